use pendzl::traits::Balance;

/// Funds the pool can release to governance without touching amounts
/// still owed to participants. `amount` is denominated in the sale
/// currency, `volume` in the underlying token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Withdrawable {
    pub amount: Balance,
    pub volume: Balance,
}

/// Pool-wide outcome of a public sale settlement.
///
/// Before the settlement is frozen this is a projection over the live
/// contribution book; afterwards it is the recorded result and no longer
/// follows the pool balance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct SettlementSummary {
    pub completed: bool,
    /// Fraction of every contribution the pool keeps, 1e18-scaled.
    pub rate: u128,
    /// Currency kept by the pool across all participants.
    pub amount: Balance,
    /// Underlying reserved for distribution across all participants.
    pub volume: Balance,
}

/// One participant's share of a public sale settlement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct ParticipantSettlement {
    pub completed: bool,
    pub rate: u128,
    /// Currency returned to the participant on claim.
    pub refund: Balance,
    /// Underlying paid to the participant on claim.
    pub volume: Balance,
}
