use ink::{contract_ref, env::DefaultEnvironment};
use pendzl::traits::{AccountId, Balance, Timestamp};
use pool_primitives::{
    currency::Currency,
    errors::PoolError,
    structs::{ParticipantSettlement, SettlementSummary, Withdrawable},
};

/// An open pro-rata token sale.
///
/// Anyone contributes currency up to a per-account cap until the purchase
/// deadline. Settlement then fixes how much of every contribution the pool
/// keeps, based on the underlying it holds at the fixed price; claims pay
/// out the bought volume together with the refund of the unkept rest.
#[ink::trait_definition]
pub trait PublicPool {
    /// Moves the per-account contribution cap.
    ///
    /// # Errors
    /// - `CallerIsNotGovernor` if the caller is not the governor.
    #[ink(message)]
    fn set_max_allocation(&mut self, max_allocation: Balance) -> Result<(), PoolError>;

    /// Contributes `amount` of the PSP22 pool currency, pulled from the
    /// caller. Repeatable while the running total stays under the cap.
    ///
    /// # Errors
    /// - `WrongCurrencyPath` if the pool currency is native.
    /// - `PoolExpired` after the purchase deadline.
    /// - `OverAllocated` if the running total would pass the cap.
    /// - `InsufficientAllowance` / `InsufficientBalance` if the caller
    ///   cannot fund the contribution.
    #[ink(message)]
    fn purchase(&mut self, amount: Balance) -> Result<(), PoolError>;

    /// Contributes the transferred native value.
    ///
    /// # Errors
    /// - `WrongCurrencyPath` if the pool currency is a PSP22 token.
    /// - `PoolExpired` after the purchase deadline.
    /// - `OverAllocated` if the running total would pass the cap.
    #[ink(message, payable)]
    fn purchase_native(&mut self) -> Result<(), PoolError>;

    /// Freezes the settlement against the underlying held right now.
    /// Callable by anyone once the purchase deadline has passed; repeated
    /// calls return the recorded result.
    ///
    /// # Errors
    /// - `TooEarlyToSettle` before the purchase deadline.
    #[ink(message)]
    fn settle(&mut self) -> Result<SettlementSummary, PoolError>;

    /// Pays out the caller's settled volume and refund, settling the pool
    /// first if no one has yet.
    ///
    /// # Errors
    /// - `ClaimNotStarted` before the settle time.
    /// - `NothingToClaim` / `AlreadyClaimed` if the caller has no open
    ///   contribution.
    #[ink(message)]
    fn claim(&mut self) -> Result<(), PoolError>;

    /// Releases up to `amount` currency and `volume` underlying to `to`,
    /// capped at what is not owed to participants.
    ///
    /// # Errors
    /// - `CallerIsNotGovernor` if the caller is not the governor.
    /// - `PoolIncomplete` while the pool is unsettled.
    #[ink(message)]
    fn withdraw(&mut self, to: AccountId, amount: Balance, volume: Balance)
        -> Result<(), PoolError>;
}

#[ink::trait_definition]
pub trait PublicPoolView {
    #[ink(message)]
    fn governor(&self) -> AccountId;

    #[ink(message)]
    fn currency(&self) -> Currency;

    #[ink(message)]
    fn underlying_token(&self) -> AccountId;

    /// Currency units per underlying unit, 1e18-scaled.
    #[ink(message)]
    fn price(&self) -> u128;

    #[ink(message)]
    fn max_allocation(&self) -> Balance;

    #[ink(message)]
    fn purchase_deadline(&self) -> Timestamp;

    #[ink(message)]
    fn settle_time(&self) -> Timestamp;

    #[ink(message)]
    fn contribution_of(&self, account: AccountId) -> Balance;

    #[ink(message)]
    fn total_contributed(&self) -> Balance;

    /// The account's settlement share: a live projection before the pool
    /// settles, the frozen record afterwards.
    #[ink(message)]
    fn settleable(&self, account: AccountId) -> Result<ParticipantSettlement, PoolError>;

    /// The pool-wide settlement: a live projection before the pool
    /// settles, the frozen record afterwards.
    #[ink(message)]
    fn total_settleable(&self) -> Result<SettlementSummary, PoolError>;

    #[ink(message)]
    fn claimed_of(&self, account: AccountId) -> Balance;

    #[ink(message)]
    fn total_claimed(&self) -> Balance;

    #[ink(message)]
    fn total_refunded(&self) -> Balance;

    /// Zero on both legs until the pool settles.
    #[ink(message)]
    fn withdrawable(&self) -> Withdrawable;
}

pub type PublicPoolRef = contract_ref!(PublicPool, DefaultEnvironment);
pub type PublicPoolViewRef = contract_ref!(PublicPoolView, DefaultEnvironment);
