use ink::{contract_ref, env::DefaultEnvironment, prelude::vec::Vec};
use pendzl::traits::{AccountId, Balance, Timestamp};
use pool_primitives::{currency::Currency, errors::PoolError, structs::Withdrawable};

/// An allowlisted fixed-ratio token sale.
///
/// Governance allocates purchase rights per account. During the purchase
/// window each allowlisted account buys once, paying in the pool currency
/// and receiving underlying volume at the fixed ratio when the claim
/// window opens.
#[ink::trait_definition]
pub trait PrivatePool {
    /// Redirects future currency forwards to `recipient`.
    ///
    /// # Errors
    /// - `CallerIsNotGovernor` if the caller is not the governor.
    /// - `InvalidRecipient` if `recipient` is the zero address.
    #[ink(message)]
    fn set_recipient(&mut self, recipient: AccountId) -> Result<(), PoolError>;

    /// Sets the absolute currency allocation of one account.
    ///
    /// # Errors
    /// - `CallerIsNotGovernor` if the caller is not the governor.
    #[ink(message)]
    fn set_allocation(&mut self, account: AccountId, allocation: Balance)
        -> Result<(), PoolError>;

    /// Grants the same allocation to every listed account.
    ///
    /// # Errors
    /// - `CallerIsNotGovernor` if the caller is not the governor.
    #[ink(message)]
    fn set_allocations_even(
        &mut self,
        accounts: Vec<AccountId>,
        allocation: Balance,
    ) -> Result<(), PoolError>;

    /// Sets a distinct allocation per listed account.
    ///
    /// # Errors
    /// - `CallerIsNotGovernor` if the caller is not the governor.
    /// - `LengthMismatch` if the two lists differ in length.
    #[ink(message)]
    fn set_allocations(
        &mut self,
        accounts: Vec<AccountId>,
        allocations: Vec<Balance>,
    ) -> Result<(), PoolError>;

    /// Buys with `amount` of the PSP22 pool currency, pulled from the
    /// caller. Single shot: the amount must fit the caller's allocation.
    ///
    /// # Errors
    /// - `WrongCurrencyPath` if the pool currency is native.
    /// - `PoolNotStarted` / `PoolExpired` outside the purchase window.
    /// - `NoAllocation` / `AlreadyPurchased` / `OverAllocated` if the
    ///   caller has no open allocation covering `amount`.
    /// - `InsufficientVolume` if the pool holds too little underlying.
    /// - `InsufficientAllowance` / `InsufficientBalance` if the caller
    ///   cannot fund the purchase.
    #[ink(message)]
    fn purchase(&mut self, amount: Balance) -> Result<(), PoolError>;

    /// Buys with the transferred native value. Value beyond the caller's
    /// allocation is refunded in the same call.
    ///
    /// # Errors
    /// - `WrongCurrencyPath` if the pool currency is a PSP22 token.
    /// - `PoolNotStarted` / `PoolExpired` outside the purchase window.
    /// - `NoAllocation` / `AlreadyPurchased` if the caller has no open
    ///   allocation.
    /// - `InsufficientVolume` if the pool holds too little underlying.
    #[ink(message, payable)]
    fn purchase_native(&mut self) -> Result<(), PoolError>;

    /// Pays out the caller's purchased volume, forwards the caller's
    /// currency to the recipient and sweeps unsold underlying along.
    ///
    /// # Errors
    /// - `ClaimNotStarted` before the claim window opens.
    /// - `NothingToClaim` / `AlreadyClaimed` if the caller has no open
    ///   purchase.
    #[ink(message)]
    fn claim(&mut self) -> Result<(), PoolError>;

    /// Releases up to `amount` currency and `volume` underlying to `to`,
    /// capped at what is not owed to participants.
    ///
    /// # Errors
    /// - `CallerIsNotGovernor` if the caller is neither the governor nor
    ///   the recipient.
    /// - `PoolIncomplete` before the claim window opens.
    #[ink(message)]
    fn withdraw(&mut self, to: AccountId, amount: Balance, volume: Balance)
        -> Result<(), PoolError>;
}

#[ink::trait_definition]
pub trait PrivatePoolView {
    #[ink(message)]
    fn governor(&self) -> AccountId;

    #[ink(message)]
    fn currency(&self) -> Currency;

    #[ink(message)]
    fn underlying_token(&self) -> AccountId;

    /// Underlying units granted per currency unit, 1e18-scaled.
    #[ink(message)]
    fn ratio(&self) -> u128;

    #[ink(message)]
    fn recipient(&self) -> AccountId;

    #[ink(message)]
    fn purchase_time(&self) -> Timestamp;

    #[ink(message)]
    fn withdraw_time(&self) -> Timestamp;

    #[ink(message)]
    fn allocation_of(&self, account: AccountId) -> Balance;

    #[ink(message)]
    fn total_allocation(&self) -> Balance;

    #[ink(message)]
    fn contribution_of(&self, account: AccountId) -> Balance;

    #[ink(message)]
    fn total_contributed(&self) -> Balance;

    #[ink(message)]
    fn purchased_of(&self, account: AccountId) -> Balance;

    #[ink(message)]
    fn total_purchased(&self) -> Balance;

    #[ink(message)]
    fn claimed_of(&self, account: AccountId) -> Balance;

    #[ink(message)]
    fn total_claimed(&self) -> Balance;

    /// Zero on both legs until the claim window opens.
    #[ink(message)]
    fn withdrawable(&self) -> Withdrawable;
}

pub type PrivatePoolRef = contract_ref!(PrivatePool, DefaultEnvironment);
pub type PrivatePoolViewRef = contract_ref!(PrivatePoolView, DefaultEnvironment);
