pub use ink::primitives::AccountId;
pub use pendzl::traits::Balance;

#[ink::event]
pub struct AllocationSet {
    #[ink(topic)]
    pub account: AccountId,
    pub allocation: Balance,
}

#[ink::event]
pub struct RecipientChanged {
    #[ink(topic)]
    pub recipient: AccountId,
}

#[ink::event]
pub struct Purchased {
    #[ink(topic)]
    pub account: AccountId,
    pub amount: Balance,
    pub volume: Balance,
}

#[ink::event]
pub struct Claimed {
    #[ink(topic)]
    pub account: AccountId,
    pub volume: Balance,
}

#[ink::event]
pub struct Withdrawn {
    #[ink(topic)]
    pub to: AccountId,
    pub amount: Balance,
    pub volume: Balance,
}
