pub use ink::primitives::AccountId;
pub use pendzl::traits::Balance;

#[ink::event]
pub struct MaxAllocationChanged {
    pub max_allocation: Balance,
}

#[ink::event]
pub struct Purchased {
    #[ink(topic)]
    pub account: AccountId,
    pub amount: Balance,
}

#[ink::event]
pub struct Settled {
    pub rate: u128,
    pub amount: Balance,
    pub volume: Balance,
}

#[ink::event]
pub struct Claimed {
    #[ink(topic)]
    pub account: AccountId,
    pub volume: Balance,
    pub refund: Balance,
}

#[ink::event]
pub struct Withdrawn {
    #[ink(topic)]
    pub to: AccountId,
    pub amount: Balance,
    pub volume: Balance,
}
