use ink::{codegen::TraitCallBuilder, env::DefaultEnvironment, prelude::vec};
use pendzl::{
    contracts::psp22::{PSP22Ref, PSP22},
    traits::{AccountId, Balance},
};

use crate::errors::PoolError;

/// Payment asset of a sale, fixed at pool initialization.
///
/// Contributions and payouts move through the chain's native transfer or
/// through PSP22 calls depending on the variant. Each pool exposes two
/// purchase entry points and only the one matching this variant is live.
#[derive(Debug, Copy, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub enum Currency {
    Native,
    Token(AccountId),
}

impl Currency {
    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native)
    }

    /// Entry check for `purchase`, which pulls PSP22 tokens.
    pub fn ensure_token_entry(&self) -> Result<(), PoolError> {
        match self {
            Currency::Native => Err(PoolError::WrongCurrencyPath),
            Currency::Token(_) => Ok(()),
        }
    }

    /// Entry check for `purchase_native`, which reads the transferred value.
    pub fn ensure_native_entry(&self) -> Result<(), PoolError> {
        match self {
            Currency::Native => Ok(()),
            Currency::Token(_) => Err(PoolError::WrongCurrencyPath),
        }
    }

    /// Pays `amount` out of the pool. Zero transfers are skipped.
    pub fn transfer(&self, to: AccountId, amount: Balance) -> Result<(), PoolError> {
        if amount == 0 {
            return Ok(());
        }
        match self {
            Currency::Native => match ink::env::transfer::<DefaultEnvironment>(to, amount) {
                Ok(_) => Ok(()),
                Err(_) => Err(PoolError::NativeTransferFailed),
            },
            Currency::Token(asset) => {
                let mut psp22: PSP22Ref = (*asset).into();
                psp22
                    .call_mut()
                    .transfer(to, amount, vec![])
                    .call_v1()
                    .invoke()?;
                Ok(())
            }
        }
    }

    /// Pulls `amount` from `from` into `to`. Native contributions arrive as
    /// transferred value instead, so the native variant has no pull path.
    pub fn transfer_from(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), PoolError> {
        match self {
            Currency::Native => Err(PoolError::WrongCurrencyPath),
            Currency::Token(asset) => {
                let mut psp22: PSP22Ref = (*asset).into();
                psp22
                    .call_mut()
                    .transfer_from(from, to, amount, vec![])
                    .call_v1()
                    .invoke()?;
                Ok(())
            }
        }
    }

    /// Currency units held by the executing contract.
    pub fn self_balance(&self) -> Balance {
        match self {
            Currency::Native => ink::env::balance::<DefaultEnvironment>(),
            Currency::Token(asset) => {
                let psp22: PSP22Ref = (*asset).into();
                psp22
                    .call()
                    .balance_of(ink::env::account_id::<DefaultEnvironment>())
                    .call_v1()
                    .invoke()
            }
        }
    }

    /// Spendable balance of `owner`. The native variant reports no limit
    /// since the value already arrives with the call.
    pub fn balance_of(&self, owner: AccountId) -> Balance {
        match self {
            Currency::Native => Balance::MAX,
            Currency::Token(asset) => {
                let psp22: PSP22Ref = (*asset).into();
                psp22.call().balance_of(owner).call_v1().invoke()
            }
        }
    }

    /// Allowance granted by `owner` to `spender`. The native variant has no
    /// allowance concept and reports no limit.
    pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
        match self {
            Currency::Native => Balance::MAX,
            Currency::Token(asset) => {
                let psp22: PSP22Ref = (*asset).into();
                psp22.call().allowance(owner, spender).call_v1().invoke()
            }
        }
    }
}
