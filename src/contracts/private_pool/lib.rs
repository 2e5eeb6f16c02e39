// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod modules;

/// An allowlisted fixed-ratio sale pool holding an underlying PSP22 token.
#[ink::contract]
pub mod private_pool {
    pub use crate::modules::pool::{
        events::{AllocationSet, Claimed, Purchased, RecipientChanged, Withdrawn},
        traits::{PrivatePool, PrivatePoolRef, PrivatePoolView, PrivatePoolViewRef},
    };
    use ink::codegen::TraitCallBuilder;
    pub use ink::{
        codegen::Env,
        prelude::{vec, vec::Vec},
    };
    use pendzl::contracts::psp22::{PSP22Ref, PSP22};
    use pool_primitives::{
        constants::zero_address,
        currency::Currency,
        errors::PoolError,
        storage_fields::{
            private_sale::{AllocationFit, PrivateSaleStorage},
            reentrancy_guard::ReentrancyGuardStorage,
        },
        structs::Withdrawable,
    };

    #[ink(storage)]
    #[derive(pendzl::traits::StorageFieldGetter)]
    pub struct PrivatePoolContract {
        #[storage_field]
        sale: PrivateSaleStorage,
        #[storage_field]
        guard: ReentrancyGuardStorage,
    }

    impl PrivatePoolContract {
        #[ink(constructor)]
        #[allow(clippy::too_many_arguments)]
        pub fn new(
            governor: AccountId,
            currency: Currency,
            underlying_token: AccountId,
            ratio: u128,
            recipient: AccountId,
            purchase_time: Timestamp,
            withdraw_time: Timestamp,
        ) -> Result<Self, PoolError> {
            Ok(PrivatePoolContract {
                sale: PrivateSaleStorage::new(
                    governor,
                    currency,
                    underlying_token,
                    ratio,
                    recipient,
                    purchase_time,
                    withdraw_time,
                )?,
                guard: Default::default(),
            })
        }
    }

    impl PrivatePool for PrivatePoolContract {
        #[ink(message)]
        fn set_recipient(&mut self, recipient: AccountId) -> Result<(), PoolError> {
            self._ensure_governor()?;
            if recipient == zero_address() {
                return Err(PoolError::InvalidRecipient);
            }
            self.sale.recipient = recipient;

            self.env().emit_event(RecipientChanged { recipient });
            Ok(())
        }

        #[ink(message)]
        fn set_allocation(
            &mut self,
            account: AccountId,
            allocation: Balance,
        ) -> Result<(), PoolError> {
            self._ensure_governor()?;
            self.sale.set_allocation(&account, allocation)?;

            self.env().emit_event(AllocationSet {
                account,
                allocation,
            });
            Ok(())
        }

        #[ink(message)]
        fn set_allocations_even(
            &mut self,
            accounts: Vec<AccountId>,
            allocation: Balance,
        ) -> Result<(), PoolError> {
            self._ensure_governor()?;
            for account in accounts {
                self.sale.set_allocation(&account, allocation)?;
                self.env().emit_event(AllocationSet {
                    account,
                    allocation,
                });
            }
            Ok(())
        }

        #[ink(message)]
        fn set_allocations(
            &mut self,
            accounts: Vec<AccountId>,
            allocations: Vec<Balance>,
        ) -> Result<(), PoolError> {
            self._ensure_governor()?;
            if accounts.len() != allocations.len() {
                return Err(PoolError::LengthMismatch);
            }
            for (account, allocation) in accounts.into_iter().zip(allocations) {
                self.sale.set_allocation(&account, allocation)?;
                self.env().emit_event(AllocationSet {
                    account,
                    allocation,
                });
            }
            Ok(())
        }

        #[ink(message)]
        fn purchase(&mut self, amount: Balance) -> Result<(), PoolError> {
            self.guard.enter()?;
            self.sale.currency.ensure_token_entry()?;
            self._ensure_purchase_phase()?;

            let caller = self.env().caller();
            let purchase = self.sale.contribute(
                &caller,
                amount,
                AllocationFit::Exact,
                self.underlying_balance(),
            )?;
            self._ensure_currency_funds(caller, purchase.accepted)?;

            self.sale
                .currency
                .transfer_from(caller, self.env().account_id(), purchase.accepted)?;
            self.guard.exit();

            self.env().emit_event(Purchased {
                account: caller,
                amount: purchase.accepted,
                volume: purchase.volume,
            });
            Ok(())
        }

        #[ink(message, payable)]
        fn purchase_native(&mut self) -> Result<(), PoolError> {
            self.guard.enter()?;
            self.sale.currency.ensure_native_entry()?;
            self._ensure_purchase_phase()?;

            let caller = self.env().caller();
            let purchase = self.sale.contribute(
                &caller,
                self.env().transferred_value(),
                AllocationFit::CapAndRefund,
                self.underlying_balance(),
            )?;

            // Value beyond the allocation goes straight back.
            self.sale.currency.transfer(caller, purchase.refund)?;
            self.guard.exit();

            self.env().emit_event(Purchased {
                account: caller,
                amount: purchase.accepted,
                volume: purchase.volume,
            });
            Ok(())
        }

        #[ink(message)]
        fn claim(&mut self) -> Result<(), PoolError> {
            self.guard.enter()?;
            self._ensure_claim_phase()?;

            let caller = self.env().caller();
            let claim = self
                .sale
                .record_claim(&caller, self.underlying_balance())?;

            self.transfer_underlying(caller, claim.volume)?;
            let recipient = self.sale.recipient;
            self.sale.currency.transfer(recipient, claim.forwarded)?;
            self.transfer_underlying(recipient, claim.sweep)?;
            self.guard.exit();

            self.env().emit_event(Claimed {
                account: caller,
                volume: claim.volume,
            });
            Ok(())
        }

        #[ink(message)]
        fn withdraw(
            &mut self,
            to: AccountId,
            amount: Balance,
            volume: Balance,
        ) -> Result<(), PoolError> {
            self.guard.enter()?;
            self._ensure_governor_or_recipient()?;
            self._ensure_withdraw_phase()?;

            let available = self
                .sale
                .withdrawable(self.currency_balance(), self.underlying_balance());
            let amount = amount.min(available.amount);
            let volume = volume.min(available.volume);

            self.sale.currency.transfer(to, amount)?;
            self.transfer_underlying(to, volume)?;
            self.guard.exit();

            self.env().emit_event(Withdrawn { to, amount, volume });
            Ok(())
        }
    }

    impl PrivatePoolView for PrivatePoolContract {
        #[ink(message)]
        fn governor(&self) -> AccountId {
            self.sale.governor
        }

        #[ink(message)]
        fn currency(&self) -> Currency {
            self.sale.currency
        }

        #[ink(message)]
        fn underlying_token(&self) -> AccountId {
            self.sale.underlying_token
        }

        #[ink(message)]
        fn ratio(&self) -> u128 {
            self.sale.ratio
        }

        #[ink(message)]
        fn recipient(&self) -> AccountId {
            self.sale.recipient
        }

        #[ink(message)]
        fn purchase_time(&self) -> Timestamp {
            self.sale.purchase_time
        }

        #[ink(message)]
        fn withdraw_time(&self) -> Timestamp {
            self.sale.withdraw_time
        }

        #[ink(message)]
        fn allocation_of(&self, account: AccountId) -> Balance {
            self.sale.allocation_of(&account)
        }

        #[ink(message)]
        fn total_allocation(&self) -> Balance {
            self.sale.total_allocation()
        }

        #[ink(message)]
        fn contribution_of(&self, account: AccountId) -> Balance {
            self.sale.contribution_of(&account)
        }

        #[ink(message)]
        fn total_contributed(&self) -> Balance {
            self.sale.total_contributed()
        }

        #[ink(message)]
        fn purchased_of(&self, account: AccountId) -> Balance {
            self.sale.purchased_of(&account)
        }

        #[ink(message)]
        fn total_purchased(&self) -> Balance {
            self.sale.total_purchased()
        }

        #[ink(message)]
        fn claimed_of(&self, account: AccountId) -> Balance {
            self.sale.claimed_of(&account)
        }

        #[ink(message)]
        fn total_claimed(&self) -> Balance {
            self.sale.total_claimed()
        }

        #[ink(message)]
        fn withdrawable(&self) -> Withdrawable {
            // Skip the balance lookups while nothing can leave anyway.
            if self.env().block_timestamp() < self.sale.withdraw_time {
                return Withdrawable {
                    amount: 0,
                    volume: 0,
                };
            }
            self.sale
                .withdrawable(self.currency_balance(), self.underlying_balance())
        }
    }

    impl PrivatePoolContract {
        fn _ensure_governor(&self) -> Result<(), PoolError> {
            if self.env().caller() != self.sale.governor {
                return Err(PoolError::CallerIsNotGovernor);
            }
            Ok(())
        }

        fn _ensure_governor_or_recipient(&self) -> Result<(), PoolError> {
            let caller = self.env().caller();
            if caller != self.sale.governor && caller != self.sale.recipient {
                return Err(PoolError::CallerIsNotGovernor);
            }
            Ok(())
        }

        fn _ensure_purchase_phase(&self) -> Result<(), PoolError> {
            let now = self.env().block_timestamp();
            if now < self.sale.purchase_time {
                return Err(PoolError::PoolNotStarted);
            }
            if now >= self.sale.withdraw_time {
                return Err(PoolError::PoolExpired);
            }
            Ok(())
        }

        fn _ensure_claim_phase(&self) -> Result<(), PoolError> {
            if self.env().block_timestamp() < self.sale.withdraw_time {
                return Err(PoolError::ClaimNotStarted);
            }
            Ok(())
        }

        fn _ensure_withdraw_phase(&self) -> Result<(), PoolError> {
            if self.env().block_timestamp() < self.sale.withdraw_time {
                return Err(PoolError::PoolIncomplete);
            }
            Ok(())
        }

        fn _ensure_currency_funds(&self, from: AccountId, amount: Balance) -> Result<(), PoolError> {
            let currency = &self.sale.currency;
            if currency.allowance(from, self.env().account_id()) < amount {
                return Err(PoolError::InsufficientAllowance);
            }
            if currency.balance_of(from) < amount {
                return Err(PoolError::InsufficientBalance);
            }
            Ok(())
        }

        fn currency_balance(&self) -> Balance {
            self.sale.currency.self_balance()
        }

        fn underlying_balance(&self) -> Balance {
            let underlying: PSP22Ref = self.sale.underlying_token.into();
            underlying
                .call()
                .balance_of(self.env().account_id())
                .call_v1()
                .invoke()
        }

        fn transfer_underlying(&self, to: AccountId, volume: Balance) -> Result<(), PoolError> {
            if volume == 0 {
                return Ok(());
            }
            let mut underlying: PSP22Ref = self.sale.underlying_token.into();
            underlying
                .call_mut()
                .transfer(to, volume, vec![])
                .call_v1()
                .invoke()?;
            Ok(())
        }
    }

}
