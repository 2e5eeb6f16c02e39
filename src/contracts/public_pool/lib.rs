// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod modules;

/// An open pro-rata sale pool holding an underlying PSP22 token.
#[ink::contract]
pub mod public_pool {
    pub use crate::modules::pool::{
        events::{Claimed, MaxAllocationChanged, Purchased, Settled, Withdrawn},
        traits::{PublicPool, PublicPoolRef, PublicPoolView, PublicPoolViewRef},
    };
    use ink::codegen::TraitCallBuilder;
    pub use ink::{codegen::Env, prelude::vec};
    use pendzl::contracts::psp22::{PSP22Ref, PSP22};
    use pool_primitives::{
        currency::Currency,
        errors::PoolError,
        storage_fields::{
            public_sale::PublicSaleStorage, reentrancy_guard::ReentrancyGuardStorage,
        },
        structs::{ParticipantSettlement, SettlementSummary, Withdrawable},
    };

    #[ink(storage)]
    #[derive(pendzl::traits::StorageFieldGetter)]
    pub struct PublicPoolContract {
        #[storage_field]
        sale: PublicSaleStorage,
        #[storage_field]
        guard: ReentrancyGuardStorage,
    }

    impl PublicPoolContract {
        #[ink(constructor)]
        #[allow(clippy::too_many_arguments)]
        pub fn new(
            governor: AccountId,
            currency: Currency,
            underlying_token: AccountId,
            price: u128,
            max_allocation: Balance,
            purchase_deadline: Timestamp,
            settle_time: Timestamp,
        ) -> Result<Self, PoolError> {
            Ok(PublicPoolContract {
                sale: PublicSaleStorage::new(
                    governor,
                    currency,
                    underlying_token,
                    price,
                    max_allocation,
                    purchase_deadline,
                    settle_time,
                )?,
                guard: Default::default(),
            })
        }
    }

    impl PublicPool for PublicPoolContract {
        #[ink(message)]
        fn set_max_allocation(&mut self, max_allocation: Balance) -> Result<(), PoolError> {
            self._ensure_governor()?;
            self.sale.max_allocation = max_allocation;

            self.env().emit_event(MaxAllocationChanged { max_allocation });
            Ok(())
        }

        #[ink(message)]
        fn purchase(&mut self, amount: Balance) -> Result<(), PoolError> {
            self.guard.enter()?;
            self.sale.currency.ensure_token_entry()?;
            self._ensure_purchase_phase()?;

            let caller = self.env().caller();
            self.sale.contribute(&caller, amount)?;
            self._ensure_currency_funds(caller, amount)?;

            self.sale
                .currency
                .transfer_from(caller, self.env().account_id(), amount)?;
            self.guard.exit();

            self.env().emit_event(Purchased {
                account: caller,
                amount,
            });
            Ok(())
        }

        #[ink(message, payable)]
        fn purchase_native(&mut self) -> Result<(), PoolError> {
            self.guard.enter()?;
            self.sale.currency.ensure_native_entry()?;
            self._ensure_purchase_phase()?;

            let caller = self.env().caller();
            let value = self.env().transferred_value();
            self.sale.contribute(&caller, value)?;
            self.guard.exit();

            self.env().emit_event(Purchased {
                account: caller,
                amount: value,
            });
            Ok(())
        }

        #[ink(message)]
        fn settle(&mut self) -> Result<SettlementSummary, PoolError> {
            self._ensure_settle_phase()?;

            let already_settled = self.sale.is_settled();
            let summary = self.sale.settle(self.underlying_balance())?;
            if !already_settled {
                self.env().emit_event(Settled {
                    rate: summary.rate,
                    amount: summary.amount,
                    volume: summary.volume,
                });
            }
            Ok(summary)
        }

        #[ink(message)]
        fn claim(&mut self) -> Result<(), PoolError> {
            self.guard.enter()?;
            self._ensure_claim_phase()?;

            let caller = self.env().caller();
            let already_settled = self.sale.is_settled();
            let claim = self
                .sale
                .record_claim(&caller, self.underlying_balance())?;
            if !already_settled {
                if let Some(summary) = self.sale.settlement() {
                    self.env().emit_event(Settled {
                        rate: summary.rate,
                        amount: summary.amount,
                        volume: summary.volume,
                    });
                }
            }

            self.transfer_underlying(caller, claim.volume)?;
            self.sale.currency.transfer(caller, claim.refund)?;
            self.guard.exit();

            self.env().emit_event(Claimed {
                account: caller,
                volume: claim.volume,
                refund: claim.refund,
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
            self._ensure_governor()?;
            self._ensure_complete()?;

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

    impl PublicPoolView for PublicPoolContract {
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
        fn price(&self) -> u128 {
            self.sale.price
        }

        #[ink(message)]
        fn max_allocation(&self) -> Balance {
            self.sale.max_allocation
        }

        #[ink(message)]
        fn purchase_deadline(&self) -> Timestamp {
            self.sale.purchase_deadline
        }

        #[ink(message)]
        fn settle_time(&self) -> Timestamp {
            self.sale.settle_time
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
        fn settleable(&self, account: AccountId) -> Result<ParticipantSettlement, PoolError> {
            self.sale.settleable(&account, self.underlying_balance())
        }

        #[ink(message)]
        fn total_settleable(&self) -> Result<SettlementSummary, PoolError> {
            self.sale.total_settleable(self.underlying_balance())
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
        fn total_refunded(&self) -> Balance {
            self.sale.total_refunded()
        }

        #[ink(message)]
        fn withdrawable(&self) -> Withdrawable {
            // Skip the balance lookups while nothing can leave anyway.
            if !self.sale.is_settled() {
                return Withdrawable {
                    amount: 0,
                    volume: 0,
                };
            }
            self.sale
                .withdrawable(self.currency_balance(), self.underlying_balance())
        }
    }

    impl PublicPoolContract {
        fn _ensure_governor(&self) -> Result<(), PoolError> {
            if self.env().caller() != self.sale.governor {
                return Err(PoolError::CallerIsNotGovernor);
            }
            Ok(())
        }

        fn _ensure_purchase_phase(&self) -> Result<(), PoolError> {
            if self.env().block_timestamp() >= self.sale.purchase_deadline {
                return Err(PoolError::PoolExpired);
            }
            Ok(())
        }

        fn _ensure_settle_phase(&self) -> Result<(), PoolError> {
            if self.env().block_timestamp() < self.sale.purchase_deadline {
                return Err(PoolError::TooEarlyToSettle);
            }
            Ok(())
        }

        fn _ensure_claim_phase(&self) -> Result<(), PoolError> {
            if self.env().block_timestamp() < self.sale.settle_time {
                return Err(PoolError::ClaimNotStarted);
            }
            Ok(())
        }

        fn _ensure_complete(&self) -> Result<(), PoolError> {
            if !self.sale.is_settled() {
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

    #[cfg(test)]
    mod tests {
        use super::*;
        use ink::env::{test, DefaultEnvironment};
        use pool_primitives::constants::E18_U128;

        fn accounts() -> test::DefaultAccounts<DefaultEnvironment> {
            test::default_accounts::<DefaultEnvironment>()
        }

        fn set_caller(caller: AccountId) {
            test::set_caller::<DefaultEnvironment>(caller);
        }

        fn set_now(now: Timestamp) {
            test::set_block_timestamp::<DefaultEnvironment>(now);
        }

        fn set_value(value: Balance) {
            test::set_value_transferred::<DefaultEnvironment>(value);
        }

        // Governor alice, 0.001 currency per unit, 1 currency cap,
        // purchases until 1_000, claims from 2_000.
        fn deploy(currency: Currency) -> PublicPoolContract {
            let accs = accounts();
            set_caller(accs.alice);
            PublicPoolContract::new(
                accs.alice,
                currency,
                accs.django,
                E18_U128 / 1000,
                E18_U128,
                1_000,
                2_000,
            )
            .unwrap()
        }

        // On chain a failed message reverts the entered flag with the rest
        // of the state; direct calls keep it, so failing-path tests that
        // call again clear it by hand.
        fn unwind_guard(pool: &mut PublicPoolContract) {
            pool.guard.exit();
        }

        #[ink::test]
        fn new_validates_the_configuration() {
            let accs = accounts();

            let result = PublicPoolContract::new(
                accs.alice,
                Currency::Native,
                pool_primitives::constants::zero_address(),
                E18_U128 / 1000,
                E18_U128,
                1_000,
                2_000,
            );
            assert!(matches!(result, Err(PoolError::InvalidUnderlyingToken)));

            let result = PublicPoolContract::new(
                accs.alice,
                Currency::Native,
                accs.django,
                E18_U128 / 1000,
                E18_U128,
                2_000,
                1_000,
            );
            assert!(matches!(result, Err(PoolError::InvalidTimeWindow)));
        }

        #[ink::test]
        fn views_expose_the_configuration() {
            let accs = accounts();
            let pool = deploy(Currency::Native);

            assert_eq!(pool.governor(), accs.alice);
            assert_eq!(pool.currency(), Currency::Native);
            assert_eq!(pool.underlying_token(), accs.django);
            assert_eq!(pool.price(), E18_U128 / 1000);
            assert_eq!(pool.max_allocation(), E18_U128);
            assert_eq!(pool.purchase_deadline(), 1_000);
            assert_eq!(pool.settle_time(), 2_000);
        }

        #[ink::test]
        fn set_max_allocation_is_governor_only() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);

            set_caller(accs.bob);
            assert_eq!(
                pool.set_max_allocation(2 * E18_U128),
                Err(PoolError::CallerIsNotGovernor)
            );

            set_caller(accs.alice);
            pool.set_max_allocation(2 * E18_U128).unwrap();
            assert_eq!(pool.max_allocation(), 2 * E18_U128);
        }

        #[ink::test]
        fn contributions_accumulate_up_to_the_cap() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);
            set_caller(accs.bob);

            set_value(E18_U128 / 2);
            pool.purchase_native().unwrap();
            assert_eq!(pool.contribution_of(accs.bob), E18_U128 / 2);

            set_value(E18_U128);
            assert_eq!(pool.purchase_native(), Err(PoolError::OverAllocated));
            unwind_guard(&mut pool);
            assert_eq!(pool.contribution_of(accs.bob), E18_U128 / 2);

            set_value(E18_U128 / 5);
            pool.purchase_native().unwrap();
            assert_eq!(pool.contribution_of(accs.bob), 7 * E18_U128 / 10);
            assert_eq!(pool.total_contributed(), 7 * E18_U128 / 10);
        }

        #[ink::test]
        fn accounts_contribute_against_separate_caps() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);

            set_caller(accs.bob);
            set_value(E18_U128);
            pool.purchase_native().unwrap();

            set_caller(accs.charlie);
            set_value(E18_U128 / 2);
            pool.purchase_native().unwrap();

            assert_eq!(pool.contribution_of(accs.bob), E18_U128);
            assert_eq!(pool.contribution_of(accs.charlie), E18_U128 / 2);
            assert_eq!(pool.total_contributed(), 3 * E18_U128 / 2);
        }

        #[ink::test]
        fn a_raised_cap_admits_further_contributions() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);

            set_caller(accs.bob);
            set_value(E18_U128);
            pool.purchase_native().unwrap();

            set_value(1);
            assert_eq!(pool.purchase_native(), Err(PoolError::OverAllocated));
            unwind_guard(&mut pool);

            set_caller(accs.alice);
            pool.set_max_allocation(2 * E18_U128).unwrap();

            set_caller(accs.bob);
            set_value(E18_U128);
            pool.purchase_native().unwrap();
            assert_eq!(pool.contribution_of(accs.bob), 2 * E18_U128);
        }

        #[ink::test]
        fn purchases_stop_at_the_deadline() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);
            set_caller(accs.bob);
            set_value(E18_U128);

            set_now(1_000);
            assert_eq!(pool.purchase_native(), Err(PoolError::PoolExpired));
        }

        #[ink::test]
        fn purchase_entry_points_match_the_currency() {
            let accs = accounts();

            let mut native_pool = deploy(Currency::Native);
            set_caller(accs.bob);
            assert_eq!(
                native_pool.purchase(E18_U128),
                Err(PoolError::WrongCurrencyPath)
            );
            // Both instances back onto the same off-chain storage cells.
            unwind_guard(&mut native_pool);

            let mut token_pool = deploy(Currency::Token(accs.frank));
            set_caller(accs.bob);
            assert_eq!(
                token_pool.purchase_native(),
                Err(PoolError::WrongCurrencyPath)
            );
        }

        #[ink::test]
        fn settle_waits_for_the_deadline() {
            let mut pool = deploy(Currency::Native);

            set_now(999);
            assert_eq!(pool.settle(), Err(PoolError::TooEarlyToSettle));
        }

        #[ink::test]
        fn claims_wait_for_the_settle_time() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);

            set_caller(accs.bob);
            set_now(1_999);
            assert_eq!(pool.claim(), Err(PoolError::ClaimNotStarted));
        }

        #[ink::test]
        fn withdraw_is_governor_only_and_needs_settlement() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);

            set_caller(accs.bob);
            assert_eq!(
                pool.withdraw(accs.bob, 1, 1),
                Err(PoolError::CallerIsNotGovernor)
            );
            unwind_guard(&mut pool);

            // Past the deadline but nobody settled: still incomplete.
            set_caller(accs.alice);
            set_now(1_500);
            assert_eq!(
                pool.withdraw(accs.alice, 1, 1),
                Err(PoolError::PoolIncomplete)
            );
        }

        #[ink::test]
        fn withdrawable_is_zero_until_settled() {
            let pool = deploy(Currency::Native);

            set_now(3_000);
            assert_eq!(
                pool.withdrawable(),
                Withdrawable {
                    amount: 0,
                    volume: 0,
                }
            );
        }

        #[ink::test]
        fn a_locked_guard_blocks_every_money_path() {
            let accs = accounts();
            let mut pool = deploy(Currency::Native);
            pool.guard.enter().unwrap();

            set_caller(accs.bob);
            set_value(E18_U128);
            assert_eq!(pool.purchase_native(), Err(PoolError::ReentrantCall));
            assert_eq!(pool.purchase(E18_U128), Err(PoolError::ReentrantCall));
            set_now(2_000);
            assert_eq!(pool.claim(), Err(PoolError::ReentrantCall));
            set_caller(accs.alice);
            assert_eq!(
                pool.withdraw(accs.alice, 0, 0),
                Err(PoolError::ReentrantCall)
            );
        }
    }
}
