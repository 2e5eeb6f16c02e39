use ink::storage::Mapping;
use pendzl::{
    math::errors::MathError,
    traits::{AccountId, Balance, Timestamp},
};

use crate::{
    constants::zero_address,
    currency::Currency,
    errors::PoolError,
    math::mul_denom_e18,
    structs::Withdrawable,
};

/// How an incoming contribution is fitted to the caller's allocation.
pub enum AllocationFit {
    /// Reject amounts above the allocation. Used by the token entry where
    /// the pool pulls an exact amount.
    Exact,
    /// Accept up to the allocation and report the excess for refund. Used
    /// by the native entry where the full value already arrived.
    CapAndRefund,
}

/// Outcome of a recorded private contribution.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrivatePurchase {
    pub accepted: Balance,
    pub refund: Balance,
    pub volume: Balance,
}

/// Transfers owed after a private claim is recorded: the purchased volume
/// to the claimer, the claimer's currency and any unsold underlying slack
/// to the recipient.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrivateClaim {
    pub volume: Balance,
    pub forwarded: Balance,
    pub sweep: Balance,
}

/// Book of an allowlisted fixed-ratio sale.
///
/// Participants buy at most once, against a per-account allocation set by
/// governance, at `ratio` underlying units per currency unit (1e18-scaled).
/// Phase gating against block time is the contract's job; this item keeps
/// the accounts straight.
#[derive(Debug)]
#[pendzl::storage_item]
pub struct PrivateSaleStorage {
    pub governor: AccountId,
    pub currency: Currency,
    pub underlying_token: AccountId,
    /// Underlying units granted per currency unit, 1e18-scaled.
    pub ratio: u128,
    pub recipient: AccountId,
    pub purchase_time: Timestamp,
    pub withdraw_time: Timestamp,

    allocations: Mapping<AccountId, Balance>,
    #[lazy]
    total_allocation: Balance,

    contributions: Mapping<AccountId, Balance>,
    #[lazy]
    total_contributed: Balance,

    purchases: Mapping<AccountId, Balance>,
    #[lazy]
    total_purchased: Balance,

    claims: Mapping<AccountId, Balance>,
    #[lazy]
    total_claimed: Balance,
    #[lazy]
    total_forwarded: Balance,
}

impl PrivateSaleStorage {
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
        if underlying_token == zero_address() {
            return Err(PoolError::InvalidUnderlyingToken);
        }
        if recipient == zero_address() {
            return Err(PoolError::InvalidRecipient);
        }
        if purchase_time >= withdraw_time {
            return Err(PoolError::InvalidTimeWindow);
        }
        Ok(PrivateSaleStorage {
            governor,
            currency,
            underlying_token,
            ratio,
            recipient,
            purchase_time,
            withdraw_time,
            allocations: Default::default(),
            total_allocation: Default::default(),
            contributions: Default::default(),
            total_contributed: Default::default(),
            purchases: Default::default(),
            total_purchased: Default::default(),
            claims: Default::default(),
            total_claimed: Default::default(),
            total_forwarded: Default::default(),
        })
    }

    pub fn allocation_of(&self, account: &AccountId) -> Balance {
        self.allocations.get(account).unwrap_or(0)
    }

    pub fn total_allocation(&self) -> Balance {
        self.total_allocation.get().unwrap_or(0)
    }

    pub fn contribution_of(&self, account: &AccountId) -> Balance {
        self.contributions.get(account).unwrap_or(0)
    }

    pub fn total_contributed(&self) -> Balance {
        self.total_contributed.get().unwrap_or(0)
    }

    pub fn purchased_of(&self, account: &AccountId) -> Balance {
        self.purchases.get(account).unwrap_or(0)
    }

    pub fn total_purchased(&self) -> Balance {
        self.total_purchased.get().unwrap_or(0)
    }

    pub fn claimed_of(&self, account: &AccountId) -> Balance {
        self.claims.get(account).unwrap_or(0)
    }

    pub fn total_claimed(&self) -> Balance {
        self.total_claimed.get().unwrap_or(0)
    }

    pub fn total_forwarded(&self) -> Balance {
        self.total_forwarded.get().unwrap_or(0)
    }

    /// Sets an absolute allocation, adjusting the running total by the
    /// delta against the previous entry.
    pub fn set_allocation(
        &mut self,
        account: &AccountId,
        allocation: Balance,
    ) -> Result<(), PoolError> {
        let total = self
            .total_allocation()
            .checked_sub(self.allocation_of(account))
            .ok_or(MathError::Underflow)?
            .checked_add(allocation)
            .ok_or(MathError::Overflow)?;
        self.allocations.insert(account, &allocation);
        self.total_allocation.set(&total);
        Ok(())
    }

    /// Underlying the pool can still sell or release: the held balance
    /// minus volume owed to purchasers who have not claimed yet.
    pub fn unreserved_volume(&self, held_volume: Balance) -> Balance {
        held_volume.saturating_sub(self.total_purchased().saturating_sub(self.total_claimed()))
    }

    /// Records a single-shot purchase of `amount` currency against the
    /// account's allocation and converts it at the fixed ratio. Purchases
    /// are first come first served: whatever the allocations promise, the
    /// pool never sells volume it does not hold unreserved.
    pub fn contribute(
        &mut self,
        account: &AccountId,
        amount: Balance,
        fit: AllocationFit,
        held_volume: Balance,
    ) -> Result<PrivatePurchase, PoolError> {
        let allocation = self.allocation_of(account);
        if allocation == 0 {
            return Err(PoolError::NoAllocation);
        }
        if self.contribution_of(account) != 0 {
            return Err(PoolError::AlreadyPurchased);
        }
        let accepted = match fit {
            AllocationFit::Exact => {
                if amount > allocation {
                    return Err(PoolError::OverAllocated);
                }
                amount
            }
            AllocationFit::CapAndRefund => amount.min(allocation),
        };
        let volume = mul_denom_e18(accepted, self.ratio)?;
        if volume > self.unreserved_volume(held_volume) {
            return Err(PoolError::InsufficientVolume);
        }

        self.contributions.insert(account, &accepted);
        self.total_contributed.set(
            &(self
                .total_contributed()
                .checked_add(accepted)
                .ok_or(MathError::Overflow)?),
        );
        self.purchases.insert(account, &volume);
        self.total_purchased.set(
            &(self
                .total_purchased()
                .checked_add(volume)
                .ok_or(MathError::Overflow)?),
        );

        Ok(PrivatePurchase {
            accepted,
            refund: amount
                .checked_sub(accepted)
                .ok_or(MathError::Underflow)?,
            volume,
        })
    }

    /// Marks the account's purchase as claimed and returns the transfers
    /// the pool owes. `sweep` is underlying held beyond what unclaimed
    /// purchases still reserve; it leaves with the recipient so a fully
    /// claimed pool ends empty.
    pub fn record_claim(
        &mut self,
        account: &AccountId,
        held_volume: Balance,
    ) -> Result<PrivateClaim, PoolError> {
        let volume = self.purchased_of(account);
        if volume == 0 {
            return Err(PoolError::NothingToClaim);
        }
        if self.claims.contains(account) {
            return Err(PoolError::AlreadyClaimed);
        }
        let forwarded = self.contribution_of(account);

        self.claims.insert(account, &volume);
        self.total_claimed.set(
            &(self
                .total_claimed()
                .checked_add(volume)
                .ok_or(MathError::Overflow)?),
        );
        self.total_forwarded.set(
            &(self
                .total_forwarded()
                .checked_add(forwarded)
                .ok_or(MathError::Overflow)?),
        );

        let sweep = held_volume
            .saturating_sub(volume)
            .saturating_sub(self.total_purchased().saturating_sub(self.total_claimed()));

        Ok(PrivateClaim {
            volume,
            forwarded,
            sweep,
        })
    }

    /// What governance may take out given the pool's held balances:
    /// currency not yet forwarded to the recipient and underlying not
    /// reserved by unclaimed purchases stay behind.
    pub fn withdrawable(&self, held_amount: Balance, held_volume: Balance) -> Withdrawable {
        Withdrawable {
            amount: held_amount
                .saturating_sub(self.total_contributed().saturating_sub(self.total_forwarded())),
            volume: self.unreserved_volume(held_volume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::E18_U128;
    use ink::env::{test, DefaultEnvironment};

    fn accounts() -> test::DefaultAccounts<DefaultEnvironment> {
        test::default_accounts::<DefaultEnvironment>()
    }

    // 1000 underlying units per currency unit, selling over [1_000, 2_000).
    fn sale() -> PrivateSaleStorage {
        let accs = accounts();
        PrivateSaleStorage::new(
            accs.alice,
            Currency::Native,
            accs.django,
            1000 * E18_U128,
            accs.eve,
            1_000,
            2_000,
        )
        .unwrap()
    }

    fn funded() -> Balance {
        2000 * E18_U128
    }

    #[ink::test]
    fn new_rejects_a_zero_underlying_token() {
        let accs = accounts();
        let result = PrivateSaleStorage::new(
            accs.alice,
            Currency::Native,
            zero_address(),
            1000 * E18_U128,
            accs.eve,
            1_000,
            2_000,
        );
        assert_eq!(result.err(), Some(PoolError::InvalidUnderlyingToken));
    }

    #[ink::test]
    fn new_rejects_a_zero_recipient() {
        let accs = accounts();
        let result = PrivateSaleStorage::new(
            accs.alice,
            Currency::Native,
            accs.django,
            1000 * E18_U128,
            zero_address(),
            1_000,
            2_000,
        );
        assert_eq!(result.err(), Some(PoolError::InvalidRecipient));
    }

    #[ink::test]
    fn new_rejects_a_window_that_never_opens() {
        let accs = accounts();
        for (purchase_time, withdraw_time) in [(2_000, 1_000), (1_000, 1_000)] {
            let result = PrivateSaleStorage::new(
                accs.alice,
                Currency::Native,
                accs.django,
                1000 * E18_U128,
                accs.eve,
                purchase_time,
                withdraw_time,
            );
            assert_eq!(result.err(), Some(PoolError::InvalidTimeWindow));
        }
    }

    #[ink::test]
    fn allocation_rewrites_adjust_the_total() {
        let accs = accounts();
        let mut sale = sale();

        sale.set_allocation(&accs.bob, 5 * E18_U128).unwrap();
        sale.set_allocation(&accs.charlie, 2 * E18_U128).unwrap();
        assert_eq!(sale.total_allocation(), 7 * E18_U128);

        sale.set_allocation(&accs.bob, 3 * E18_U128).unwrap();
        assert_eq!(sale.allocation_of(&accs.bob), 3 * E18_U128);
        assert_eq!(sale.total_allocation(), 5 * E18_U128);

        sale.set_allocation(&accs.bob, 0).unwrap();
        assert_eq!(sale.total_allocation(), 2 * E18_U128);
    }

    #[ink::test]
    fn contribute_requires_an_allocation() {
        let accs = accounts();
        let mut sale = sale();

        assert_eq!(
            sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
                .err(),
            Some(PoolError::NoAllocation)
        );
    }

    #[ink::test]
    fn contribute_converts_at_the_fixed_ratio() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();

        let purchase = sale
            .contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();

        assert_eq!(
            purchase,
            PrivatePurchase {
                accepted: E18_U128,
                refund: 0,
                volume: 1000 * E18_U128,
            }
        );
        assert_eq!(sale.contribution_of(&accs.bob), E18_U128);
        assert_eq!(sale.total_contributed(), E18_U128);
        assert_eq!(sale.purchased_of(&accs.bob), 1000 * E18_U128);
        assert_eq!(sale.total_purchased(), 1000 * E18_U128);
    }

    #[ink::test]
    fn contribute_is_single_shot() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, 2 * E18_U128).unwrap();

        sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();
        assert_eq!(
            sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
                .err(),
            Some(PoolError::AlreadyPurchased)
        );
    }

    #[ink::test]
    fn exact_fit_rejects_amounts_above_the_allocation() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();

        assert_eq!(
            sale.contribute(&accs.bob, E18_U128 + 1, AllocationFit::Exact, funded())
                .err(),
            Some(PoolError::OverAllocated)
        );
    }

    #[ink::test]
    fn capped_fit_takes_the_allocation_and_reports_the_excess() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();

        let purchase = sale
            .contribute(&accs.bob, 2 * E18_U128, AllocationFit::CapAndRefund, funded())
            .unwrap();

        assert_eq!(
            purchase,
            PrivatePurchase {
                accepted: E18_U128,
                refund: E18_U128,
                volume: 1000 * E18_U128,
            }
        );
        assert_eq!(sale.contribution_of(&accs.bob), E18_U128);
    }

    #[ink::test]
    fn zero_value_contributions_do_not_mark_the_account() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();

        sale.contribute(&accs.bob, 0, AllocationFit::CapAndRefund, funded())
            .unwrap();
        assert_eq!(sale.contribution_of(&accs.bob), 0);

        // Only a non-zero contribution closes the account.
        sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();
        assert_eq!(sale.contribution_of(&accs.bob), E18_U128);
    }

    #[ink::test]
    fn contribute_is_limited_to_unreserved_volume() {
        let accs = accounts();
        let mut sale = sale();
        for account in [accs.bob, accs.charlie, accs.frank] {
            sale.set_allocation(&account, E18_U128).unwrap();
        }

        sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();
        sale.contribute(&accs.charlie, E18_U128, AllocationFit::Exact, funded())
            .unwrap();

        // 2000 of the held underlying are now reserved; frank's allocation
        // is worth another 1000 the pool does not have.
        assert_eq!(sale.unreserved_volume(funded()), 0);
        assert_eq!(
            sale.contribute(&accs.frank, E18_U128, AllocationFit::Exact, funded())
                .err(),
            Some(PoolError::InsufficientVolume)
        );
    }

    #[ink::test]
    fn claim_requires_a_purchase() {
        let accs = accounts();
        let mut sale = sale();

        assert_eq!(
            sale.record_claim(&accs.bob, funded()).err(),
            Some(PoolError::NothingToClaim)
        );
    }

    #[ink::test]
    fn claim_pays_volume_forwards_currency_and_sweeps_slack() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();
        sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();

        // Half of the 2000 held units were sold; the other half is slack
        // that leaves with the first claim.
        let claim = sale.record_claim(&accs.bob, funded()).unwrap();
        assert_eq!(
            claim,
            PrivateClaim {
                volume: 1000 * E18_U128,
                forwarded: E18_U128,
                sweep: 1000 * E18_U128,
            }
        );
        assert_eq!(sale.claimed_of(&accs.bob), 1000 * E18_U128);
        assert_eq!(sale.total_claimed(), 1000 * E18_U128);
        assert_eq!(sale.total_forwarded(), E18_U128);
    }

    #[ink::test]
    fn claim_is_single_shot() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();
        sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();

        sale.record_claim(&accs.bob, funded()).unwrap();
        assert_eq!(
            sale.record_claim(&accs.bob, 0).err(),
            Some(PoolError::AlreadyClaimed)
        );
    }

    #[ink::test]
    fn sweep_never_touches_volume_reserved_for_others() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();
        sale.set_allocation(&accs.charlie, E18_U128).unwrap();
        sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();
        sale.contribute(&accs.charlie, E18_U128, AllocationFit::Exact, funded())
            .unwrap();

        // Everything held is spoken for, so neither claim sweeps anything.
        let claim = sale.record_claim(&accs.bob, funded()).unwrap();
        assert_eq!(claim.sweep, 0);

        let held_after_bob = funded() - claim.volume;
        let claim = sale.record_claim(&accs.charlie, held_after_bob).unwrap();
        assert_eq!(claim.sweep, 0);

        assert_eq!(sale.total_claimed(), 2000 * E18_U128);
        assert_eq!(sale.total_forwarded(), 2 * E18_U128);
    }

    #[ink::test]
    fn withdrawable_excludes_funds_owed_to_participants() {
        let accs = accounts();
        let mut sale = sale();
        sale.set_allocation(&accs.bob, E18_U128).unwrap();
        sale.contribute(&accs.bob, E18_U128, AllocationFit::Exact, funded())
            .unwrap();

        // The contributed currency is owed to the recipient and 1000 units
        // of underlying are owed to bob; only the slack is free.
        let withdrawable = sale.withdrawable(E18_U128, funded());
        assert_eq!(
            withdrawable,
            Withdrawable {
                amount: 0,
                volume: 1000 * E18_U128,
            }
        );

        // Once the claim is recorded every obligation is discharged and
        // whatever balance remains is free.
        sale.record_claim(&accs.bob, funded()).unwrap();
        let withdrawable = sale.withdrawable(E18_U128, 1000 * E18_U128);
        assert_eq!(
            withdrawable,
            Withdrawable {
                amount: E18_U128,
                volume: 1000 * E18_U128,
            }
        );
    }
}
