use ink::storage::Mapping;
use pendzl::{
    math::errors::MathError,
    traits::{AccountId, Balance, Timestamp},
};

use crate::{
    constants::{zero_address, E18_U128},
    currency::Currency,
    errors::PoolError,
    math::{mul_denom_e18, ratio_e18},
    structs::{ParticipantSettlement, SettlementSummary, Withdrawable},
};

/// Payouts owed after a public claim is recorded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PublicClaim {
    pub volume: Balance,
    pub refund: Balance,
}

/// Book of an open pro-rata sale.
///
/// Anyone contributes currency up to `max_allocation` per account until the
/// purchase deadline. Settlement fixes a keep-rate from the underlying the
/// pool holds: every contribution is kept at that rate and converted at
/// `price` (currency per underlying unit, 1e18-scaled); the rest is owed
/// back as refunds. Phase gating against block time is the contract's job.
#[derive(Debug)]
#[pendzl::storage_item]
pub struct PublicSaleStorage {
    pub governor: AccountId,
    pub currency: Currency,
    pub underlying_token: AccountId,
    /// Currency units per underlying unit, 1e18-scaled.
    pub price: u128,
    pub max_allocation: Balance,
    pub purchase_deadline: Timestamp,
    pub settle_time: Timestamp,

    contributions: Mapping<AccountId, Balance>,
    #[lazy]
    total_contributed: Balance,

    #[lazy]
    settlement: SettlementSummary,

    claims: Mapping<AccountId, Balance>,
    #[lazy]
    total_claimed: Balance,
    #[lazy]
    total_refunded: Balance,
}

impl PublicSaleStorage {
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
        if underlying_token == zero_address() {
            return Err(PoolError::InvalidUnderlyingToken);
        }
        if purchase_deadline >= settle_time {
            return Err(PoolError::InvalidTimeWindow);
        }
        Ok(PublicSaleStorage {
            governor,
            currency,
            underlying_token,
            price,
            max_allocation,
            purchase_deadline,
            settle_time,
            contributions: Default::default(),
            total_contributed: Default::default(),
            settlement: Default::default(),
            claims: Default::default(),
            total_claimed: Default::default(),
            total_refunded: Default::default(),
        })
    }

    pub fn contribution_of(&self, account: &AccountId) -> Balance {
        self.contributions.get(account).unwrap_or(0)
    }

    pub fn total_contributed(&self) -> Balance {
        self.total_contributed.get().unwrap_or(0)
    }

    pub fn claimed_of(&self, account: &AccountId) -> Balance {
        self.claims.get(account).unwrap_or(0)
    }

    pub fn total_claimed(&self) -> Balance {
        self.total_claimed.get().unwrap_or(0)
    }

    pub fn total_refunded(&self) -> Balance {
        self.total_refunded.get().unwrap_or(0)
    }

    pub fn settlement(&self) -> Option<SettlementSummary> {
        self.settlement.get()
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.get().is_some()
    }

    /// Records an incremental contribution against the per-account cap.
    pub fn contribute(&mut self, account: &AccountId, amount: Balance) -> Result<(), PoolError> {
        let contributed = self
            .contribution_of(account)
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        if contributed > self.max_allocation {
            return Err(PoolError::OverAllocated);
        }
        self.contributions.insert(account, &contributed);
        self.total_contributed.set(
            &(self
                .total_contributed()
                .checked_add(amount)
                .ok_or(MathError::Overflow)?),
        );
        Ok(())
    }

    /// The settlement as it stands: the frozen record once `settle` has
    /// run, otherwise a projection over the current book and balance.
    pub fn total_settleable(
        &self,
        held_volume: Balance,
    ) -> Result<SettlementSummary, PoolError> {
        if let Some(settlement) = self.settlement.get() {
            return Ok(settlement);
        }
        self.project_settlement(held_volume)
    }

    /// `account`'s share of the settlement: how much of its contribution
    /// the pool keeps, what flows back and what volume that buys.
    pub fn settleable(
        &self,
        account: &AccountId,
        held_volume: Balance,
    ) -> Result<ParticipantSettlement, PoolError> {
        let summary = self.total_settleable(held_volume)?;
        self.participant_share(account, &summary)
    }

    /// Freezes the settlement on the first call. Later calls return the
    /// recorded result untouched by balance changes since.
    pub fn settle(&mut self, held_volume: Balance) -> Result<SettlementSummary, PoolError> {
        if let Some(settlement) = self.settlement.get() {
            return Ok(settlement);
        }
        let mut settlement = self.project_settlement(held_volume)?;
        settlement.completed = true;
        self.settlement.set(&settlement);
        Ok(settlement)
    }

    /// Marks the account's contribution as claimed, settling first if no
    /// one has yet, and returns the payouts owed.
    pub fn record_claim(
        &mut self,
        account: &AccountId,
        held_volume: Balance,
    ) -> Result<PublicClaim, PoolError> {
        if self.contribution_of(account) == 0 {
            return Err(PoolError::NothingToClaim);
        }
        if self.claims.contains(account) {
            return Err(PoolError::AlreadyClaimed);
        }
        let summary = self.settle(held_volume)?;
        let share = self.participant_share(account, &summary)?;

        self.claims.insert(account, &share.volume);
        self.total_claimed.set(
            &(self
                .total_claimed()
                .checked_add(share.volume)
                .ok_or(MathError::Overflow)?),
        );
        self.total_refunded.set(
            &(self
                .total_refunded()
                .checked_add(share.refund)
                .ok_or(MathError::Overflow)?),
        );

        Ok(PublicClaim {
            volume: share.volume,
            refund: share.refund,
        })
    }

    /// What governance may take out given the pool's held balances. Zero
    /// until settled; afterwards unpaid refunds and unclaimed settled
    /// volume stay behind.
    pub fn withdrawable(&self, held_amount: Balance, held_volume: Balance) -> Withdrawable {
        let settlement = match self.settlement.get() {
            Some(settlement) => settlement,
            None => {
                return Withdrawable {
                    amount: 0,
                    volume: 0,
                }
            }
        };
        let refund_owed = self
            .total_contributed()
            .saturating_sub(settlement.amount)
            .saturating_sub(self.total_refunded());
        Withdrawable {
            amount: held_amount.saturating_sub(refund_owed),
            volume: held_volume
                .saturating_sub(settlement.volume.saturating_sub(self.total_claimed())),
        }
    }

    // The keep-rate is the fraction of the contribution book the held
    // underlying can serve at `price`: 1e18 when everything fits, pro-rata
    // when oversubscribed.
    fn project_settlement(&self, held_volume: Balance) -> Result<SettlementSummary, PoolError> {
        let total = self.total_contributed();
        let capacity = mul_denom_e18(held_volume, self.price)?;
        let rate = if total == 0 || capacity >= total {
            E18_U128
        } else {
            ratio_e18(capacity, total)?
        };
        let amount = mul_denom_e18(total, rate)?;
        Ok(SettlementSummary {
            completed: false,
            rate,
            amount,
            volume: ratio_e18(amount, self.price)?,
        })
    }

    fn participant_share(
        &self,
        account: &AccountId,
        summary: &SettlementSummary,
    ) -> Result<ParticipantSettlement, PoolError> {
        let contributed = self.contribution_of(account);
        let kept = mul_denom_e18(contributed, summary.rate)?;
        // Kept shares floor, so the raw refunds summed over all
        // participants can exceed `total - amount` by dust. The payable
        // refund is capped at what is still reserved.
        let reserved = self
            .total_contributed()
            .saturating_sub(summary.amount)
            .saturating_sub(self.total_refunded());
        let refund = contributed
            .checked_sub(kept)
            .ok_or(MathError::Underflow)?
            .min(reserved);
        Ok(ParticipantSettlement {
            completed: summary.completed,
            rate: summary.rate,
            refund,
            volume: ratio_e18(kept, self.price)?,
        })
    }
}
