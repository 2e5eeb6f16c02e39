use pendzl::{contracts::psp22::PSP22Error, math::errors::MathError};

#[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum PoolError {
    PSP22Error(PSP22Error),
    MathError(MathError),

    InvalidTimeWindow,
    InvalidUnderlyingToken,
    InvalidRecipient,

    CallerIsNotGovernor,

    PoolNotStarted,
    PoolExpired,
    TooEarlyToSettle,
    ClaimNotStarted,
    /// The pool has not reached its terminal phase yet: the claim window
    /// for a private sale, a frozen settlement for a public sale.
    PoolIncomplete,

    NoAllocation,
    OverAllocated,
    AlreadyPurchased,
    NothingToClaim,
    AlreadyClaimed,
    LengthMismatch,

    WrongCurrencyPath,
    InsufficientVolume,
    InsufficientAllowance,
    InsufficientBalance,
    NativeTransferFailed,
    ReentrantCall,
}

impl From<PSP22Error> for PoolError {
    fn from(error: PSP22Error) -> Self {
        PoolError::PSP22Error(error)
    }
}

impl From<MathError> for PoolError {
    fn from(error: MathError) -> Self {
        PoolError::MathError(error)
    }
}
