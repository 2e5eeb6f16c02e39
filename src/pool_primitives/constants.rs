use pendzl::traits::AccountId;

/// Scale of all pool rates: ratios, prices and settlement rates are
/// fixed-point numbers with 18 decimal places.
pub const E18_U128: u128 = 10_u128.pow(18);

pub fn zero_address() -> AccountId {
    AccountId::from([0u8; 32])
}
