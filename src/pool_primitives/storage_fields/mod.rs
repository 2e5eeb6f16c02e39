pub mod private_sale;
pub mod public_sale;
pub mod reentrancy_guard;
