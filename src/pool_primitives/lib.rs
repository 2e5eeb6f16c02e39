#![cfg_attr(not(feature = "std"), no_std)]

pub mod constants;
pub mod currency;
pub mod errors;
pub mod math;
pub mod storage_fields;
pub mod structs;
