pub mod events;
pub mod traits;
