pub mod controller;
pub mod error;

pub use controller::{Interception, OfflineCacheController, ResponseSource};
pub use error::DomainError;
