pub mod cache;
pub mod loader;

pub use loader::{BankLoader, BankSources, BankUpdate};
