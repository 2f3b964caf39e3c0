pub mod claims;
pub mod config;
pub mod constants;
pub mod error;
pub mod ports;
pub mod types;
pub mod units;

pub use claims::{ClaimReceipt, ClaimRecord, ClaimStatus};
pub use config::{LockdropConfig, PowConfig};
pub use constants::*;
pub use error::LockdropError;
pub use ports::{ChainDataProvider, LedgerClient};
pub use types::*;
