pub mod annuity;
pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "flipping")]
pub mod flipping;

pub use error::PropFinError;
pub use types::*;

/// Standard result type for all propfin operations
pub type PropFinResult<T> = Result<T, PropFinError>;
