//! Error types for ASN.1 parsing and encoding.

use thiserror::Error;

/// Errors that can occur during ASN.1 parsing and encoding operations.
#[derive(Debug, Error)]
pub enum Error {
    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: value out of range for i64")]
    IntegerOutOfRangeI64,
    #[error("INTEGER: value out of range for u64")]
    IntegerOutOfRangeU64,

    // Element errors
    #[error("element: cannot encode {0}")]
    ElementCannotEncode(&'static str),
}
