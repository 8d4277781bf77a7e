use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("PEM: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("DER: {0}")]
    Der(#[from] der::error::Error),

    #[error("ASN.1: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount { expected: usize, actual: usize },

    #[error("expected INTEGER for {field}")]
    ExpectedInteger { field: &'static str },

    #[error("negative INTEGER for {field}")]
    NegativeInteger { field: &'static str },

    #[error("empty ASN1Object")]
    EmptyAsn1Object,

    #[error("invalid version: {0} (must be 0 for a two-prime key)")]
    InvalidVersion(i64),

    #[error("multi-prime RSA keys are not supported")]
    MultiPrimeUnsupported,

    #[error(
        "unrecognized key format (tried PKCS#1 private key: {private}; PKCS#1 public key: {public})"
    )]
    UnrecognizedKeyFormat { private: String, public: String },

    #[error("invalid key: {0}")]
    InvalidKey(#[from] InvalidKey),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64url: {0}")]
    Base64Url(base64::DecodeError),

    #[error("unsupported JWK key type: {0}")]
    UnsupportedKeyType(String),

    #[error("JWK is missing required member: {0}")]
    MissingJwkMember(&'static str),

    #[error("JWK carries private members but no 'd'")]
    PrivateMemberWithoutD,
}

/// Reasons a structurally well-formed key fails validation.
///
/// The checks run fail-fast in the order the variants are declared, so
/// the reported reason is always the first violated invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidKey {
    #[error("modulus must be positive")]
    NonPositiveModulus,

    #[error("public exponent must be positive")]
    NonPositiveExponent,

    #[error("prime factor must be greater than 1")]
    PrimeTooSmall,

    #[error("prime product does not match the modulus")]
    PrimeProductMismatch,

    #[error("private exponent is not the inverse of the public exponent mod lcm(p-1, q-1)")]
    ExponentNotInverse,

    #[error("dp is not d mod (p-1)")]
    DpMismatch,

    #[error("dq is not d mod (q-1)")]
    DqMismatch,

    #[error("qinv is not the inverse of q mod p")]
    QinvMismatch,

    #[error("q is not invertible modulo p")]
    QNotInvertible,
}

pub type Result<T> = std::result::Result<T, Error>;
