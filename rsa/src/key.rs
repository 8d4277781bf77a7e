use num_bigint::BigUint;
use num_integer::Integer as _;
use num_traits::{One, Zero};
use pem::Label;

use crate::error::{InvalidKey, Result};
use crate::pkcs1;

/// Canonical RSA key.
///
/// The variant is the single source of truth for what the key is: every
/// consumer matches on it exhaustively, so a new kind or format cannot be
/// handled partially. A value of this type is immutable and always
/// satisfies the RSA invariants; the constructors reject anything that
/// does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsaKey {
    Public(RsaPublicKey),
    Private(RsaPrivateKey),
}

impl RsaKey {
    /// PEM label matching the key kind.
    pub fn label(&self) -> Label {
        match self {
            RsaKey::Public(_) => Label::RSAPublicKey,
            RsaKey::Private(_) => Label::RSAPrivateKey,
        }
    }

    /// The public half: the key itself for a public key, the embedded
    /// public half for a private key.
    pub fn public(&self) -> &RsaPublicKey {
        match self {
            RsaKey::Public(key) => key,
            RsaKey::Private(key) => key.public(),
        }
    }

    /// Canonical PKCS#1 DER encoding, computed once at construction.
    pub fn pkcs1_der(&self) -> &[u8] {
        match self {
            RsaKey::Public(key) => key.pkcs1_der(),
            RsaKey::Private(key) => key.pkcs1_der(),
        }
    }

    /// Key size: bit length of the modulus.
    pub fn bits(&self) -> u64 {
        self.public().bits()
    }

    /// Re-runs the construction-time invariant checks.
    pub fn validate(&self) -> std::result::Result<(), InvalidKey> {
        match self {
            RsaKey::Public(key) => key.validate(),
            RsaKey::Private(key) => key.validate(),
        }
    }
}

/// RSA public key: modulus and public exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    n: BigUint,
    e: BigUint,
    pkcs1: Vec<u8>,
}

impl RsaPublicKey {
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        check_public(&n, &e)?;
        let pkcs1 = pkcs1::encode_public(&n, &e)?;
        Ok(RsaPublicKey { n, e, pkcs1 })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.e
    }

    pub fn pkcs1_der(&self) -> &[u8] {
        &self.pkcs1
    }

    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    pub fn validate(&self) -> std::result::Result<(), InvalidKey> {
        check_public(&self.n, &self.e)
    }
}

/// Precomputed CRT parameters of a private key.
///
/// These are derived values: dp = d mod (p-1), dq = d mod (q-1),
/// qinv = q^-1 mod p. They are recomputed from (d, p, q) whenever an
/// input lacks them, and checked against (d, p, q) when an input carries
/// them; they are never authoritative on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrtValues {
    dp: BigUint,
    dq: BigUint,
    qinv: BigUint,
}

impl CrtValues {
    pub fn new(dp: BigUint, dq: BigUint, qinv: BigUint) -> Self {
        CrtValues { dp, dq, qinv }
    }

    /// Derives the CRT triple from the primary private key fields.
    pub fn derive(
        d: &BigUint,
        p: &BigUint,
        q: &BigUint,
    ) -> std::result::Result<Self, InvalidKey> {
        let one = BigUint::one();
        let dp = d % (p - &one);
        let dq = d % (q - &one);
        let qinv = q.modinv(p).ok_or(InvalidKey::QNotInvertible)?;
        Ok(CrtValues { dp, dq, qinv })
    }

    pub fn dp(&self) -> &BigUint {
        &self.dp
    }

    pub fn dq(&self) -> &BigUint {
        &self.dq
    }

    pub fn qinv(&self) -> &BigUint {
        &self.qinv
    }
}

/// RSA private key with its embedded public half and CRT parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    public: RsaPublicKey,
    d: BigUint,
    p: BigUint,
    q: BigUint,
    crt: CrtValues,
    pkcs1: Vec<u8>,
}

impl RsaPrivateKey {
    /// Builds a validated private key.
    ///
    /// When `crt` is `None` the CRT parameters are derived from
    /// (d, p, q); supplied values are checked against the primary fields.
    /// Validation is fail-fast: modulus and exponent positivity, prime
    /// bounds, p*q == n, d*e == 1 mod lcm(p-1, q-1), then the CRT
    /// congruences.
    pub fn new(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        crt: Option<CrtValues>,
    ) -> Result<Self> {
        check_public(&n, &e)?;
        check_private(&n, &e, &d, &p, &q)?;
        let crt = match crt {
            Some(crt) => {
                check_crt(&d, &p, &q, &crt)?;
                crt
            }
            None => CrtValues::derive(&d, &p, &q)?,
        };
        let pkcs1 = pkcs1::encode_private(&n, &e, &d, &p, &q, &crt)?;
        let public = RsaPublicKey::new(n, e)?;
        Ok(RsaPrivateKey {
            public,
            d,
            p,
            q,
            crt,
            pkcs1,
        })
    }

    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn crt(&self) -> &CrtValues {
        &self.crt
    }

    pub fn pkcs1_der(&self) -> &[u8] {
        &self.pkcs1
    }

    pub fn bits(&self) -> u64 {
        self.public.bits()
    }

    pub fn validate(&self) -> std::result::Result<(), InvalidKey> {
        check_public(self.public.modulus(), self.public.public_exponent())?;
        check_private(
            self.public.modulus(),
            self.public.public_exponent(),
            &self.d,
            &self.p,
            &self.q,
        )?;
        check_crt(&self.d, &self.p, &self.q, &self.crt)
    }
}

fn check_public(n: &BigUint, e: &BigUint) -> std::result::Result<(), InvalidKey> {
    if n.is_zero() {
        return Err(InvalidKey::NonPositiveModulus);
    }
    if e.is_zero() {
        return Err(InvalidKey::NonPositiveExponent);
    }
    Ok(())
}

fn check_private(
    n: &BigUint,
    e: &BigUint,
    d: &BigUint,
    p: &BigUint,
    q: &BigUint,
) -> std::result::Result<(), InvalidKey> {
    let one = BigUint::one();
    if p <= &one || q <= &one {
        return Err(InvalidKey::PrimeTooSmall);
    }
    if &(p * q) != n {
        return Err(InvalidKey::PrimeProductMismatch);
    }
    // d must invert e modulo the Carmichael function lambda(n)
    let lambda = (p - &one).lcm(&(q - &one));
    if (d * e) % &lambda != one {
        return Err(InvalidKey::ExponentNotInverse);
    }
    Ok(())
}

fn check_crt(
    d: &BigUint,
    p: &BigUint,
    q: &BigUint,
    crt: &CrtValues,
) -> std::result::Result<(), InvalidKey> {
    let one = BigUint::one();
    if crt.dp != d % (p - &one) {
        return Err(InvalidKey::DpMismatch);
    }
    if crt.dq != d % (q - &one) {
        return Err(InvalidKey::DqMismatch);
    }
    if (q * &crt.qinv) % p != one {
        return Err(InvalidKey::QinvMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use rstest::rstest;

    use super::*;
    use crate::error::{Error, InvalidKey};

    fn uint(v: u64) -> BigUint {
        BigUint::from(v)
    }

    // Textbook parameters: p=61, q=53, n=3233, e=17, d=2753.
    fn textbook_private_key() -> RsaPrivateKey {
        RsaPrivateKey::new(uint(3233), uint(17), uint(2753), uint(61), uint(53), None).unwrap()
    }

    #[test]
    fn test_derive_crt() {
        let crt = CrtValues::derive(&uint(2753), &uint(61), &uint(53)).unwrap();
        assert_eq!(crt.dp(), &uint(53)); // 2753 mod 60
        assert_eq!(crt.dq(), &uint(49)); // 2753 mod 52
        assert_eq!(crt.qinv(), &uint(38)); // 53^-1 mod 61
    }

    #[test]
    fn test_private_key_construction() {
        let key = textbook_private_key();
        assert_eq!(key.bits(), 12);
        assert_eq!(key.public().modulus(), &uint(3233));
        assert_eq!(key.crt().dp(), &uint(53));
        assert!(key.validate().is_ok());
    }

    #[test]
    fn test_private_key_accepts_valid_supplied_crt() {
        let crt = CrtValues::new(uint(53), uint(49), uint(38));
        let key = RsaPrivateKey::new(
            uint(3233),
            uint(17),
            uint(2753),
            uint(61),
            uint(53),
            Some(crt),
        )
        .unwrap();
        assert_eq!(key, textbook_private_key());
    }

    #[rstest(
        n, e, d, p, q, expected,
        case(3234, 17, 2753, 61, 53, InvalidKey::PrimeProductMismatch),
        case(3233, 17, 2754, 61, 53, InvalidKey::ExponentNotInverse),
        case(3233, 17, 2753, 1, 3233, InvalidKey::PrimeTooSmall),
        case(0, 17, 2753, 61, 53, InvalidKey::NonPositiveModulus),
        case(3233, 0, 2753, 61, 53, InvalidKey::NonPositiveExponent)
    )]
    fn test_private_key_rejects_invalid(
        n: u64,
        e: u64,
        d: u64,
        p: u64,
        q: u64,
        expected: InvalidKey,
    ) {
        let got = RsaPrivateKey::new(uint(n), uint(e), uint(d), uint(p), uint(q), None);
        match got {
            Err(Error::InvalidKey(reason)) => assert_eq!(expected, reason),
            other => panic!("expected InvalidKey({:?}), got {:?}", expected, other),
        }
    }

    #[rstest(
        dp, dq, qinv, expected,
        case(54, 49, 38, InvalidKey::DpMismatch),
        case(53, 50, 38, InvalidKey::DqMismatch),
        case(53, 49, 39, InvalidKey::QinvMismatch)
    )]
    fn test_private_key_rejects_tampered_crt(dp: u64, dq: u64, qinv: u64, expected: InvalidKey) {
        let crt = CrtValues::new(uint(dp), uint(dq), uint(qinv));
        let got = RsaPrivateKey::new(
            uint(3233),
            uint(17),
            uint(2753),
            uint(61),
            uint(53),
            Some(crt),
        );
        match got {
            Err(Error::InvalidKey(reason)) => assert_eq!(expected, reason),
            other => panic!("expected InvalidKey({:?}), got {:?}", expected, other),
        }
    }

    #[test]
    fn test_public_key_construction() {
        let key = RsaPublicKey::new(uint(3233), uint(17)).unwrap();
        assert_eq!(key.bits(), 12);
        assert!(key.validate().is_ok());

        assert!(matches!(
            RsaPublicKey::new(uint(0), uint(17)),
            Err(Error::InvalidKey(InvalidKey::NonPositiveModulus))
        ));
    }

    #[test]
    fn test_key_kind_accessors() {
        let private = RsaKey::Private(textbook_private_key());
        assert_eq!(private.label(), pem::Label::RSAPrivateKey);
        assert_eq!(private.public().modulus(), &uint(3233));

        let public = RsaKey::Public(RsaPublicKey::new(uint(3233), uint(17)).unwrap());
        assert_eq!(public.label(), pem::Label::RSAPublicKey);
        assert_eq!(public.bits(), 12);
    }
}
