use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::key::{CrtValues, RsaKey, RsaPrivateKey, RsaPublicKey};

const KEY_TYPE_RSA: &str = "RSA";

/// Unsigned big-endian byte sequence, the JWK integer convention of
/// RFC 7518: minimal-length magnitude rendered as base64url text without
/// padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytes {
    inner: Vec<u8>,
}

impl Bytes {
    /// Minimal big-endian encoding of a magnitude: no leading zero byte.
    /// The zero value encodes as a single zero byte (RSA parameters never
    /// take that value in practice).
    pub fn from_uint(value: &BigUint) -> Self {
        Bytes {
            inner: value.to_bytes_be(),
        }
    }

    /// Interprets the bytes as an unsigned big-endian magnitude.
    /// Non-canonical input with leading zero bytes is accepted.
    pub fn to_uint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.inner)
    }

    /// Decodes base64url text. The URL-safe alphabet without padding is
    /// required: `+`, `/` and `=` are rejected.
    pub fn from_base64url(s: &str) -> Result<Self> {
        let inner = URL_SAFE_NO_PAD.decode(s).map_err(Error::Base64Url)?;
        Ok(Bytes { inner })
    }

    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.inner)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(inner: Vec<u8>) -> Self {
        Bytes { inner }
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Bytes::from_base64url(&s).map_err(serde::de::Error::custom)
    }
}

/// Public RSA JWK: kty, n, e in RFC 7517 member order.
#[derive(Debug, Clone, Serialize)]
struct RsaPublicJwk {
    kty: &'static str,
    n: Bytes,
    e: Bytes,
}

impl From<&RsaPublicKey> for RsaPublicJwk {
    fn from(key: &RsaPublicKey) -> Self {
        RsaPublicJwk {
            kty: KEY_TYPE_RSA,
            n: Bytes::from_uint(key.modulus()),
            e: Bytes::from_uint(key.public_exponent()),
        }
    }
}

/// Private RSA JWK. The member set is fixed by the type: a private JWK
/// always carries the full CRT triple, a public one never carries any of
/// the private members.
#[derive(Debug, Clone, Serialize)]
struct RsaPrivateJwk {
    kty: &'static str,
    n: Bytes,
    e: Bytes,
    d: Bytes,
    p: Bytes,
    q: Bytes,
    dp: Bytes,
    dq: Bytes,
    qi: Bytes,
}

impl From<&RsaPrivateKey> for RsaPrivateJwk {
    fn from(key: &RsaPrivateKey) -> Self {
        RsaPrivateJwk {
            kty: KEY_TYPE_RSA,
            n: Bytes::from_uint(key.public().modulus()),
            e: Bytes::from_uint(key.public().public_exponent()),
            d: Bytes::from_uint(key.private_exponent()),
            p: Bytes::from_uint(key.p()),
            q: Bytes::from_uint(key.q()),
            dp: Bytes::from_uint(key.crt().dp()),
            dq: Bytes::from_uint(key.crt().dq()),
            qi: Bytes::from_uint(key.crt().qinv()),
        }
    }
}

/// Pretty-printed UTF-8 JWK document for the key. Member presence is
/// decided by the key kind, nothing else.
pub(crate) fn to_json(key: &RsaKey) -> Result<Vec<u8>> {
    let json = match key {
        RsaKey::Public(key) => serde_json::to_vec_pretty(&RsaPublicJwk::from(key))?,
        RsaKey::Private(key) => serde_json::to_vec_pretty(&RsaPrivateJwk::from(key))?,
    };
    Ok(json)
}

/// Permissive parse form. Unknown members (kid, alg, use, ...) are
/// ignored; private members stay optional until checked against each
/// other.
#[derive(Debug, Deserialize)]
struct RawJwk {
    kty: String,
    n: Bytes,
    e: Bytes,
    #[serde(default)]
    d: Option<Bytes>,
    #[serde(default)]
    p: Option<Bytes>,
    #[serde(default)]
    q: Option<Bytes>,
    #[serde(default)]
    dp: Option<Bytes>,
    #[serde(default)]
    dq: Option<Bytes>,
    #[serde(default)]
    qi: Option<Bytes>,
}

pub(crate) fn key_from_slice(data: &[u8]) -> Result<RsaKey> {
    let raw: RawJwk = serde_json::from_slice(data)?;
    if raw.kty != KEY_TYPE_RSA {
        return Err(Error::UnsupportedKeyType(raw.kty));
    }
    let n = raw.n.to_uint();
    let e = raw.e.to_uint();

    let Some(d) = raw.d else {
        if raw.p.is_some()
            || raw.q.is_some()
            || raw.dp.is_some()
            || raw.dq.is_some()
            || raw.qi.is_some()
        {
            return Err(Error::PrivateMemberWithoutD);
        }
        return Ok(RsaKey::Public(RsaPublicKey::new(n, e)?));
    };

    let p = raw.p.ok_or(Error::MissingJwkMember("p"))?.to_uint();
    let q = raw.q.ok_or(Error::MissingJwkMember("q"))?.to_uint();
    // dp/dq/qi are derived values; a partial triple is recomputed rather
    // than trusted.
    let crt = match (raw.dp, raw.dq, raw.qi) {
        (Some(dp), Some(dq), Some(qi)) => {
            Some(CrtValues::new(dp.to_uint(), dq.to_uint(), qi.to_uint()))
        }
        _ => None,
    };

    Ok(RsaKey::Private(RsaPrivateKey::new(
        n,
        e,
        d.to_uint(),
        p,
        q,
        crt,
    )?))
}

impl RsaKey {
    /// Parses an RFC 7517 JWK document into a validated key.
    pub fn from_jwk(data: &[u8]) -> Result<RsaKey> {
        key_from_slice(data)
    }
}
