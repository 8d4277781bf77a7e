use asn1::{ASN1Object, Element, Integer};
use der::Der;
use kagi::decoder::Decoder;
use kagi::encoder::Encoder;
use num_bigint::BigUint;

use crate::error::{Error, Result};
use crate::key::{CrtValues, RsaPrivateKey, RsaPublicKey};

/*
RFC 8017 - PKCS #1: RSA Cryptography Specifications

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER   -- (inverse of q) mod p
}

RSAPublicKey ::= SEQUENCE {
    modulus           INTEGER,  -- n
    publicExponent    INTEGER   -- e
}

Version ::= INTEGER { two-prime(0), multi(1) }
*/

// Only two-prime keys exist in this toolkit; version 1 (multi) is
// rejected on parse.
const VERSION_TWO_PRIME: i64 = 0;
const VERSION_MULTI: i64 = 1;

/// Decodes a PKCS#1 RSAPrivateKey structure into a validated key.
pub(crate) fn private_key_from_der(data: &[u8]) -> Result<RsaPrivateKey> {
    let obj = decode_top_level(data)?;
    let element = obj.elements().first().ok_or(Error::EmptyAsn1Object)?;
    decode_private(element)
}

/// Decodes a PKCS#1 RSAPublicKey structure into a validated key.
pub(crate) fn public_key_from_der(data: &[u8]) -> Result<RsaPublicKey> {
    let obj = decode_top_level(data)?;
    let element = obj.elements().first().ok_or(Error::EmptyAsn1Object)?;
    decode_public(element)
}

fn decode_top_level(data: &[u8]) -> Result<ASN1Object> {
    let der: Der = data.to_vec().decode()?;
    let obj: ASN1Object = der.decode()?;
    Ok(obj)
}

fn decode_private(element: &Element) -> Result<RsaPrivateKey> {
    let Element::Sequence(elements) = element else {
        return Err(Error::ExpectedSequence);
    };
    if elements.len() != 9 {
        return Err(Error::InvalidElementCount {
            expected: 9,
            actual: elements.len(),
        });
    }

    let version = match &elements[0] {
        Element::Integer(int) => i64::try_from(int)?,
        _ => return Err(Error::ExpectedInteger { field: "version" }),
    };
    match version {
        VERSION_TWO_PRIME => {}
        VERSION_MULTI => return Err(Error::MultiPrimeUnsupported),
        v => return Err(Error::InvalidVersion(v)),
    }

    let n = get_uint(elements, 1, "modulus")?;
    let e = get_uint(elements, 2, "publicExponent")?;
    let d = get_uint(elements, 3, "privateExponent")?;
    let p = get_uint(elements, 4, "prime1")?;
    let q = get_uint(elements, 5, "prime2")?;
    let dp = get_uint(elements, 6, "exponent1")?;
    let dq = get_uint(elements, 7, "exponent2")?;
    let qinv = get_uint(elements, 8, "coefficient")?;

    RsaPrivateKey::new(n, e, d, p, q, Some(CrtValues::new(dp, dq, qinv)))
}

fn decode_public(element: &Element) -> Result<RsaPublicKey> {
    let Element::Sequence(elements) = element else {
        return Err(Error::ExpectedSequence);
    };
    if elements.len() != 2 {
        return Err(Error::InvalidElementCount {
            expected: 2,
            actual: elements.len(),
        });
    }

    let n = get_uint(elements, 0, "modulus")?;
    let e = get_uint(elements, 1, "publicExponent")?;

    RsaPublicKey::new(n, e)
}

fn get_uint(elements: &[Element], idx: usize, field: &'static str) -> Result<BigUint> {
    match &elements[idx] {
        Element::Integer(int) => int.to_biguint().ok_or(Error::NegativeInteger { field }),
        _ => Err(Error::ExpectedInteger { field }),
    }
}

/// Canonical PKCS#1 RSAPrivateKey DER bytes.
pub(crate) fn encode_private(
    n: &BigUint,
    e: &BigUint,
    d: &BigUint,
    p: &BigUint,
    q: &BigUint,
    crt: &CrtValues,
) -> Result<Vec<u8>> {
    let element = Element::Sequence(vec![
        Element::Integer(Integer::from(VERSION_TWO_PRIME)),
        Element::Integer(Integer::from(n)),
        Element::Integer(Integer::from(e)),
        Element::Integer(Integer::from(d)),
        Element::Integer(Integer::from(p)),
        Element::Integer(Integer::from(q)),
        Element::Integer(Integer::from(crt.dp())),
        Element::Integer(Integer::from(crt.dq())),
        Element::Integer(Integer::from(crt.qinv())),
    ]);
    encode_element(element)
}

/// Canonical PKCS#1 RSAPublicKey DER bytes.
pub(crate) fn encode_public(n: &BigUint, e: &BigUint) -> Result<Vec<u8>> {
    let element = Element::Sequence(vec![
        Element::Integer(Integer::from(n)),
        Element::Integer(Integer::from(e)),
    ]);
    encode_element(element)
}

fn encode_element(element: Element) -> Result<Vec<u8>> {
    let obj = ASN1Object::new(vec![element]);
    let der: Der = obj.encode()?;
    let bytes: Vec<u8> = der.encode()?;
    Ok(bytes)
}
