use std::fmt::Display;

use der::{Der, Tag, Tlv};
use error::Error;
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;

    fn decode(&self) -> Result<ASN1Object, Error> {
        let mut elements = Vec::new();
        for tlv in self.elements() {
            let element = Element::try_from(tlv)?;
            elements.push(element);
        }
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der, Self::Error> {
        let mut tlvs = Vec::new();
        for element in &self.elements {
            tlvs.push(element.encode()?);
        }
        Ok(Der::new(tlvs))
    }
}

/// Typed ASN.1 element.
///
/// PKCS#1 key structures only use INTEGER and SEQUENCE; any other tag
/// found in the input is preserved as `Unimplemented` and rejected by the
/// layer that knows which structure it expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Integer(Integer),
    Sequence(Vec<Element>),
    Unimplemented(Tlv),
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        match tlv.tag() {
            Tag::Integer => match tlv.data() {
                Some(data) if !data.is_empty() => Ok(Element::Integer(Integer::from(data))),
                _ => Err(Error::IntegerNoData),
            },
            Tag::Sequence => {
                let mut elements = Vec::new();
                if let Some(tlvs) = tlv.tlvs() {
                    for sub_tlv in tlvs.iter() {
                        let element = Element::try_from(sub_tlv)?;
                        elements.push(element);
                    }
                }
                Ok(Element::Sequence(elements))
            }
            Tag::Unimplemented(_) => Ok(Element::Unimplemented(tlv.clone())),
        }
    }
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self, Self::Error> {
        match element {
            Element::Integer(i) => {
                let data = i.as_bigint().to_signed_bytes_be();
                Ok(Tlv::new_primitive(Tag::Integer, data))
            }
            Element::Sequence(elements) => {
                let tlvs = elements
                    .iter()
                    .map(Tlv::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Tlv::new_constructed(Tag::Sequence, tlvs))
            }
            Element::Unimplemented(_) => Err(Error::ElementCannotEncode("Unimplemented")),
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::Sequence(seq) => write!(f, "Sequence({:?})", seq),
            Element::Unimplemented(tlv) => write!(f, "Unimplemented({:?})", tlv),
        }
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        Tlv::try_from(self)
    }
}

/// ASN.1 INTEGER.
///
/// The wire form is big-endian two's complement, so a positive value whose
/// high bit is set carries one leading zero byte. In serde output the value
/// renders as a decimal string, which keeps arbitrary-sized key parameters
/// readable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    /// Returns a reference to the inner BigInt
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    /// Converts the Integer to u64 if it fits in the range
    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }

    /// Converts the Integer to i64 if it fits in the range
    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    /// Converts to an unsigned magnitude; `None` when the value is negative.
    pub fn to_biguint(&self) -> Option<BigUint> {
        self.inner.to_biguint()
    }

    /// Bit length of the value's magnitude.
    pub fn bits(&self) -> u64 {
        self.inner.bits()
    }
}

impl Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner.to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let inner = s.parse::<BigInt>().map_err(serde::de::Error::custom)?;
        Ok(Integer { inner })
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<Vec<u8>> for Integer {
    fn from(value: Vec<u8>) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(&value),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Integer { inner: value }
    }
}

impl From<&BigUint> for Integer {
    fn from(value: &BigUint) -> Self {
        Integer {
            inner: BigInt::from(value.clone()),
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl TryFrom<&Integer> for i64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_i64().ok_or(Error::IntegerOutOfRangeI64)
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_u64().ok_or(Error::IntegerOutOfRangeU64)
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::{BigInt, BigUint};
    use rstest::rstest;

    use kagi::decoder::Decoder;
    use kagi::encoder::Encoder;

    use crate::{ASN1Object, Element, Integer};
    use der::{Der, Tag, Tlv};

    #[rstest(
        input,
        expected,
        case(vec![0x01], 1),
        case(vec![0x00], 0),
        case(vec![0xff], -1),
        case(vec![0x00, 0xff], 255),
        case(vec![0x01, 0x00, 0x01], 65537)
    )]
    fn test_integer_from_signed_bytes(input: Vec<u8>, expected: i64) {
        let integer = Integer::from(input);
        assert_eq!(integer.to_i64(), Some(expected));
    }

    #[rstest(
        value,
        expected,
        case(0, vec![0x00]),
        case(127, vec![0x7f]),
        case(255, vec![0x00, 0xff]),
        case(65537, vec![0x01, 0x00, 0x01])
    )]
    fn test_integer_to_signed_bytes(value: i64, expected: Vec<u8>) {
        let integer = Integer::from(value);
        assert_eq!(integer.as_bigint().to_signed_bytes_be(), expected);
    }

    #[test]
    fn test_integer_to_biguint_rejects_negative() {
        let negative = Integer::from(BigInt::from(-5));
        assert_eq!(negative.to_biguint(), None);

        let positive = Integer::from(&BigUint::from(65537u32));
        assert_eq!(positive.to_biguint(), Some(BigUint::from(65537u32)));
    }

    #[rstest(input, expected,
        case(
            vec![0x30, 0x06, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08],
            Element::Sequence(vec![
                Element::Integer(Integer::from(7)),
                Element::Integer(Integer::from(8)),
            ])
        ),
        case(vec![0x02, 0x01, 0x2a], Element::Integer(Integer::from(42)))
    )]
    fn test_element_try_from_tlv(input: Vec<u8>, expected: Element) {
        let der: Der = input.decode().unwrap();
        let obj: ASN1Object = der.decode().unwrap();
        assert_eq!(obj.elements(), &[expected]);
    }

    #[test]
    fn test_element_encode_decode_roundtrip() {
        let element = Element::Sequence(vec![
            Element::Integer(Integer::from(0)),
            Element::Integer(Integer::from(65537)),
            Element::Integer(Integer::from(&BigUint::from(0xff00ff00u32))),
        ]);
        let obj = ASN1Object::new(vec![element.clone()]);

        let der: Der = obj.encode().unwrap();
        let bytes: Vec<u8> = der.encode().unwrap();

        let decoded_der: Der = bytes.decode().unwrap();
        let decoded: ASN1Object = decoded_der.decode().unwrap();
        assert_eq!(decoded.elements(), &[element]);
    }

    #[test]
    fn test_unimplemented_element_cannot_encode() {
        let tlv = Tlv::new_primitive(Tag::Unimplemented(0x05), vec![]);
        let element = Element::Unimplemented(tlv);
        assert!(element.encode().is_err());
    }

    #[test]
    fn test_integer_serde_decimal_string() {
        let integer = Integer::from(65537);
        let json = serde_json::to_string(&integer).unwrap();
        assert_eq!(json, "\"65537\"");
    }
}
