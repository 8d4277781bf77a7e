use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use nom::{IResult, Parser};
use pem::Pem;

pub mod error;

use error::Error;

/// A decoded DER document: the sequence of top-level TLV structures
/// found in the input bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    tlvs: Vec<Tlv>,
}

impl Der {
    pub fn new(tlvs: Vec<Tlv>) -> Self {
        Der { tlvs }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.tlvs
    }
}

/// DER tag octets understood by this crate.
///
/// PKCS#1 structures only contain INTEGER and SEQUENCE. Anything else is
/// carried through as `Unimplemented` so the caller can reject it with a
/// precise error instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tag {
    Integer,
    Sequence,
    Unimplemented(u8),
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            0x02 => Self::Integer,
            0x30 => Self::Sequence,
            _ => Tag::Unimplemented(value),
        }
    }
}

impl From<Tag> for u8 {
    fn from(value: Tag) -> Self {
        match value {
            Tag::Integer => 0x02,
            Tag::Sequence => 0x30,
            Tag::Unimplemented(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        Tlv {
            tag,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Content octets of a primitive TLV.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    /// Nested TLVs of a constructed TLV.
    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    fn parse(input: &[u8]) -> IResult<&[u8], Tlv> {
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, data) = nom::bytes::complete::take(length).parse(input)?;

        if tag.eq(&Tag::Sequence) {
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (new_input, v) = Self::parse(data)?;
                data = new_input;
                tlvs.push(v);
            }

            return Ok((
                input,
                Tlv {
                    tag,
                    value: Value::Tlv(tlvs),
                },
            ));
        }

        Ok((
            input,
            Tlv {
                tag,
                value: Value::Data(data.to_vec()),
            },
        ))
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        let content = match &self.value {
            Value::Data(data) => data.clone(),
            Value::Tlv(tlvs) => {
                let mut inner = Vec::new();
                for tlv in tlvs {
                    tlv.encode_into(&mut inner);
                }
                inner
            }
        };
        buf.push(u8::from(self.tag));
        encode_length(content.len(), buf);
        buf.extend_from_slice(&content);
    }
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (input, n) = nom::number::be_u8().parse(input)?;
    Ok((input, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], u64> {
    let (input, n) = nom::number::be_u8().parse(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let length = n & 0x7f;
        let (input, bs) = nom::bytes::complete::take(length).parse(input)?;
        let n = bs.iter().enumerate().fold(0u64, |n, (i, &b)| {
            n + 256_u64.pow((bs.len() - i - 1) as u32) * b as u64
        });
        return Ok((input, n));
    }
    // short form: 0-127
    Ok((input, n as u64))
}

// Canonical (minimal) length octets: short form below 128, otherwise the
// shortest long form.
fn encode_length(len: usize, buf: &mut Vec<u8>) {
    if len < 128 {
        buf.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];
    buf.push(0x80 | significant.len() as u8);
    buf.extend_from_slice(significant);
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        let mut tlvs = Vec::new();
        let mut input = self.as_slice();
        while !input.is_empty() {
            let (rest, tlv) = Tlv::parse(input).map_err(Error::from)?;
            input = rest;
            tlvs.push(tlv);
        }
        Ok(Der::new(tlvs))
    }
}

impl DecodableFrom<Pem> for Der {}

impl Decoder<Pem, Der> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        let bytes: Vec<u8> = Decoder::<Pem, Vec<u8>>::decode(self)?;
        bytes.decode()
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut buf = Vec::new();
        for tlv in &self.tlvs {
            tlv.encode_into(&mut buf);
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use kagi::decoder::Decoder;
    use kagi::encoder::Encoder;

    use crate::{Der, Tag, Tlv, Value, parse_length};

    #[rstest(input, expected, case(vec![0x02], Tag::Integer), case(vec![0x02, 0x01], Tag::Integer), case(vec![0x30, 0x01], Tag::Sequence))]
    fn test_parse_tag(input: Vec<u8>, expected: Tag) {
        use crate::parse_tag;

        let actual = parse_tag(&input).unwrap();

        assert_eq!(expected, actual.1);
    }

    #[rstest(input, expected,
        case(vec![0x02], 0x02),
        case(vec![0x02, 0x01], 0x02),
        case(vec![0x30, 0x01], 0x30),
        case(vec![0x82, 0x02, 0x10], 256 * 0x02 + 0x10),
        case(vec![0x83, 0x01, 0x00, 0x00], 256 * 256),
        case(vec![0x82, 0xff, 0xff], 256 * 0xff + 0xff),
    )]
    fn test_parse_length(input: Vec<u8>, expected: u64) {
        let actual = parse_length(&input).unwrap();

        assert_eq!(expected, actual.1);
    }

    #[rstest(input, expected,
        case(vec![0x02, 0x01, 0x01], Tlv{tag: Tag::Integer, value: Value::Data(vec![0x01])}),
        case(vec![0x02, 0x09, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01], Tlv{tag: Tag::Integer, value: Value::Data(vec![0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01])}),
        case(vec![0x05, 0x00], Tlv { tag: Tag::Unimplemented(0x05), value: Value::Data(vec![]) }),
    )]
    fn test_tlv_parse_primitive(input: Vec<u8>, expected: Tlv) {
        let (_, actual) = Tlv::parse(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input, expected,
        case(vec![0x30, 0x09, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09], Tlv::new_constructed(Tag::Sequence, vec![
            Tlv::new_primitive(Tag::Integer, vec![0x07]),
            Tlv::new_primitive(Tag::Integer, vec![0x08]),
            Tlv::new_primitive(Tag::Integer, vec![0x09]),
        ]))
    )]
    fn test_tlv_parse_structured(input: Vec<u8>, expected: Tlv) {
        let (_, actual) = Tlv::parse(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input,
        case(vec![0x30, 0x09, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09]),
        case(vec![0x02, 0x01, 0x00]),
    )]
    fn test_der_roundtrip(input: Vec<u8>) {
        let der: Der = input.decode().unwrap();
        let encoded: Vec<u8> = der.encode().unwrap();
        assert_eq!(input, encoded);
    }

    #[test]
    fn test_encode_long_form_length() {
        // 200 content octets do not fit the short form
        let tlv = Tlv::new_primitive(Tag::Integer, vec![0xaa; 200]);
        let mut buf = Vec::new();
        tlv.encode_into(&mut buf);
        assert_eq!(&buf[..3], &[0x02, 0x81, 200]);
        assert_eq!(buf.len(), 3 + 200);

        let der: Der = buf.decode().unwrap();
        assert_eq!(der.elements(), &[tlv]);
    }

    #[test]
    fn test_decode_empty_input() {
        let der: Der = Vec::<u8>::new().decode().unwrap();
        assert!(der.elements().is_empty());
    }
}
