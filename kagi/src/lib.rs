//! # kagi
//!
//! Core traits for encoding and decoding in the kagi RSA key toolkit.
//!
//! This crate defines the `Decoder` and `Encoder` traits that establish
//! the type-safe conversion chain used throughout the workspace:
//!
//! ```text
//! PEM → Vec<u8> → DER → ASN1Object → RSA key
//! ```
//!
//! Each step implements the `Decoder` trait to convert from one
//! representation to the next, and the `Encoder` trait for the reverse
//! direction. The marker traits (`DecodableFrom` and `EncodableTo`)
//! constrain which conversions exist, so an invalid step is a compile
//! error rather than a runtime surprise.
//!
//! Concrete implementations live in the `pem`, `der`, `asn1`, and `rsa`
//! crates. For example, decoding raw bytes into a DER structure:
//!
//! ```ignore
//! use kagi::decoder::Decoder;
//! use der::Der;
//!
//! let bytes = vec![0x30, 0x00];
//! let der: Der = bytes.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
