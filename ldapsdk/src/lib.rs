//! # ldapsdk
//!
//! Core traits shared by the ldapsdk codec crates.
//!
//! Every protocol element handled by the SDK travels through the same chain
//! of representations:
//!
//! ```text
//! Vec<u8> → Ber → Element → typed value (extended operation value, Certificate)
//! ```
//!
//! Each step uses the `Decoder` trait to go forward and the `Encoder` trait
//! to come back. The marker traits `DecodableFrom` and `EncodableTo` restrict
//! the pairs for which a conversion exists, so a mistaken conversion is a
//! compile error instead of a runtime surprise.
//!
//! ```ignore
//! use ldapsdk::decoder::Decoder;
//! use ber::Ber;
//! use asn1::ASN1Object;
//!
//! let bytes = vec![0x30, 0x00];
//! let ber: Ber = bytes.decode().unwrap();
//! let object: ASN1Object = ber.decode().unwrap();
//! ```
//!
//! The [`error::ErrorKind`] enum classifies failures from every crate so
//! callers can tell a truncated frame from a semantic violation without
//! matching on crate-specific variants.

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
pub mod error;
