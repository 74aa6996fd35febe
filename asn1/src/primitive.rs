//! Content codecs for the UNIVERSAL primitive types.
//!
//! Every codec works on content octets and can be framed under its own
//! UNIVERSAL tag or under a caller-supplied override tag, which is how
//! `[n] IMPLICIT` and `[APPLICATION n] IMPLICIT` fields are read and written.

use ber::{Tag, Tlv, UniversalTag};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::integer::Integer;

pub trait Primitive: Sized {
    /// The tag used when no override is given.
    const TAG: UniversalTag;

    fn decode_content(content: &[u8]) -> Result<Self, Error>;

    fn encode_content(&self) -> Result<Vec<u8>, Error>;

    fn decode_tlv(tlv: &Tlv) -> Result<Self, Error> {
        Self::decode_tlv_as(tlv, Self::TAG.tag())
    }

    /// Decodes `tlv` after checking it carries exactly `tag`.
    fn decode_tlv_as(tlv: &Tlv, tag: Tag) -> Result<Self, Error> {
        if tlv.tag() != tag {
            return Err(Error::UnexpectedTag {
                expected: tag,
                actual: tlv.tag(),
            });
        }
        Self::decode_content(tlv.value())
    }

    fn encode_tlv(&self) -> Result<Tlv, Error> {
        self.encode_tlv_as(Self::TAG.tag())
    }

    fn encode_tlv_as(&self, tag: Tag) -> Result<Tlv, Error> {
        if tag.is_constructed() {
            return Err(Error::ConstructedOverrideTag(tag));
        }
        Ok(Tlv::new(tag, self.encode_content()?))
    }
}

impl Primitive for bool {
    const TAG: UniversalTag = UniversalTag::Boolean;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        match content {
            [0x00] => Ok(false),
            [0xff] => Ok(true),
            _ => Err(Error::InvalidBoolean),
        }
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        Ok(vec![if *self { 0xff } else { 0x00 }])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Null;

impl Primitive for Null {
    const TAG: UniversalTag = UniversalTag::Null;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        if !content.is_empty() {
            return Err(Error::InvalidNull(content.len()));
        }
        Ok(Null)
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }
}

/// ENUMERATED shares the INTEGER content encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerated(Integer);

impl Enumerated {
    pub fn new(value: impl Into<Integer>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &Integer {
        &self.0
    }

    pub fn into_inner(self) -> Integer {
        self.0
    }
}

impl Primitive for Enumerated {
    const TAG: UniversalTag = UniversalTag::Enumerated;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        Integer::decode_content(content).map(Self)
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        self.0.encode_content()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utf8String(pub String);

impl Primitive for Utf8String {
    const TAG: UniversalTag = UniversalTag::UTF8String;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        String::from_utf8(content.to_vec())
            .map(Self)
            .map_err(|_| Error::InvalidUtf8("UTF8String"))
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        Ok(self.0.as_bytes().to_vec())
    }
}

// PrintableString is checked as ASCII only: '*', '@' and '&' show up in
// real-world certificates even though the character set forbids them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintableString(pub String);

impl Primitive for PrintableString {
    const TAG: UniversalTag = UniversalTag::PrintableString;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        decode_ascii(content, "PrintableString").map(Self)
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        encode_ascii(&self.0, "PrintableString")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ia5String(pub String);

impl Primitive for Ia5String {
    const TAG: UniversalTag = UniversalTag::IA5String;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        decode_ascii(content, "IA5String").map(Self)
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        encode_ascii(&self.0, "IA5String")
    }
}

fn decode_ascii(content: &[u8], what: &'static str) -> Result<String, Error> {
    if !content.is_ascii() {
        return Err(Error::InvalidAscii(what));
    }
    String::from_utf8(content.to_vec()).map_err(|_| Error::InvalidUtf8(what))
}

fn encode_ascii(value: &str, what: &'static str) -> Result<Vec<u8>, Error> {
    if !value.is_ascii() {
        return Err(Error::InvalidAscii(what));
    }
    Ok(value.as_bytes().to_vec())
}

/// Children of a SEQUENCE, SET or implicitly tagged constructed element.
pub fn decode_constructed(tlv: &Tlv, tag: Tag) -> Result<Vec<Tlv>, Error> {
    if tlv.tag() != tag {
        return Err(Error::UnexpectedTag {
            expected: tag,
            actual: tlv.tag(),
        });
    }
    Ok(tlv.children()?)
}

pub fn encode_constructed(tag: Tag, children: &[Tlv]) -> Tlv {
    Tlv::constructed(tag, children)
}
