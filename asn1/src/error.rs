//! Error types for ASN.1 decoding and encoding.

use std::num::ParseIntError;

use ber::Tag;
use ldapsdk::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid BER framing: {0}")]
    Ber(#[from] ber::Error),

    // Shape errors
    #[error("expected tag {expected}, got {actual}")]
    UnexpectedTag { expected: Tag, actual: Tag },
    #[error("expected {expected}, got element with tag {actual}")]
    UnexpectedElement { expected: &'static str, actual: Tag },
    #[error("{what}: expected {expected} elements, got {actual}")]
    InvalidElementCount {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("override tag {0} must be primitive")]
    ConstructedOverrideTag(Tag),
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    // Boolean errors
    #[error("BOOLEAN: content must be a single 0x00 or 0xff octet")]
    InvalidBoolean,

    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: value out of range for {0}")]
    IntegerOutOfRange(&'static str),
    #[error("parse int error: {0}")]
    ParseInt(#[from] ParseIntError),

    #[error("NULL: content must be empty, got {0} bytes")]
    InvalidNull(usize),

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: sub-identifier with a leading 0x80 octet")]
    ObjectIdentifierNotMinimal,
    #[error("OBJECT IDENTIFIER: sub-identifier does not fit in u64")]
    ObjectIdentifierOverflow,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: invalid component '{0}'")]
    ObjectIdentifierInvalidComponent(String),
    #[error("OBJECT IDENTIFIER: {0} cannot be encoded")]
    ObjectIdentifierCannotEncode(String),

    // BitString errors
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),
    #[error("BIT STRING: {0} unused bits declared without data")]
    BitStringUnusedBitsWithoutData(u8),

    // String errors
    #[error("{0}: invalid UTF-8")]
    InvalidUtf8(&'static str),
    #[error("{0}: non-ASCII character")]
    InvalidAscii(&'static str),

    // Time errors
    #[error("UTCTime: invalid format '{0}'")]
    UtcTimeInvalidFormat(String),
    #[error("UTCTime: year {0} outside 1950-2049")]
    UtcTimeOutOfRange(i32),
    #[error("GeneralizedTime: invalid format '{0}'")]
    GeneralizedTimeInvalidFormat(String),
    #[error("GeneralizedTime: year {0} outside 0-9999")]
    GeneralizedTimeOutOfRange(i32),

    // Tagged-field dispatch errors
    #[error("{schema}: missing mandatory field {field}")]
    MissingField {
        schema: &'static str,
        field: &'static str,
    },
    #[error("{schema}: field {field} expected tag {expected}, got {actual}")]
    FieldTagMismatch {
        schema: &'static str,
        field: &'static str,
        expected: Tag,
        actual: Tag,
    },
    #[error("{schema}: unexpected element with tag {tag}")]
    UnexpectedField { schema: &'static str, tag: Tag },
    #[error("{schema}: element with tag {tag} appears more than once")]
    DuplicateField { schema: &'static str, tag: Tag },
    #[error("{schema}: no field with tag {tag}")]
    FieldNotInSchema { schema: &'static str, tag: Tag },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Ber(e) => e.kind(),
            Error::UnexpectedTag { .. }
            | Error::UnexpectedElement { .. }
            | Error::InvalidElementCount { .. }
            | Error::NestingTooDeep(_)
            | Error::MissingField { .. }
            | Error::FieldTagMismatch { .. }
            | Error::UnexpectedField { .. }
            | Error::DuplicateField { .. } => ErrorKind::Shape,
            Error::ConstructedOverrideTag(_)
            | Error::ObjectIdentifierCannotEncode(_)
            | Error::UtcTimeOutOfRange(_)
            | Error::GeneralizedTimeOutOfRange(_)
            | Error::FieldNotInSchema { .. } => ErrorKind::Encoding,
            _ => ErrorKind::Value,
        }
    }
}
