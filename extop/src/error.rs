//! Error types for extended operation values.

use ldapsdk::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: a value is required")]
    MissingValue(&'static str),

    #[error("{name}: value is {len} bytes, limit is {limit}")]
    ValueTooLarge {
        name: &'static str,
        len: usize,
        limit: usize,
    },

    #[error("{name}: {source}")]
    Decode {
        name: &'static str,
        #[source]
        source: asn1::Error,
    },

    #[error("unknown configuration type {0}")]
    UnknownConfigurationType(String),

    #[error(transparent)]
    Asn1(#[from] asn1::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingValue(_) => ErrorKind::Shape,
            Error::ValueTooLarge { .. } => ErrorKind::Framing,
            Error::Decode { source, .. } => source.kind(),
            Error::UnknownConfigurationType(_) => ErrorKind::Value,
            Error::Asn1(e) => e.kind(),
        }
    }

    /// Attaches the value name to a bare ASN.1 failure.
    pub(crate) fn in_value(self, name: &'static str) -> Self {
        match self {
            Error::Asn1(source) => Error::Decode { name, source },
            other => other,
        }
    }
}
