//! Extension-specific error types

use ldapsdk::error::ErrorKind;
use thiserror::Error;

/// Context for where an extension error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    AuthorityKeyIdentifier,
    BasicConstraints,
    CRLDistributionPoints,
    ExtendedKeyUsage,
    GeneralName,
    IssuerAltName,
    KeyUsage,
    SubjectAltName,
    SubjectKeyIdentifier,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorityKeyIdentifier => write!(f, "AuthorityKeyIdentifier"),
            Self::BasicConstraints => write!(f, "BasicConstraints"),
            Self::CRLDistributionPoints => write!(f, "CRLDistributionPoints"),
            Self::ExtendedKeyUsage => write!(f, "ExtendedKeyUsage"),
            Self::GeneralName => write!(f, "GeneralName"),
            Self::IssuerAltName => write!(f, "IssuerAltName"),
            Self::KeyUsage => write!(f, "KeyUsage"),
            Self::SubjectAltName => write!(f, "SubjectAltName"),
            Self::SubjectKeyIdentifier => write!(f, "SubjectKeyIdentifier"),
        }
    }
}

/// Extension parsing errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: empty extension value")]
    EmptyValue(Kind),

    #[error("{0}: at least one element required")]
    EmptySequence(Kind),

    #[error("BasicConstraints: pathLenConstraint out of range for u32")]
    PathLenConstraintOutOfRange,

    #[error("GeneralName: unknown tag {0}")]
    UnknownGeneralNameTag(ber::Tag),

    #[error("GeneralName: iPAddress must be 4 or 16 bytes, got {0}")]
    InvalidIpAddressLength(usize),

    #[error("{kind}: {source}")]
    Asn1 {
        kind: Kind,
        #[source]
        source: asn1::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyValue(_) | Error::EmptySequence(_) | Error::UnknownGeneralNameTag(_) => {
                ErrorKind::Shape
            }
            Error::PathLenConstraintOutOfRange | Error::InvalidIpAddressLength(_) => {
                ErrorKind::Value
            }
            Error::Asn1 { source, .. } => source.kind(),
        }
    }
}

impl Kind {
    /// Adapter for `map_err` that attaches this context to an ASN.1 failure.
    pub(crate) fn asn1(self) -> impl Fn(asn1::Error) -> Error {
        move |source| Error::Asn1 { kind: self, source }
    }
}
