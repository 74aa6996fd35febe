use asn1::ObjectIdentifier;
use ldapsdk::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("certificate is {len} bytes, limit is {limit}")]
    TooLarge { len: usize, limit: usize },

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("extensions: at least one extension required when present")]
    EmptyExtensions,

    #[error("extension {oid}: {source}")]
    InvalidExtension {
        oid: ObjectIdentifier,
        #[source]
        source: crate::extensions::error::Error,
    },

    #[error("unknown attribute type {0}")]
    UnknownAttributeType(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(&'static str),

    #[error(
        "signature algorithm {outer} does not match the TBSCertificate signature algorithm {inner}"
    )]
    SignatureAlgorithmMismatch {
        outer: ObjectIdentifier,
        inner: ObjectIdentifier,
    },

    #[error("{what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: asn1::Error,
    },

    #[error(transparent)]
    Asn1(#[from] asn1::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TooLarge { .. } => ErrorKind::Framing,
            Error::InvalidVersion(_) => ErrorKind::Value,
            Error::EmptyExtensions => ErrorKind::Shape,
            Error::InvalidExtension { source, .. } => source.kind(),
            Error::UnknownAttributeType(_) => ErrorKind::Encoding,
            Error::InvalidPublicKey(_) => ErrorKind::Value,
            Error::SignatureAlgorithmMismatch { .. } => ErrorKind::CrossCheck,
            Error::Decode { source, .. } | Error::Asn1(source) => source.kind(),
        }
    }

    /// Adapter for `map_err` naming the certificate field that failed.
    pub(crate) fn field(what: &'static str) -> impl Fn(asn1::Error) -> Error {
        move |source| Error::Decode { what, source }
    }
}
