//! Certificate extensions.
//!
//! Every extension is read into a [`CertificateExtension`]. The value of a
//! recognised OID is parsed into its typed form through [`parse_value`];
//! any other OID keeps its raw value as [`ExtensionValue::Generic`].

use std::str::FromStr;

use asn1::schema::{Extensibility, Field, Schema};
use asn1::{Element, ObjectIdentifier, OctetString};
use ber::UniversalTag;
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;
use tracing::warn;

use crate::config::ExtensionPolicy;

mod authority_key_identifier;
mod basic_constraints;
mod crl_distribution_points;
pub mod error;
mod extended_key_usage;
mod general_name;
mod issuer_alt_name;
mod key_usage;
mod subject_alt_name;
mod subject_key_identifier;

pub use authority_key_identifier::AuthorityKeyIdentifier;
pub use basic_constraints::BasicConstraints;
pub use crl_distribution_points::{
    CRLDistributionPoints, DistributionPoint, DistributionPointName, ReasonFlags,
};
pub use extended_key_usage::{ExtendedKeyUsage, KEY_PURPOSES};
pub use general_name::{GeneralName, GeneralNames};
pub use issuer_alt_name::IssuerAltName;
pub use key_usage::KeyUsage;
pub use subject_alt_name::SubjectAltName;
pub use subject_key_identifier::SubjectKeyIdentifier;

use self::error::{Error, Kind};

/*
RFC 5280 Section 4.1.2.9

Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension

Extension  ::=  SEQUENCE  {
    extnID      OBJECT IDENTIFIER,
    critical    BOOLEAN DEFAULT FALSE,
    extnValue   OCTET STRING
                -- contains the DER encoding of an ASN.1 value
                -- corresponding to the extension type identified
                -- by extnID
}
*/

const TYPE_CRITICAL: ber::Tag = UniversalTag::Boolean.tag();

static EXTENSION: Schema = Schema::new(
    "Extension",
    &[
        Field::required("extnID", UniversalTag::ObjectIdentifier.tag()),
        Field::defaulted("critical", TYPE_CRITICAL),
        Field::required("extnValue", UniversalTag::OctetString.tag()),
    ],
    &[],
    Extensibility::Closed,
);

/// A typed extension with a fixed OID.
pub trait Extension: Sized {
    const OID: &'static str;
    /// Conventional name, such as `basicConstraints`.
    const NAME: &'static str;

    fn oid() -> Result<ObjectIdentifier, asn1::Error> {
        ObjectIdentifier::from_str(Self::OID)
    }

    /// Parses the content of extnValue.
    fn parse(value: &OctetString) -> Result<Self, Error>;

    /// Produces the content of extnValue.
    fn to_value(&self) -> Result<OctetString, Error>;

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self>;

    fn into_extension_value(self) -> ExtensionValue;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExtensionValue {
    AuthorityKeyIdentifier(AuthorityKeyIdentifier),
    BasicConstraints(BasicConstraints),
    CRLDistributionPoints(CRLDistributionPoints),
    ExtendedKeyUsage(ExtendedKeyUsage),
    IssuerAltName(IssuerAltName),
    KeyUsage(KeyUsage),
    SubjectAltName(SubjectAltName),
    SubjectKeyIdentifier(SubjectKeyIdentifier),
    /// Unrecognised OID, or a malformed value kept under the lenient policy.
    Generic(OctetString),
}

/// Parses `value` as the extension registered for `oid`. `None` when the
/// OID is not recognised.
pub fn parse_value(
    oid: &ObjectIdentifier,
    value: &OctetString,
) -> Option<Result<ExtensionValue, Error>> {
    let parsed = match oid.to_string().as_str() {
        AuthorityKeyIdentifier::OID => {
            AuthorityKeyIdentifier::parse(value).map(ExtensionValue::AuthorityKeyIdentifier)
        }
        BasicConstraints::OID => {
            BasicConstraints::parse(value).map(ExtensionValue::BasicConstraints)
        }
        CRLDistributionPoints::OID => {
            CRLDistributionPoints::parse(value).map(ExtensionValue::CRLDistributionPoints)
        }
        ExtendedKeyUsage::OID => {
            ExtendedKeyUsage::parse(value).map(ExtensionValue::ExtendedKeyUsage)
        }
        IssuerAltName::OID => IssuerAltName::parse(value).map(ExtensionValue::IssuerAltName),
        KeyUsage::OID => KeyUsage::parse(value).map(ExtensionValue::KeyUsage),
        SubjectAltName::OID => SubjectAltName::parse(value).map(ExtensionValue::SubjectAltName),
        SubjectKeyIdentifier::OID => {
            SubjectKeyIdentifier::parse(value).map(ExtensionValue::SubjectKeyIdentifier)
        }
        _ => return None,
    };
    Some(parsed)
}

pub fn name_for_oid(oid: &ObjectIdentifier) -> Option<&'static str> {
    match oid.to_string().as_str() {
        AuthorityKeyIdentifier::OID => Some(AuthorityKeyIdentifier::NAME),
        BasicConstraints::OID => Some(BasicConstraints::NAME),
        CRLDistributionPoints::OID => Some(CRLDistributionPoints::NAME),
        ExtendedKeyUsage::OID => Some(ExtendedKeyUsage::NAME),
        IssuerAltName::OID => Some(IssuerAltName::NAME),
        KeyUsage::OID => Some(KeyUsage::NAME),
        SubjectAltName::OID => Some(SubjectAltName::NAME),
        SubjectKeyIdentifier::OID => Some(SubjectKeyIdentifier::NAME),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateExtension {
    oid: ObjectIdentifier,
    critical: bool,
    #[serde(skip)]
    raw_value: OctetString,
    value: ExtensionValue,
}

impl CertificateExtension {
    pub fn new<T: Extension>(critical: bool, value: T) -> Result<Self, crate::error::Error> {
        let oid = T::oid()?;
        let raw_value = value
            .to_value()
            .map_err(|source| crate::error::Error::InvalidExtension {
                oid: oid.clone(),
                source,
            })?;
        Ok(Self {
            oid,
            critical,
            raw_value,
            value: value.into_extension_value(),
        })
    }

    /// An extension kept as raw bytes whatever its OID.
    pub fn generic(oid: ObjectIdentifier, critical: bool, value: impl Into<OctetString>) -> Self {
        let raw_value = value.into();
        Self {
            oid,
            critical,
            value: ExtensionValue::Generic(raw_value.clone()),
            raw_value,
        }
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// The content of extnValue exactly as it will be encoded.
    pub fn raw_value(&self) -> &OctetString {
        &self.raw_value
    }

    pub fn value(&self) -> &ExtensionValue {
        &self.value
    }

    pub fn is_generic(&self) -> bool {
        matches!(self.value, ExtensionValue::Generic(_))
    }

    pub fn name(&self) -> Option<&'static str> {
        name_for_oid(&self.oid)
    }

    pub fn get<T: Extension>(&self) -> Option<&T> {
        T::from_extension_value(&self.value)
    }

    pub(crate) fn decode_with(
        element: &Element,
        policy: ExtensionPolicy,
    ) -> Result<Self, crate::error::Error> {
        let at = crate::error::Error::field;
        let fields = EXTENSION
            .decode(element.as_sequence().map_err(at("extension"))?)
            .map_err(at("extension"))?;

        let oid = fields.required(0).and_then(Element::as_oid).map_err(at("extnID"))?;
        let critical = fields
            .positional(1)
            .map(Element::as_bool)
            .transpose()
            .map_err(at("critical"))?
            .unwrap_or(false);
        let raw_value = fields
            .required(2)
            .and_then(Element::as_octet_string)
            .map_err(at("extnValue"))?;

        let value = match parse_value(oid, raw_value) {
            None => ExtensionValue::Generic(raw_value.clone()),
            Some(Ok(value)) => value,
            Some(Err(source)) if policy == ExtensionPolicy::Lenient => {
                warn!(
                    "keeping malformed {} extension as generic: {}",
                    name_for_oid(oid).unwrap_or("?"),
                    source
                );
                ExtensionValue::Generic(raw_value.clone())
            }
            Some(Err(source)) => {
                return Err(crate::error::Error::InvalidExtension {
                    oid: oid.clone(),
                    source,
                });
            }
        };

        Ok(Self {
            oid: oid.clone(),
            critical,
            raw_value: raw_value.clone(),
            value,
        })
    }
}

impl EncodableTo<CertificateExtension> for Element {}

impl Encoder<CertificateExtension, Element> for CertificateExtension {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        // DER omits a DEFAULT value
        let critical = self.critical.then_some(Element::Boolean(true));
        let children = EXTENSION
            .encoder()
            .positional(Element::ObjectIdentifier(self.oid.clone()))
            .positional(critical)
            .positional(Element::OctetString(self.raw_value.clone()))
            .finish()?;
        Ok(Element::Sequence(children))
    }
}

/// Reads extnValue content as a single element. An empty value is rejected
/// before parsing.
pub(crate) fn value_element(kind: Kind, value: &OctetString) -> Result<Element, Error> {
    if value.is_empty() {
        return Err(Error::EmptyValue(kind));
    }
    Element::from_ber(value.as_bytes()).map_err(kind.asn1())
}

pub(crate) fn element_value(kind: Kind, element: &Element) -> Result<OctetString, Error> {
    element.to_der().map(OctetString::from).map_err(kind.asn1())
}
