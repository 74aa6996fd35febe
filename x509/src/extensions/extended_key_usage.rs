use asn1::{Element, ObjectIdentifier, OctetString};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use super::error::{Error, Kind};
use super::{Extension, ExtensionValue, element_value, value_element};
use crate::oid_name::{OidTable, name_of};

/*
RFC 5280 Section 4.2.1.12
ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId

KeyPurposeId ::= OBJECT IDENTIFIER
*/

pub static KEY_PURPOSES: &OidTable = &[
    ("1.3.6.1.5.5.7.3.1", "serverAuth"),
    ("1.3.6.1.5.5.7.3.2", "clientAuth"),
    ("1.3.6.1.5.5.7.3.3", "codeSigning"),
    ("1.3.6.1.5.5.7.3.4", "emailProtection"),
    ("1.3.6.1.5.5.7.3.8", "timeStamping"),
    ("1.3.6.1.5.5.7.3.9", "OCSPSigning"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedKeyUsage {
    pub key_purposes: Vec<ObjectIdentifier>,
}

impl ExtendedKeyUsage {
    pub fn new(key_purposes: Vec<ObjectIdentifier>) -> Self {
        Self { key_purposes }
    }

    /// Purpose names, falling back to the dotted OID for unknown purposes.
    pub fn purpose_names(&self) -> Vec<String> {
        self.key_purposes
            .iter()
            .map(|oid| name_of(KEY_PURPOSES, oid).map_or_else(|| oid.to_string(), str::to_string))
            .collect()
    }
}

impl Extension for ExtendedKeyUsage {
    const OID: &'static str = "2.5.29.37";
    const NAME: &'static str = "extKeyUsage";

    fn parse(value: &OctetString) -> Result<Self, Error> {
        value_element(Kind::ExtendedKeyUsage, value)?.decode()
    }

    fn to_value(&self) -> Result<OctetString, Error> {
        element_value(Kind::ExtendedKeyUsage, &self.encode()?)
    }

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::ExtendedKeyUsage(eku) => Some(eku),
            _ => None,
        }
    }

    fn into_extension_value(self) -> ExtensionValue {
        ExtensionValue::ExtendedKeyUsage(self)
    }
}

impl DecodableFrom<Element> for ExtendedKeyUsage {}

impl Decoder<Element, ExtendedKeyUsage> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ExtendedKeyUsage, Self::Error> {
        let elements = self.as_sequence().map_err(Kind::ExtendedKeyUsage.asn1())?;
        if elements.is_empty() {
            return Err(Error::EmptySequence(Kind::ExtendedKeyUsage));
        }
        let key_purposes = elements
            .iter()
            .map(|e| e.as_oid().cloned())
            .collect::<Result<Vec<ObjectIdentifier>, asn1::Error>>()
            .map_err(Kind::ExtendedKeyUsage.asn1())?;
        Ok(ExtendedKeyUsage { key_purposes })
    }
}

impl EncodableTo<ExtendedKeyUsage> for Element {}

impl Encoder<ExtendedKeyUsage, Element> for ExtendedKeyUsage {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Sequence(
            self.key_purposes
                .iter()
                .cloned()
                .map(Element::ObjectIdentifier)
                .collect(),
        ))
    }
}
