use asn1::{Element, OctetString};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use super::error::{Error, Kind};
use super::{Extension, ExtensionValue, element_value, value_element};

/*
RFC 5280 Section 4.2.1.2
SubjectKeyIdentifier ::= KeyIdentifier

KeyIdentifier ::= OCTET STRING
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectKeyIdentifier {
    pub key_identifier: OctetString,
}

impl SubjectKeyIdentifier {
    pub fn new(key_identifier: impl Into<OctetString>) -> Self {
        Self {
            key_identifier: key_identifier.into(),
        }
    }
}

impl Extension for SubjectKeyIdentifier {
    const OID: &'static str = "2.5.29.14";
    const NAME: &'static str = "subjectKeyIdentifier";

    fn parse(value: &OctetString) -> Result<Self, Error> {
        value_element(Kind::SubjectKeyIdentifier, value)?.decode()
    }

    fn to_value(&self) -> Result<OctetString, Error> {
        element_value(Kind::SubjectKeyIdentifier, &self.encode()?)
    }

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::SubjectKeyIdentifier(ski) => Some(ski),
            _ => None,
        }
    }

    fn into_extension_value(self) -> ExtensionValue {
        ExtensionValue::SubjectKeyIdentifier(self)
    }
}

impl DecodableFrom<Element> for SubjectKeyIdentifier {}

impl Decoder<Element, SubjectKeyIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<SubjectKeyIdentifier, Self::Error> {
        let key_identifier = self
            .as_octet_string()
            .map_err(Kind::SubjectKeyIdentifier.asn1())?;
        Ok(SubjectKeyIdentifier {
            key_identifier: key_identifier.clone(),
        })
    }
}

impl EncodableTo<SubjectKeyIdentifier> for Element {}

impl Encoder<SubjectKeyIdentifier, Element> for SubjectKeyIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::OctetString(self.key_identifier.clone()))
    }
}
