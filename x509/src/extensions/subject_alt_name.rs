use asn1::{Element, OctetString};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use super::error::{Error, Kind};
use super::general_name::{GeneralNames, decode_general_names, encode_general_names};
use super::{Extension, ExtensionValue, element_value, value_element};

/*
RFC 5280 Section 4.2.1.6
SubjectAltName ::= GeneralNames

GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectAltName {
    pub names: GeneralNames,
}

impl SubjectAltName {
    pub fn new(names: GeneralNames) -> Self {
        Self { names }
    }

    /// The dNSName entries, in order.
    pub fn dns_names(&self) -> Vec<&str> {
        self.names
            .iter()
            .filter_map(|name| match name {
                super::GeneralName::DnsName(dns) => Some(dns.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Extension for SubjectAltName {
    const OID: &'static str = "2.5.29.17";
    const NAME: &'static str = "subjectAltName";

    fn parse(value: &OctetString) -> Result<Self, Error> {
        value_element(Kind::SubjectAltName, value)?.decode()
    }

    fn to_value(&self) -> Result<OctetString, Error> {
        element_value(Kind::SubjectAltName, &self.encode()?)
    }

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::SubjectAltName(san) => Some(san),
            _ => None,
        }
    }

    fn into_extension_value(self) -> ExtensionValue {
        ExtensionValue::SubjectAltName(self)
    }
}

impl DecodableFrom<Element> for SubjectAltName {}

impl Decoder<Element, SubjectAltName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<SubjectAltName, Self::Error> {
        let elements = self.as_sequence().map_err(Kind::SubjectAltName.asn1())?;
        let names = decode_general_names(Kind::SubjectAltName, elements)?;
        Ok(SubjectAltName { names })
    }
}

impl EncodableTo<SubjectAltName> for Element {}

impl Encoder<SubjectAltName, Element> for SubjectAltName {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Sequence(encode_general_names(&self.names)?))
    }
}
