use asn1::{Element, OctetString};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use super::error::{Error, Kind};
use super::general_name::{GeneralNames, decode_general_names, encode_general_names};
use super::{Extension, ExtensionValue, element_value, value_element};

/*
RFC 5280 Section 4.2.1.7
IssuerAltName ::= GeneralNames
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerAltName {
    pub names: GeneralNames,
}

impl IssuerAltName {
    pub fn new(names: GeneralNames) -> Self {
        Self { names }
    }
}

impl Extension for IssuerAltName {
    const OID: &'static str = "2.5.29.18";
    const NAME: &'static str = "issuerAltName";

    fn parse(value: &OctetString) -> Result<Self, Error> {
        value_element(Kind::IssuerAltName, value)?.decode()
    }

    fn to_value(&self) -> Result<OctetString, Error> {
        element_value(Kind::IssuerAltName, &self.encode()?)
    }

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::IssuerAltName(ian) => Some(ian),
            _ => None,
        }
    }

    fn into_extension_value(self) -> ExtensionValue {
        ExtensionValue::IssuerAltName(self)
    }
}

impl DecodableFrom<Element> for IssuerAltName {}

impl Decoder<Element, IssuerAltName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<IssuerAltName, Self::Error> {
        let elements = self.as_sequence().map_err(Kind::IssuerAltName.asn1())?;
        let names = decode_general_names(Kind::IssuerAltName, elements)?;
        Ok(IssuerAltName { names })
    }
}

impl EncodableTo<IssuerAltName> for Element {}

impl Encoder<IssuerAltName, Element> for IssuerAltName {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Sequence(encode_general_names(&self.names)?))
    }
}

#[cfg(test)]
mod tests {
    use asn1::OctetString;

    use super::IssuerAltName;
    use crate::extensions::{Extension, GeneralName};

    #[test]
    fn test_issuer_alt_name_value() {
        let ian = IssuerAltName::new(vec![GeneralName::dns_name("issuer.example.com")]);
        let value = ian.to_value().unwrap();
        assert_eq!(value.as_bytes()[..4], [0x30, 20, 0x82, 18]);
        assert_eq!(IssuerAltName::parse(&value).unwrap(), ian);
    }

    #[test]
    fn test_issuer_alt_name_empty() {
        let err = IssuerAltName::parse(&OctetString::from(vec![0x30, 0x00])).unwrap_err();
        assert!(format!("{:?}", err).contains("EmptySequence(IssuerAltName)"));
    }
}
