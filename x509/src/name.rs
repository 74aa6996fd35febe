//! Name and related types
//!
//! Defined in RFC 5280 Section 4.1.2.4
//!
//! ```asn1
//! Name ::= CHOICE { -- only one possibility for now --
//!     rdnSequence  RDNSequence
//! }
//!
//! RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
//!
//! RelativeDistinguishedName ::= SET OF AttributeTypeAndValue
//!
//! AttributeTypeAndValue ::= SEQUENCE {
//!     type     AttributeType,
//!     value    AttributeValue
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use asn1::{Element, ObjectIdentifier};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::error::Error;
use crate::oid_name::{OidName, OidTable, name_of, oid_of};

pub const OID_COUNTRY_NAME: &str = "2.5.4.6";

pub static ATTRIBUTE_TYPES: &OidTable = &[
    ("2.5.4.3", "CN"),
    ("2.5.4.10", "O"),
    (OID_COUNTRY_NAME, "C"),
    ("2.5.4.11", "OU"),
    ("2.5.4.7", "L"),
    ("2.5.4.8", "ST"),
    ("0.9.2342.19200300.100.1.25", "DC"),
    ("0.9.2342.19200300.100.1.1", "UID"),
    ("1.2.840.113549.1.9.1", "E"),
];

/// X.509 Distinguished Name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Name {
    pub rdn_sequence: Vec<RelativeDistinguishedName>,
}

impl Name {
    pub fn new(rdn_sequence: Vec<RelativeDistinguishedName>) -> Self {
        Self { rdn_sequence }
    }

    /// Builds a name of single-valued RDNs from `(attribute, value)` pairs
    /// in order, such as `[("CN", "ldap.example.com"), ("C", "US")]`.
    ///
    /// # Errors
    ///
    /// Returns an error when an attribute name is not one of the known
    /// attribute types.
    pub fn from_attributes(attributes: &[(&str, &str)]) -> Result<Self, Error> {
        let rdn_sequence = attributes
            .iter()
            .map(|(name, value)| {
                AttributeTypeAndValue::from_name(name, value)
                    .map(RelativeDistinguishedName::new_single)
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self { rdn_sequence })
    }

    pub fn rdn_sequence(&self) -> &[RelativeDistinguishedName] {
        &self.rdn_sequence
    }

    pub fn is_empty(&self) -> bool {
        self.rdn_sequence.is_empty()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .rdn_sequence
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", formatted)
    }
}

impl DecodableFrom<Element> for Name {}

impl Decoder<Element, Name> for Element {
    type Error = asn1::Error;

    fn decode(&self) -> Result<Name, Self::Error> {
        let rdn_sequence = self
            .as_sequence()?
            .iter()
            .map(|elem| elem.decode())
            .collect::<Result<Vec<RelativeDistinguishedName>, asn1::Error>>()?;
        Ok(Name { rdn_sequence })
    }
}

impl EncodableTo<Name> for Element {}

impl Encoder<Name, Element> for Name {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let rdn_elements = self
            .rdn_sequence
            .iter()
            .map(|rdn| rdn.encode())
            .collect::<Result<Vec<Element>, asn1::Error>>()?;
        Ok(Element::Sequence(rdn_elements))
    }
}

/// A set of attribute-value pairs that together form one component of a
/// Name. Usually holds a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeDistinguishedName {
    pub attributes: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn new_single(attribute: AttributeTypeAndValue) -> Self {
        Self {
            attributes: vec![attribute],
        }
    }

    pub fn new(attributes: Vec<AttributeTypeAndValue>) -> Self {
        Self { attributes }
    }
}

impl fmt::Display for RelativeDistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .attributes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("+");
        write!(f, "{}", formatted)
    }
}

impl DecodableFrom<Element> for RelativeDistinguishedName {}

impl Decoder<Element, RelativeDistinguishedName> for Element {
    type Error = asn1::Error;

    fn decode(&self) -> Result<RelativeDistinguishedName, Self::Error> {
        let attributes = self
            .as_set()?
            .iter()
            .map(|elem| elem.decode())
            .collect::<Result<Vec<AttributeTypeAndValue>, asn1::Error>>()?;
        Ok(RelativeDistinguishedName { attributes })
    }
}

impl EncodableTo<RelativeDistinguishedName> for Element {}

impl Encoder<RelativeDistinguishedName, Element> for RelativeDistinguishedName {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let attr_elements = self
            .attributes
            .iter()
            .map(|attr| attr.encode())
            .collect::<Result<Vec<Element>, asn1::Error>>()?;
        Ok(Element::Set(attr_elements))
    }
}

/// Attribute Type and Value pair, such as CN=example.com.
///
/// The value keeps its original element so that PrintableString and
/// UTF8String values re-encode with the same string type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    pub attribute_type: ObjectIdentifier,
    pub attribute_value: Element,
}

impl AttributeTypeAndValue {
    pub fn new(attribute_type: ObjectIdentifier, attribute_value: Element) -> Self {
        Self {
            attribute_type,
            attribute_value,
        }
    }

    /// Resolves `name` through the attribute type table. Country names are
    /// PrintableString and everything else is UTF8String.
    pub fn from_name(name: &str, value: &str) -> Result<Self, Error> {
        let dotted =
            oid_of(ATTRIBUTE_TYPES, name).ok_or_else(|| Error::UnknownAttributeType(name.to_string()))?;
        let attribute_type = ObjectIdentifier::from_str(dotted)?;
        let attribute_value = if dotted == OID_COUNTRY_NAME {
            Element::PrintableString(value.to_string())
        } else {
            Element::UTF8String(value.to_string())
        };
        Ok(Self {
            attribute_type,
            attribute_value,
        })
    }

    /// The value as text when it is one of the string types.
    pub fn value_str(&self) -> Option<&str> {
        self.attribute_value.as_str()
    }

    fn name_or_oid(&self) -> String {
        self.oid_name()
            .map_or_else(|| self.attribute_type.to_string(), str::to_string)
    }
}

impl OidName for AttributeTypeAndValue {
    fn oid_name(&self) -> Option<&'static str> {
        name_of(ATTRIBUTE_TYPES, &self.attribute_type)
    }
}

impl fmt::Display for AttributeTypeAndValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.name_or_oid())?;
        match self.value_str() {
            Some(value) => {
                for c in value.chars() {
                    if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';') {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
            None => write!(f, "{}", self.attribute_value),
        }
    }
}

impl Serialize for AttributeTypeAndValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AttributeTypeAndValue", 2)?;
        state.serialize_field("attribute_type", &self.name_or_oid())?;
        match self.value_str() {
            Some(value) => state.serialize_field("attribute_value", value)?,
            None => state.serialize_field("attribute_value", &self.attribute_value.to_string())?,
        }
        state.end()
    }
}

impl DecodableFrom<Element> for AttributeTypeAndValue {}

impl Decoder<Element, AttributeTypeAndValue> for Element {
    type Error = asn1::Error;

    fn decode(&self) -> Result<AttributeTypeAndValue, Self::Error> {
        let seq = self.as_sequence()?;
        let [attribute_type, attribute_value] = seq else {
            return Err(asn1::Error::InvalidElementCount {
                what: "AttributeTypeAndValue",
                expected: 2,
                actual: seq.len(),
            });
        };

        Ok(AttributeTypeAndValue {
            attribute_type: attribute_type.as_oid()?.clone(),
            attribute_value: attribute_value.clone(),
        })
    }
}

impl EncodableTo<AttributeTypeAndValue> for Element {}

impl Encoder<AttributeTypeAndValue, Element> for AttributeTypeAndValue {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Sequence(vec![
            Element::ObjectIdentifier(self.attribute_type.clone()),
            self.attribute_value.clone(),
        ]))
    }
}
