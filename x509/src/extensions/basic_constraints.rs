use std::fmt;

use asn1::schema::{Extensibility, Field, Schema};
use asn1::{Element, Integer, OctetString};
use ber::UniversalTag;
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use super::error::{Error, Kind};
use super::{Extension, ExtensionValue, element_value, value_element};

/*
RFC 5280 Section 4.2.1.9
BasicConstraints ::= SEQUENCE {
    cA                      BOOLEAN DEFAULT FALSE,
    pathLenConstraint       INTEGER (0..MAX) OPTIONAL
}
*/

static BASIC_CONSTRAINTS: Schema = Schema::new(
    "BasicConstraints",
    &[
        Field::defaulted("cA", UniversalTag::Boolean.tag()),
        Field::defaulted("pathLenConstraint", UniversalTag::Integer.tag()),
    ],
    &[],
    Extensibility::Closed,
);

/// Whether the subject is a CA, and how many intermediate certificates may
/// follow it in a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicConstraints {
    pub ca: bool,
    pub path_len_constraint: Option<u32>,
}

impl BasicConstraints {
    pub fn new(ca: bool, path_len_constraint: Option<u32>) -> Self {
        Self {
            ca,
            path_len_constraint,
        }
    }
}

impl Extension for BasicConstraints {
    const OID: &'static str = "2.5.29.19";
    const NAME: &'static str = "basicConstraints";

    fn parse(value: &OctetString) -> Result<Self, Error> {
        value_element(Kind::BasicConstraints, value)?.decode()
    }

    fn to_value(&self) -> Result<OctetString, Error> {
        element_value(Kind::BasicConstraints, &self.encode()?)
    }

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::BasicConstraints(bc) => Some(bc),
            _ => None,
        }
    }

    fn into_extension_value(self) -> ExtensionValue {
        ExtensionValue::BasicConstraints(self)
    }
}

impl DecodableFrom<Element> for BasicConstraints {}

impl Decoder<Element, BasicConstraints> for Element {
    type Error = Error;

    fn decode(&self) -> Result<BasicConstraints, Self::Error> {
        let fields = self
            .as_sequence()
            .and_then(|elements| BASIC_CONSTRAINTS.decode(elements))
            .map_err(Kind::BasicConstraints.asn1())?;

        let ca = fields
            .positional(0)
            .map(Element::as_bool)
            .transpose()
            .map_err(Kind::BasicConstraints.asn1())?
            .unwrap_or(false);
        let path_len_constraint = fields
            .positional(1)
            .map(|e| {
                e.as_integer()
                    .map_err(Kind::BasicConstraints.asn1())?
                    .to_u32()
                    .ok_or(Error::PathLenConstraintOutOfRange)
            })
            .transpose()?;

        Ok(BasicConstraints {
            ca,
            path_len_constraint,
        })
    }
}

impl EncodableTo<BasicConstraints> for Element {}

impl Encoder<BasicConstraints, Element> for BasicConstraints {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let ca = self.ca.then_some(Element::Boolean(true));
        let path_len = self
            .path_len_constraint
            .map(|len| Element::Integer(Integer::from(len)));

        let children = BASIC_CONSTRAINTS
            .encoder()
            .positional(ca)
            .positional(path_len)
            .finish()
            .map_err(Kind::BasicConstraints.asn1())?;
        Ok(Element::Sequence(children))
    }
}

impl fmt::Display for BasicConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.ca {
            return write!(f, "CA:FALSE");
        }
        write!(f, "CA:TRUE")?;
        if let Some(pathlen) = self.path_len_constraint {
            write!(f, ", pathlen:{}", pathlen)?;
        }
        Ok(())
    }
}
