use asn1::schema::{Extensibility, Field, Schema};
use asn1::{BitString, Element, OctetString};
use ber::Tag;
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use super::error::{Error, Kind};
use super::general_name::{GeneralNames, decode_general_names, encode_general_names};
use super::{Extension, ExtensionValue, element_value, value_element};
use crate::name::{AttributeTypeAndValue, RelativeDistinguishedName};

/*
RFC 5280 Section 4.2.1.13
CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint

DistributionPoint ::= SEQUENCE {
    distributionPoint       [0]     DistributionPointName OPTIONAL,
    reasons                 [1]     ReasonFlags OPTIONAL,
    cRLIssuer               [2]     GeneralNames OPTIONAL
}

DistributionPointName ::= CHOICE {
    fullName                [0]     GeneralNames,
    nameRelativeToCRLIssuer [1]     RelativeDistinguishedName
}

ReasonFlags ::= BIT STRING {
    unused                  (0),
    keyCompromise           (1),
    cACompromise            (2),
    affiliationChanged      (3),
    superseded              (4),
    cessationOfOperation    (5),
    certificateHold         (6),
    privilegeWithdrawn      (7),
    aACompromise            (8)
}
*/

const TYPE_DISTRIBUTION_POINT: Tag = Tag::context_constructed(0);
const TYPE_REASONS: Tag = Tag::context(1);
const TYPE_CRL_ISSUER: Tag = Tag::context_constructed(2);

const TYPE_FULL_NAME: Tag = Tag::context_constructed(0);
const TYPE_NAME_RELATIVE_TO_CRL_ISSUER: Tag = Tag::context_constructed(1);

static DISTRIBUTION_POINT: Schema = Schema::new(
    "DistributionPoint",
    &[],
    &[
        Field::optional("distributionPoint", TYPE_DISTRIBUTION_POINT),
        Field::optional("reasons", TYPE_REASONS),
        Field::optional("cRLIssuer", TYPE_CRL_ISSUER),
    ],
    Extensibility::Closed,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CRLDistributionPoints {
    pub distribution_points: Vec<DistributionPoint>,
}

impl CRLDistributionPoints {
    pub fn new(distribution_points: Vec<DistributionPoint>) -> Self {
        Self {
            distribution_points,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub reasons: Option<ReasonFlags>,
    pub crl_issuer: Option<GeneralNames>,
}

impl DistributionPoint {
    /// A distribution point named by its full name only.
    pub fn full_name(names: GeneralNames) -> Self {
        Self {
            distribution_point: Some(DistributionPointName::FullName(names)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DistributionPointName {
    FullName(GeneralNames),
    NameRelativeToCRLIssuer(RelativeDistinguishedName),
}

/// Revocation reasons covered by a distribution point. Bit 0 is unused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReasonFlags {
    pub key_compromise: bool,
    pub ca_compromise: bool,
    pub affiliation_changed: bool,
    pub superseded: bool,
    pub cessation_of_operation: bool,
    pub certificate_hold: bool,
    pub privilege_withdrawn: bool,
    pub aa_compromise: bool,
}

impl ReasonFlags {
    fn from_bits(bits: &BitString) -> Self {
        Self {
            key_compromise: bits.bit(1),
            ca_compromise: bits.bit(2),
            affiliation_changed: bits.bit(3),
            superseded: bits.bit(4),
            cessation_of_operation: bits.bit(5),
            certificate_hold: bits.bit(6),
            privilege_withdrawn: bits.bit(7),
            aa_compromise: bits.bit(8),
        }
    }

    fn to_bits(&self) -> BitString {
        BitString::from_named_bits(&[
            false,
            self.key_compromise,
            self.ca_compromise,
            self.affiliation_changed,
            self.superseded,
            self.cessation_of_operation,
            self.certificate_hold,
            self.privilege_withdrawn,
            self.aa_compromise,
        ])
    }
}

impl Extension for CRLDistributionPoints {
    const OID: &'static str = "2.5.29.31";
    const NAME: &'static str = "cRLDistributionPoints";

    fn parse(value: &OctetString) -> Result<Self, Error> {
        value_element(Kind::CRLDistributionPoints, value)?.decode()
    }

    fn to_value(&self) -> Result<OctetString, Error> {
        element_value(Kind::CRLDistributionPoints, &self.encode()?)
    }

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::CRLDistributionPoints(crldp) => Some(crldp),
            _ => None,
        }
    }

    fn into_extension_value(self) -> ExtensionValue {
        ExtensionValue::CRLDistributionPoints(self)
    }
}

impl DecodableFrom<Element> for CRLDistributionPoints {}

impl Decoder<Element, CRLDistributionPoints> for Element {
    type Error = Error;

    fn decode(&self) -> Result<CRLDistributionPoints, Self::Error> {
        let elements = self
            .as_sequence()
            .map_err(Kind::CRLDistributionPoints.asn1())?;
        if elements.is_empty() {
            return Err(Error::EmptySequence(Kind::CRLDistributionPoints));
        }
        let distribution_points = elements
            .iter()
            .map(|e| e.decode())
            .collect::<Result<Vec<DistributionPoint>, Error>>()?;
        Ok(CRLDistributionPoints {
            distribution_points,
        })
    }
}

impl EncodableTo<CRLDistributionPoints> for Element {}

impl Encoder<CRLDistributionPoints, Element> for CRLDistributionPoints {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let points = self
            .distribution_points
            .iter()
            .map(|dp| dp.encode())
            .collect::<Result<Vec<Element>, Error>>()?;
        Ok(Element::Sequence(points))
    }
}

impl DecodableFrom<Element> for DistributionPoint {}

impl Decoder<Element, DistributionPoint> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DistributionPoint, Self::Error> {
        let asn1_err = Kind::CRLDistributionPoints.asn1();
        let fields = self
            .as_sequence()
            .and_then(|elements| DISTRIBUTION_POINT.decode(elements))
            .map_err(&asn1_err)?;

        let distribution_point = fields
            .optional(TYPE_DISTRIBUTION_POINT)
            .map(|e| {
                // EXPLICIT, since DistributionPointName is a CHOICE
                let inner = e.explicit_inner(0).map_err(&asn1_err)?;
                Decoder::<Element, DistributionPointName>::decode(inner)
            })
            .transpose()?;
        let reasons = fields
            .optional(TYPE_REASONS)
            .map(|e| e.decode_as::<BitString>(TYPE_REASONS))
            .transpose()
            .map_err(&asn1_err)?
            .map(|bits| ReasonFlags::from_bits(&bits));
        let crl_issuer = fields
            .optional(TYPE_CRL_ISSUER)
            .map(|e| {
                let names = e.constructed_children(TYPE_CRL_ISSUER).map_err(&asn1_err)?;
                decode_general_names(Kind::CRLDistributionPoints, names)
            })
            .transpose()?;

        Ok(DistributionPoint {
            distribution_point,
            reasons,
            crl_issuer,
        })
    }
}

impl EncodableTo<DistributionPoint> for Element {}

impl Encoder<DistributionPoint, Element> for DistributionPoint {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let asn1_err = Kind::CRLDistributionPoints.asn1();
        let distribution_point = self
            .distribution_point
            .as_ref()
            .map(|name| name.encode())
            .transpose()?
            .map(|inner| Element::explicit(0, inner));
        let reasons = self
            .reasons
            .as_ref()
            .map(|flags| Element::implicit(&flags.to_bits(), TYPE_REASONS))
            .transpose()
            .map_err(&asn1_err)?;
        let crl_issuer = self
            .crl_issuer
            .as_deref()
            .map(encode_general_names)
            .transpose()?
            .map(|names| Element::implicit_constructed(TYPE_CRL_ISSUER, names));

        let children = DISTRIBUTION_POINT
            .encoder()
            .optional(TYPE_DISTRIBUTION_POINT, distribution_point)
            .optional(TYPE_REASONS, reasons)
            .optional(TYPE_CRL_ISSUER, crl_issuer)
            .finish()
            .map_err(&asn1_err)?;
        Ok(Element::Sequence(children))
    }
}

impl DecodableFrom<Element> for DistributionPointName {}

impl Decoder<Element, DistributionPointName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DistributionPointName, Self::Error> {
        let asn1_err = Kind::CRLDistributionPoints.asn1();
        match self.tag() {
            TYPE_FULL_NAME => {
                let names = self.constructed_children(TYPE_FULL_NAME).map_err(&asn1_err)?;
                decode_general_names(Kind::CRLDistributionPoints, names)
                    .map(DistributionPointName::FullName)
            }
            TYPE_NAME_RELATIVE_TO_CRL_ISSUER => {
                let attributes = self
                    .constructed_children(TYPE_NAME_RELATIVE_TO_CRL_ISSUER)
                    .and_then(|children| {
                        children
                            .iter()
                            .map(|e| e.decode())
                            .collect::<Result<Vec<AttributeTypeAndValue>, asn1::Error>>()
                    })
                    .map_err(&asn1_err)?;
                Ok(DistributionPointName::NameRelativeToCRLIssuer(
                    RelativeDistinguishedName::new(attributes),
                ))
            }
            actual => Err(asn1_err(asn1::Error::UnexpectedTag {
                expected: TYPE_FULL_NAME,
                actual,
            })),
        }
    }
}

impl EncodableTo<DistributionPointName> for Element {}

impl Encoder<DistributionPointName, Element> for DistributionPointName {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        match self {
            DistributionPointName::FullName(names) => Ok(Element::implicit_constructed(
                TYPE_FULL_NAME,
                encode_general_names(names)?,
            )),
            DistributionPointName::NameRelativeToCRLIssuer(rdn) => {
                let attributes = rdn
                    .attributes
                    .iter()
                    .map(|attr| attr.encode())
                    .collect::<Result<Vec<Element>, asn1::Error>>()
                    .map_err(Kind::CRLDistributionPoints.asn1())?;
                Ok(Element::implicit_constructed(
                    TYPE_NAME_RELATIVE_TO_CRL_ISSUER,
                    attributes,
                ))
            }
        }
    }
}
