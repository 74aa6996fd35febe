use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use asn1::{Element, Ia5String, ObjectIdentifier, OctetString};
use ber::{Tag, TagClass};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::{Serialize, Serializer};

use super::error::{Error, Kind};
use crate::name::Name;

/*
RFC 5280 Section 4.2.1.6
GeneralName ::= CHOICE {
    otherName                 [0] OtherName,
    rfc822Name                [1] IA5String,
    dNSName                   [2] IA5String,
    x400Address               [3] ORAddress,
    directoryName             [4] Name,
    ediPartyName              [5] EDIPartyName,
    uniformResourceIdentifier [6] IA5String,
    iPAddress                 [7] OCTET STRING,
    registeredID              [8] OBJECT IDENTIFIER
}

GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
*/

const TAG_RFC822_NAME: Tag = Tag::context(1);
const TAG_DNS_NAME: Tag = Tag::context(2);
const TAG_URI: Tag = Tag::context(6);
const TAG_IP_ADDRESS: Tag = Tag::context(7);
const TAG_REGISTERED_ID: Tag = Tag::context(8);

/// otherName, x400Address and ediPartyName keep the children of their
/// implicitly tagged SEQUENCE unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GeneralName {
    OtherName(#[serde(serialize_with = "serialize_der")] Vec<Element>),
    Rfc822Name(String),
    DnsName(String),
    X400Address(#[serde(serialize_with = "serialize_der")] Vec<Element>),
    DirectoryName(Name),
    EdiPartyName(#[serde(serialize_with = "serialize_der")] Vec<Element>),
    Uri(String),
    IpAddress(IpAddr),
    RegisteredId(ObjectIdentifier),
}

pub type GeneralNames = Vec<GeneralName>;

impl GeneralName {
    pub fn dns_name(name: impl Into<String>) -> Self {
        GeneralName::DnsName(name.into())
    }
}

impl fmt::Display for GeneralName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralName::OtherName(_) => write!(f, "otherName:<unsupported>"),
            GeneralName::Rfc822Name(email) => write!(f, "email:{}", email),
            GeneralName::DnsName(dns) => write!(f, "DNS:{}", dns),
            GeneralName::X400Address(_) => write!(f, "X400Name:<unsupported>"),
            GeneralName::DirectoryName(name) => write!(f, "DirName:{}", name),
            GeneralName::EdiPartyName(_) => write!(f, "EdiPartyName:<unsupported>"),
            GeneralName::Uri(uri) => write!(f, "URI:{}", uri),
            GeneralName::IpAddress(ip) => write!(f, "IP:{}", ip),
            GeneralName::RegisteredId(oid) => write!(f, "RID:{}", oid),
        }
    }
}

fn serialize_der<S: Serializer>(elements: &[Element], serializer: S) -> Result<S::Ok, S::Error> {
    let mut der = Vec::new();
    for element in elements {
        der.extend(element.to_der().map_err(serde::ser::Error::custom)?);
    }
    OctetString::from(der).serialize(serializer)
}

fn ia5(element: &Element, tag: Tag) -> Result<String, Error> {
    element
        .decode_as::<Ia5String>(tag)
        .map(|s| s.0)
        .map_err(Kind::GeneralName.asn1())
}

fn constructed(element: &Element, number: u32) -> Result<Vec<Element>, Error> {
    element
        .constructed_children(Tag::context_constructed(number))
        .map(<[Element]>::to_vec)
        .map_err(Kind::GeneralName.asn1())
}

impl DecodableFrom<Element> for GeneralName {}

impl Decoder<Element, GeneralName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<GeneralName, Self::Error> {
        let tag = self.tag();
        if tag.class() != TagClass::ContextSpecific {
            return Err(Error::UnknownGeneralNameTag(tag));
        }
        match tag.number() {
            0 => constructed(self, 0).map(GeneralName::OtherName),
            1 => ia5(self, TAG_RFC822_NAME).map(GeneralName::Rfc822Name),
            2 => ia5(self, TAG_DNS_NAME).map(GeneralName::DnsName),
            3 => constructed(self, 3).map(GeneralName::X400Address),
            4 => {
                // EXPLICIT, since Name is a CHOICE
                let name: Name = self
                    .explicit_inner(4)
                    .and_then(|inner| inner.decode())
                    .map_err(Kind::GeneralName.asn1())?;
                Ok(GeneralName::DirectoryName(name))
            }
            5 => constructed(self, 5).map(GeneralName::EdiPartyName),
            6 => ia5(self, TAG_URI).map(GeneralName::Uri),
            7 => {
                let octets: OctetString = self
                    .decode_as(TAG_IP_ADDRESS)
                    .map_err(Kind::GeneralName.asn1())?;
                let address = match octets.as_bytes() {
                    bytes if bytes.len() == 4 => {
                        let mut v4 = [0u8; 4];
                        v4.copy_from_slice(bytes);
                        IpAddr::V4(Ipv4Addr::from(v4))
                    }
                    bytes if bytes.len() == 16 => {
                        let mut v6 = [0u8; 16];
                        v6.copy_from_slice(bytes);
                        IpAddr::V6(Ipv6Addr::from(v6))
                    }
                    bytes => return Err(Error::InvalidIpAddressLength(bytes.len())),
                };
                Ok(GeneralName::IpAddress(address))
            }
            8 => self
                .decode_as(TAG_REGISTERED_ID)
                .map(GeneralName::RegisteredId)
                .map_err(Kind::GeneralName.asn1()),
            _ => Err(Error::UnknownGeneralNameTag(tag)),
        }
    }
}

impl EncodableTo<GeneralName> for Element {}

impl Encoder<GeneralName, Element> for GeneralName {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let implicit_ia5 = |value: &str, tag: Tag| {
            Element::implicit(&Ia5String(value.to_string()), tag).map_err(Kind::GeneralName.asn1())
        };
        match self {
            GeneralName::OtherName(children) => Ok(Element::implicit_constructed(
                Tag::context_constructed(0),
                children.clone(),
            )),
            GeneralName::Rfc822Name(email) => implicit_ia5(email, TAG_RFC822_NAME),
            GeneralName::DnsName(dns) => implicit_ia5(dns, TAG_DNS_NAME),
            GeneralName::X400Address(children) => Ok(Element::implicit_constructed(
                Tag::context_constructed(3),
                children.clone(),
            )),
            GeneralName::DirectoryName(name) => {
                let inner = name.encode().map_err(Kind::GeneralName.asn1())?;
                Ok(Element::explicit(4, inner))
            }
            GeneralName::EdiPartyName(children) => Ok(Element::implicit_constructed(
                Tag::context_constructed(5),
                children.clone(),
            )),
            GeneralName::Uri(uri) => implicit_ia5(uri, TAG_URI),
            GeneralName::IpAddress(ip) => {
                let octets = match ip {
                    IpAddr::V4(v4) => OctetString::from(v4.octets().to_vec()),
                    IpAddr::V6(v6) => OctetString::from(v6.octets().to_vec()),
                };
                Element::implicit(&octets, TAG_IP_ADDRESS).map_err(Kind::GeneralName.asn1())
            }
            GeneralName::RegisteredId(oid) => {
                Element::implicit(oid, TAG_REGISTERED_ID).map_err(Kind::GeneralName.asn1())
            }
        }
    }
}

/// Reads a non-empty GeneralNames sequence. `kind` names the extension
/// in errors.
pub(crate) fn decode_general_names(
    kind: Kind,
    elements: &[Element],
) -> Result<GeneralNames, Error> {
    if elements.is_empty() {
        return Err(Error::EmptySequence(kind));
    }
    elements.iter().map(|e| e.decode()).collect()
}

pub(crate) fn encode_general_names(names: &[GeneralName]) -> Result<Vec<Element>, Error> {
    names.iter().map(|name| name.encode()).collect()
}
