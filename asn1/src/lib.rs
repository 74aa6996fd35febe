//! Typed ASN.1 element tree over the raw BER framing.
//!
//! UNIVERSAL elements are decoded into typed variants. Elements carrying an
//! APPLICATION, CONTEXT-SPECIFIC or PRIVATE tag are kept as
//! [`Element::Tagged`]: their children are decoded when constructed, their
//! content is kept raw when primitive, and the schema that owns the field
//! decides how to read it (see [`schema`] and [`Element::decode_as`]).

use std::fmt::Display;

use ber::{Ber, Tag, TagClass, Tlv, UniversalTag};
use chrono::NaiveDateTime;
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};

mod bit_string;
pub mod error;
mod integer;
mod octet_string;
mod oid;
pub mod primitive;
pub mod schema;
mod time;

pub use bit_string::BitString;
pub use error::Error;
pub use integer::Integer;
pub use octet_string::OctetString;
pub use oid::{AsOid, ObjectIdentifier};
pub use primitive::{
    Enumerated, Ia5String, Null, Primitive, PrintableString, Utf8String, decode_constructed,
    encode_constructed,
};
pub use time::{GeneralizedTime, UtcTime};

/// Deepest nesting accepted when building an element tree.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

impl DecodableFrom<Ber> for ASN1Object {}

impl Decoder<Ber, ASN1Object> for Ber {
    type Error = Error;

    fn decode(&self) -> Result<ASN1Object, Self::Error> {
        let elements = self
            .elements()
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Ber {}

impl Encoder<ASN1Object, Ber> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Ber, Self::Error> {
        let tlvs = self
            .elements
            .iter()
            .map(Tlv::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Ber::new(tlvs))
    }
}

/// Reads the content of an OCTET STRING as a run of encoded elements, as
/// extension values and extended operation values are carried.
impl TryFrom<&OctetString> for ASN1Object {
    type Error = Error;

    fn try_from(value: &OctetString) -> Result<Self, Self::Error> {
        let ber: Ber = value.as_bytes().decode()?;
        ber.decode()
    }
}

/// Content of a non-UNIVERSAL element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedValue {
    Primitive(Vec<u8>),
    Constructed(Vec<Element>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    Enumerated(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    UTF8String(String),
    PrintableString(String),
    IA5String(String),
    UTCTime(NaiveDateTime),
    GeneralizedTime(NaiveDateTime),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    Tagged { tag: Tag, value: TaggedValue },
    /// UNIVERSAL types without a typed variant (TeletexString, BMPString, ...)
    /// are carried through unchanged.
    Unimplemented(Tlv),
}

impl Element {
    pub fn tag(&self) -> Tag {
        let universal = match self {
            Element::Boolean(_) => UniversalTag::Boolean,
            Element::Integer(_) => UniversalTag::Integer,
            Element::Enumerated(_) => UniversalTag::Enumerated,
            Element::BitString(_) => UniversalTag::BitString,
            Element::OctetString(_) => UniversalTag::OctetString,
            Element::Null => UniversalTag::Null,
            Element::ObjectIdentifier(_) => UniversalTag::ObjectIdentifier,
            Element::UTF8String(_) => UniversalTag::UTF8String,
            Element::PrintableString(_) => UniversalTag::PrintableString,
            Element::IA5String(_) => UniversalTag::IA5String,
            Element::UTCTime(_) => UniversalTag::UTCTime,
            Element::GeneralizedTime(_) => UniversalTag::GeneralizedTime,
            Element::Sequence(_) => UniversalTag::Sequence,
            Element::Set(_) => UniversalTag::Set,
            Element::Tagged { tag, .. } => return *tag,
            Element::Unimplemented(tlv) => return tlv.tag(),
        };
        universal.tag()
    }

    /// Decodes exactly one element from `bytes`; trailing bytes are an error.
    pub fn from_ber(bytes: &[u8]) -> Result<Element, Error> {
        let tlv = ber::decode_single(bytes)?;
        Element::try_from(&tlv)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(Tlv::try_from(self)?.to_bytes())
    }

    /// Wraps `inner` in a constructed `[number]` tag (EXPLICIT tagging).
    pub fn explicit(number: u32, inner: Element) -> Element {
        Element::Tagged {
            tag: Tag::context_constructed(number),
            value: TaggedValue::Constructed(vec![inner]),
        }
    }

    /// Frames a primitive value under `tag` (IMPLICIT tagging).
    pub fn implicit<T: Primitive>(value: &T, tag: Tag) -> Result<Element, Error> {
        Element::try_from(&value.encode_tlv_as(tag)?)
    }

    /// Frames `children` under a constructed `tag`, used for implicitly
    /// tagged SEQUENCE and SET types.
    pub fn implicit_constructed(tag: Tag, children: Vec<Element>) -> Element {
        let tag = tag.with_constructed(true);
        match tag {
            t if t == UniversalTag::Sequence.tag() => Element::Sequence(children),
            t if t == UniversalTag::Set.tag() => Element::Set(children),
            _ => Element::Tagged {
                tag,
                value: TaggedValue::Constructed(children),
            },
        }
    }

    /// Reads this element as primitive `T` framed under `tag`.
    pub fn decode_as<T: Primitive>(&self, tag: Tag) -> Result<T, Error> {
        T::decode_tlv_as(&Tlv::try_from(self)?, tag)
    }

    /// Reads this element as primitive `T` under its UNIVERSAL tag.
    pub fn as_primitive<T: Primitive>(&self) -> Result<T, Error> {
        self.decode_as(T::TAG.tag())
    }

    /// The single child of a constructed `[number]` wrapper.
    pub fn explicit_inner(&self, number: u32) -> Result<&Element, Error> {
        let children = self.constructed_children(Tag::context_constructed(number))?;
        match children {
            [inner] => Ok(inner),
            _ => Err(Error::InvalidElementCount {
                what: "EXPLICIT tag",
                expected: 1,
                actual: children.len(),
            }),
        }
    }

    /// Children of a SEQUENCE, SET or implicitly tagged constructed element
    /// whose tag equals `tag`.
    pub fn constructed_children(&self, tag: Tag) -> Result<&[Element], Error> {
        match self {
            Element::Sequence(children) | Element::Set(children) if self.tag() == tag => {
                Ok(children)
            }
            Element::Tagged {
                tag: actual,
                value: TaggedValue::Constructed(children),
            } if *actual == tag => Ok(children),
            _ => Err(Error::UnexpectedTag {
                expected: tag,
                actual: self.tag(),
            }),
        }
    }

    pub fn as_sequence(&self) -> Result<&[Element], Error> {
        match self {
            Element::Sequence(children) => Ok(children),
            _ => Err(self.unexpected("SEQUENCE")),
        }
    }

    pub fn as_set(&self) -> Result<&[Element], Error> {
        match self {
            Element::Set(children) => Ok(children),
            _ => Err(self.unexpected("SET")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Element::Boolean(b) => Ok(*b),
            _ => Err(self.unexpected("BOOLEAN")),
        }
    }

    pub fn as_integer(&self) -> Result<&Integer, Error> {
        match self {
            Element::Integer(i) => Ok(i),
            _ => Err(self.unexpected("INTEGER")),
        }
    }

    pub fn as_bit_string(&self) -> Result<&BitString, Error> {
        match self {
            Element::BitString(b) => Ok(b),
            _ => Err(self.unexpected("BIT STRING")),
        }
    }

    pub fn as_octet_string(&self) -> Result<&OctetString, Error> {
        match self {
            Element::OctetString(o) => Ok(o),
            _ => Err(self.unexpected("OCTET STRING")),
        }
    }

    pub fn as_oid(&self) -> Result<&ObjectIdentifier, Error> {
        match self {
            Element::ObjectIdentifier(oid) => Ok(oid),
            _ => Err(self.unexpected("OBJECT IDENTIFIER")),
        }
    }

    /// Text of any of the typed character string variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::UTF8String(s) | Element::PrintableString(s) | Element::IA5String(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    fn unexpected(&self, expected: &'static str) -> Error {
        Error::UnexpectedElement {
            expected,
            actual: self.tag(),
        }
    }

    fn from_tlv(tlv: &Tlv, depth: usize) -> Result<Element, Error> {
        if depth > MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }
        let tag = tlv.tag();
        if tag.class() != TagClass::Universal {
            let value = if tag.is_constructed() {
                TaggedValue::Constructed(Self::children_of(tlv, depth)?)
            } else {
                TaggedValue::Primitive(tlv.value().to_vec())
            };
            return Ok(Element::Tagged { tag, value });
        }

        let Some(universal) = UniversalTag::from_number(tag.number()) else {
            return Ok(Element::Unimplemented(tlv.clone()));
        };
        // constructed string forms (valid BER) are not supported
        if tag != universal.tag() {
            return Err(Error::UnexpectedTag {
                expected: universal.tag(),
                actual: tag,
            });
        }

        let content = tlv.value();
        let element = match universal {
            UniversalTag::Boolean => Element::Boolean(bool::decode_content(content)?),
            UniversalTag::Integer => Element::Integer(Integer::decode_content(content)?),
            UniversalTag::Enumerated => {
                Element::Enumerated(Enumerated::decode_content(content)?.into_inner())
            }
            UniversalTag::BitString => Element::BitString(BitString::decode_content(content)?),
            UniversalTag::OctetString => {
                Element::OctetString(OctetString::decode_content(content)?)
            }
            UniversalTag::Null => {
                Null::decode_content(content)?;
                Element::Null
            }
            UniversalTag::ObjectIdentifier => {
                Element::ObjectIdentifier(ObjectIdentifier::decode_content(content)?)
            }
            UniversalTag::UTF8String => Element::UTF8String(Utf8String::decode_content(content)?.0),
            UniversalTag::PrintableString => {
                Element::PrintableString(PrintableString::decode_content(content)?.0)
            }
            UniversalTag::IA5String => Element::IA5String(Ia5String::decode_content(content)?.0),
            UniversalTag::UTCTime => Element::UTCTime(UtcTime::decode_content(content)?.0),
            UniversalTag::GeneralizedTime => {
                Element::GeneralizedTime(GeneralizedTime::decode_content(content)?.0)
            }
            UniversalTag::Sequence => Element::Sequence(Self::children_of(tlv, depth)?),
            UniversalTag::Set => Element::Set(Self::children_of(tlv, depth)?),
        };
        Ok(element)
    }

    fn children_of(tlv: &Tlv, depth: usize) -> Result<Vec<Element>, Error> {
        tlv.children()?
            .iter()
            .map(|child| Element::from_tlv(child, depth + 1))
            .collect()
    }
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        Element::from_tlv(tlv, 0)
    }
}

impl DecodableFrom<Tlv> for Element {}

impl Decoder<Tlv, Element> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<Element, Self::Error> {
        Element::try_from(self)
    }
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self, Self::Error> {
        let tlv = match element {
            Element::Boolean(b) => b.encode_tlv()?,
            Element::Integer(i) => i.encode_tlv()?,
            Element::Enumerated(i) => {
                Tlv::new(UniversalTag::Enumerated.tag(), i.encode_content()?)
            }
            Element::BitString(b) => b.encode_tlv()?,
            Element::OctetString(o) => o.encode_tlv()?,
            Element::Null => Null.encode_tlv()?,
            Element::ObjectIdentifier(oid) => oid.encode_tlv()?,
            Element::UTF8String(s) => Tlv::new(UniversalTag::UTF8String.tag(), s.as_bytes().to_vec()),
            Element::PrintableString(s) => {
                Tlv::new(UniversalTag::PrintableString.tag(), s.as_bytes().to_vec())
            }
            Element::IA5String(s) => Tlv::new(UniversalTag::IA5String.tag(), s.as_bytes().to_vec()),
            Element::UTCTime(t) => UtcTime(*t).encode_tlv()?,
            Element::GeneralizedTime(t) => GeneralizedTime(*t).encode_tlv()?,
            Element::Sequence(children) => {
                Tlv::constructed(UniversalTag::Sequence.tag(), &encode_children(children)?)
            }
            Element::Set(children) => {
                Tlv::constructed(UniversalTag::Set.tag(), &encode_children(children)?)
            }
            Element::Tagged { tag, value } => match value {
                TaggedValue::Primitive(content) => Tlv::new(*tag, content.clone()),
                TaggedValue::Constructed(children) => {
                    Tlv::constructed(*tag, &encode_children(children)?)
                }
            },
            Element::Unimplemented(tlv) => tlv.clone(),
        };
        Ok(tlv)
    }
}

fn encode_children(children: &[Element]) -> Result<Vec<Tlv>, Error> {
    children.iter().map(Tlv::try_from).collect()
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        Tlv::try_from(self)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "Boolean({})", b),
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::Enumerated(i) => write!(f, "Enumerated({})", i),
            Element::BitString(bs) => write!(f, "BitString({})", bs),
            Element::OctetString(os) => write!(f, "OctetString({})", os),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::UTF8String(s) => write!(f, "UTF8String({})", s),
            Element::PrintableString(s) => write!(f, "PrintableString({})", s),
            Element::IA5String(s) => write!(f, "IA5String({})", s),
            Element::UTCTime(dt) => write!(f, "UTCTime({})", dt),
            Element::GeneralizedTime(dt) => write!(f, "GeneralizedTime({})", dt),
            Element::Sequence(children) => write!(f, "Sequence({} elements)", children.len()),
            Element::Set(children) => write!(f, "Set({} elements)", children.len()),
            Element::Tagged { tag, value } => match value {
                TaggedValue::Primitive(content) => {
                    write!(f, "Tagged({}, {} bytes)", tag, content.len())
                }
                TaggedValue::Constructed(children) => {
                    write!(f, "Tagged({}, {} elements)", tag, children.len())
                }
            },
            Element::Unimplemented(tlv) => write!(f, "Unimplemented({})", tlv.tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use ber::{Ber, Tag, Tlv, UniversalTag};
    use chrono::NaiveDate;
    use ldapsdk::decoder::Decoder;
    use ldapsdk::encoder::Encoder;
    use rstest::rstest;

    use super::*;

    #[rstest(input, expected,
        case(vec![0x01, 0x01, 0xff], Element::Boolean(true)),
        case(vec![0x02, 0x01, 0x07], Element::Integer(Integer::from(7))),
        case(vec![0x0a, 0x01, 0x01], Element::Enumerated(Integer::from(1))),
        case(vec![0x05, 0x00], Element::Null),
        case(vec![0x04, 0x02, 0x68, 0x69], Element::OctetString(OctetString::from(b"hi".as_slice()))),
        case(vec![0x13, 0x02, 0x68, 0x69], Element::PrintableString("hi".to_string())),
        case(vec![0x16, 0x02, 0x68, 0x69], Element::IA5String("hi".to_string())),
        case(vec![0x0c, 0x04, 0xf0, 0x9f, 0x98, 0x8e], Element::UTF8String("\u{1f60e}".to_string())),
        case(vec![0x06, 0x03, 0x55, 0x1d, 0x13], Element::ObjectIdentifier(ObjectIdentifier::from_str("2.5.29.19").unwrap())),
        case(vec![0x03, 0x02, 0x07, 0x80], Element::BitString(BitString::from_bits(&[true]))),
        case(
            vec![0x17, 0x0d, 0x31, 0x39, 0x31, 0x32, 0x31, 0x35, 0x31, 0x39, 0x30, 0x32, 0x31, 0x30, 0x5a],
            Element::UTCTime(NaiveDate::from_ymd_opt(2019, 12, 15).unwrap().and_hms_opt(19, 2, 10).unwrap()),
        ),
        case(vec![0x80, 0x02, 0x61, 0x62], Element::Tagged { tag: Tag::context(0), value: TaggedValue::Primitive(b"ab".to_vec()) }),
        case(vec![0x1e, 0x02, 0x00, 0x41], Element::Unimplemented(Tlv::new(Tag::universal(0x1e, false), vec![0x00, 0x41]))),
    )]
    fn test_decode_element(input: Vec<u8>, expected: Element) {
        let element = Element::from_ber(&input).unwrap();
        assert_eq!(element, expected);
        assert_eq!(element.to_der().unwrap(), input);
    }

    #[test]
    fn test_decode_nested() {
        // SEQUENCE { INTEGER 7, [0] { INTEGER 8 }, SET { NULL } }
        let input = vec![
            0x30, 0x0c, 0x02, 0x01, 0x07, 0xa0, 0x03, 0x02, 0x01, 0x08, 0x31, 0x02, 0x05, 0x00,
        ];
        let element = Element::from_ber(&input).unwrap();
        let children = element.as_sequence().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].as_integer().unwrap().to_i64(), Some(7));
        let inner = children[1].explicit_inner(0).unwrap();
        assert_eq!(inner.as_integer().unwrap().to_i64(), Some(8));
        assert_eq!(children[2].as_set().unwrap(), &[Element::Null]);
        assert_eq!(element.to_der().unwrap(), input);
    }

    #[rstest]
    #[case::constructed_octet_string(vec![0x24, 0x03, 0x04, 0x01, 0x00], "UnexpectedTag")]
    #[case::primitive_sequence(vec![0x10, 0x00], "UnexpectedTag")]
    #[case::bad_boolean(vec![0x01, 0x01, 0x01], "InvalidBoolean")]
    #[case::bad_oid(vec![0x30, 0x03, 0x06, 0x01, 0x86], "ObjectIdentifierIncompleteEncoding")]
    #[case::trailing(vec![0x05, 0x00, 0x05, 0x00], "TrailingData")]
    #[case::truncated_child(vec![0x30, 0x02, 0x04, 0x05], "Truncated")]
    fn test_decode_element_error(#[case] input: Vec<u8>, #[case] expected: &str) {
        let err = Element::from_ber(&input).unwrap_err();
        assert!(
            format!("{:?}", err).contains(expected),
            "expected {expected}, got {err:?}"
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut bytes = vec![0x05, 0x00];
        for _ in 0..=MAX_DEPTH {
            let mut wrapped = vec![0x30];
            wrapped.extend(ber::encode_length(bytes.len()));
            wrapped.extend(bytes);
            bytes = wrapped;
        }
        let err = Element::from_ber(&bytes).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_implicit_and_explicit() {
        let element = Element::implicit(&OctetString::from("otp"), Tag::context(2)).unwrap();
        assert_eq!(element.to_der().unwrap(), vec![0x82, 0x03, b'o', b't', b'p']);
        let value: OctetString = element.decode_as(Tag::context(2)).unwrap();
        assert_eq!(value.as_utf8().unwrap(), "otp");

        let explicit = Element::explicit(0, Element::Integer(Integer::from(2)));
        assert_eq!(explicit.to_der().unwrap(), vec![0xa0, 0x03, 0x02, 0x01, 0x02]);
        assert_eq!(explicit.explicit_inner(0).unwrap(), &Element::Integer(Integer::from(2)));
        assert!(explicit.explicit_inner(1).is_err());
    }

    #[test]
    fn test_implicit_constructed() {
        let element = Element::implicit_constructed(
            Tag::context(1),
            vec![Element::Null],
        );
        assert_eq!(element.tag(), Tag::context_constructed(1));
        assert_eq!(
            element.constructed_children(Tag::context_constructed(1)).unwrap(),
            &[Element::Null]
        );
        let seq = Element::implicit_constructed(UniversalTag::Sequence.tag(), vec![]);
        assert_eq!(seq, Element::Sequence(vec![]));
    }

    #[test]
    fn test_explicit_with_two_children_is_error() {
        let element = Element::Tagged {
            tag: Tag::context_constructed(0),
            value: TaggedValue::Constructed(vec![Element::Null, Element::Null]),
        };
        let err = element.explicit_inner(0).unwrap_err();
        assert!(format!("{:?}", err).contains("InvalidElementCount"));
    }

    #[test]
    fn test_typed_getter_mismatch() {
        let err = Element::Null.as_integer().unwrap_err();
        assert!(format!("{:?}", err).contains("UnexpectedElement"));
    }

    #[test]
    fn test_asn1_object_decoder_and_encoder() {
        let bytes = vec![0x02, 0x01, 0x01, 0x30, 0x03, 0x01, 0x01, 0x00];
        let ber: Ber = bytes.decode().unwrap();
        let object: ASN1Object = ber.decode().unwrap();
        assert_eq!(object.elements().len(), 2);

        let ber: Ber = object.encode().unwrap();
        let encoded: Vec<u8> = ber.encode().unwrap();
        assert_eq!(encoded, bytes);
    }

    #[test]
    fn test_asn1_object_from_octet_string() {
        let value = OctetString::from(vec![0x30, 0x03, 0x01, 0x01, 0xff]);
        let object = ASN1Object::try_from(&value).unwrap();
        assert_eq!(
            object.elements(),
            &[Element::Sequence(vec![Element::Boolean(true)])]
        );
    }
}
