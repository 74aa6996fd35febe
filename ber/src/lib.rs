//! BER element framing.
//!
//! Decoding accepts BER: short and long length forms (including non-minimal
//! long forms) and high-tag-number identifiers. The indefinite length form
//! is rejected. Encoding always emits DER: the shortest length form.

use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use nom::bytes::complete::take;
use nom::number::complete::be_u8;
use nom::{IResult, Parser};

pub mod error;
mod tag;

pub use error::Error;
pub use tag::{Tag, TagClass, UniversalTag};

use tag::{CONSTRUCTED, HIGH_TAG_NUMBER};

const LONG_FORM: u8 = 0x80;

/// A decoded run of top-level elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ber {
    elements: Vec<Tlv>,
}

impl Ber {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Tlv> {
        self.elements
    }
}

impl<'a> DecodableFrom<&'a [u8]> for Ber {}

impl<'a> Decoder<&'a [u8], Ber> for &'a [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Ber, Self::Error> {
        decode_sequence(self).map(Ber::new)
    }
}

impl DecodableFrom<Vec<u8>> for Ber {}

impl Decoder<Vec<u8>, Ber> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Ber, Self::Error> {
        decode_sequence(self).map(Ber::new)
    }
}

impl EncodableTo<Ber> for Vec<u8> {}

impl Encoder<Ber, Vec<u8>> for Ber {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.elements.iter().flat_map(Tlv::to_bytes).collect())
    }
}

/// One tag-length-value element.
///
/// The content is kept as raw bytes. Children of a constructed element are
/// decoded on demand with [`Tlv::children`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Vec<u8>,
}

impl Tlv {
    pub fn new(tag: Tag, value: Vec<u8>) -> Self {
        Self { tag, value }
    }

    /// Builds a constructed element whose content is the concatenation of
    /// `children`.
    pub fn constructed(tag: Tag, children: &[Tlv]) -> Self {
        let value = children.iter().flat_map(Tlv::to_bytes).collect();
        Self::new(tag.with_constructed(true), value)
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn children(&self) -> Result<Vec<Tlv>, Error> {
        if !self.tag.is_constructed() {
            return Err(Error::NotConstructed(self.tag));
        }
        decode_sequence(&self.value)
    }

    pub fn encoded_len(&self) -> usize {
        self.tag.to_bytes().len() + encode_length(self.value.len()).len() + self.value.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.tag.to_bytes();
        out.extend(encode_length(self.value.len()));
        out.extend_from_slice(&self.value);
        out
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], Tlv, Error> {
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        if input.len() < length {
            return Err(nom::Err::Failure(Error::Truncated {
                expected: length,
                actual: input.len(),
            }));
        }
        let (input, value) = take::<_, _, Error>(length).parse(input)?;
        Ok((input, Tlv::new(tag, value.to_vec())))
    }
}

/// Decodes one element from the front of `bytes`, returning it with the
/// number of bytes consumed.
pub fn decode_element(bytes: &[u8]) -> Result<(Tlv, usize), Error> {
    let (rest, tlv) = Tlv::parse(bytes)?;
    Ok((tlv, bytes.len() - rest.len()))
}

/// Decodes exactly one element and rejects anything after it.
pub fn decode_single(bytes: &[u8]) -> Result<Tlv, Error> {
    let (tlv, consumed) = decode_element(bytes)?;
    if consumed != bytes.len() {
        return Err(Error::TrailingData(bytes.len() - consumed));
    }
    Ok(tlv)
}

/// Decodes elements until `bytes` is exhausted.
///
/// A child whose declared length runs past the end of `bytes` is a
/// [`Error::Truncated`] error.
pub fn decode_sequence(mut bytes: &[u8]) -> Result<Vec<Tlv>, Error> {
    let mut elements = Vec::new();
    while !bytes.is_empty() {
        let (rest, tlv) = Tlv::parse(bytes)?;
        elements.push(tlv);
        bytes = rest;
    }
    Ok(elements)
}

pub fn encode(tlv: &Tlv) -> Vec<u8> {
    tlv.to_bytes()
}

/// Shortest length octets for `length`.
pub fn encode_length(length: usize) -> Vec<u8> {
    if length < usize::from(LONG_FORM) {
        return vec![length as u8];
    }
    let octets: Vec<u8> = length
        .to_be_bytes()
        .into_iter()
        .skip_while(|b| *b == 0)
        .collect();
    let mut out = Vec::with_capacity(octets.len() + 1);
    out.push(LONG_FORM | octets.len() as u8);
    out.extend(octets);
    out
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag, Error> {
    let (mut input, first) = be_u8::<_, Error>(input)?;
    let class = TagClass::from_identifier(first);
    let constructed = first & CONSTRUCTED != 0;
    let low = first & HIGH_TAG_NUMBER;
    if low != HIGH_TAG_NUMBER {
        return Ok((input, Tag::new(class, constructed, u32::from(low))));
    }

    // high-tag-number form: base-128, most significant group first
    let mut number: u32 = 0;
    loop {
        let (rest, octet) = be_u8::<_, Error>(input)?;
        input = rest;
        if number > (u32::MAX >> 7) {
            return Err(nom::Err::Failure(Error::TagNumberOverflow));
        }
        number = (number << 7) | u32::from(octet & 0x7f);
        if octet & 0x80 == 0 {
            break;
        }
    }
    Ok((input, Tag::new(class, constructed, number)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], usize, Error> {
    let (input, first) = be_u8::<_, Error>(input)?;
    if first & LONG_FORM == 0 {
        return Ok((input, usize::from(first)));
    }

    // long form: the low 7 bits count the length octets that follow
    let count = usize::from(first & !LONG_FORM);
    if count == 0 {
        return Err(nom::Err::Failure(Error::IndefiniteLength));
    }
    if count > size_of::<usize>() {
        return Err(nom::Err::Failure(Error::LengthOverflow(count)));
    }
    if input.len() < count {
        return Err(nom::Err::Failure(Error::Truncated {
            expected: count,
            actual: input.len(),
        }));
    }
    let (input, octets) = take::<_, _, Error>(count).parse(input)?;
    let length = octets
        .iter()
        .fold(0usize, |length, &b| (length << 8) | usize::from(b));
    Ok((input, length))
}

#[cfg(test)]
mod tests {
    use ldapsdk::decoder::Decoder;
    use ldapsdk::encoder::Encoder;
    use rstest::rstest;

    use super::*;

    #[rstest(input, expected,
        case(vec![0x02], Tag::universal(2, false)),
        case(vec![0x30, 0x01], UniversalTag::Sequence.tag()),
        case(vec![0x80], Tag::context(0)),
        case(vec![0xa3], Tag::context_constructed(3)),
        case(vec![0x9f, 0x1f], Tag::context(31)),
        case(vec![0xbf, 0x81, 0x00], Tag::context_constructed(128)),
    )]
    fn test_parse_tag(input: Vec<u8>, expected: Tag) {
        let (_, actual) = parse_tag(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input, expected,
        case(vec![0x02], 0x02),
        case(vec![0x7f], 0x7f),
        case(vec![0x81, 0x80], 0x80),
        case(vec![0x82, 0x02, 0x10], 256 * 0x02 + 0x10),
        case(vec![0x83, 0x01, 0x00, 0x00], 256 * 256),
        case(vec![0x82, 0x00, 0x05], 5),
    )]
    fn test_parse_length(input: Vec<u8>, expected: usize) {
        let (_, actual) = parse_length(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest]
    #[case::indefinite(vec![0x30, 0x80, 0x00, 0x00], "IndefiniteLength")]
    #[case::short_content(vec![0x04, 0x05, 0x01, 0x02], "Truncated")]
    #[case::short_length_octets(vec![0x04, 0x83, 0x01], "Truncated")]
    #[case::length_too_wide(vec![0x04, 0x89, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], "LengthOverflow")]
    #[case::empty(vec![], "UnexpectedEof")]
    #[case::tag_only(vec![0x04], "UnexpectedEof")]
    #[case::unterminated_high_tag(vec![0x1f, 0x81], "UnexpectedEof")]
    #[case::huge_tag_number(vec![0x1f, 0x8f, 0xff, 0xff, 0xff, 0xff, 0x7f, 0x00], "TagNumberOverflow")]
    fn test_decode_element_error(#[case] input: Vec<u8>, #[case] expected: &str) {
        let err = decode_element(&input).unwrap_err();
        assert!(
            format!("{:?}", err).contains(expected),
            "expected {expected}, got {err:?}"
        );
    }

    #[test]
    fn test_decode_element_reports_consumed() {
        let input = [0x04, 0x02, 0xaa, 0xbb, 0x05, 0x00];
        let (tlv, consumed) = decode_element(&input).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(tlv.tag(), UniversalTag::OctetString.tag());
        assert_eq!(tlv.value(), &[0xaa, 0xbb]);
    }

    #[test]
    fn test_decode_single_rejects_trailing_bytes() {
        let err = decode_single(&[0x05, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, Error::TrailingData(1)));
    }

    #[rstest]
    #[case(vec![0x30, 0x09, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09], 3)]
    #[case(vec![0x30, 0x00], 0)]
    #[case(vec![0xa0, 0x03, 0x02, 0x01, 0x02], 1)]
    fn test_children(#[case] input: Vec<u8>, #[case] expected: usize) {
        let tlv = decode_single(&input).unwrap();
        let children = tlv.children().unwrap();
        assert_eq!(children.len(), expected);
    }

    #[test]
    fn test_child_exceeding_parent_is_error() {
        // parent declares 3 bytes, child claims 5
        let tlv = decode_single(&[0x30, 0x03, 0x04, 0x05, 0x00]).unwrap();
        let err = tlv.children().unwrap_err();
        assert!(matches!(err, Error::Truncated { expected: 5, actual: 1 }));
    }

    #[test]
    fn test_children_of_primitive_is_error() {
        let tlv = Tlv::new(UniversalTag::OctetString.tag(), vec![]);
        assert!(matches!(tlv.children(), Err(Error::NotConstructed(_))));
    }

    #[rstest]
    #[case(0, vec![0x00])]
    #[case(127, vec![0x7f])]
    #[case(128, vec![0x81, 0x80])]
    #[case(255, vec![0x81, 0xff])]
    #[case(256, vec![0x82, 0x01, 0x00])]
    #[case(65536, vec![0x83, 0x01, 0x00, 0x00])]
    fn test_encode_length(#[case] length: usize, #[case] expected: Vec<u8>) {
        assert_eq!(encode_length(length), expected);
    }

    #[test]
    fn test_encode_uses_minimal_length() {
        // BER long form for a one byte value re-encodes in short form
        let tlv = decode_single(&[0x04, 0x82, 0x00, 0x01, 0xaa]).unwrap();
        assert_eq!(encode(&tlv), vec![0x04, 0x01, 0xaa]);
    }

    #[rstest]
    #[case(Tlv::new(Tag::context(0), b"abc".to_vec()))]
    #[case(Tlv::new(Tag::context(200), vec![0x01; 300]))]
    #[case(Tlv::constructed(UniversalTag::Sequence.tag(), &[
        Tlv::new(UniversalTag::Boolean.tag(), vec![0xff]),
        Tlv::new(Tag::application(7, false), vec![]),
    ]))]
    fn test_encode_then_decode(#[case] tlv: Tlv) {
        let bytes = encode(&tlv);
        assert_eq!(bytes.len(), tlv.encoded_len());
        let (decoded, consumed) = decode_element(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, tlv);
    }

    #[test]
    fn test_ber_decoder_and_encoder() {
        let bytes = vec![0x02, 0x01, 0x05, 0x30, 0x03, 0x01, 0x01, 0x00];
        let ber: Ber = bytes.decode().unwrap();
        assert_eq!(ber.elements().len(), 2);
        let encoded: Vec<u8> = ber.encode().unwrap();
        assert_eq!(encoded, bytes);
    }
}
