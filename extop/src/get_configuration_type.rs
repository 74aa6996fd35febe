use std::fmt;
use std::str::FromStr;

use asn1::{Element, Enumerated, Integer};
use ber::Tag;
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which configuration a get configuration request asks for.
///
/// Each type has a context-specific BER type, used when it selects a CHOICE
/// alternative, and an integer value, used when it is sent as ENUMERATED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GetConfigurationType {
    /// The configuration the server is running with.
    Active,
    /// The baseline configuration for the server's current version.
    Baseline,
    /// An archived configuration from an earlier point in time.
    Archived,
}

const ALL: [GetConfigurationType; 3] = [
    GetConfigurationType::Active,
    GetConfigurationType::Baseline,
    GetConfigurationType::Archived,
];

impl GetConfigurationType {
    pub const fn ber_type(self) -> u8 {
        match self {
            GetConfigurationType::Active => 0x80,
            GetConfigurationType::Baseline => 0x81,
            GetConfigurationType::Archived => 0x82,
        }
    }

    pub const fn int_value(self) -> i32 {
        match self {
            GetConfigurationType::Active => 0,
            GetConfigurationType::Baseline => 1,
            GetConfigurationType::Archived => 2,
        }
    }

    pub fn tag(self) -> Tag {
        Tag::context(self.int_value() as u32)
    }

    pub fn for_ber_type(ber_type: u8) -> Option<Self> {
        ALL.into_iter().find(|t| t.ber_type() == ber_type)
    }

    pub fn for_int_value(int_value: i32) -> Option<Self> {
        ALL.into_iter().find(|t| t.int_value() == int_value)
    }

    pub fn for_tag(tag: Tag) -> Option<Self> {
        tag.identifier_octet().and_then(Self::for_ber_type)
    }

    pub fn name(self) -> &'static str {
        match self {
            GetConfigurationType::Active => "active",
            GetConfigurationType::Baseline => "baseline",
            GetConfigurationType::Archived => "archived",
        }
    }
}

impl fmt::Display for GetConfigurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GetConfigurationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownConfigurationType(s.to_string()))
    }
}

impl DecodableFrom<Element> for GetConfigurationType {}

impl Decoder<Element, GetConfigurationType> for Element {
    type Error = Error;

    fn decode(&self) -> Result<GetConfigurationType, Self::Error> {
        let value: Enumerated = self.as_primitive()?;
        value
            .value()
            .to_i64()
            .and_then(|v| i32::try_from(v).ok())
            .and_then(GetConfigurationType::for_int_value)
            .ok_or_else(|| Error::UnknownConfigurationType(value.value().to_string()))
    }
}

impl EncodableTo<GetConfigurationType> for Element {}

impl Encoder<GetConfigurationType, Element> for GetConfigurationType {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Enumerated(Integer::from(self.int_value())))
    }
}

#[cfg(test)]
mod tests {
    use asn1::{Element, Integer};
    use ber::Tag;
    use ldapsdk::decoder::Decoder;
    use ldapsdk::encoder::Encoder;
    use rstest::rstest;

    use super::GetConfigurationType;

    #[rstest]
    #[case(GetConfigurationType::Active, 0x80, 0, "active")]
    #[case(GetConfigurationType::Baseline, 0x81, 1, "baseline")]
    #[case(GetConfigurationType::Archived, 0x82, 2, "archived")]
    fn test_lookups(
        #[case] config_type: GetConfigurationType,
        #[case] ber_type: u8,
        #[case] int_value: i32,
        #[case] name: &str,
    ) {
        assert_eq!(config_type.ber_type(), ber_type);
        assert_eq!(config_type.int_value(), int_value);
        assert_eq!(GetConfigurationType::for_ber_type(ber_type), Some(config_type));
        assert_eq!(GetConfigurationType::for_int_value(int_value), Some(config_type));
        assert_eq!(GetConfigurationType::for_tag(config_type.tag()), Some(config_type));
        assert_eq!(config_type.to_string(), name);
        assert_eq!(name.to_uppercase().parse::<GetConfigurationType>().unwrap(), config_type);

        let element: Element = config_type.encode().unwrap();
        assert_eq!(element.to_der().unwrap(), vec![0x0a, 0x01, int_value as u8]);
        let decoded: GetConfigurationType = element.decode().unwrap();
        assert_eq!(decoded, config_type);
    }

    #[rstest]
    #[case(0x83)]
    #[case(0x00)]
    #[case(0xa0)]
    fn test_unknown_ber_type(#[case] ber_type: u8) {
        assert_eq!(GetConfigurationType::for_ber_type(ber_type), None);
    }

    #[test]
    fn test_unknown_values() {
        assert_eq!(GetConfigurationType::for_int_value(3), None);
        assert_eq!(GetConfigurationType::for_int_value(-1), None);
        assert_eq!(GetConfigurationType::for_tag(Tag::context(5)), None);
        assert!("current".parse::<GetConfigurationType>().is_err());
    }

    #[rstest]
    #[case(Element::Enumerated(Integer::from(7)), "UnknownConfigurationType")]
    #[case(Element::Integer(Integer::from(0)), "UnexpectedTag")]
    fn test_decode_error(#[case] element: Element, #[case] expected: &str) {
        let result: Result<GetConfigurationType, _> = element.decode();
        let err = result.unwrap_err();
        assert!(format!("{:?}", err).contains(expected));
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&GetConfigurationType::Baseline).unwrap();
        assert_eq!(json, "\"baseline\"");
        let back: GetConfigurationType = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(back, GetConfigurationType::Archived);
    }
}
