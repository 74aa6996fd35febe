use asn1::schema::{Extensibility, Field, Schema};
use asn1::{Element, Integer, OctetString};
use ber::Tag;
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use super::error::{Error, Kind};
use super::general_name::{GeneralNames, decode_general_names, encode_general_names};
use super::{Extension, ExtensionValue, element_value, value_element};

/*
RFC 5280 Section 4.2.1.1
AuthorityKeyIdentifier ::= SEQUENCE {
    keyIdentifier             [0] KeyIdentifier           OPTIONAL,
    authorityCertIssuer       [1] GeneralNames            OPTIONAL,
    authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL
}

KeyIdentifier ::= OCTET STRING
*/

const TYPE_KEY_IDENTIFIER: Tag = Tag::context(0);
const TYPE_AUTHORITY_CERT_ISSUER: Tag = Tag::context_constructed(1);
const TYPE_AUTHORITY_CERT_SERIAL_NUMBER: Tag = Tag::context(2);

static AUTHORITY_KEY_IDENTIFIER: Schema = Schema::new(
    "AuthorityKeyIdentifier",
    &[],
    &[
        Field::optional("keyIdentifier", TYPE_KEY_IDENTIFIER),
        Field::optional("authorityCertIssuer", TYPE_AUTHORITY_CERT_ISSUER),
        Field::optional("authorityCertSerialNumber", TYPE_AUTHORITY_CERT_SERIAL_NUMBER),
    ],
    Extensibility::Closed,
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Option<OctetString>,
    pub authority_cert_issuer: Option<GeneralNames>,
    pub authority_cert_serial_number: Option<Integer>,
}

impl AuthorityKeyIdentifier {
    pub fn with_key_identifier(key_identifier: impl Into<OctetString>) -> Self {
        Self {
            key_identifier: Some(key_identifier.into()),
            ..Self::default()
        }
    }
}

impl Extension for AuthorityKeyIdentifier {
    const OID: &'static str = "2.5.29.35";
    const NAME: &'static str = "authorityKeyIdentifier";

    fn parse(value: &OctetString) -> Result<Self, Error> {
        value_element(Kind::AuthorityKeyIdentifier, value)?.decode()
    }

    fn to_value(&self) -> Result<OctetString, Error> {
        element_value(Kind::AuthorityKeyIdentifier, &self.encode()?)
    }

    fn from_extension_value(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::AuthorityKeyIdentifier(aki) => Some(aki),
            _ => None,
        }
    }

    fn into_extension_value(self) -> ExtensionValue {
        ExtensionValue::AuthorityKeyIdentifier(self)
    }
}

impl DecodableFrom<Element> for AuthorityKeyIdentifier {}

impl Decoder<Element, AuthorityKeyIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AuthorityKeyIdentifier, Self::Error> {
        let asn1_err = Kind::AuthorityKeyIdentifier.asn1();
        let fields = self
            .as_sequence()
            .and_then(|elements| AUTHORITY_KEY_IDENTIFIER.decode(elements))
            .map_err(&asn1_err)?;

        let key_identifier = fields
            .optional(TYPE_KEY_IDENTIFIER)
            .map(|e| e.decode_as::<OctetString>(TYPE_KEY_IDENTIFIER))
            .transpose()
            .map_err(&asn1_err)?;
        let authority_cert_issuer = fields
            .optional(TYPE_AUTHORITY_CERT_ISSUER)
            .map(|e| {
                let names = e
                    .constructed_children(TYPE_AUTHORITY_CERT_ISSUER)
                    .map_err(&asn1_err)?;
                decode_general_names(Kind::AuthorityKeyIdentifier, names)
            })
            .transpose()?;
        let authority_cert_serial_number = fields
            .optional(TYPE_AUTHORITY_CERT_SERIAL_NUMBER)
            .map(|e| e.decode_as::<Integer>(TYPE_AUTHORITY_CERT_SERIAL_NUMBER))
            .transpose()
            .map_err(&asn1_err)?;

        Ok(AuthorityKeyIdentifier {
            key_identifier,
            authority_cert_issuer,
            authority_cert_serial_number,
        })
    }
}

impl EncodableTo<AuthorityKeyIdentifier> for Element {}

impl Encoder<AuthorityKeyIdentifier, Element> for AuthorityKeyIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let asn1_err = Kind::AuthorityKeyIdentifier.asn1();
        let key_identifier = self
            .key_identifier
            .as_ref()
            .map(|id| Element::implicit(id, TYPE_KEY_IDENTIFIER))
            .transpose()
            .map_err(&asn1_err)?;
        let authority_cert_issuer = self
            .authority_cert_issuer
            .as_deref()
            .map(encode_general_names)
            .transpose()?
            .map(|names| Element::implicit_constructed(TYPE_AUTHORITY_CERT_ISSUER, names));
        let authority_cert_serial_number = self
            .authority_cert_serial_number
            .as_ref()
            .map(|serial| Element::implicit(serial, TYPE_AUTHORITY_CERT_SERIAL_NUMBER))
            .transpose()
            .map_err(&asn1_err)?;

        let children = AUTHORITY_KEY_IDENTIFIER
            .encoder()
            .optional(TYPE_KEY_IDENTIFIER, key_identifier)
            .optional(TYPE_AUTHORITY_CERT_ISSUER, authority_cert_issuer)
            .optional(TYPE_AUTHORITY_CERT_SERIAL_NUMBER, authority_cert_serial_number)
            .finish()
            .map_err(&asn1_err)?;
        Ok(Element::Sequence(children))
    }
}

#[cfg(test)]
mod tests {
    use asn1::{Integer, OctetString};
    use rstest::rstest;

    use super::AuthorityKeyIdentifier;
    use crate::extensions::{Extension, GeneralName};
    use crate::name::Name;

    #[test]
    fn test_key_identifier_only() {
        let aki = AuthorityKeyIdentifier::with_key_identifier(vec![0x01, 0x02, 0x03]);
        let value = aki.to_value().unwrap();
        assert_eq!(
            value.as_bytes(),
            &[0x30, 0x05, 0x80, 0x03, 0x01, 0x02, 0x03]
        );
        assert_eq!(AuthorityKeyIdentifier::parse(&value).unwrap(), aki);
    }

    #[test]
    fn test_all_fields() {
        let aki = AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::from("authority-key-identifier")),
            authority_cert_issuer: Some(vec![GeneralName::DirectoryName(
                Name::from_attributes(&[("CN", "Root")]).unwrap(),
            )]),
            authority_cert_serial_number: Some(Integer::from(4096)),
        };
        let value = aki.to_value().unwrap();
        assert_eq!(AuthorityKeyIdentifier::parse(&value).unwrap(), aki);
    }

    #[test]
    fn test_fields_in_any_order() {
        // [2] 01, [0] 0a
        let value = OctetString::from(vec![0x30, 0x06, 0x82, 0x01, 0x01, 0x80, 0x01, 0x0a]);
        let aki = AuthorityKeyIdentifier::parse(&value).unwrap();
        assert_eq!(aki.key_identifier, Some(OctetString::from(vec![0x0a])));
        assert_eq!(aki.authority_cert_serial_number, Some(Integer::from(1)));
        assert_eq!(aki.authority_cert_issuer, None);
    }

    #[rstest]
    #[case::empty(vec![], "EmptyValue")]
    #[case::unknown_tag(vec![0x30, 0x03, 0x83, 0x01, 0x00], "UnexpectedField")]
    #[case::duplicate(vec![0x30, 0x06, 0x80, 0x01, 0x00, 0x80, 0x01, 0x00], "DuplicateField")]
    #[case::empty_issuer(vec![0x30, 0x02, 0xa1, 0x00], "EmptySequence")]
    fn test_authority_key_identifier_error(#[case] der: Vec<u8>, #[case] expected: &str) {
        let err = AuthorityKeyIdentifier::parse(&OctetString::from(der)).unwrap_err();
        assert!(format!("{:?}", err).contains(expected));
    }
}
