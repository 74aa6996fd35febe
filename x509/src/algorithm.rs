//! AlgorithmIdentifier and the names of the algorithms certificates use.

use asn1::{Element, ObjectIdentifier};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::oid_name::{OidName, OidTable, name_of};

/*
RFC 5280 Section 4.1.1.2

AlgorithmIdentifier ::= SEQUENCE {
    algorithm   OBJECT IDENTIFIER,
    parameters  ANY DEFINED BY algorithm OPTIONAL }
*/

pub static SIGNATURE_ALGORITHMS: &OidTable = &[
    ("1.2.840.113549.1.1.2", "MD2withRSA"),
    ("1.2.840.113549.1.1.4", "MD5withRSA"),
    ("1.2.840.113549.1.1.5", "SHA1withRSA"),
    ("1.2.840.113549.1.1.14", "SHA224withRSA"),
    ("1.2.840.113549.1.1.11", "SHA256withRSA"),
    ("1.2.840.113549.1.1.12", "SHA384withRSA"),
    ("1.2.840.113549.1.1.13", "SHA512withRSA"),
    ("1.2.840.10040.4.3", "SHA1withDSA"),
    ("2.16.840.1.101.3.4.3.1", "SHA224withDSA"),
    ("2.16.840.1.101.3.4.3.2", "SHA256withDSA"),
    ("1.2.840.10045.4.1", "SHA1withECDSA"),
    ("1.2.840.10045.4.3.1", "SHA224withECDSA"),
    ("1.2.840.10045.4.3.2", "SHA256withECDSA"),
    ("1.2.840.10045.4.3.3", "SHA384withECDSA"),
    ("1.2.840.10045.4.3.4", "SHA512withECDSA"),
];

pub const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
pub const EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";

pub static PUBLIC_KEY_ALGORITHMS: &OidTable = &[
    (RSA_ENCRYPTION, "RSA"),
    ("1.2.840.10040.4.1", "DSA"),
    ("1.2.840.10046.2.1", "DH"),
    (EC_PUBLIC_KEY, "EC"),
];

pub static NAMED_CURVES: &OidTable = &[
    ("1.2.840.10045.3.1.1", "secp192r1"),
    ("1.3.132.0.33", "secp224r1"),
    ("1.2.840.10045.3.1.7", "secp256r1"),
    ("1.3.132.0.34", "secp384r1"),
    ("1.3.132.0.35", "secp521r1"),
    ("1.3.132.0.10", "secp256k1"),
];

/// Parameters field in AlgorithmIdentifier
///
/// `None` on the identifier means the field was omitted, which is distinct
/// from an explicit NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParameters {
    /// Explicit NULL (05 00), as RSA signature algorithms carry.
    Null,
    /// Any other element, such as the named curve OID of an EC key.
    Elm(Element),
}

impl Serialize for AlgorithmParameters {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            AlgorithmParameters::Null => serializer.serialize_str("Null"),
            AlgorithmParameters::Elm(Element::ObjectIdentifier(oid)) => match name_of(NAMED_CURVES, oid) {
                Some(name) => serializer.serialize_str(name),
                None => serializer.serialize_str(&oid.to_string()),
            },
            AlgorithmParameters::Elm(elm) => serializer.serialize_str(&elm.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<AlgorithmParameters>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: ObjectIdentifier) -> Self {
        Self {
            algorithm,
            parameters: None,
        }
    }

    pub fn new_with_params(algorithm: ObjectIdentifier, parameters: AlgorithmParameters) -> Self {
        Self {
            algorithm,
            parameters: Some(parameters),
        }
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&AlgorithmParameters> {
        self.parameters.as_ref()
    }

    /// The conventional name, or the dotted OID when there is none.
    pub fn name_or_oid(&self) -> String {
        self.oid_name()
            .map_or_else(|| self.algorithm.to_string(), str::to_string)
    }

    /// The curve OID when the parameters name one.
    pub fn named_curve(&self) -> Option<&ObjectIdentifier> {
        match &self.parameters {
            Some(AlgorithmParameters::Elm(Element::ObjectIdentifier(oid))) => Some(oid),
            _ => None,
        }
    }

    pub fn named_curve_name(&self) -> Option<&'static str> {
        self.named_curve().and_then(|oid| name_of(NAMED_CURVES, oid))
    }
}

impl OidName for AlgorithmIdentifier {
    /// Looks in the signature table first, then the public key table.
    fn oid_name(&self) -> Option<&'static str> {
        name_of(SIGNATURE_ALGORITHMS, &self.algorithm)
            .or_else(|| name_of(PUBLIC_KEY_ALGORITHMS, &self.algorithm))
    }
}

impl Serialize for AlgorithmIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AlgorithmIdentifier", 2)?;
        state.serialize_field("algorithm", &self.name_or_oid())?;
        if let Some(ref params) = self.parameters {
            state.serialize_field("parameters", params)?;
        }
        state.end()
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = asn1::Error;

    fn decode(&self) -> Result<AlgorithmIdentifier, Self::Error> {
        let elements = self.as_sequence()?;
        let (algorithm, parameters) = match elements {
            [algorithm] => (algorithm, None),
            [algorithm, Element::Null] => (algorithm, Some(AlgorithmParameters::Null)),
            [algorithm, other] => (algorithm, Some(AlgorithmParameters::Elm(other.clone()))),
            _ => {
                return Err(asn1::Error::InvalidElementCount {
                    what: "AlgorithmIdentifier",
                    expected: 2,
                    actual: elements.len(),
                });
            }
        };

        Ok(AlgorithmIdentifier {
            algorithm: algorithm.as_oid()?.clone(),
            parameters,
        })
    }
}

impl EncodableTo<AlgorithmIdentifier> for Element {}

impl Encoder<AlgorithmIdentifier, Element> for AlgorithmIdentifier {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let mut elements = vec![Element::ObjectIdentifier(self.algorithm.clone())];
        if let Some(params) = &self.parameters {
            elements.push(match params {
                AlgorithmParameters::Null => Element::Null,
                AlgorithmParameters::Elm(elm) => elm.clone(),
            });
        }

        Ok(Element::Sequence(elements))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use asn1::{Element, ObjectIdentifier};
    use ldapsdk::decoder::Decoder;
    use ldapsdk::encoder::Encoder;
    use rstest::rstest;

    use super::{AlgorithmIdentifier, AlgorithmParameters};
    use crate::oid_name::OidName;

    fn oid(s: &str) -> ObjectIdentifier {
        ObjectIdentifier::from_str(s).unwrap()
    }

    #[test]
    fn test_decode_with_null() {
        let elem = Element::Sequence(vec![
            Element::ObjectIdentifier(oid("1.2.840.10045.4.3.2")),
            Element::Null,
        ]);

        let alg_id: AlgorithmIdentifier = elem.decode().unwrap();
        assert_eq!(alg_id.algorithm(), &oid("1.2.840.10045.4.3.2"));
        assert_eq!(alg_id.parameters(), Some(&AlgorithmParameters::Null));
        assert_eq!(alg_id.encode().unwrap(), elem);
    }

    #[test]
    fn test_decode_with_curve() {
        let elem = Element::Sequence(vec![
            Element::ObjectIdentifier(oid("1.2.840.10045.2.1")),
            Element::ObjectIdentifier(oid("1.2.840.10045.3.1.7")),
        ]);

        let alg_id: AlgorithmIdentifier = elem.decode().unwrap();
        assert_eq!(alg_id.oid_name(), Some("EC"));
        assert_eq!(alg_id.named_curve(), Some(&oid("1.2.840.10045.3.1.7")));
        assert_eq!(alg_id.named_curve_name(), Some("secp256r1"));
    }

    #[rstest]
    #[case("1.2.840.113549.1.1.11", "SHA256withRSA")]
    #[case("1.2.840.10045.4.3.2", "SHA256withECDSA")]
    #[case("1.2.840.113549.1.1.1", "RSA")]
    #[case("1.2.3.4", "1.2.3.4")]
    fn test_name_or_oid(#[case] algorithm: &str, #[case] expected: &str) {
        let alg_id = AlgorithmIdentifier::new(oid(algorithm));
        assert_eq!(alg_id.name_or_oid(), expected);
    }

    #[rstest]
    #[case::not_sequence(Element::Null, "UnexpectedElement")]
    #[case::empty(Element::Sequence(vec![]), "InvalidElementCount")]
    #[case::too_many(
        Element::Sequence(vec![
            Element::ObjectIdentifier(oid("1.2.3.4")),
            Element::Null,
            Element::Null,
        ]),
        "InvalidElementCount"
    )]
    #[case::not_oid(Element::Sequence(vec![Element::Null]), "UnexpectedElement")]
    fn test_decode_error(#[case] elem: Element, #[case] expected: &str) {
        let err = Decoder::<Element, AlgorithmIdentifier>::decode(&elem).unwrap_err();
        assert!(format!("{:?}", err).contains(expected));
    }

    #[test]
    fn test_serialize() {
        let alg_id = AlgorithmIdentifier::new_with_params(
            oid("1.2.840.10045.2.1"),
            AlgorithmParameters::Elm(Element::ObjectIdentifier(oid("1.2.840.10045.3.1.7"))),
        );
        let json = serde_json::to_string(&alg_id).unwrap();
        assert_eq!(json, r#"{"algorithm":"EC","parameters":"secp256r1"}"#);
    }
}
