//! X.509 certificate structure codec.
//!
//! Reads a DER (or BER) encoded certificate into a [`Certificate`] and
//! writes it back. The signature is carried as-is: nothing here verifies or
//! recomputes it.
//!
//! ```
//! use x509::{Certificate, DecodeOptions};
//!
//! let err = Certificate::decode_with(&[0x30, 0x00], &DecodeOptions::default()).unwrap_err();
//! assert!(err.to_string().contains("Certificate"));
//! ```

#![forbid(unsafe_code)]

use asn1::schema::{Extensibility, Field, Schema};
use asn1::{BitString, Element, Integer, UtcTime};
use ber::{Tag, UniversalTag};
use chrono::{NaiveDateTime, Timelike};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;
use tracing::debug;

pub mod algorithm;
pub mod config;
pub mod error;
pub mod extensions;
pub mod name;
pub mod oid_name;
pub mod public_key;

pub use algorithm::{AlgorithmIdentifier, AlgorithmParameters};
pub use config::{DecodeOptions, ExtensionPolicy};
pub use error::Error;
pub use extensions::{CertificateExtension, Extension, ExtensionValue};
pub use name::{AttributeTypeAndValue, Name, RelativeDistinguishedName};
pub use oid_name::OidName;
pub use public_key::{EllipticCurvePublicKey, PublicKey, RsaPublicKey, SubjectPublicKeyInfo};

/*
RFC 5280 Section 4.1

Certificate  ::=  SEQUENCE  {
    tbsCertificate       TBSCertificate,
    signatureAlgorithm   AlgorithmIdentifier,
    signatureValue       BIT STRING  }

TBSCertificate  ::=  SEQUENCE  {
    version         [0]  EXPLICIT Version DEFAULT v1,
    serialNumber         CertificateSerialNumber,
    signature            AlgorithmIdentifier,
    issuer               Name,
    validity             Validity,
    subject              Name,
    subjectPublicKeyInfo SubjectPublicKeyInfo,
    issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
    subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
    extensions      [3]  EXPLICIT Extensions OPTIONAL  }

Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }

Validity ::= SEQUENCE {
    notBefore      Time,
    notAfter       Time  }

Time ::= CHOICE {
    utcTime        UTCTime,
    generalTime    GeneralizedTime  }

UniqueIdentifier  ::=  BIT STRING
*/

const TYPE_VERSION: Tag = Tag::context_constructed(0);
const TYPE_ISSUER_UNIQUE_ID: Tag = Tag::context(1);
const TYPE_SUBJECT_UNIQUE_ID: Tag = Tag::context(2);
const TYPE_EXTENSIONS: Tag = Tag::context_constructed(3);

const TYPE_SEQUENCE: Tag = UniversalTag::Sequence.tag();

static TBS_CERTIFICATE: Schema = Schema::new(
    "TBSCertificate",
    &[
        Field::defaulted("version", TYPE_VERSION),
        Field::required("serialNumber", UniversalTag::Integer.tag()),
        Field::required("signature", TYPE_SEQUENCE),
        Field::required("issuer", TYPE_SEQUENCE),
        Field::required("validity", TYPE_SEQUENCE),
        Field::required("subject", TYPE_SEQUENCE),
        Field::required("subjectPublicKeyInfo", TYPE_SEQUENCE),
    ],
    &[
        Field::optional("issuerUniqueID", TYPE_ISSUER_UNIQUE_ID),
        Field::optional("subjectUniqueID", TYPE_SUBJECT_UNIQUE_ID),
        Field::optional("extensions", TYPE_EXTENSIONS),
    ],
    Extensibility::Closed,
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Version {
    #[default]
    V1 = 0,
    V2 = 1,
    V3 = 2,
}

impl Version {
    fn from_integer(value: &Integer) -> Result<Self, Error> {
        match value.to_i64() {
            Some(0) => Ok(Version::V1),
            Some(1) => Ok(Version::V2),
            Some(2) => Ok(Version::V3),
            _ => Err(Error::InvalidVersion(value.to_string())),
        }
    }

    fn to_integer(self) -> Integer {
        Integer::from(self as u32)
    }
}

/// A point in time as carried in a certificate. The variant records which
/// string type the value is encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Time {
    Utc(NaiveDateTime),
    Generalized(NaiveDateTime),
}

impl Time {
    /// UTCTime for years 1950 through 2049, GeneralizedTime otherwise.
    /// UTCTime has no fractional seconds, so they are dropped.
    pub fn new(datetime: NaiveDateTime) -> Self {
        if UtcTime::can_represent(&datetime) {
            Time::Utc(datetime.with_nanosecond(0).unwrap_or(datetime))
        } else {
            Time::Generalized(datetime)
        }
    }

    pub fn datetime(&self) -> &NaiveDateTime {
        match self {
            Time::Utc(dt) | Time::Generalized(dt) => dt,
        }
    }
}

impl DecodableFrom<Element> for Time {}

impl Decoder<Element, Time> for Element {
    type Error = asn1::Error;

    fn decode(&self) -> Result<Time, Self::Error> {
        match self {
            Element::UTCTime(dt) => Ok(Time::Utc(*dt)),
            Element::GeneralizedTime(dt) => Ok(Time::Generalized(*dt)),
            _ => Err(asn1::Error::UnexpectedElement {
                expected: "UTCTime or GeneralizedTime",
                actual: self.tag(),
            }),
        }
    }
}

impl EncodableTo<Time> for Element {}

impl Encoder<Time, Element> for Time {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(match self {
            Time::Utc(dt) => Element::UTCTime(*dt),
            Time::Generalized(dt) => Element::GeneralizedTime(*dt),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Validity {
    pub not_before: Time,
    pub not_after: Time,
}

impl Validity {
    pub fn new(not_before: NaiveDateTime, not_after: NaiveDateTime) -> Self {
        Self {
            not_before: Time::new(not_before),
            not_after: Time::new(not_after),
        }
    }
}

impl DecodableFrom<Element> for Validity {}

impl Decoder<Element, Validity> for Element {
    type Error = asn1::Error;

    fn decode(&self) -> Result<Validity, Self::Error> {
        let elements = self.as_sequence()?;
        let [not_before, not_after] = elements else {
            return Err(asn1::Error::InvalidElementCount {
                what: "Validity",
                expected: 2,
                actual: elements.len(),
            });
        };
        Ok(Validity {
            not_before: not_before.decode()?,
            not_after: not_after.decode()?,
        })
    }
}

impl EncodableTo<Validity> for Element {}

impl Encoder<Validity, Element> for Validity {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Sequence(vec![
            self.not_before.encode()?,
            self.not_after.encode()?,
        ]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TBSCertificate {
    pub version: Version,
    pub serial_number: Integer,
    pub signature: AlgorithmIdentifier,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    pub issuer_unique_id: Option<BitString>,
    pub subject_unique_id: Option<BitString>,
    pub extensions: Vec<CertificateExtension>,
}

impl TBSCertificate {
    fn decode_with(element: &Element, policy: ExtensionPolicy) -> Result<Self, Error> {
        let at = Error::field;
        let fields = element
            .as_sequence()
            .and_then(|elements| TBS_CERTIFICATE.decode(elements))
            .map_err(at("TBSCertificate"))?;

        let version = match fields.positional(0) {
            Some(wrapped) => {
                let value = wrapped
                    .explicit_inner(0)
                    .and_then(Element::as_integer)
                    .map_err(at("version"))?;
                Version::from_integer(value)?
            }
            None => Version::V1,
        };
        let serial_number = fields
            .required(1)
            .and_then(Element::as_integer)
            .map_err(at("serialNumber"))?
            .clone();
        let signature: AlgorithmIdentifier = fields
            .required(2)
            .and_then(|e| e.decode())
            .map_err(at("signature"))?;
        let issuer: Name = fields
            .required(3)
            .and_then(|e| e.decode())
            .map_err(at("issuer"))?;
        let validity: Validity = fields
            .required(4)
            .and_then(|e| e.decode())
            .map_err(at("validity"))?;
        let subject: Name = fields
            .required(5)
            .and_then(|e| e.decode())
            .map_err(at("subject"))?;
        let subject_public_key_info: SubjectPublicKeyInfo = fields
            .required(6)
            .and_then(|e| e.decode())
            .map_err(at("subjectPublicKeyInfo"))?;

        let issuer_unique_id = fields
            .optional(TYPE_ISSUER_UNIQUE_ID)
            .map(|e| e.decode_as::<BitString>(TYPE_ISSUER_UNIQUE_ID))
            .transpose()
            .map_err(at("issuerUniqueID"))?;
        let subject_unique_id = fields
            .optional(TYPE_SUBJECT_UNIQUE_ID)
            .map(|e| e.decode_as::<BitString>(TYPE_SUBJECT_UNIQUE_ID))
            .transpose()
            .map_err(at("subjectUniqueID"))?;

        let extensions = match fields.optional(TYPE_EXTENSIONS) {
            Some(wrapped) => {
                let elements = wrapped
                    .explicit_inner(3)
                    .and_then(Element::as_sequence)
                    .map_err(at("extensions"))?;
                if elements.is_empty() {
                    return Err(Error::EmptyExtensions);
                }
                elements
                    .iter()
                    .map(|e| CertificateExtension::decode_with(e, policy))
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => Vec::new(),
        };

        Ok(TBSCertificate {
            version,
            serial_number,
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            issuer_unique_id,
            subject_unique_id,
            extensions,
        })
    }
}

impl DecodableFrom<Element> for TBSCertificate {}

impl Decoder<Element, TBSCertificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<TBSCertificate, Self::Error> {
        TBSCertificate::decode_with(self, ExtensionPolicy::Strict)
    }
}

impl EncodableTo<TBSCertificate> for Element {}

impl Encoder<TBSCertificate, Element> for TBSCertificate {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        // v1 is the DEFAULT and is left out
        let version = (self.version != Version::V1)
            .then(|| Element::explicit(0, Element::Integer(self.version.to_integer())));
        let issuer_unique_id = self
            .issuer_unique_id
            .as_ref()
            .map(|id| Element::implicit(id, TYPE_ISSUER_UNIQUE_ID))
            .transpose()?;
        let subject_unique_id = self
            .subject_unique_id
            .as_ref()
            .map(|id| Element::implicit(id, TYPE_SUBJECT_UNIQUE_ID))
            .transpose()?;
        let extensions = if self.extensions.is_empty() {
            None
        } else {
            let elements = self
                .extensions
                .iter()
                .map(|ext| ext.encode())
                .collect::<Result<Vec<_>, _>>()?;
            Some(Element::explicit(3, Element::Sequence(elements)))
        };

        let children = TBS_CERTIFICATE
            .encoder()
            .positional(version)
            .positional(Element::Integer(self.serial_number.clone()))
            .positional(self.signature.encode()?)
            .positional(self.issuer.encode()?)
            .positional(self.validity.encode()?)
            .positional(self.subject.encode()?)
            .positional(self.subject_public_key_info.encode()?)
            .optional(TYPE_ISSUER_UNIQUE_ID, issuer_unique_id)
            .optional(TYPE_SUBJECT_UNIQUE_ID, subject_unique_id)
            .optional(TYPE_EXTENSIONS, extensions)
            .finish()?;
        Ok(Element::Sequence(children))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    tbs_certificate: TBSCertificate,
    signature_algorithm: AlgorithmIdentifier,
    signature_value: BitString,
}

impl Certificate {
    /// Pairs `tbs_certificate` with an already computed signature. The outer
    /// signature algorithm is taken from the TBSCertificate.
    pub fn new(tbs_certificate: TBSCertificate, signature_value: BitString) -> Self {
        Self {
            signature_algorithm: tbs_certificate.signature.clone(),
            tbs_certificate,
            signature_value,
        }
    }

    /// Decodes with [`DecodeOptions::default`].
    pub fn from_der(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode_with(bytes, &DecodeOptions::default())
    }

    pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Self, Error> {
        if bytes.len() > options.max_encoded_len {
            debug!(
                "certificate of {} bytes exceeds the {} byte limit",
                bytes.len(),
                options.max_encoded_len
            );
            return Err(Error::TooLarge {
                len: bytes.len(),
                limit: options.max_encoded_len,
            });
        }
        let result = Element::from_ber(bytes)
            .map_err(Error::field("Certificate"))
            .and_then(|element| Self::decode_element(&element, options.extension_policy));
        if let Err(err) = &result {
            debug!("failed to decode certificate: {}", err);
        }
        result
    }

    fn decode_element(element: &Element, policy: ExtensionPolicy) -> Result<Self, Error> {
        let at = Error::field;
        let elements = element.as_sequence().map_err(at("Certificate"))?;
        let [tbs, signature_algorithm, signature_value] = elements else {
            return Err(at("Certificate")(asn1::Error::InvalidElementCount {
                what: "Certificate",
                expected: 3,
                actual: elements.len(),
            }));
        };

        let tbs_certificate = TBSCertificate::decode_with(tbs, policy)?;
        let signature_algorithm: AlgorithmIdentifier = signature_algorithm
            .decode()
            .map_err(at("signatureAlgorithm"))?;
        if signature_algorithm.algorithm != tbs_certificate.signature.algorithm {
            return Err(Error::SignatureAlgorithmMismatch {
                outer: signature_algorithm.algorithm,
                inner: tbs_certificate.signature.algorithm,
            });
        }
        let signature_value = signature_value
            .as_bit_string()
            .map_err(at("signatureValue"))?
            .clone();

        Ok(Certificate {
            tbs_certificate,
            signature_algorithm,
            signature_value,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.encode()?.to_der()?)
    }

    pub fn tbs_certificate(&self) -> &TBSCertificate {
        &self.tbs_certificate
    }

    pub fn version(&self) -> Version {
        self.tbs_certificate.version
    }

    pub fn serial_number(&self) -> &Integer {
        &self.tbs_certificate.serial_number
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature_algorithm_name(&self) -> Option<&'static str> {
        self.signature_algorithm.oid_name()
    }

    pub fn signature_algorithm_name_or_oid(&self) -> String {
        self.signature_algorithm.name_or_oid()
    }

    pub fn issuer(&self) -> &Name {
        &self.tbs_certificate.issuer
    }

    pub fn validity(&self) -> &Validity {
        &self.tbs_certificate.validity
    }

    pub fn not_before(&self) -> &NaiveDateTime {
        self.tbs_certificate.validity.not_before.datetime()
    }

    pub fn not_after(&self) -> &NaiveDateTime {
        self.tbs_certificate.validity.not_after.datetime()
    }

    pub fn subject(&self) -> &Name {
        &self.tbs_certificate.subject
    }

    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfo {
        &self.tbs_certificate.subject_public_key_info
    }

    pub fn public_key_algorithm_name_or_oid(&self) -> String {
        self.subject_public_key_info().algorithm().name_or_oid()
    }

    /// The typed key, absent when the algorithm is not RSA or EC or the
    /// key bytes do not parse.
    pub fn decoded_public_key(&self) -> Option<&PublicKey> {
        self.subject_public_key_info().decoded_public_key()
    }

    pub fn issuer_unique_id(&self) -> Option<&BitString> {
        self.tbs_certificate.issuer_unique_id.as_ref()
    }

    pub fn subject_unique_id(&self) -> Option<&BitString> {
        self.tbs_certificate.subject_unique_id.as_ref()
    }

    pub fn extensions(&self) -> &[CertificateExtension] {
        &self.tbs_certificate.extensions
    }

    /// The first extension of type `T` that was parsed into its typed form.
    pub fn extension<T: Extension>(&self) -> Option<&T> {
        self.extensions().iter().find_map(|ext| ext.get::<T>())
    }

    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }
}

impl TryFrom<&[u8]> for Certificate {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Certificate::from_der(bytes)
    }
}

impl DecodableFrom<Element> for Certificate {}

impl Decoder<Element, Certificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Certificate, Self::Error> {
        Certificate::decode_element(self, ExtensionPolicy::Strict)
    }
}

impl EncodableTo<Certificate> for Element {}

impl Encoder<Certificate, Element> for Certificate {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Sequence(vec![
            self.tbs_certificate.encode()?,
            self.signature_algorithm.encode()?,
            Element::BitString(self.signature_value.clone()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use asn1::{BitString, Element, Integer};
    use chrono::{NaiveDate, NaiveDateTime};
    use ldapsdk::decoder::Decoder;
    use ldapsdk::encoder::Encoder;
    use ldapsdk::error::ErrorKind;
    use rstest::rstest;

    use super::{Certificate, TBSCertificate, Time, Validity, Version};
    use crate::algorithm::{AlgorithmIdentifier, AlgorithmParameters};
    use crate::config::DecodeOptions;
    use crate::name::Name;
    use crate::public_key::{PublicKey, RsaPublicKey, SubjectPublicKeyInfo};

    fn datetime(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sha256_with_rsa() -> AlgorithmIdentifier {
        AlgorithmIdentifier::new_with_params(
            "1.2.840.113549.1.1.11".parse().unwrap(),
            AlgorithmParameters::Null,
        )
    }

    fn v1_tbs() -> TBSCertificate {
        let rsa = AlgorithmIdentifier::new_with_params(
            "1.2.840.113549.1.1.1".parse().unwrap(),
            AlgorithmParameters::Null,
        );
        TBSCertificate {
            version: Version::V1,
            serial_number: Integer::from(1),
            signature: sha256_with_rsa(),
            issuer: Name::from_attributes(&[("CN", "Root")]).unwrap(),
            validity: Validity::new(datetime(2020, 1, 1), datetime(2030, 1, 1)),
            subject: Name::from_attributes(&[("CN", "Leaf")]).unwrap(),
            subject_public_key_info: SubjectPublicKeyInfo::from_public_key(
                rsa,
                PublicKey::Rsa(RsaPublicKey::new(0xc5u32, 65537u32)),
            )
            .unwrap(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Vec::new(),
        }
    }

    #[test]
    fn test_v1_certificate_roundtrip() {
        let cert = Certificate::new(v1_tbs(), BitString::from_bits(&[true, false, true]));
        let der = cert.to_der().unwrap();
        let decoded = Certificate::from_der(&der).unwrap();
        assert_eq!(decoded, cert);
        assert_eq!(decoded.version(), Version::V1);
        assert_eq!(decoded.signature_algorithm_name(), Some("SHA256withRSA"));
        assert_eq!(decoded.public_key_algorithm_name_or_oid(), "RSA");
        assert!(matches!(decoded.decoded_public_key(), Some(PublicKey::Rsa(_))));
        assert_eq!(decoded.to_der().unwrap(), der);

        // version [0] is absent from the encoding
        let tbs = cert.tbs_certificate().encode().unwrap();
        assert_eq!(tbs.as_sequence().unwrap()[0], Element::Integer(Integer::from(1)));
    }

    #[rstest]
    #[case(datetime(2049, 12, 31), true)]
    #[case(datetime(1950, 1, 1), true)]
    #[case(datetime(2050, 1, 1), false)]
    #[case(datetime(1949, 12, 31), false)]
    fn test_time_choice(#[case] dt: NaiveDateTime, #[case] utc: bool) {
        let time = Time::new(dt);
        assert_eq!(matches!(time, Time::Utc(_)), utc);
        assert_eq!(time.datetime(), &dt);
    }

    #[rstest]
    #[case(2, Some(Version::V3))]
    #[case(1, Some(Version::V2))]
    #[case(0, Some(Version::V1))]
    #[case(3, None)]
    #[case(-1, None)]
    fn test_version_value(#[case] value: i64, #[case] expected: Option<Version>) {
        let mut tbs = v1_tbs().encode().unwrap().as_sequence().unwrap().to_vec();
        tbs.insert(
            0,
            Element::explicit(0, Element::Integer(Integer::from(value))),
        );
        let result: Result<TBSCertificate, _> = Element::Sequence(tbs).decode();
        match expected {
            Some(version) => assert_eq!(result.unwrap().version, version),
            None => {
                let err = result.unwrap_err();
                assert!(format!("{:?}", err).contains("InvalidVersion"));
                assert_eq!(err.kind(), ErrorKind::Value);
            }
        }
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let mut tbs = v1_tbs().encode().unwrap().as_sequence().unwrap().to_vec();
        tbs.push(Element::explicit(3, Element::Sequence(vec![])));
        let err = Decoder::<Element, TBSCertificate>::decode(&Element::Sequence(tbs)).unwrap_err();
        assert!(format!("{:?}", err).contains("EmptyExtensions"));
    }

    #[rstest]
    #[case::two_elements(2, ErrorKind::Shape)]
    #[case::four_elements(4, ErrorKind::Shape)]
    fn test_certificate_element_count(#[case] count: usize, #[case] kind: ErrorKind) {
        let cert = Certificate::new(v1_tbs(), BitString::from_bits(&[true]));
        let mut elements = cert.encode().unwrap().as_sequence().unwrap().to_vec();
        elements.resize(count, Element::Null);
        let der = Element::Sequence(elements).to_der().unwrap();
        let err = Certificate::from_der(&der).unwrap_err();
        assert!(format!("{:?}", err).contains("InvalidElementCount"));
        assert_eq!(err.kind(), kind);
    }

    #[test]
    fn test_size_cap() {
        let cert = Certificate::new(v1_tbs(), BitString::from_bits(&[true]));
        let der = cert.to_der().unwrap();
        let options = DecodeOptions::default().with_max_encoded_len(der.len() - 1);
        let err = Certificate::decode_with(&der, &options).unwrap_err();
        assert!(format!("{:?}", err).contains("TooLarge"));
        assert_eq!(err.kind(), ErrorKind::Framing);

        let options = DecodeOptions::default().with_max_encoded_len(der.len());
        assert!(Certificate::decode_with(&der, &options).is_ok());
    }
}
