//! SubjectPublicKeyInfo and the typed keys it can carry.

use asn1::{BitString, Element, Integer};
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use tracing::trace;

use crate::algorithm::{AlgorithmIdentifier, EC_PUBLIC_KEY, RSA_ENCRYPTION};
use crate::error::Error;

/*
RFC 5280 Section 4.1.2.7

SubjectPublicKeyInfo ::= SEQUENCE {
    algorithm            AlgorithmIdentifier,
    subjectPublicKey     BIT STRING }

RFC 8017 Appendix A.1.1

RSAPublicKey ::= SEQUENCE {
    modulus           INTEGER,  -- n
    publicExponent    INTEGER   -- e }
*/

/// Octets in one coordinate of a P-256 point.
const EC_COORDINATE_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectPublicKeyInfo {
    algorithm: AlgorithmIdentifier,
    subject_public_key: BitString,
    decoded: Option<PublicKey>,
}

impl SubjectPublicKeyInfo {
    /// The typed key is decoded when the algorithm is RSA or EC and the key
    /// bytes parse; otherwise it is left absent.
    pub fn new(algorithm: AlgorithmIdentifier, subject_public_key: BitString) -> Self {
        let decoded = decode_public_key(&algorithm, &subject_public_key);
        Self {
            algorithm,
            subject_public_key,
            decoded,
        }
    }

    pub fn from_public_key(algorithm: AlgorithmIdentifier, key: PublicKey) -> Result<Self, Error> {
        let subject_public_key = key.to_bit_string()?;
        Ok(Self {
            algorithm,
            subject_public_key,
            decoded: Some(key),
        })
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn subject_public_key(&self) -> &BitString {
        &self.subject_public_key
    }

    pub fn decoded_public_key(&self) -> Option<&PublicKey> {
        self.decoded.as_ref()
    }
}

fn decode_public_key(algorithm: &AlgorithmIdentifier, bits: &BitString) -> Option<PublicKey> {
    let result = match algorithm.algorithm.to_string().as_str() {
        RSA_ENCRYPTION => RsaPublicKey::from_bit_string(bits).map(PublicKey::Rsa),
        EC_PUBLIC_KEY if algorithm.named_curve().is_none() => {
            Err(Error::InvalidPublicKey("EC key without a named curve"))
        }
        EC_PUBLIC_KEY => EllipticCurvePublicKey::from_bit_string(bits).map(PublicKey::EllipticCurve),
        _ => return None,
    };
    match result {
        Ok(key) => Some(key),
        Err(e) => {
            trace!("{} public key left undecoded: {}", algorithm.name_or_oid(), e);
            None
        }
    }
}

impl DecodableFrom<Element> for SubjectPublicKeyInfo {}

impl Decoder<Element, SubjectPublicKeyInfo> for Element {
    type Error = asn1::Error;

    fn decode(&self) -> Result<SubjectPublicKeyInfo, Self::Error> {
        let elements = self.as_sequence()?;
        let [algorithm, subject_public_key] = elements else {
            return Err(asn1::Error::InvalidElementCount {
                what: "SubjectPublicKeyInfo",
                expected: 2,
                actual: elements.len(),
            });
        };
        Ok(SubjectPublicKeyInfo::new(
            algorithm.decode()?,
            subject_public_key.as_bit_string()?.clone(),
        ))
    }
}

impl EncodableTo<SubjectPublicKeyInfo> for Element {}

impl Encoder<SubjectPublicKeyInfo, Element> for SubjectPublicKeyInfo {
    type Error = asn1::Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        Ok(Element::Sequence(vec![
            self.algorithm.encode()?,
            Element::BitString(self.subject_public_key.clone()),
        ]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EllipticCurve(EllipticCurvePublicKey),
}

impl PublicKey {
    pub fn to_bit_string(&self) -> Result<BitString, Error> {
        match self {
            PublicKey::Rsa(key) => key.to_bit_string(),
            PublicKey::EllipticCurve(key) => key.to_bit_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RsaPublicKey {
    pub modulus: Integer,
    pub public_exponent: Integer,
}

impl RsaPublicKey {
    pub fn new(modulus: impl Into<Integer>, public_exponent: impl Into<Integer>) -> Self {
        Self {
            modulus: modulus.into(),
            public_exponent: public_exponent.into(),
        }
    }

    pub fn from_bit_string(bits: &BitString) -> Result<Self, Error> {
        if bits.unused_bits() != 0 {
            return Err(Error::InvalidPublicKey("RSA key has unused bits"));
        }
        let element = Element::from_ber(bits.as_bytes())?;
        let elements = element.as_sequence()?;
        let [modulus, public_exponent] = elements else {
            return Err(asn1::Error::InvalidElementCount {
                what: "RSAPublicKey",
                expected: 2,
                actual: elements.len(),
            }
            .into());
        };
        Ok(Self {
            modulus: modulus.as_integer()?.clone(),
            public_exponent: public_exponent.as_integer()?.clone(),
        })
    }

    pub fn to_bit_string(&self) -> Result<BitString, Error> {
        let der = Element::Sequence(vec![
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
        ])
        .to_der()?;
        Ok(BitString::new(0, der)?)
    }
}

/// A point on a 256-bit prime curve, as carried in an EC
/// SubjectPublicKeyInfo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EllipticCurvePublicKey {
    Uncompressed {
        #[serde(serialize_with = "serialize_hex")]
        x: BigUint,
        #[serde(serialize_with = "serialize_hex")]
        y: BigUint,
    },
    Compressed {
        #[serde(serialize_with = "serialize_hex")]
        x: BigUint,
        y_is_even: bool,
    },
}

impl EllipticCurvePublicKey {
    pub fn uncompressed(x: impl Into<BigUint>, y: impl Into<BigUint>) -> Self {
        Self::Uncompressed {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn compressed(x: impl Into<BigUint>, y_is_even: bool) -> Self {
        Self::Compressed {
            x: x.into(),
            y_is_even,
        }
    }

    pub fn x(&self) -> &BigUint {
        match self {
            Self::Uncompressed { x, .. } | Self::Compressed { x, .. } => x,
        }
    }

    /// Absent for a compressed point.
    pub fn y(&self) -> Option<&BigUint> {
        match self {
            Self::Uncompressed { y, .. } => Some(y),
            Self::Compressed { .. } => None,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed { .. })
    }

    /// `04 || x || y` (65 bytes) or `02|03 || x` (33 bytes).
    pub fn from_bit_string(bits: &BitString) -> Result<Self, Error> {
        if bits.unused_bits() != 0 {
            return Err(Error::InvalidPublicKey("EC point has unused bits"));
        }
        let bytes = bits.as_bytes();
        match bytes.split_first() {
            Some((&0x04, rest)) if rest.len() == 2 * EC_COORDINATE_LEN => {
                let (x, y) = rest.split_at(EC_COORDINATE_LEN);
                Ok(Self::uncompressed(
                    BigUint::from_bytes_be(x),
                    BigUint::from_bytes_be(y),
                ))
            }
            Some((&(prefix @ (0x02 | 0x03)), rest)) if rest.len() == EC_COORDINATE_LEN => Ok(
                Self::compressed(BigUint::from_bytes_be(rest), prefix == 0x02),
            ),
            _ => Err(Error::InvalidPublicKey("unrecognised EC point encoding")),
        }
    }

    pub fn to_bit_string(&self) -> Result<BitString, Error> {
        let mut bytes = Vec::with_capacity(1 + 2 * EC_COORDINATE_LEN);
        match self {
            Self::Uncompressed { x, y } => {
                bytes.push(0x04);
                bytes.extend(coordinate(x)?);
                bytes.extend(coordinate(y)?);
            }
            Self::Compressed { x, y_is_even } => {
                bytes.push(if *y_is_even { 0x02 } else { 0x03 });
                bytes.extend(coordinate(x)?);
            }
        }
        Ok(BitString::new(0, bytes)?)
    }
}

fn coordinate(value: &BigUint) -> Result<Vec<u8>, Error> {
    let bytes = value.to_bytes_be();
    if bytes.len() > EC_COORDINATE_LEN {
        return Err(Error::InvalidPublicKey("EC coordinate longer than 32 bytes"));
    }
    let mut padded = vec![0u8; EC_COORDINATE_LEN - bytes.len()];
    padded.extend(bytes);
    Ok(padded)
}

fn serialize_hex<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_str_radix(16))
}
