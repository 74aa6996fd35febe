use std::fmt::Display;

use ber::UniversalTag;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::primitive::Primitive;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl Serialize for OctetString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.inner.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for OctetString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex_string = String::deserialize(deserializer)?;
            let cleaned =
                hex_string.replace(|c: char| c.is_whitespace() || c == ':' || c == '-', "");
            if cleaned.len() % 2 != 0 {
                return Err(serde::de::Error::custom("hex string must have even length"));
            }
            let inner = (0..cleaned.len())
                .step_by(2)
                .map(|i| {
                    u8::from_str_radix(&cleaned[i..i + 2], 16)
                        .map_err(|e| serde::de::Error::custom(format!("invalid hex string: {}", e)))
                })
                .collect::<Result<Vec<u8>, D::Error>>()?;
            Ok(OctetString { inner })
        } else {
            let inner = Vec::<u8>::deserialize(deserializer)?;
            Ok(OctetString { inner })
        }
    }
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The content read as UTF-8 text, the LDAP "string value" of an octet
    /// string.
    pub fn as_utf8(&self) -> Result<&str, Error> {
        std::str::from_utf8(&self.inner).map_err(|_| Error::InvalidUtf8("OCTET STRING"))
    }
}

impl Primitive for OctetString {
    const TAG: UniversalTag = UniversalTag::OctetString;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        Ok(OctetString::from(content))
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        Ok(self.inner.clone())
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl From<&str> for OctetString {
    fn from(value: &str) -> Self {
        OctetString {
            inner: value.as_bytes().to_vec(),
        }
    }
}

impl From<String> for OctetString {
    fn from(value: String) -> Self {
        OctetString {
            inner: value.into_bytes(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.inner {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
