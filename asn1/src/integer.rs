use std::fmt::Display;

use ber::UniversalTag;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::primitive::Primitive;

// Arbitrary precision, two's complement on the wire. Non-minimal BER
// encodings are accepted; encoding is always minimal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.inner.to_u32()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }

    /// Minimal two's complement bytes.
    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        self.inner.to_signed_bytes_be()
    }
}

impl Primitive for Integer {
    const TAG: UniversalTag = UniversalTag::Integer;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        if content.is_empty() {
            return Err(Error::IntegerNoData);
        }
        Ok(Integer {
            inner: BigInt::from_signed_bytes_be(content),
        })
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        Ok(self.to_signed_bytes_be())
    }
}

impl Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner.to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let inner = s.parse::<BigInt>().map_err(serde::de::Error::custom)?;
        Ok(Integer { inner })
    }
}

impl From<BigInt> for Integer {
    fn from(inner: BigInt) -> Self {
        Integer { inner }
    }
}

impl From<Integer> for BigInt {
    fn from(value: Integer) -> Self {
        value.inner
    }
}

macro_rules! impl_from_primitive_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Integer {
                fn from(value: $t) -> Self {
                    Integer { inner: BigInt::from(value) }
                }
            }
        )*
    };
}

impl_from_primitive_int!(i32, i64, u32, u64);

impl TryFrom<&Integer> for i64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.to_i64().ok_or(Error::IntegerOutOfRange("i64"))
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.to_u64().ok_or(Error::IntegerOutOfRange("u64"))
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
