use std::fmt::Display;
use std::str::FromStr;

use ber::UniversalTag;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::primitive::Primitive;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier {
    arcs: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Builds an identifier from its arcs without validating them. Whether
    /// the arcs can be encoded is only checked by `encode_content`.
    pub fn from_arcs(arcs: Vec<u64>) -> Self {
        Self { arcs }
    }
}

impl Primitive for ObjectIdentifier {
    const TAG: UniversalTag = UniversalTag::ObjectIdentifier;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        if content.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut subids = Vec::new();
        let mut value = 0u64;
        let mut pending = false;
        for &octet in content {
            if !pending && octet == 0x80 {
                return Err(Error::ObjectIdentifierNotMinimal);
            }
            if value > (u64::MAX >> 7) {
                return Err(Error::ObjectIdentifierOverflow);
            }
            value = (value << 7) | u64::from(octet & 0x7f);
            pending = octet & 0x80 != 0;
            if !pending {
                subids.push(value);
                value = 0;
            }
        }
        if pending {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        // the first sub-identifier packs the first two arcs
        let first = subids[0];
        let (a, b) = match first {
            0..=39 => (0, first),
            40..=79 => (1, first - 40),
            _ => (2, first - 80),
        };
        let mut arcs = Vec::with_capacity(subids.len() + 1);
        arcs.push(a);
        arcs.push(b);
        arcs.extend_from_slice(&subids[1..]);
        Ok(ObjectIdentifier { arcs })
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        let cannot_encode = || Error::ObjectIdentifierCannotEncode(self.to_string());
        let (first, second) = match self.arcs.as_slice() {
            [first, second, ..] => (*first, *second),
            _ => return Err(cannot_encode()),
        };
        if first > 2 || (first < 2 && second >= 40) {
            return Err(cannot_encode());
        }
        let head = (first * 40).checked_add(second).ok_or_else(cannot_encode)?;

        let mut out = Vec::new();
        for subid in std::iter::once(head).chain(self.arcs[2..].iter().copied()) {
            push_base128(&mut out, subid);
        }
        Ok(out)
    }
}

fn push_base128(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value > 0 {
        groups.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(groups.into_iter().rev());
}

impl Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectIdentifier::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dotted = self
            .arcs
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&dotted)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .split('.')
            .map(|arc| {
                arc.parse::<u64>()
                    .map_err(|_| Error::ObjectIdentifierInvalidComponent(arc.to_string()))
            })
            .collect::<Result<Vec<u64>, Error>>()?;
        if arcs.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { arcs })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        let mut parts = other.split('.');
        for arc in &self.arcs {
            match parts.next().map(str::parse::<u64>) {
                Some(Ok(n)) if n == *arc => {}
                _ => return false,
            }
        }
        parts.next().is_none()
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        other == self
    }
}

/// Anything that names an object identifier.
pub trait AsOid {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error>;
}

impl AsOid for ObjectIdentifier {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error> {
        Ok(self.clone())
    }
}

impl AsOid for &str {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error> {
        ObjectIdentifier::from_str(self)
    }
}

impl AsOid for String {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error> {
        ObjectIdentifier::from_str(self)
    }
}
