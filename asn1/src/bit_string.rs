use std::fmt::Display;

use ber::UniversalTag;
use serde::Serialize;

use crate::error::Error;
use crate::primitive::Primitive;

/// Bits packed most significant first, with the count of unused trailing
/// bits in the final octet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl Serialize for BitString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            use serde::ser::SerializeStruct;
            let mut state = serializer.serialize_struct("BitString", 2)?;
            state.serialize_field("bit_length", &self.bit_len())?;
            let hex_string = self
                .data
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(":");
            state.serialize_field("bits", &hex_string)?;
            state.end()
        } else {
            (self.unused, &self.data).serialize(serializer)
        }
    }
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Result<Self, Error> {
        if unused > 7 {
            return Err(Error::BitStringUnusedBitsOutOfRange(unused));
        }
        if unused > 0 && data.is_empty() {
            return Err(Error::BitStringUnusedBitsWithoutData(unused));
        }
        Ok(BitString { unused, data })
    }

    /// Packs `bits` exactly as given.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut data = vec![0u8; bits.len().div_ceil(8)];
        for (i, _) in bits.iter().enumerate().filter(|(_, bit)| **bit) {
            data[i / 8] |= 0x80 >> (i % 8);
        }
        let unused = ((8 - bits.len() % 8) % 8) as u8;
        BitString { unused, data }
    }

    /// Packs a named bit list, dropping trailing zero bits as DER requires.
    pub fn from_named_bits(bits: &[bool]) -> Self {
        let len = bits.iter().rposition(|bit| *bit).map_or(0, |last| last + 1);
        Self::from_bits(&bits[..len])
    }

    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - usize::from(self.unused)
    }

    /// Returns bit `index`, counting from the most significant bit of the
    /// first octet. Bits past the end read as unset.
    pub fn bit(&self, index: usize) -> bool {
        if index >= self.bit_len() {
            return false;
        }
        self.data[index / 8] & (0x80 >> (index % 8)) != 0
    }

    pub fn to_bits(&self) -> Vec<bool> {
        (0..self.bit_len()).map(|i| self.bit(i)).collect()
    }
}

impl Primitive for BitString {
    const TAG: UniversalTag = UniversalTag::BitString;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        match content.split_first() {
            Some((&unused, data)) => BitString::new(unused, data.to_vec()),
            None => Err(Error::BitStringNoData),
        }
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        let mut content = Vec::with_capacity(self.data.len() + 1);
        content.push(self.unused);
        content.extend_from_slice(&self.data);
        Ok(content)
    }
}

impl AsRef<[u8]> for BitString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits: String = self
            .to_bits()
            .into_iter()
            .map(|bit| if bit { '1' } else { '0' })
            .collect();
        f.write_str(&bits)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::BitString;
    use crate::primitive::Primitive;

    #[rstest]
    #[case(vec![0x00], 0)]
    #[case(vec![0x06, 0x6e, 0x5d, 0xc0], 18)]
    #[case(vec![0x03, 0xa8], 5)]
    fn test_decode_bit_string(#[case] content: Vec<u8>, #[case] expected_len: usize) {
        let bits = BitString::decode_content(&content).unwrap();
        assert_eq!(bits.bit_len(), expected_len);
        assert_eq!(bits.encode_content().unwrap(), content);
    }

    #[rstest]
    #[case::empty(vec![], "BitStringNoData")]
    #[case::unused_too_large(vec![0x08, 0xff], "BitStringUnusedBitsOutOfRange")]
    #[case::unused_without_data(vec![0x01], "BitStringUnusedBitsWithoutData")]
    fn test_decode_bit_string_error(#[case] content: Vec<u8>, #[case] expected: &str) {
        let err = BitString::decode_content(&content).unwrap_err();
        assert!(format!("{:?}", err).contains(expected));
    }

    #[test]
    fn test_from_bits() {
        let bits = BitString::from_bits(&[true, false, true, false, true]);
        assert_eq!(bits.unused_bits(), 3);
        assert_eq!(bits.as_bytes(), &[0xa8]);
        assert_eq!(bits.to_string(), "10101");

        let bits = BitString::from_bits(&[false, true, false, true, false]);
        assert_eq!(bits.as_bytes(), &[0x50]);
        assert_eq!(bits.to_string(), "01010");
    }

    #[rstest]
    #[case(vec![true; 9], 7, vec![0xff, 0x80])]
    #[case(vec![true, false, true, false, false, false], 5, vec![0xa0])]
    #[case(vec![false, false], 0, vec![])]
    fn test_from_named_bits(
        #[case] bits: Vec<bool>,
        #[case] unused: u8,
        #[case] bytes: Vec<u8>,
    ) {
        let bit_string = BitString::from_named_bits(&bits);
        assert_eq!(bit_string.unused_bits(), unused);
        assert_eq!(bit_string.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_bit_past_end_is_unset() {
        let bits = BitString::from_bits(&[true]);
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(!bits.bit(100));
    }
}
