//! Decoder trait for type-safe conversions.
//!
//! The decoder uses a two-trait pattern:
//!
//! 1. `Decoder<T, D>` performs the conversion.
//! 2. `DecodableFrom<T>` marks `D` as a valid target for `T`.
//!
//! ```no_run
//! use ldapsdk::decoder::{DecodableFrom, Decoder};
//!
//! struct Raw(Vec<u8>);
//! struct Text(String);
//!
//! #[derive(Debug)]
//! struct NotUtf8;
//!
//! impl DecodableFrom<Raw> for Text {}
//!
//! impl Decoder<Raw, Text> for Raw {
//!     type Error = NotUtf8;
//!
//!     fn decode(&self) -> Result<Text, Self::Error> {
//!         String::from_utf8(self.0.clone()).map(Text).map_err(|_| NotUtf8)
//!     }
//! }
//! ```

/// Converts `self` (of type `T`) into `D`.
///
/// `T` is usually `Self`; it is a type parameter so that a single source
/// type can decode into several targets.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error when the source does not hold a valid `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that `D` can be decoded from `T`.
pub trait DecodableFrom<T> {}
