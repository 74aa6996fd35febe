//! Encoder trait, the reverse of [`crate::decoder::Decoder`].

/// Converts `self` (of type `T`) into `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    type Error;

    /// # Errors
    ///
    /// Returns an error when `self` holds a value that has no valid encoding,
    /// for example an object identifier whose first arc is larger than 2.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that `E` can be encoded from `T`.
pub trait EncodableTo<T> {}
