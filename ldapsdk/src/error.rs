//! Error classification shared across crates.

use std::fmt;

use serde::Serialize;

/// The class of a codec failure.
///
/// Each crate keeps its own error enum with precise variants; `kind()` on
/// those enums maps a variant to one of these classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Truncated input, bad length encoding, indefinite length.
    Framing,
    /// Wrong tag, wrong element count, constructed where primitive expected.
    Shape,
    /// Content that is well framed but invalid for its type.
    Value,
    /// Fields that are individually valid but disagree with each other.
    CrossCheck,
    /// A value that cannot be represented on the wire.
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Framing => "framing",
            ErrorKind::Shape => "shape",
            ErrorKind::Value => "value",
            ErrorKind::CrossCheck => "cross-check",
            ErrorKind::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ErrorKind;

    #[rstest]
    #[case(ErrorKind::Framing, "framing")]
    #[case(ErrorKind::CrossCheck, "cross-check")]
    #[case(ErrorKind::Encoding, "encoding")]
    fn test_error_kind_display(#[case] kind: ErrorKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }
}
