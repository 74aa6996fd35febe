use ldapsdk::error::ErrorKind;
use thiserror::Error;

use crate::Tag;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parser error {0:?}")]
    Parser(nom::error::ErrorKind),
    #[error("parser incomplete: {0:?}")]
    ParserIncomplete(nom::Needed),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("element declares {expected} content bytes but only {actual} remain")]
    Truncated { expected: usize, actual: usize },
    #[error("indefinite length form is not supported")]
    IndefiniteLength,
    #[error("length is encoded in {0} bytes which does not fit in usize")]
    LengthOverflow(usize),
    #[error("tag number does not fit in u32")]
    TagNumberOverflow,
    #[error("{0} trailing bytes after element")]
    TrailingData(usize),
    #[error("element with tag {0} is primitive and has no children")]
    NotConstructed(Tag),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotConstructed(_) => ErrorKind::Shape,
            _ => ErrorKind::Framing,
        }
    }
}

impl<'a> nom::error::ParseError<&'a [u8]> for Error {
    fn from_error_kind(_input: &'a [u8], kind: nom::error::ErrorKind) -> Self {
        match kind {
            nom::error::ErrorKind::Eof => Error::UnexpectedEof,
            _ => Error::Parser(kind),
        }
    }

    fn append(_input: &'a [u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => Error::ParserIncomplete(needed),
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}
