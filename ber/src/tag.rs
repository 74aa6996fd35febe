use std::fmt;

pub(crate) const CONSTRUCTED: u8 = 0x20;
pub(crate) const HIGH_TAG_NUMBER: u8 = 0x1f;
const CLASS_MASK: u8 = 0xc0;

/// The two high bits of an identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    pub(crate) const fn from_identifier(octet: u8) -> Self {
        match octet & CLASS_MASK {
            0x00 => TagClass::Universal,
            0x40 => TagClass::Application,
            0x80 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    pub(crate) const fn bits(self) -> u8 {
        match self {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xc0,
        }
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagClass::Universal => "UNIVERSAL",
            TagClass::Application => "APPLICATION",
            TagClass::ContextSpecific => "CONTEXT",
            TagClass::Private => "PRIVATE",
        };
        f.write_str(name)
    }
}

/// Identifier of an element: class, primitive/constructed form and number.
///
/// Two tags are equal only when all three parts match, so a primitive
/// `[0]` (`0x80`) and a constructed `[0]` (`0xa0`) are different tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    class: TagClass,
    constructed: bool,
    number: u32,
}

impl Tag {
    pub const fn new(class: TagClass, constructed: bool, number: u32) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    pub const fn universal(number: u32, constructed: bool) -> Self {
        Self::new(TagClass::Universal, constructed, number)
    }

    /// Primitive context-specific tag, `[number] IMPLICIT` over a primitive type.
    pub const fn context(number: u32) -> Self {
        Self::new(TagClass::ContextSpecific, false, number)
    }

    /// Constructed context-specific tag, used for `EXPLICIT` tagging and for
    /// implicit tagging of SEQUENCE or SET types.
    pub const fn context_constructed(number: u32) -> Self {
        Self::new(TagClass::ContextSpecific, true, number)
    }

    pub const fn application(number: u32, constructed: bool) -> Self {
        Self::new(TagClass::Application, constructed, number)
    }

    pub const fn class(&self) -> TagClass {
        self.class
    }

    pub const fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub const fn number(&self) -> u32 {
        self.number
    }

    pub const fn with_constructed(self, constructed: bool) -> Self {
        Self::new(self.class, constructed, self.number)
    }

    /// Returns the single identifier octet for tag numbers below 31.
    pub const fn identifier_octet(&self) -> Option<u8> {
        if self.number < HIGH_TAG_NUMBER as u32 {
            Some(self.leading_bits() | self.number as u8)
        } else {
            None
        }
    }

    const fn leading_bits(&self) -> u8 {
        let constructed = if self.constructed { CONSTRUCTED } else { 0 };
        self.class.bits() | constructed
    }

    /// Identifier octets, using the high-tag-number form for numbers of 31
    /// and above.
    pub fn to_bytes(&self) -> Vec<u8> {
        if let Some(octet) = self.identifier_octet() {
            return vec![octet];
        }
        let mut number = self.number;
        let mut base128 = vec![(number & 0x7f) as u8];
        number >>= 7;
        while number > 0 {
            base128.push(((number & 0x7f) as u8) | 0x80);
            number >>= 7;
        }
        base128.push(self.leading_bits() | HIGH_TAG_NUMBER);
        base128.reverse();
        base128
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identifier_octet() {
            Some(octet) => write!(f, "0x{octet:02x}"),
            None => {
                let form = if self.constructed {
                    "constructed"
                } else {
                    "primitive"
                };
                write!(f, "[{} {}] {}", self.class, self.number, form)
            }
        }
    }
}

/// UNIVERSAL tag numbers understood by the typed layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniversalTag {
    Boolean = 0x01,
    Integer = 0x02,
    BitString = 0x03,
    OctetString = 0x04,
    Null = 0x05,
    ObjectIdentifier = 0x06,
    Enumerated = 0x0a,
    UTF8String = 0x0c,
    Sequence = 0x10,
    Set = 0x11,
    PrintableString = 0x13,
    IA5String = 0x16,
    UTCTime = 0x17,
    GeneralizedTime = 0x18,
}

impl UniversalTag {
    pub const fn number(self) -> u32 {
        self as u32
    }

    /// The tag in its canonical form: SEQUENCE and SET are constructed,
    /// everything else primitive.
    pub const fn tag(self) -> Tag {
        let constructed = matches!(self, UniversalTag::Sequence | UniversalTag::Set);
        Tag::universal(self as u32, constructed)
    }

    pub fn from_number(number: u32) -> Option<Self> {
        let tag = match number {
            0x01 => UniversalTag::Boolean,
            0x02 => UniversalTag::Integer,
            0x03 => UniversalTag::BitString,
            0x04 => UniversalTag::OctetString,
            0x05 => UniversalTag::Null,
            0x06 => UniversalTag::ObjectIdentifier,
            0x0a => UniversalTag::Enumerated,
            0x0c => UniversalTag::UTF8String,
            0x10 => UniversalTag::Sequence,
            0x11 => UniversalTag::Set,
            0x13 => UniversalTag::PrintableString,
            0x16 => UniversalTag::IA5String,
            0x17 => UniversalTag::UTCTime,
            0x18 => UniversalTag::GeneralizedTime,
            _ => return None,
        };
        Some(tag)
    }
}

impl From<UniversalTag> for Tag {
    fn from(tag: UniversalTag) -> Self {
        tag.tag()
    }
}
