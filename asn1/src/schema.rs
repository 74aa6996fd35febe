//! Tagged-field dispatch for SEQUENCE types.
//!
//! A [`Schema`] lists the positional fields of a SEQUENCE, consumed in
//! order from the front, followed by the optional fields, each identified
//! by a unique tag and accepted in any order. Decoding stops at the first
//! violation. Encoding emits positional fields in declaration order and
//! optional fields in schema order, whatever order they were supplied in.
//!
//! ```text
//! DeliveryMechanism ::= SEQUENCE {
//!      deliveryMechanism     [0] OCTET STRING,     -- positional
//!      isSupported           [1] BOOLEAN OPTIONAL, -- dispatched by tag
//!      recipientID           [2] OCTET STRING OPTIONAL }
//! ```

use ber::Tag;

use crate::Element;
use crate::error::Error;

/// What to do with a trailing element whose tag no optional field claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extensibility {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    /// Present only when the next element carries the field's tag, such as
    /// `version [0] EXPLICIT Version DEFAULT v1`.
    Defaulted,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    name: &'static str,
    tag: Option<Tag>,
    presence: Presence,
}

impl Field {
    pub const fn required(name: &'static str, tag: Tag) -> Self {
        Self {
            name,
            tag: Some(tag),
            presence: Presence::Required,
        }
    }

    /// Required positional field whose tag varies, such as a CHOICE.
    pub const fn any(name: &'static str) -> Self {
        Self {
            name,
            tag: None,
            presence: Presence::Required,
        }
    }

    pub const fn defaulted(name: &'static str, tag: Tag) -> Self {
        Self {
            name,
            tag: Some(tag),
            presence: Presence::Defaulted,
        }
    }

    pub const fn optional(name: &'static str, tag: Tag) -> Self {
        Self {
            name,
            tag: Some(tag),
            presence: Presence::Defaulted,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn accepts(&self, tag: Tag) -> bool {
        self.tag.is_none_or(|expected| expected == tag)
    }
}

#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    positional: &'static [Field],
    optional: &'static [Field],
    extensibility: Extensibility,
}

impl Schema {
    pub const fn new(
        name: &'static str,
        positional: &'static [Field],
        optional: &'static [Field],
        extensibility: Extensibility,
    ) -> Self {
        Self {
            name,
            positional,
            optional,
            extensibility,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decode<'a>(&'a self, elements: &'a [Element]) -> Result<Fields<'a>, Error> {
        let mut rest = elements.iter().peekable();

        let mut positional = Vec::with_capacity(self.positional.len());
        for field in self.positional {
            let next_tag = rest.peek().map(|element| element.tag());
            match next_tag {
                Some(tag) if field.accepts(tag) => positional.push(rest.next()),
                _ if field.presence == Presence::Defaulted => positional.push(None),
                Some(tag) => {
                    return Err(Error::FieldTagMismatch {
                        schema: self.name,
                        field: field.name,
                        expected: field.tag.unwrap_or(tag),
                        actual: tag,
                    });
                }
                None => {
                    return Err(Error::MissingField {
                        schema: self.name,
                        field: field.name,
                    });
                }
            }
        }

        let mut optional = vec![None; self.optional.len()];
        for element in rest {
            let tag = element.tag();
            match self.optional.iter().position(|field| field.accepts(tag)) {
                Some(index) => {
                    if optional[index].is_some() {
                        return Err(Error::DuplicateField {
                            schema: self.name,
                            tag,
                        });
                    }
                    optional[index] = Some(element);
                }
                None if self.extensibility == Extensibility::Open => {}
                None => {
                    return Err(Error::UnexpectedField {
                        schema: self.name,
                        tag,
                    });
                }
            }
        }

        Ok(Fields {
            schema: self,
            positional,
            optional,
        })
    }

    pub fn encoder(&self) -> FieldsEncoder<'_> {
        FieldsEncoder {
            schema: self,
            positional: Vec::with_capacity(self.positional.len()),
            optional: Vec::new(),
        }
    }
}

/// Fields matched by [`Schema::decode`].
#[derive(Debug)]
pub struct Fields<'a> {
    schema: &'a Schema,
    positional: Vec<Option<&'a Element>>,
    optional: Vec<Option<&'a Element>>,
}

impl<'a> Fields<'a> {
    /// Positional field `index`, absent when it is a defaulted field that
    /// was not encoded.
    pub fn positional(&self, index: usize) -> Option<&'a Element> {
        self.positional.get(index).copied().flatten()
    }

    pub fn required(&self, index: usize) -> Result<&'a Element, Error> {
        self.positional(index).ok_or_else(|| Error::MissingField {
            schema: self.schema.name,
            field: self
                .schema
                .positional
                .get(index)
                .map_or("?", |field| field.name),
        })
    }

    pub fn optional(&self, tag: Tag) -> Option<&'a Element> {
        let index = self
            .schema
            .optional
            .iter()
            .position(|field| field.tag == Some(tag))?;
        self.optional[index]
    }
}

/// Collects field values and lays them out in schema order.
#[derive(Debug)]
pub struct FieldsEncoder<'a> {
    schema: &'a Schema,
    positional: Vec<Option<Element>>,
    optional: Vec<(Tag, Element)>,
}

impl FieldsEncoder<'_> {
    /// Supplies the next positional field. `None` omits a defaulted field.
    pub fn positional(mut self, element: impl Into<Option<Element>>) -> Self {
        self.positional.push(element.into());
        self
    }

    /// Supplies the optional field identified by `tag`; `None` leaves it out.
    pub fn optional(mut self, tag: Tag, element: Option<Element>) -> Self {
        if let Some(element) = element {
            self.optional.push((tag, element));
        }
        self
    }

    pub fn finish(self) -> Result<Vec<Element>, Error> {
        let schema = self.schema;
        let mut out = Vec::with_capacity(self.positional.len() + self.optional.len());

        let mut supplied = self.positional.into_iter();
        for field in schema.positional {
            match supplied.next().flatten() {
                Some(element) => {
                    if !field.accepts(element.tag()) {
                        return Err(Error::FieldTagMismatch {
                            schema: schema.name,
                            field: field.name,
                            expected: field.tag.unwrap_or(element.tag()),
                            actual: element.tag(),
                        });
                    }
                    out.push(element);
                }
                None if field.presence == Presence::Defaulted => {}
                None => {
                    return Err(Error::MissingField {
                        schema: schema.name,
                        field: field.name,
                    });
                }
            }
        }

        let mut slots: Vec<Option<Element>> = vec![None; schema.optional.len()];
        for (tag, element) in self.optional {
            let index = schema
                .optional
                .iter()
                .position(|field| field.tag == Some(tag))
                .ok_or(Error::FieldNotInSchema {
                    schema: schema.name,
                    tag,
                })?;
            if element.tag() != tag {
                return Err(Error::FieldTagMismatch {
                    schema: schema.name,
                    field: schema.optional[index].name,
                    expected: tag,
                    actual: element.tag(),
                });
            }
            if slots[index].is_some() {
                return Err(Error::DuplicateField {
                    schema: schema.name,
                    tag,
                });
            }
            slots[index] = Some(element);
        }
        out.extend(slots.into_iter().flatten());
        Ok(out)
    }
}
