use asn1::schema::{Extensibility, Field, Schema};
use asn1::{Element, OctetString};
use ber::Tag;
use serde::Serialize;

use crate::error::Error;
use crate::{ExtendedValue, decode_failed, sequence_value, value_sequence};

/*
IdentifyBackupCompatibilityProblemsRequest ::= SEQUENCE {
     sourceDescriptor     [0] OCTET STRING,
     targetDescriptor     [1] OCTET STRING }
*/

const TYPE_SOURCE_DESCRIPTOR: Tag = Tag::context(0);
const TYPE_TARGET_DESCRIPTOR: Tag = Tag::context(1);

static BACKUP_COMPATIBILITY: Schema = Schema::new(
    "IdentifyBackupCompatibilityProblemsRequest",
    &[
        Field::required("sourceDescriptor", TYPE_SOURCE_DESCRIPTOR),
        Field::required("targetDescriptor", TYPE_TARGET_DESCRIPTOR),
    ],
    &[],
    Extensibility::Closed,
);

/// Asks the server whether a backup taken with the source descriptor can be
/// restored into the server described by the target descriptor.
///
/// Both descriptors are opaque blobs obtained from earlier operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifyBackupCompatibilityProblemsRequest {
    source_descriptor: OctetString,
    target_descriptor: OctetString,
}

impl IdentifyBackupCompatibilityProblemsRequest {
    pub fn new(
        source_descriptor: impl Into<OctetString>,
        target_descriptor: impl Into<OctetString>,
    ) -> Self {
        Self {
            source_descriptor: source_descriptor.into(),
            target_descriptor: target_descriptor.into(),
        }
    }

    pub fn source_descriptor(&self) -> &OctetString {
        &self.source_descriptor
    }

    pub fn target_descriptor(&self) -> &OctetString {
        &self.target_descriptor
    }
}

impl ExtendedValue for IdentifyBackupCompatibilityProblemsRequest {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.6.32";
    const NAME: &'static str = "Identify Backup Compatibility Problems Request";

    fn decode_value(value: Option<&OctetString>) -> Result<Self, Error> {
        let decode = || -> Result<Self, Error> {
            let value = value.ok_or(Error::MissingValue(Self::NAME))?;
            let children = value_sequence(value)?;
            let fields = BACKUP_COMPATIBILITY.decode(&children)?;
            Ok(Self {
                source_descriptor: fields.required(0)?.decode_as(TYPE_SOURCE_DESCRIPTOR)?,
                target_descriptor: fields.required(1)?.decode_as(TYPE_TARGET_DESCRIPTOR)?,
            })
        };
        decode().map_err(decode_failed::<Self>)
    }

    fn encode_value(&self) -> Result<Option<OctetString>, Error> {
        let children = BACKUP_COMPATIBILITY
            .encoder()
            .positional(Element::implicit(&self.source_descriptor, TYPE_SOURCE_DESCRIPTOR)?)
            .positional(Element::implicit(&self.target_descriptor, TYPE_TARGET_DESCRIPTOR)?)
            .finish()?;
        sequence_value(children).map(Some)
    }
}
