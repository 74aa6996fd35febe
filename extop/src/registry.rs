//! Lookup of value codecs by the OID of the extended request or result.

use asn1::OctetString;
use serde::Serialize;

use crate::error::Error;
use crate::{
    ExtendedValue, GetSupportedOtpDeliveryMechanismsResult,
    IdentifyBackupCompatibilityProblemsRequest, ListNotificationSubscriptionsResult,
};

/// A decoded value whose OID is in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum KnownValue {
    GetSupportedOtpDeliveryMechanisms(GetSupportedOtpDeliveryMechanismsResult),
    IdentifyBackupCompatibilityProblems(IdentifyBackupCompatibilityProblemsRequest),
    ListNotificationSubscriptions(ListNotificationSubscriptionsResult),
}

impl KnownValue {
    pub fn oid(&self) -> &'static str {
        match self {
            KnownValue::GetSupportedOtpDeliveryMechanisms(_) => {
                GetSupportedOtpDeliveryMechanismsResult::OID
            }
            KnownValue::IdentifyBackupCompatibilityProblems(_) => {
                IdentifyBackupCompatibilityProblemsRequest::OID
            }
            KnownValue::ListNotificationSubscriptions(_) => ListNotificationSubscriptionsResult::OID,
        }
    }

    pub fn encode_value(&self) -> Result<Option<OctetString>, Error> {
        match self {
            KnownValue::GetSupportedOtpDeliveryMechanisms(v) => v.encode_value(),
            KnownValue::IdentifyBackupCompatibilityProblems(v) => v.encode_value(),
            KnownValue::ListNotificationSubscriptions(v) => v.encode_value(),
        }
    }
}

/// Display name of a registered OID.
pub fn name_for_oid(oid: &str) -> Option<&'static str> {
    match oid {
        GetSupportedOtpDeliveryMechanismsResult::OID => {
            Some(GetSupportedOtpDeliveryMechanismsResult::NAME)
        }
        IdentifyBackupCompatibilityProblemsRequest::OID => {
            Some(IdentifyBackupCompatibilityProblemsRequest::NAME)
        }
        ListNotificationSubscriptionsResult::OID => Some(ListNotificationSubscriptionsResult::NAME),
        _ => None,
    }
}

/// Decodes `value` with the codec registered for `oid`.
///
/// Returns `Ok(None)` for an OID with no registered codec; the caller keeps
/// such values as raw octets.
pub fn decode(oid: &str, value: Option<&OctetString>) -> Result<Option<KnownValue>, Error> {
    let known = match oid {
        GetSupportedOtpDeliveryMechanismsResult::OID => KnownValue::GetSupportedOtpDeliveryMechanisms(
            GetSupportedOtpDeliveryMechanismsResult::decode_value(value)?,
        ),
        IdentifyBackupCompatibilityProblemsRequest::OID => {
            KnownValue::IdentifyBackupCompatibilityProblems(
                IdentifyBackupCompatibilityProblemsRequest::decode_value(value)?,
            )
        }
        ListNotificationSubscriptionsResult::OID => KnownValue::ListNotificationSubscriptions(
            ListNotificationSubscriptionsResult::decode_value(value)?,
        ),
        _ => return Ok(None),
    };
    Ok(Some(known))
}

/// Like [`decode`], refusing values longer than `limit` octets before any
/// parsing.
pub fn decode_with_limit(
    oid: &str,
    value: Option<&OctetString>,
    limit: usize,
) -> Result<Option<KnownValue>, Error> {
    if let Some(value) = value.filter(|v| v.as_bytes().len() > limit) {
        return Err(Error::ValueTooLarge {
            name: name_for_oid(oid).unwrap_or("extended value"),
            len: value.as_bytes().len(),
            limit,
        });
    }
    decode(oid, value)
}
