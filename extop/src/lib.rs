//! Codecs for the values carried by vendor LDAP extended requests and
//! results.
//!
//! An extended operation value is an OCTET STRING whose content is itself a
//! BER encoded element, usually a SEQUENCE. Each type here reads and writes
//! that content; the LDAP message that carries it is handled elsewhere.
//!
//! ```
//! use extop::{ExtendedValue, GetSupportedOtpDeliveryMechanismsResult};
//!
//! let result = GetSupportedOtpDeliveryMechanismsResult::decode_value(None).unwrap();
//! assert!(result.delivery_mechanisms().is_empty());
//! ```

#![forbid(unsafe_code)]

use asn1::{Element, OctetString};
use tracing::debug;

mod backup_compatibility;
mod delivery_mechanism;
pub mod error;
mod get_configuration_type;
mod notification_subscriptions;
pub mod registry;

pub use backup_compatibility::IdentifyBackupCompatibilityProblemsRequest;
pub use delivery_mechanism::{GetSupportedOtpDeliveryMechanismsResult, SupportedOtpDeliveryMechanismInfo};
pub use error::Error;
pub use get_configuration_type::GetConfigurationType;
pub use notification_subscriptions::{
    ListNotificationSubscriptionsResult, NotificationDestinationDetails,
    NotificationSubscriptionDetails,
};
pub use registry::KnownValue;

/// A typed extended request or result value.
pub trait ExtendedValue: Sized {
    /// The OID of the request or result that carries this value.
    const OID: &'static str;
    const NAME: &'static str;

    /// Decodes the value of an extended request or result. `None` means the
    /// operation carried no value at all.
    fn decode_value(value: Option<&OctetString>) -> Result<Self, Error>;

    /// `None` when the operation should be sent without a value.
    fn encode_value(&self) -> Result<Option<OctetString>, Error>;
}

/// Reads the content of `value` as exactly one SEQUENCE and returns its
/// children.
pub(crate) fn value_sequence(value: &OctetString) -> Result<Vec<Element>, Error> {
    match Element::from_ber(value.as_bytes())? {
        Element::Sequence(children) => Ok(children),
        other => Err(asn1::Error::UnexpectedElement {
            expected: "SEQUENCE",
            actual: other.tag(),
        }
        .into()),
    }
}

pub(crate) fn sequence_value(children: Vec<Element>) -> Result<OctetString, Error> {
    Ok(OctetString::from(Element::Sequence(children).to_der()?))
}

/// Names the failing value and logs the failure before returning it.
pub(crate) fn decode_failed<T: ExtendedValue>(err: Error) -> Error {
    let err = err.in_value(T::NAME);
    debug!("failed to decode {} ({}): {}", T::NAME, T::OID, err);
    err
}
