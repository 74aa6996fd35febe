use asn1::schema::{Extensibility, Field, Schema};
use asn1::{Element, OctetString};
use ber::Tag;
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use crate::error::Error;
use crate::{ExtendedValue, decode_failed, sequence_value, value_sequence};

/*
GetSupportedOTPDeliveryMechanismsResult ::= SEQUENCE OF SEQUENCE {
     deliveryMechanism     [0] OCTET STRING,
     isSupported           [1] BOOLEAN OPTIONAL,
     recipientID           [2] OCTET STRING OPTIONAL,
     ... }
*/

const TYPE_DELIVERY_MECHANISM: Tag = Tag::context(0);
const TYPE_IS_SUPPORTED: Tag = Tag::context(1);
const TYPE_RECIPIENT_ID: Tag = Tag::context(2);

static DELIVERY_MECHANISM: Schema = Schema::new(
    "SupportedOTPDeliveryMechanismInfo",
    &[Field::required("deliveryMechanism", TYPE_DELIVERY_MECHANISM)],
    &[
        Field::optional("isSupported", TYPE_IS_SUPPORTED),
        Field::optional("recipientID", TYPE_RECIPIENT_ID),
    ],
    Extensibility::Closed,
);

/// Whether a one-time password delivery mechanism can be used for a user.
///
/// `is_supported` is absent when the server could not tell, and
/// `recipient_id` names where the password would be sent (a phone number or
/// an e-mail address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedOtpDeliveryMechanismInfo {
    pub delivery_mechanism: String,
    pub is_supported: Option<bool>,
    pub recipient_id: Option<String>,
}

impl SupportedOtpDeliveryMechanismInfo {
    pub fn new(
        delivery_mechanism: impl Into<String>,
        is_supported: Option<bool>,
        recipient_id: Option<String>,
    ) -> Self {
        Self {
            delivery_mechanism: delivery_mechanism.into(),
            is_supported,
            recipient_id,
        }
    }
}

impl DecodableFrom<Element> for SupportedOtpDeliveryMechanismInfo {}

impl Decoder<Element, SupportedOtpDeliveryMechanismInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<SupportedOtpDeliveryMechanismInfo, Self::Error> {
        let fields = DELIVERY_MECHANISM.decode(self.as_sequence()?)?;

        let delivery_mechanism: OctetString =
            fields.required(0)?.decode_as(TYPE_DELIVERY_MECHANISM)?;
        let is_supported = fields
            .optional(TYPE_IS_SUPPORTED)
            .map(|e| e.decode_as::<bool>(TYPE_IS_SUPPORTED))
            .transpose()?;
        let recipient_id = fields
            .optional(TYPE_RECIPIENT_ID)
            .map(|e| e.decode_as::<OctetString>(TYPE_RECIPIENT_ID))
            .transpose()?;

        Ok(SupportedOtpDeliveryMechanismInfo {
            delivery_mechanism: delivery_mechanism.as_utf8()?.to_string(),
            is_supported,
            recipient_id: recipient_id
                .as_ref()
                .map(|r| r.as_utf8().map(str::to_string))
                .transpose()?,
        })
    }
}

impl EncodableTo<SupportedOtpDeliveryMechanismInfo> for Element {}

impl Encoder<SupportedOtpDeliveryMechanismInfo, Element> for SupportedOtpDeliveryMechanismInfo {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let mechanism = OctetString::from(self.delivery_mechanism.as_str());
        let is_supported = self
            .is_supported
            .map(|b| Element::implicit(&b, TYPE_IS_SUPPORTED))
            .transpose()?;
        let recipient_id = self
            .recipient_id
            .as_deref()
            .map(|r| Element::implicit(&OctetString::from(r), TYPE_RECIPIENT_ID))
            .transpose()?;

        let children = DELIVERY_MECHANISM
            .encoder()
            .positional(Element::implicit(&mechanism, TYPE_DELIVERY_MECHANISM)?)
            .optional(TYPE_IS_SUPPORTED, is_supported)
            .optional(TYPE_RECIPIENT_ID, recipient_id)
            .finish()?;
        Ok(Element::Sequence(children))
    }
}

/// Value of the get supported OTP delivery mechanisms extended result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetSupportedOtpDeliveryMechanismsResult {
    delivery_mechanisms: Vec<SupportedOtpDeliveryMechanismInfo>,
}

impl GetSupportedOtpDeliveryMechanismsResult {
    pub fn new(delivery_mechanisms: Vec<SupportedOtpDeliveryMechanismInfo>) -> Self {
        Self {
            delivery_mechanisms,
        }
    }

    pub fn delivery_mechanisms(&self) -> &[SupportedOtpDeliveryMechanismInfo] {
        &self.delivery_mechanisms
    }

    pub fn into_delivery_mechanisms(self) -> Vec<SupportedOtpDeliveryMechanismInfo> {
        self.delivery_mechanisms
    }
}

impl ExtendedValue for GetSupportedOtpDeliveryMechanismsResult {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.6.48";
    const NAME: &'static str = "Get Supported OTP Delivery Mechanisms Result";

    fn decode_value(value: Option<&OctetString>) -> Result<Self, Error> {
        let Some(value) = value else {
            return Ok(Self::default());
        };
        let decode = || -> Result<Self, Error> {
            let delivery_mechanisms = value_sequence(value)?
                .iter()
                .map(|e| e.decode())
                .collect::<Result<Vec<SupportedOtpDeliveryMechanismInfo>, Error>>()?;
            Ok(Self::new(delivery_mechanisms))
        };
        decode().map_err(decode_failed::<Self>)
    }

    /// Always carries a value, an empty SEQUENCE when no mechanisms are
    /// listed.
    fn encode_value(&self) -> Result<Option<OctetString>, Error> {
        let children = self
            .delivery_mechanisms
            .iter()
            .map(|m| m.encode())
            .collect::<Result<Vec<Element>, Error>>()?;
        sequence_value(children).map(Some)
    }
}
