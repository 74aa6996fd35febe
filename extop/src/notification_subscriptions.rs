use asn1::schema::{Extensibility, Field, Schema};
use asn1::{Element, OctetString};
use ber::UniversalTag;
use ldapsdk::decoder::{DecodableFrom, Decoder};
use ldapsdk::encoder::{EncodableTo, Encoder};
use serde::Serialize;

use crate::error::Error;
use crate::{ExtendedValue, decode_failed, sequence_value, value_sequence};

/*
ListNotificationSubscriptionsResult ::= SEQUENCE OF SEQUENCE {
     destinationID             OCTET STRING,
     destinationDetails        SEQUENCE OF OCTET STRING,
     subscriptions             SEQUENCE OF SEQUENCE {
          subscriptionID          OCTET STRING,
          subscriptionDetails     SEQUENCE OF OCTET STRING } }
*/

static DESTINATION: Schema = Schema::new(
    "NotificationDestinationDetails",
    &[
        Field::required("destinationID", UniversalTag::OctetString.tag()),
        Field::required("destinationDetails", UniversalTag::Sequence.tag()),
        Field::required("subscriptions", UniversalTag::Sequence.tag()),
    ],
    &[],
    Extensibility::Closed,
);

static SUBSCRIPTION: Schema = Schema::new(
    "NotificationSubscriptionDetails",
    &[
        Field::required("subscriptionID", UniversalTag::OctetString.tag()),
        Field::required("subscriptionDetails", UniversalTag::Sequence.tag()),
    ],
    &[],
    Extensibility::Closed,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationSubscriptionDetails {
    id: String,
    details: Vec<OctetString>,
}

impl NotificationSubscriptionDetails {
    pub fn new(id: impl Into<String>, details: Vec<OctetString>) -> Self {
        Self {
            id: id.into(),
            details,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn details(&self) -> &[OctetString] {
        &self.details
    }
}

/// A notification destination and the subscriptions registered against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationDestinationDetails {
    id: String,
    details: Vec<OctetString>,
    subscriptions: Vec<NotificationSubscriptionDetails>,
}

impl NotificationDestinationDetails {
    pub fn new(
        id: impl Into<String>,
        details: Vec<OctetString>,
        subscriptions: Vec<NotificationSubscriptionDetails>,
    ) -> Self {
        Self {
            id: id.into(),
            details,
            subscriptions,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn details(&self) -> &[OctetString] {
        &self.details
    }

    pub fn subscriptions(&self) -> &[NotificationSubscriptionDetails] {
        &self.subscriptions
    }
}

fn decode_details(element: &Element) -> Result<Vec<OctetString>, Error> {
    Ok(element
        .as_sequence()?
        .iter()
        .map(|e| e.as_primitive::<OctetString>())
        .collect::<Result<Vec<_>, _>>()?)
}

fn encode_details(details: &[OctetString]) -> Element {
    Element::Sequence(details.iter().cloned().map(Element::OctetString).collect())
}

fn decode_id(element: &Element) -> Result<String, Error> {
    Ok(element.as_octet_string()?.as_utf8()?.to_string())
}

impl DecodableFrom<Element> for NotificationSubscriptionDetails {}

impl Decoder<Element, NotificationSubscriptionDetails> for Element {
    type Error = Error;

    fn decode(&self) -> Result<NotificationSubscriptionDetails, Self::Error> {
        let fields = SUBSCRIPTION.decode(self.as_sequence()?)?;
        Ok(NotificationSubscriptionDetails {
            id: decode_id(fields.required(0)?)?,
            details: decode_details(fields.required(1)?)?,
        })
    }
}

impl EncodableTo<NotificationSubscriptionDetails> for Element {}

impl Encoder<NotificationSubscriptionDetails, Element> for NotificationSubscriptionDetails {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let children = SUBSCRIPTION
            .encoder()
            .positional(Element::OctetString(OctetString::from(self.id.as_str())))
            .positional(encode_details(&self.details))
            .finish()?;
        Ok(Element::Sequence(children))
    }
}

impl DecodableFrom<Element> for NotificationDestinationDetails {}

impl Decoder<Element, NotificationDestinationDetails> for Element {
    type Error = Error;

    fn decode(&self) -> Result<NotificationDestinationDetails, Self::Error> {
        let fields = DESTINATION.decode(self.as_sequence()?)?;
        let subscriptions = fields
            .required(2)?
            .as_sequence()?
            .iter()
            .map(|e| e.decode())
            .collect::<Result<Vec<NotificationSubscriptionDetails>, Error>>()?;
        Ok(NotificationDestinationDetails {
            id: decode_id(fields.required(0)?)?,
            details: decode_details(fields.required(1)?)?,
            subscriptions,
        })
    }
}

impl EncodableTo<NotificationDestinationDetails> for Element {}

impl Encoder<NotificationDestinationDetails, Element> for NotificationDestinationDetails {
    type Error = Error;

    fn encode(&self) -> Result<Element, Self::Error> {
        let subscriptions = self
            .subscriptions
            .iter()
            .map(|s| s.encode())
            .collect::<Result<Vec<Element>, Error>>()?;
        let children = DESTINATION
            .encoder()
            .positional(Element::OctetString(OctetString::from(self.id.as_str())))
            .positional(encode_details(&self.details))
            .positional(Element::Sequence(subscriptions))
            .finish()?;
        Ok(Element::Sequence(children))
    }
}

/// Value of the list notification subscriptions extended result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListNotificationSubscriptionsResult {
    destinations: Vec<NotificationDestinationDetails>,
}

impl ListNotificationSubscriptionsResult {
    pub fn new(destinations: Vec<NotificationDestinationDetails>) -> Self {
        Self { destinations }
    }

    pub fn destinations(&self) -> &[NotificationDestinationDetails] {
        &self.destinations
    }
}

impl ExtendedValue for ListNotificationSubscriptionsResult {
    const OID: &'static str = "1.3.6.1.4.1.30221.2.6.41";
    const NAME: &'static str = "List Notification Subscriptions Result";

    fn decode_value(value: Option<&OctetString>) -> Result<Self, Error> {
        let Some(value) = value else {
            return Ok(Self::default());
        };
        let decode = || -> Result<Self, Error> {
            let destinations = value_sequence(value)?
                .iter()
                .map(|e| e.decode())
                .collect::<Result<Vec<NotificationDestinationDetails>, Error>>()?;
            Ok(Self::new(destinations))
        };
        decode().map_err(decode_failed::<Self>)
    }

    /// No value is sent when there are no destinations.
    fn encode_value(&self) -> Result<Option<OctetString>, Error> {
        if self.destinations.is_empty() {
            return Ok(None);
        }
        let children = self
            .destinations
            .iter()
            .map(|d| d.encode())
            .collect::<Result<Vec<Element>, Error>>()?;
        sequence_value(children).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use asn1::{Element, OctetString};
    use rstest::rstest;

    use super::*;

    fn sample() -> ListNotificationSubscriptionsResult {
        ListNotificationSubscriptionsResult::new(vec![
            NotificationDestinationDetails::new(
                "dest1",
                vec![OctetString::from("dest1-detail1"), OctetString::from("dest1-detail2")],
                vec![
                    NotificationSubscriptionDetails::new(
                        "sub1",
                        vec![OctetString::from("sub1-detail")],
                    ),
                    NotificationSubscriptionDetails::new("sub2", vec![]),
                ],
            ),
            NotificationDestinationDetails::new("dest2", vec![], vec![]),
        ])
    }

    #[test]
    fn test_encode_decode() {
        let result = sample();
        let value = result.encode_value().unwrap().unwrap();
        let decoded = ListNotificationSubscriptionsResult::decode_value(Some(&value)).unwrap();
        assert_eq!(decoded, result);

        let dest = &decoded.destinations()[0];
        assert_eq!(dest.id(), "dest1");
        assert_eq!(dest.details().len(), 2);
        assert_eq!(dest.subscriptions()[0].id(), "sub1");
        assert_eq!(dest.subscriptions()[0].details()[0].as_bytes(), b"sub1-detail");
        assert!(dest.subscriptions()[1].details().is_empty());
    }

    #[test]
    fn test_encoded_layout() {
        let result = ListNotificationSubscriptionsResult::new(vec![
            NotificationDestinationDetails::new(
                "d",
                vec![OctetString::from("x")],
                vec![NotificationSubscriptionDetails::new("s", vec![])],
            ),
        ]);
        let value = result.encode_value().unwrap().unwrap();
        assert_eq!(
            value.as_bytes(),
            &[
                0x30, 0x13, // destinations
                0x30, 0x11, // destination
                0x04, 0x01, b'd', // id
                0x30, 0x03, 0x04, 0x01, b'x', // details
                0x30, 0x07, // subscriptions
                0x30, 0x05, 0x04, 0x01, b's', 0x30, 0x00,
            ]
        );
    }

    #[test]
    fn test_empty() {
        let result = ListNotificationSubscriptionsResult::decode_value(None).unwrap();
        assert!(result.destinations().is_empty());
        assert!(result.encode_value().unwrap().is_none());

        let empty = OctetString::from(vec![0x30, 0x00]);
        let result = ListNotificationSubscriptionsResult::decode_value(Some(&empty)).unwrap();
        assert!(result.destinations().is_empty());
    }

    #[rstest]
    #[case::missing_subscriptions(
        Element::Sequence(vec![
            Element::OctetString(OctetString::from("d")),
            Element::Sequence(vec![]),
        ]),
        "MissingField"
    )]
    #[case::extra_element(
        Element::Sequence(vec![
            Element::OctetString(OctetString::from("d")),
            Element::Sequence(vec![]),
            Element::Sequence(vec![]),
            Element::Null,
        ]),
        "UnexpectedField"
    )]
    #[case::detail_not_octet_string(
        Element::Sequence(vec![
            Element::OctetString(OctetString::from("d")),
            Element::Sequence(vec![Element::Null]),
            Element::Sequence(vec![]),
        ]),
        "UnexpectedTag"
    )]
    #[case::bad_subscription(
        Element::Sequence(vec![
            Element::OctetString(OctetString::from("d")),
            Element::Sequence(vec![]),
            Element::Sequence(vec![Element::Sequence(vec![Element::OctetString(OctetString::from("s"))])]),
        ]),
        "MissingField"
    )]
    #[case::id_not_utf8(
        Element::Sequence(vec![
            Element::OctetString(OctetString::from(vec![0xc3, 0x28])),
            Element::Sequence(vec![]),
            Element::Sequence(vec![]),
        ]),
        "InvalidUtf8"
    )]
    fn test_decode_error(#[case] destination: Element, #[case] expected: &str) {
        let value = OctetString::from(Element::Sequence(vec![destination]).to_der().unwrap());
        let err = ListNotificationSubscriptionsResult::decode_value(Some(&value)).unwrap_err();
        assert!(
            format!("{:?}", err).contains(expected),
            "expected {expected}, got {err:?}"
        );
    }
}
