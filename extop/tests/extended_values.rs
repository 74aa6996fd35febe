use asn1::{Element, OctetString};
use ber::Tag;
use extop::{
    ExtendedValue, GetSupportedOtpDeliveryMechanismsResult,
    IdentifyBackupCompatibilityProblemsRequest, KnownValue, SupportedOtpDeliveryMechanismInfo,
    registry,
};
use ldapsdk::error::ErrorKind;

#[test]
fn delivery_mechanisms_survive_encode_and_decode() {
    let result = GetSupportedOtpDeliveryMechanismsResult::new(vec![
        SupportedOtpDeliveryMechanismInfo::new(
            "SMS",
            Some(true),
            Some("123-456-7890".to_string()),
        ),
        SupportedOtpDeliveryMechanismInfo::new("E-Mail", Some(false), None),
    ]);

    let value = result.encode_value().unwrap().unwrap();
    let decoded = GetSupportedOtpDeliveryMechanismsResult::decode_value(Some(&value)).unwrap();

    let mechanisms = decoded.delivery_mechanisms();
    assert_eq!(mechanisms.len(), 2);
    assert_eq!(mechanisms[0].delivery_mechanism, "SMS");
    assert_eq!(mechanisms[0].is_supported, Some(true));
    assert_eq!(mechanisms[0].recipient_id.as_deref(), Some("123-456-7890"));
    assert_eq!(mechanisms[1].delivery_mechanism, "E-Mail");
    assert_eq!(mechanisms[1].is_supported, Some(false));
    assert_eq!(mechanisms[1].recipient_id, None);
    assert_eq!(decoded, result);
}

fn backup_request_value(extra: Option<Element>) -> OctetString {
    let mut children = vec![
        Element::implicit(&OctetString::from("source"), Tag::context(0)).unwrap(),
        Element::implicit(&OctetString::from("target"), Tag::context(1)).unwrap(),
    ];
    children.extend(extra);
    OctetString::from(Element::Sequence(children).to_der().unwrap())
}

#[test]
fn backup_request_requires_exactly_two_descriptors() {
    let value = backup_request_value(None);
    let request = IdentifyBackupCompatibilityProblemsRequest::decode_value(Some(&value)).unwrap();
    assert_eq!(request.source_descriptor().as_utf8().unwrap(), "source");
    assert_eq!(request.target_descriptor().as_utf8().unwrap(), "target");

    let third = Element::implicit(&OctetString::from("other"), Tag::context(3)).unwrap();
    let value = backup_request_value(Some(third));
    let err = IdentifyBackupCompatibilityProblemsRequest::decode_value(Some(&value)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn registry_dispatches_by_oid() {
    let value = backup_request_value(None);
    let known = registry::decode("1.3.6.1.4.1.30221.2.6.32", Some(&value))
        .unwrap()
        .unwrap();
    match known {
        KnownValue::IdentifyBackupCompatibilityProblems(request) => {
            assert_eq!(request.source_descriptor().as_bytes(), b"source");
        }
        other => panic!("unexpected value {other:?}"),
    }

    let known = registry::decode("1.3.6.1.4.1.30221.2.6.48", None)
        .unwrap()
        .unwrap();
    assert_eq!(known.oid(), GetSupportedOtpDeliveryMechanismsResult::OID);
}
