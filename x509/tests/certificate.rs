use asn1::{BitString, Element, Integer, ObjectIdentifier, OctetString};
use chrono::NaiveDate;
use ldapsdk::encoder::Encoder;
use ldapsdk::error::ErrorKind;
use num_bigint::BigUint;
use x509::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, CRLDistributionPoints, DistributionPoint,
    ExtendedKeyUsage, GeneralName, IssuerAltName, KeyUsage, SubjectAltName, SubjectKeyIdentifier,
};
use x509::{
    AlgorithmIdentifier, AlgorithmParameters, Certificate, CertificateExtension, DecodeOptions,
    EllipticCurvePublicKey, Name, PublicKey, SubjectPublicKeyInfo, Validity, Version,
    extensions::ExtensionValue,
};

fn oid(s: &str) -> ObjectIdentifier {
    s.parse().unwrap()
}

fn sha256_with_ecdsa() -> AlgorithmIdentifier {
    AlgorithmIdentifier::new_with_params(oid("1.2.840.10045.4.3.2"), AlgorithmParameters::Null)
}

fn ec_key_info() -> SubjectPublicKeyInfo {
    let algorithm = AlgorithmIdentifier::new_with_params(
        oid("1.2.840.10045.2.1"),
        AlgorithmParameters::Elm(Element::ObjectIdentifier(oid("1.2.840.10045.3.1.7"))),
    );
    let key = EllipticCurvePublicKey::uncompressed(1234567890u64, 9876543210u64);
    SubjectPublicKeyInfo::from_public_key(algorithm, PublicKey::EllipticCurve(key)).unwrap()
}

fn all_extensions() -> Vec<CertificateExtension> {
    vec![
        CertificateExtension::generic(oid("1.2.3.4"), true, "foo"),
        CertificateExtension::new(
            false,
            AuthorityKeyIdentifier::with_key_identifier("authority-key-identifier"),
        )
        .unwrap(),
        CertificateExtension::new(false, BasicConstraints::new(false, None)).unwrap(),
        CertificateExtension::new(
            false,
            CRLDistributionPoints::new(vec![DistributionPoint::full_name(vec![
                GeneralName::dns_name("crl.example.com"),
            ])]),
        )
        .unwrap(),
        CertificateExtension::new(
            false,
            ExtendedKeyUsage::new(vec![oid("1.3.6.1.5.5.7.3.1"), oid("1.3.6.1.5.5.7.3.2")]),
        )
        .unwrap(),
        CertificateExtension::new(
            false,
            IssuerAltName::new(vec![GeneralName::dns_name("issuer.example.com")]),
        )
        .unwrap(),
        CertificateExtension::new(false, KeyUsage::all()).unwrap(),
        CertificateExtension::new(
            false,
            SubjectAltName::new(vec![GeneralName::dns_name("ldap.example.com")]),
        )
        .unwrap(),
        CertificateExtension::new(false, SubjectKeyIdentifier::new("subject-key-identifier"))
            .unwrap(),
    ]
}

fn ec_certificate(extensions: Vec<CertificateExtension>) -> Certificate {
    let not_before = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let not_after = NaiveDate::from_ymd_opt(2034, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let tbs = x509::TBSCertificate {
        version: Version::V3,
        serial_number: Integer::from(987654321u32),
        signature: sha256_with_ecdsa(),
        issuer: Name::from_attributes(&[("CN", "Issuer"), ("O", "Example Corp"), ("C", "US")])
            .unwrap(),
        validity: Validity::new(not_before, not_after),
        subject: Name::from_attributes(&[
            ("CN", "ldap.example.com"),
            ("O", "Example Corp"),
            ("C", "US"),
        ])
        .unwrap(),
        subject_public_key_info: ec_key_info(),
        issuer_unique_id: Some(BitString::from_bits(&[true, false, true, false, true])),
        subject_unique_id: Some(BitString::from_bits(&[false, true, false, true, false])),
        extensions,
    };
    Certificate::new(tbs, BitString::from_bits(&[true; 24]))
}

#[test]
fn v3_ec_certificate_with_all_extensions() {
    let der = ec_certificate(all_extensions()).to_der().unwrap();
    let cert = Certificate::from_der(&der).unwrap();

    assert_eq!(cert.version(), Version::V3);
    assert_eq!(cert.serial_number(), &Integer::from(987654321u32));
    assert_eq!(cert.signature_algorithm_name_or_oid(), "SHA256withECDSA");
    assert_eq!(
        cert.signature_algorithm().parameters(),
        Some(&AlgorithmParameters::Null)
    );
    assert_eq!(cert.issuer().to_string(), "CN=Issuer,O=Example Corp,C=US");
    assert_eq!(
        cert.subject().to_string(),
        "CN=ldap.example.com,O=Example Corp,C=US"
    );
    assert_eq!(cert.not_before().to_string(), "2024-01-01 00:00:00");

    assert_eq!(cert.public_key_algorithm_name_or_oid(), "EC");
    assert_eq!(
        cert.subject_public_key_info().algorithm().named_curve_name(),
        Some("secp256r1")
    );
    let Some(PublicKey::EllipticCurve(key)) = cert.decoded_public_key() else {
        panic!("expected an EC key, got {:?}", cert.decoded_public_key());
    };
    assert!(!key.is_compressed());
    assert_eq!(key.x(), &BigUint::from(1234567890u64));
    assert_eq!(key.y(), Some(&BigUint::from(9876543210u64)));

    assert_eq!(
        cert.issuer_unique_id().unwrap().to_bits(),
        vec![true, false, true, false, true]
    );
    assert_eq!(
        cert.subject_unique_id().unwrap().to_bits(),
        vec![false, true, false, true, false]
    );

    let extensions = cert.extensions();
    assert_eq!(extensions.len(), 9);
    assert_eq!(extensions[0].oid(), &oid("1.2.3.4"));
    assert!(extensions[0].is_critical());
    assert_eq!(
        extensions[0].value(),
        &ExtensionValue::Generic(OctetString::from("foo"))
    );
    assert!(extensions[1..].iter().all(|ext| !ext.is_critical() && !ext.is_generic()));
    let names = extensions[1..]
        .iter()
        .map(|ext| ext.name().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "authorityKeyIdentifier",
            "basicConstraints",
            "cRLDistributionPoints",
            "extKeyUsage",
            "issuerAltName",
            "keyUsage",
            "subjectAltName",
            "subjectKeyIdentifier",
        ]
    );

    let aki = cert.extension::<AuthorityKeyIdentifier>().unwrap();
    assert_eq!(
        aki.key_identifier,
        Some(OctetString::from("authority-key-identifier"))
    );
    let bc = cert.extension::<BasicConstraints>().unwrap();
    assert!(!bc.ca);
    assert_eq!(bc.path_len_constraint, None);
    let crldp = cert.extension::<CRLDistributionPoints>().unwrap();
    assert_eq!(
        crldp.distribution_points,
        vec![DistributionPoint::full_name(vec![GeneralName::dns_name(
            "crl.example.com"
        )])]
    );
    let eku = cert.extension::<ExtendedKeyUsage>().unwrap();
    assert_eq!(eku.purpose_names(), vec!["serverAuth", "clientAuth"]);
    let ian = cert.extension::<IssuerAltName>().unwrap();
    assert_eq!(ian.names, vec![GeneralName::dns_name("issuer.example.com")]);
    assert_eq!(cert.extension::<KeyUsage>().unwrap(), &KeyUsage::all());
    let san = cert.extension::<SubjectAltName>().unwrap();
    assert_eq!(san.dns_names(), vec!["ldap.example.com"]);
    let ski = cert.extension::<SubjectKeyIdentifier>().unwrap();
    assert_eq!(
        ski.key_identifier,
        OctetString::from("subject-key-identifier")
    );

    // encoding the decoded certificate gives back the same bytes
    assert_eq!(cert.to_der().unwrap(), der);
}

#[test]
fn certificate_serializes_to_json() {
    let cert = ec_certificate(all_extensions());
    let json = serde_json::to_value(&cert).unwrap();
    let tbs = &json["tbs_certificate"];
    assert_eq!(tbs["version"], "V3");
    assert_eq!(tbs["serial_number"], "987654321");
    assert_eq!(tbs["signature"]["algorithm"], "SHA256withECDSA");
    assert_eq!(tbs["subject_public_key_info"]["algorithm"]["parameters"], "secp256r1");
    assert_eq!(tbs["extensions"][0]["oid"], "1.2.3.4");
    assert_eq!(tbs["extensions"].as_array().unwrap().len(), 9);
}

#[test]
fn signature_algorithm_mismatch_is_rejected() {
    let cert = ec_certificate(Vec::new());
    let Element::Sequence(mut elements) = cert.encode().unwrap() else {
        panic!("certificate must encode as a SEQUENCE");
    };
    let sha256_with_rsa = AlgorithmIdentifier::new_with_params(
        oid("1.2.840.113549.1.1.11"),
        AlgorithmParameters::Null,
    );
    elements[1] = sha256_with_rsa.encode().unwrap();
    let der = Element::Sequence(elements).to_der().unwrap();

    let err = Certificate::from_der(&der).unwrap_err();
    assert!(format!("{:?}", err).contains("SignatureAlgorithmMismatch"));
    assert_eq!(err.kind(), ErrorKind::CrossCheck);
}

#[test]
fn malformed_basic_constraints_depends_on_policy() {
    let empty_basic_constraints = CertificateExtension::generic(oid("2.5.29.19"), true, Vec::<u8>::new());
    let der = ec_certificate(vec![empty_basic_constraints])
        .to_der()
        .unwrap();

    let err = Certificate::from_der(&der).unwrap_err();
    assert!(format!("{:?}", err).contains("InvalidExtension"));
    assert!(format!("{:?}", err).contains("EmptyValue(BasicConstraints)"));
    assert_eq!(err.kind(), ErrorKind::Shape);

    let cert = Certificate::decode_with(&der, &DecodeOptions::lenient()).unwrap();
    let extension = &cert.extensions()[0];
    assert!(extension.is_generic());
    assert!(extension.is_critical());
    assert_eq!(extension.name(), Some("basicConstraints"));
    assert!(cert.extension::<BasicConstraints>().is_none());
    assert_eq!(cert.to_der().unwrap(), der);
}

#[test]
fn truncated_certificate_is_a_framing_error() {
    let der = ec_certificate(all_extensions()).to_der().unwrap();
    let err = Certificate::from_der(&der[..der.len() - 1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Framing);
}

#[test]
fn oversized_input_is_rejected_before_parsing() {
    let options = DecodeOptions::default().with_max_encoded_len(16);
    let err = Certificate::decode_with(&[0u8; 17], &options).unwrap_err();
    assert!(format!("{:?}", err).contains("TooLarge"));
    assert_eq!(err.kind(), ErrorKind::Framing);
}
