//! Conventional names for well-known OIDs.

use asn1::ObjectIdentifier;

/// Types whose OID has a conventional name, such as `secp256r1` for
/// `1.2.840.10045.3.1.7`.
pub trait OidName {
    fn oid_name(&self) -> Option<&'static str>;
}

/// Dotted OID paired with its conventional name.
pub(crate) type OidTable = [(&'static str, &'static str)];

pub(crate) fn name_of(table: &OidTable, oid: &ObjectIdentifier) -> Option<&'static str> {
    table
        .iter()
        .find(|(dotted, _)| *oid == *dotted)
        .map(|(_, name)| *name)
}

/// Names compare case-insensitively.
pub(crate) fn oid_of(table: &OidTable, name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(name))
        .map(|(dotted, _)| *dotted)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{OidTable, name_of, oid_of};

    static TABLE: &OidTable = &[("2.5.4.3", "CN"), ("2.5.4.10", "O")];

    #[rstest]
    #[case("2.5.4.3", Some("CN"))]
    #[case("2.5.4.10", Some("O"))]
    #[case("2.5.4.100", None)]
    fn test_name_of(#[case] oid: &str, #[case] expected: Option<&str>) {
        assert_eq!(name_of(TABLE, &oid.parse().unwrap()), expected);
    }

    #[rstest]
    #[case("cn", Some("2.5.4.3"))]
    #[case("O", Some("2.5.4.10"))]
    #[case("OU", None)]
    fn test_oid_of(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(oid_of(TABLE, name), expected);
    }
}
