//! Options controlling certificate decoding.

use serde::{Deserialize, Serialize};

/// Upper bound on the encoded size of a certificate accepted for decoding.
pub const DEFAULT_MAX_ENCODED_LEN: usize = 1 << 20;

/// What to do with a recognised extension whose value cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionPolicy {
    /// Reject the whole certificate.
    #[default]
    Strict,
    /// Keep the extension with its raw value as a generic extension.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub extension_policy: ExtensionPolicy,
    pub max_encoded_len: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            extension_policy: ExtensionPolicy::Strict,
            max_encoded_len: DEFAULT_MAX_ENCODED_LEN,
        }
    }
}

impl DecodeOptions {
    pub fn lenient() -> Self {
        Self {
            extension_policy: ExtensionPolicy::Lenient,
            ..Self::default()
        }
    }

    pub fn with_max_encoded_len(mut self, max_encoded_len: usize) -> Self {
        self.max_encoded_len = max_encoded_len;
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{DEFAULT_MAX_ENCODED_LEN, DecodeOptions, ExtensionPolicy};

    #[test]
    fn test_default_options() {
        let options = DecodeOptions::default();
        assert_eq!(options.extension_policy, ExtensionPolicy::Strict);
        assert_eq!(options.max_encoded_len, DEFAULT_MAX_ENCODED_LEN);
    }

    #[rstest]
    #[case("{}", DecodeOptions::default())]
    #[case(r#"{"extension_policy":"lenient"}"#, DecodeOptions::lenient())]
    #[case(
        r#"{"max_encoded_len":4096}"#,
        DecodeOptions::default().with_max_encoded_len(4096)
    )]
    #[case(
        r#"{"extension_policy":"strict","max_encoded_len":1}"#,
        DecodeOptions::default().with_max_encoded_len(1)
    )]
    fn test_deserialize_options(#[case] json: &str, #[case] expected: DecodeOptions) {
        let options: DecodeOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options, expected);
    }

    #[test]
    fn test_deserialize_unknown_policy() {
        let result = serde_json::from_str::<DecodeOptions>(r#"{"extension_policy":"loose"}"#);
        assert!(result.is_err());
    }
}
