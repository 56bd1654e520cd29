use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A dotted property path such as `org.cometd`, naming the object a wrapped
/// bundle exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPath {
    segments: Vec<String>,
}

impl ExportPath {
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidExportPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.trim().is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !is_identifier(segment) {
                return Err(invalid(&format!(
                    "`{segment}` is not a JavaScript identifier"
                )));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The top-level binding the path starts from.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Every property access below the root, shortest first:
    /// `org.example.Thing` → `["org.example", "org.example.Thing"]`.
    pub fn prefixes(&self) -> Vec<String> {
        (2..=self.segments.len())
            .map(|n| self.segments[..n].join("."))
            .collect()
    }
}

impl fmt::Display for ExportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for ExportPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whether `name` is a plain ASCII JavaScript identifier.
///
/// Unicode escapes and non-ASCII identifier characters are rejected.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_path() {
        let path = ExportPath::parse("org.cometd").unwrap();
        assert_eq!(path.segments(), ["org", "cometd"]);
        assert_eq!(path.root(), "org");
        assert_eq!(path.to_string(), "org.cometd");
    }

    #[test]
    fn test_parse_single_segment() {
        let path: ExportPath = "$".parse().unwrap();
        assert_eq!(path.segments(), ["$"]);
        assert!(path.prefixes().is_empty());
    }

    #[test]
    fn test_prefixes_below_root() {
        let path = ExportPath::parse("org.example.Thing").unwrap();
        assert_eq!(path.root(), "org");
        assert_eq!(path.prefixes(), ["org.example", "org.example.Thing"]);
    }

    #[test]
    fn test_rejects_empty_segments() {
        for bad in ["", "  ", "org.", ".org", "org..cometd"] {
            assert!(
                matches!(
                    ExportPath::parse(bad),
                    Err(ConfigError::InvalidExportPath { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_non_identifiers() {
        for bad in ["org.3d", "org-cometd", "org.co met", "org[0]"] {
            assert!(ExportPath::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("cometd"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("$jq2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("my-lib"));
    }
}
