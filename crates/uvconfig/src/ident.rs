//! Bare-identifier rules for names supplied through the mutation API
//!
//! uVision itself accepts almost anything as a target or group name, but
//! names created by tooling end up in generated paths and compile databases,
//! so new names are held to C-identifier syntax. Names already present in a
//! loaded document are never validated.

use crate::error::ConfigError;

/// True when `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a caller-supplied name, rejecting anything non-identifier.
pub fn check_identifier(name: &str) -> Result<(), ConfigError> {
    if is_bare_identifier(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_identifiers() {
        for name in ["app", "Debug1", "_scratch", "B", "flight_fw_v2"] {
            assert!(is_bare_identifier(name), "{name} should be accepted");
        }
    }

    #[test]
    fn test_rejects_non_identifiers() {
        for name in ["", "1abc", "my app", "app-v2", "src/app", "tårget", "a.b"] {
            assert!(!is_bare_identifier(name), "{name} should be rejected");
        }
    }

    #[test]
    fn test_check_identifier_error_carries_name() {
        let err = check_identifier("my app").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier { ref name } if name == "my app"));
    }
}
