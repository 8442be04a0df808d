//! Identifier generation and validation

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Canonical identifier form: five dash-separated hex groups (8-4-4-4-12).
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-(?:[0-9a-f]{4}-){3}[0-9a-f]{12}$")
        .expect("canonical id pattern")
});

/// Check whether `id` is a well-formed record identifier.
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}

/// Source of fresh record identifiers.
///
/// Injected into services at construction so tests can substitute a
/// deterministic generator.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send {
    fn new_id(&self) -> String;
}

/// Default generator producing random v4 UUIDs
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("0e2d4e20-9f25-4e6f-8b1a-3c5d7e9f0a1b"));
        // Case-insensitive
        assert!(is_valid_id("0E2D4E20-9F25-4E6F-8B1A-3C5D7E9F0A1B"));
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("not-a-uuid"));
        assert!(!is_valid_id("0e2d4e20-9f25-4e6f-8b1a-3c5d7e9f0a1"));
        assert!(!is_valid_id("0e2d4e209f254e6f8b1a3c5d7e9f0a1b"));
        assert!(!is_valid_id("0e2d4e20-9f25-4e6f-8b1a-3c5d7e9f0a1b-extra"));
        assert!(!is_valid_id("ge2d4e20-9f25-4e6f-8b1a-3c5d7e9f0a1b"));
    }

    #[test]
    fn test_generated_ids_are_valid() {
        let generator = UuidGenerator;
        let id = generator.new_id();
        assert!(is_valid_id(&id));
        assert_ne!(id, generator.new_id());
    }
}
