//! Per-call configuration.

use crate::case::KeyCase;

/// Configuration threaded through planning, serialization and normalization.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Key case policy shared by query construction and response parsing.
    pub key_case: KeyCase,
}

impl Config {
    /// Creates a config with the default (camel case) policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key case policy.
    #[must_use]
    pub fn key_case(mut self, key_case: KeyCase) -> Self {
        self.key_case = key_case;
        self
    }

    /// Normalizes a key with the configured policy.
    pub fn normalize(&self, key: &str) -> String {
        self.key_case.normalize(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = Config::new().key_case(KeyCase::Snake);
        assert_eq!(config.normalize("createdAt"), "created_at");
        assert_eq!(Config::default().normalize("created_at"), "createdAt");
    }
}
