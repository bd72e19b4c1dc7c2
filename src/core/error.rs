//! # Errors
//!
//! One error type for the task model, the store and the key-binding loader.
//!
//! ```text
//! NotFound       list, task or stored record absent
//! AlreadyExists  duplicate list name or task id
//! Validation     empty name, out-of-range index, bad key binding
//! Exhausted      id allocation gave up (ids are not being released)
//! Config         unreadable or malformed config file
//! Io / Storage   filesystem or database failure
//! Format / Yaml  malformed import or export document
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid: {0}")]
    Validation(String),

    /// Id allocation hit its retry bound. Always a caller bug.
    #[error("exhausted: {0}")]
    Exhausted(String),

    #[error("{0}")]
    Config(#[from] crate::core::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("format error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_object() {
        let err = Error::NotFound("list \"Groceries\"".to_string());
        assert_eq!(err.to_string(), "not found: list \"Groceries\"");

        let err = Error::Validation("list name cannot be empty".to_string());
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_io_errors_convert() {
        fn fails() -> Result<()> {
            Err(std::io::Error::other("disk full"))?
        }
        assert!(matches!(fails(), Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_config_converts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general\ndata_dir = ").unwrap();

        fn load(path: &std::path::Path) -> Result<()> {
            crate::core::config::load_config_from(path)?;
            Ok(())
        }
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("config parse error"));
    }
}
