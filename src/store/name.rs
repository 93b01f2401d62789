//! Validated database names.

use std::fmt;

use thiserror::Error;

/// Errors for names unusable as storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name cannot be empty")]
    Empty,

    #[error("name too long: {0} characters")]
    TooLong(usize),

    #[error("name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character '{char}' at position {position}")]
    InvalidCharacter { char: char, position: usize },
}

/// A validated database name.
///
/// Database names become file stems, so they are restricted to prevent path
/// traversal and stay portable across filesystems:
///
/// - 1-64 characters
/// - ASCII alphanumerics, underscores, hyphens only
/// - must start with a letter or underscore
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Create a new name, validating the input.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > 64 {
            return Err(NameError::TooLong(name.len()));
        }

        let first = name.chars().next().unwrap();
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(NameError::InvalidStart(first));
        }
        for (i, c) in name.chars().enumerate() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
                return Err(NameError::InvalidCharacter { char: c, position: i });
            }
        }
        Ok(())
    }

    /// The string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(DatabaseName::new("testdb").is_ok());
        assert!(DatabaseName::new("my-db_2").is_ok());
        assert!(DatabaseName::new("_private").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(DatabaseName::new(""), Err(NameError::Empty));
        assert!(matches!(
            DatabaseName::new("1db"),
            Err(NameError::InvalidStart('1'))
        ));
        assert!(matches!(
            DatabaseName::new("-db"),
            Err(NameError::InvalidStart('-'))
        ));
        assert!(matches!(
            DatabaseName::new("a/b"),
            Err(NameError::InvalidCharacter { char: '/', .. })
        ));
        assert!(matches!(
            DatabaseName::new("..".to_string()),
            Err(NameError::InvalidStart('.'))
        ));
        assert!(matches!(
            DatabaseName::new("a".repeat(65)),
            Err(NameError::TooLong(65))
        ));
    }
}
