//! Site login credentials.

use std::fmt;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Username/password pair read from a TOML key-value file.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parse credentials from TOML text with `username` and `password` keys.
    pub fn parse(content: &str) -> Result<Self> {
        let creds: Self = toml::from_str(content)?;
        if creds.username.trim().is_empty() {
            return Err(AppError::config("credentials: username is empty"));
        }
        Ok(creds)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_file() {
        let creds = Credentials::parse("username = \"hophead\"\npassword = \"s3cret\"\n").unwrap();
        assert_eq!(creds.username, "hophead");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn rejects_blank_username() {
        let parsed = Credentials::parse("username = \"\"\npassword = \"x\"\n");
        assert!(matches!(parsed, Err(AppError::Config(_))));
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials {
            username: "hophead".into(),
            password: "s3cret".into(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("hophead"));
        assert!(!shown.contains("s3cret"));
    }
}
