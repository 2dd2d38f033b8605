// src/error.rs

//! Unified error handling for the scraper.

use std::fmt;

use thiserror::Error;

/// Result type alias for brewmap operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response was not an HTML page
    #[error("Non-HTML content at {url} (status {status}, content-type '{content_type}')")]
    NonHtml {
        url: String,
        status: u16,
        content_type: String,
    },

    /// An expected element or attribute is missing from a page
    #[error("Missing {element} in {context}")]
    Absent { context: String, element: String },

    /// A text fragment could not be converted to a number
    #[error("Cannot parse {field} from '{value}'")]
    NumericParse { field: String, value: String },

    /// Site login failed
    #[error("Login failed: {0}")]
    Login(String),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a structural-absence error.
    pub fn absent(context: impl Into<String>, element: impl Into<String>) -> Self {
        Self::Absent {
            context: context.into(),
            element: element.into(),
        }
    }

    /// Create a numeric parse error.
    pub fn numeric(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NumericParse {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a login error.
    pub fn login(message: impl Into<String>) -> Self {
        Self::Login(message.into())
    }

    /// Whether this error means the page lacked expected markup.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Absent { .. })
    }

    /// Whether this error came from the network or the response itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::NonHtml { .. })
    }
}
