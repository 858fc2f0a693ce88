use std::error::Error as StdError;
use std::fmt;
use std::io;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Status { url: String, status: StatusCode },
    Extraction(String),
    MissingField { field: &'static str, detail: Option<String> },
    Json(serde_json::Error),
    Io(io::Error),
    Config(String),
    Other(Box<dyn StdError>),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Self::Json(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Self::Io(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Self::Other(Box::new(err))
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "HTTP request failed: {}", err),
            Self::Status { url, status } => write!(f, "Unexpected response status {} from {}", status, url),
            Self::Extraction(msg) => write!(f, "{}", msg),
            Self::MissingField { field, detail: Some(detail) } => {
                write!(f, "Response is missing the '{}' field ({})", field, detail)
            },
            Self::MissingField { field, detail: None } => write!(f, "Response is missing the '{}' field", field),
            Self::Json(err) => write!(f, "Invalid JSON response: {}", err),
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::Other(err) => err.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_error::SimpleError;

    #[test]
    fn missing_field_includes_upstream_detail() {
        let err = Error::MissingField { field: "url", detail: Some("App not found".to_string()) };
        assert_eq!(err.to_string(), "Response is missing the 'url' field (App not found)");
        let err = Error::MissingField { field: "url", detail: None };
        assert_eq!(err.to_string(), "Response is missing the 'url' field");
    }

    #[test]
    fn boxed_errors_display_transparently() {
        let err = Error::Other(Box::new(SimpleError::new("No app IDs found in apps.txt")));
        assert_eq!(err.to_string(), "No app IDs found in apps.txt");
    }
}
