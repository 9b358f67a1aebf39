// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("no connection to {target}")]
    NoConnection { target: String },
    #[error("request to {target} timed out")]
    Timeout { target: String },
    #[error("server error (HTTP {code})")]
    Server { code: u16 },
    #[error("HTTP {code}: {message}")]
    Http { code: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} has invalid format")]
    InvalidFormat { field: &'static str },
    #[error("{field} must not exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be on/after {other}")]
    OutOfOrder {
        field: &'static str,
        other: &'static str,
    },
}

impl FieldError {
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::InvalidFormat { field }
            | Self::TooLong { field, .. }
            | Self::OutOfOrder { field, .. } => field,
        }
    }
}

/// Failure of a backend call or a client-side check.
///
/// Repositories map every lower-level failure into one of these; list
/// controllers keep only [`AppError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("graphql error: {0}")]
    GraphQl(String),
    #[error("decode response: {0}")]
    Decode(String),
    #[error(transparent)]
    Validation(#[from] FieldError),
    #[error("{0}")]
    Unknown(String),
}

impl AppError {
    pub fn from_status(code: u16, body: &str) -> Self {
        let message = body.trim();
        if code >= 500 {
            return Self::Network(NetworkError::Server { code });
        }
        Self::Network(NetworkError::Http {
            code,
            message: if message.is_empty() {
                format!("HTTP {code}")
            } else {
                message.to_owned()
            },
        })
    }

    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Network(NetworkError::NoConnection { .. }) => {
                "कृपया अपना इंटरनेट कनेक्शन जांचें और पुनः प्रयास करें".to_owned()
            }
            Self::Network(NetworkError::Timeout { .. }) => {
                "अनुरोध का समय समाप्त हो गया। कृपया पुनः प्रयास करें".to_owned()
            }
            Self::Network(NetworkError::Server { .. }) => {
                "सर्वर अस्थायी रूप से अनुपलब्ध है। कृपया बाद में पुनः प्रयास करें".to_owned()
            }
            Self::Network(NetworkError::Http { code, .. }) => match code {
                400 => "अमान्य अनुरोध। कृपया अपना इनपुट जांचें".to_owned(),
                401 => "प्रमाणीकरण आवश्यक। कृपया लॉगिन करें".to_owned(),
                403 => "आपको यह कार्य करने की अनुमति नहीं है".to_owned(),
                404 => "अनुरोधित संसाधन नहीं मिला".to_owned(),
                other => format!("नेटवर्क त्रुटि हुई (कोड: {other})"),
            },
            Self::GraphQl(message) | Self::Decode(message) | Self::Unknown(message) => {
                message.clone()
            }
            Self::Validation(error) => error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, FieldError, NetworkError};

    #[test]
    fn server_statuses_collapse_to_server_error() {
        assert_eq!(
            AppError::from_status(503, "unavailable"),
            AppError::Network(NetworkError::Server { code: 503 })
        );
    }

    #[test]
    fn client_statuses_keep_body_and_code() {
        let error = AppError::from_status(404, "  ");
        assert_eq!(
            error,
            AppError::Network(NetworkError::Http {
                code: 404,
                message: "HTTP 404".to_owned(),
            })
        );
        assert_eq!(error.user_message(), "अनुरोधित संसाधन नहीं मिला");
    }

    #[test]
    fn graphql_errors_surface_server_message() {
        let error = AppError::GraphQl("permission denied for table member".to_owned());
        assert_eq!(error.user_message(), "permission denied for table member");
        assert!(!error.is_network());
    }

    #[test]
    fn validation_errors_name_the_field() {
        let error = AppError::from(FieldError::Required { field: "name" });
        assert_eq!(error.user_message(), "name is required");
    }
}
