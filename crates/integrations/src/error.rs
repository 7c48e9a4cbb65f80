use thiserror::Error;

/// Errors raised by outbound integrations.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// The request could not be sent or its response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("{service} responded with {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The SMTP server rejected or dropped the message.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The email could not be assembled.
    #[error("Invalid email message: {0}")]
    Message(#[from] lettre::error::Error),

    /// A sender or recipient address is malformed.
    #[error("Invalid email address: {0}")]
    Address(String),

    /// The service is switched off or refused the call.
    #[error("{0} unavailable")]
    Unavailable(String),
}

/// Result type for integration calls.
pub type Result<T> = std::result::Result<T, IntegrationError>;
