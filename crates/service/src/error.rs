use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service endpoint is not configured.
    NotConfigured,
    /// The request could not be delivered, or the connection broke while
    /// waiting for the response.
    Transport,
    /// The request did not complete in time.
    Timeout,
    /// The service answered with a non-success status.
    Status,
    /// The response body does not have the expected shape.
    Decode,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotConfigured => write!(f, "Not configured"),
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::Timeout => write!(f, "Timed out"),
            ErrorKind::Status => write!(f, "Server error"),
            ErrorKind::Decode => write!(f, "Malformed response"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
