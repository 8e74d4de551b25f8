//! Error types for the mawaqit library.

use thiserror::Error;

/// Errors that can occur while refreshing or displaying prayer times.
#[derive(Error, Debug)]
pub enum Error {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The translation service failed or returned no match.
    #[error("translation failed: {0}")]
    Translation(String),

    /// The location provider could not determine a position.
    #[error("geolocation failed: {0}")]
    Geolocation(String),

    /// A response was missing expected fields or held unparseable values.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// I/O error during cache or config file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// Every entry of the combined schedule is already in the past.
    #[error("no upcoming prayer time in schedule")]
    NoUpcomingEvent,
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse(e.to_string())
    }
}

/// A specialized `Result` type for mawaqit operations.
pub type Result<T> = std::result::Result<T, Error>;
