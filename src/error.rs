use thiserror::Error;

/// Errors that can occur while configuring a client or transmitting metrics.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A custom error with a free-form message.
    #[error("Custom error: {0}")]
    Custom(String),

    /// An I/O error from the standard library.
    #[error("Std Io error: {0}")]
    StdIo(#[from] std::io::Error),

    /// A sample rate outside of `(0, 1]`.
    #[error("Invalid sample rate {0}: must be greater than 0 and at most 1")]
    InvalidSampleRate(f64),

    /// The statsd host did not resolve to any address.
    #[error("Could not resolve {host}:{port}")]
    Resolve {
        /// Host name that failed to resolve.
        host: String,
        /// Port the resolution was attempted for.
        port: u16,
    },

    /// The transport was closed before the send.
    #[error("Transport is closed")]
    TransportClosed,
}

impl From<String> for MetricsError {
    fn from(value: String) -> Self {
        Self::Custom(value)
    }
}

impl From<&str> for MetricsError {
    fn from(value: &str) -> Self {
        Self::Custom(value.to_string())
    }
}
