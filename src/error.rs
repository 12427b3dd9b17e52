use std::fmt;

#[derive(Debug)]
pub enum Error {
    ConfigError(String),
    /// Network-level failure or non-2xx status. `body` carries the raw
    /// response text when one was readable.
    TransportError {
        message: String,
        body: Option<String>,
    },
    ParseError(String),
    /// Well-formed response with zero usable entries.
    EmptyResult,
    DecodeError(String),
    EncodeError(String),
    IoError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Error::TransportError { message, body } => match body {
                Some(body) => write!(f, "Transport error: {} (response: {})", message, body),
                None => write!(f, "Transport error: {}", message),
            },
            Error::ParseError(msg) => write!(f, "Response parse error: {}", msg),
            Error::EmptyResult => write!(f, "Response contained no usable entries"),
            Error::DecodeError(msg) => write!(f, "Image decode error: {}", msg),
            Error::EncodeError(msg) => write!(f, "Image encode error: {}", msg),
            Error::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
