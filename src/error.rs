use std::fmt;
use std::io;

#[derive(Debug)]
pub enum JviewError {
    Io(io::Error),
    Utf8(std::str::Utf8Error),
    CursorField { field: &'static str },
    InvalidHex { value: String },
}

impl std::error::Error for JviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JviewError::Io(e) => Some(e),
            JviewError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for JviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JviewError::Io(e) => write!(f, "I/O error: {}", e),
            JviewError::Utf8(e) => write!(f, "log file is not valid UTF-8: {}", e),
            JviewError::CursorField { field } => {
                write!(f, "cursor field \"{}=\" not found", field)
            }
            JviewError::InvalidHex { value } => write!(f, "invalid hex value: {}", value),
        }
    }
}

impl From<io::Error> for JviewError {
    fn from(err: io::Error) -> Self {
        JviewError::Io(err)
    }
}

impl From<std::str::Utf8Error> for JviewError {
    fn from(err: std::str::Utf8Error) -> Self {
        JviewError::Utf8(err)
    }
}

pub type Result<T> = std::result::Result<T, JviewError>;
