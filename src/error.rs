use std::fmt;

#[derive(Debug)]
pub enum DetectorError {
    Io(String),
    Parse(String),
    Config(String),
    Channel(String),
}

impl fmt::Display for DetectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorError::Io(msg) => write!(f, "I/O error: {}", msg),
            DetectorError::Parse(msg) => write!(f, "parse error: {}", msg),
            DetectorError::Config(msg) => write!(f, "configuration error: {}", msg),
            DetectorError::Channel(msg) => write!(f, "channel error: {}", msg),
        }
    }
}

impl std::error::Error for DetectorError {}

impl From<std::io::Error> for DetectorError {
    fn from(err: std::io::Error) -> Self {
        DetectorError::Io(err.to_string())
    }
}

impl From<csv::Error> for DetectorError {
    fn from(err: csv::Error) -> Self {
        DetectorError::Io(err.to_string())
    }
}

impl From<std::num::ParseIntError> for DetectorError {
    fn from(err: std::num::ParseIntError) -> Self {
        DetectorError::Parse(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for DetectorError {
    fn from(err: std::num::ParseFloatError) -> Self {
        DetectorError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for DetectorError {
    fn from(err: toml::de::Error) -> Self {
        DetectorError::Config(err.to_string())
    }
}

impl From<&str> for DetectorError {
    fn from(msg: &str) -> Self {
        DetectorError::Config(msg.to_string())
    }
}

impl From<String> for DetectorError {
    fn from(msg: String) -> Self {
        DetectorError::Config(msg)
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;
