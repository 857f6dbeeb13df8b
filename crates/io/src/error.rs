use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File read failure.
    Read { path: String, message: String },
    /// File write failure.
    Write { path: String, message: String },
    /// CSV encode failure.
    Csv(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Write { path, message } => write!(f, "cannot write {path}: {message}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}
