use std::fmt;

#[derive(Debug)]
pub enum DedupError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty file name, bad column mapping, etc.).
    ConfigValidation(String),
    /// Missing required column in input data.
    MissingColumn { table: String, column: String },
    /// A data row is missing its primary identifier. Precondition
    /// violation per the input contract; the run fails fast.
    MissingId { table: String, line: u64 },
    /// CSV decode error.
    Csv(String),
}

impl fmt::Display for DedupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::MissingId { table, line } => {
                write!(f, "table '{table}', line {line}: missing record identifier")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for DedupError {}
