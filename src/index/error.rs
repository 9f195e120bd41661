#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("Malformed record {name:?}: {reason}")]
    MalformedRecord { name: String, reason: String },

    #[error("Not a directory: {0}")]
    NotADirectory(String),
}

impl IndexError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
