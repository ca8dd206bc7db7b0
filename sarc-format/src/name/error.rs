use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntoEntryNameError {
    Empty,
    NonAscii { position: usize },
    Unprintable { position: usize },
}

impl std::error::Error for IntoEntryNameError {}

impl fmt::Display for IntoEntryNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntoEntryNameError::NonAscii { position } | IntoEntryNameError::Unprintable { position } => {
                write!(f, "{} at byte {}", self.as_str(), position)
            }
            IntoEntryNameError::Empty => f.write_str(self.as_str()),
        }
    }
}

impl IntoEntryNameError {
    pub fn as_str(&self) -> &str {
        match self {
            IntoEntryNameError::Empty => "no entry name provided",
            IntoEntryNameError::NonAscii { .. } => "non-ASCII character in entry name",
            IntoEntryNameError::Unprintable { .. } => "unprintable character in entry name",
        }
    }

    pub fn as_io_error(&self) -> std::io::Error {
        use std::io::{Error, ErrorKind};
        Error::new(ErrorKind::InvalidInput, self.to_string())
    }
}
