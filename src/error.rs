use std::io;

/// Error type for window streams. End-of-window is not an error: reads report
/// it as `0` bytes or `None`.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Open Error: {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Size Error: cannot determine file size: {0}")]
    Size(#[source] io::Error),
    #[error("Invalid Window: {0}")]
    InvalidWindow(String),
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
    #[error("Seek Error: target {target} is outside window of size {size}")]
    SeekOutOfRange { target: i128, size: u64 },
    #[error("Seek Error: {0}")]
    Seek(#[source] io::Error),
    #[error("Read Error: {0}")]
    Read(#[source] io::Error),
}

impl WindowError {
    pub fn is_seek(&self) -> bool {
        matches!(self, WindowError::SeekOutOfRange { .. } | WindowError::Seek(_))
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self,
            WindowError::Open { .. } | WindowError::Size(_) | WindowError::InvalidWindow(_)
        )
    }
}

impl From<WindowError> for io::Error {
    fn from(e: WindowError) -> Self {
        match e {
            WindowError::Open { source, .. } => source,
            WindowError::Size(source) | WindowError::Seek(source) | WindowError::Read(source) => {
                source
            }
            other @ (WindowError::InvalidWindow(_)
            | WindowError::InvalidArgument(_)
            | WindowError::SeekOutOfRange { .. }) => {
                io::Error::new(io::ErrorKind::InvalidInput, other)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, WindowError>;
