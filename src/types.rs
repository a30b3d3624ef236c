use crate::error::{Result, WindowError};

/// The `(origin, size)` sub-region of a physical file exposed as a stream.
/// Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    origin: u64,
    size: u64,
}

impl Window {
    pub fn new(origin: u64, size: u64) -> Result<Self> {
        origin.checked_add(size).ok_or_else(|| {
            WindowError::InvalidWindow(format!(
                "origin {} + size {} overflows",
                origin, size
            ))
        })?;
        Ok(Window { origin, size })
    }

    /// Build the window for a file of `file_size` bytes. An unspecified size
    /// extends the window to the end of the file.
    pub fn resolve(file_size: u64, origin: u64, size: Option<u64>) -> Result<Self> {
        let size = match size {
            Some(size) => size,
            None => file_size.checked_sub(origin).ok_or_else(|| {
                WindowError::InvalidWindow(format!(
                    "origin {} is past end of file ({} bytes)",
                    origin, file_size
                ))
            })?,
        };

        let window = Window::new(origin, size)?;
        if window.end() > file_size {
            return Err(WindowError::InvalidWindow(format!(
                "window [{}, {}) exceeds file size {}",
                origin,
                window.end(),
                file_size
            )));
        }
        Ok(window)
    }

    pub fn origin(&self) -> u64 {
        self.origin
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Absolute file offset one past the last byte of the window.
    pub fn end(&self) -> u64 {
        self.origin + self.size
    }

    /// Whether `offset` is a valid window-relative position (`size` included).
    pub fn contains(&self, offset: u64) -> bool {
        offset <= self.size
    }

    /// Translate a window-relative offset to an absolute file offset.
    pub fn absolute(&self, offset: u64) -> Option<u64> {
        if !self.contains(offset) {
            return None;
        }
        Some(self.origin + offset)
    }

    pub fn remaining(&self, position: u64) -> u64 {
        self.size.saturating_sub(position)
    }
}
