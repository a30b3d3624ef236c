//! Read-only, buffered, seekable streams over a window of a file.
//!
//! A [`WindowStream`] exposes the region `[start, start + length)` of a file
//! as if it were a file of its own, so entries packed into one physical file
//! can be handed to anything that consumes [`std::io::Read`] +
//! [`std::io::Seek`].

pub mod error;
pub mod io;
pub mod seekable_mmap;
pub mod types;
pub mod window;

use std::path::Path;

pub use error::{Result, WindowError};
pub use io::{ByteSource, FsSource, OpenSource};
pub use seekable_mmap::SeekableMmap;
pub use types::Window;
pub use window::{WindowStream, WindowedSource, DEFAULT_BUFFER_SIZE};

/// Open a window of `path` read through the filesystem. A `length` of `None`
/// runs to the end of the file.
pub fn open_window_stream<P: AsRef<Path>>(
    path: P,
    start: u64,
    length: Option<u64>,
) -> Result<WindowStream<FsSource>> {
    WindowStream::open(path, start, length)
}

/// Like [`open_window_stream`] but reads through a memory map of the file.
pub fn open_mapped_window_stream<P: AsRef<Path>>(
    path: P,
    start: u64,
    length: Option<u64>,
) -> Result<WindowStream<SeekableMmap>> {
    WindowStream::open(path, start, length)
}
