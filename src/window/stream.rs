use std::fmt;
use std::io::{self, BufRead, Read, Seek, SeekFrom};
use std::path::Path;

use log::trace;

use crate::error::{Result, WindowError};
use crate::io::{ByteSource, OpenSource};
use crate::types::Window;

use super::WindowedSource;

/// Read-ahead buffer size used by [`WindowStream::new`] and [`WindowStream::open`].
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// A buffered, read-only stream over a window of a file.
///
/// Positions are window-relative: `0` is the first byte of the window and
/// [`len()`](Self::len) is end-of-stream. Reading past the window yields
/// end-of-stream (a `0`-byte read), never bytes that follow it in the file.
///
/// The buffer is refilled on demand, one chunk at a time, and is dropped on
/// every successful seek. Relative seeks are measured from
/// [`position()`](Self::position), the offset of the next byte a read
/// returns, not from how far the buffer has read ahead.
///
/// ```no_run
/// use std::io::{Read, Seek, SeekFrom};
///
/// # fn main() -> std::io::Result<()> {
/// let mut entry = window_stream::open_window_stream("assets.pak", 1024, Some(256))?;
/// let mut header = [0u8; 16];
/// entry.read_exact(&mut header)?;
/// entry.seek(SeekFrom::End(-4))?;
/// # Ok(())
/// # }
/// ```
pub struct WindowStream<S: ByteSource> {
    source: WindowedSource<S>,
    buf: Box<[u8]>,
    // read cursor and end of valid data within `buf`
    pos: usize,
    filled: usize,
}

impl<S: OpenSource> WindowStream<S> {
    /// Open `path` and expose `[start, start + length)` of it. When `length`
    /// is `None` the stream runs to the end of the file.
    pub fn open<P: AsRef<Path>>(path: P, start: u64, length: Option<u64>) -> Result<Self> {
        let source = WindowedSource::open(path, start, length)?;
        Self::with_capacity(DEFAULT_BUFFER_SIZE, source)
    }
}

impl<S: ByteSource> WindowStream<S> {
    pub fn new(source: WindowedSource<S>) -> Self {
        Self::from_parts(source, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize, source: WindowedSource<S>) -> Result<Self> {
        if capacity == 0 {
            return Err(WindowError::InvalidArgument(
                "buffer capacity must be non-zero".to_string(),
            ));
        }
        Ok(Self::from_parts(source, capacity))
    }

    /// Wrap an already opened raw source.
    pub fn from_source(source: S, start: u64, length: Option<u64>) -> Result<Self> {
        let source = WindowedSource::from_source(source, start, length)?;
        Ok(Self::new(source))
    }

    fn from_parts(source: WindowedSource<S>, capacity: usize) -> Self {
        WindowStream {
            source,
            buf: vec![0; capacity].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    /// Read the next byte, `None` at end-of-stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.pos == self.filled && self.refill()? == 0 {
            return Ok(None);
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    /// Copy up to `dst.len()` bytes into `dst`. Returns fewer only at
    /// end-of-window, or when a read fails after some bytes were copied.
    pub fn read_block(&mut self, dst: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        while copied < dst.len() {
            if self.pos == self.filled {
                // Large reads on an empty buffer skip the copy.
                let direct = dst.len() - copied >= self.buf.len();
                let fetched = if direct {
                    self.source.read_chunk(&mut dst[copied..])
                } else {
                    self.refill()
                };
                let got = match fetched {
                    Ok(got) => got,
                    // Bytes already copied are returned; the error surfaces
                    // on the next call, which starts with an empty buffer.
                    Err(e) if copied > 0 => {
                        trace!("read error after {} bytes: {}", copied, e);
                        return Ok(copied);
                    }
                    Err(e) => return Err(e),
                };
                if got == 0 {
                    break;
                }
                if direct {
                    copied += got;
                    continue;
                }
            }

            let n = (self.filled - self.pos).min(dst.len() - copied);
            dst[copied..copied + n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            copied += n;
        }
        Ok(copied)
    }

    /// Move to a new window-relative position and return it.
    ///
    /// The target must lie within `[0, len()]`. On failure neither the
    /// position nor the buffered bytes change.
    pub fn seek_window(&mut self, from: SeekFrom) -> Result<u64> {
        let size = self.len();
        let target = match from {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(offset) => i128::from(self.position()) + i128::from(offset),
            SeekFrom::End(offset) => i128::from(size) + i128::from(offset),
        };
        let offset = u64::try_from(target)
            .ok()
            .filter(|offset| *offset <= size)
            .ok_or(WindowError::SeekOutOfRange { target, size })?;

        self.source.seek(offset)?;
        self.discard_buffer();
        trace!("seek {:?} -> {}", from, offset);
        Ok(offset)
    }

    /// Position the stream on the byte at `pos`. Unlike
    /// [`seek_window`](Self::seek_window) the end-of-stream position is
    /// rejected: `pos` must name an existing byte.
    pub fn seek_to_byte(&mut self, pos: u64) -> Result<u64> {
        if pos >= self.len() {
            return Err(WindowError::SeekOutOfRange {
                target: i128::from(pos),
                size: self.len(),
            });
        }
        self.seek_window(SeekFrom::Start(pos))
    }

    /// Window-relative position of the next byte a read returns.
    pub fn position(&self) -> u64 {
        self.source.position() - (self.filled - self.pos) as u64
    }

    /// Logical length of the stream.
    pub fn len(&self) -> u64 {
        self.source.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> u64 {
        self.len() - self.position()
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes read ahead but not yet consumed.
    pub fn buffer(&self) -> &[u8] {
        &self.buf[self.pos..self.filled]
    }

    pub fn window(&self) -> Window {
        self.source.window()
    }

    pub fn into_inner(self) -> WindowedSource<S> {
        self.source
    }

    fn refill(&mut self) -> Result<usize> {
        let got = self.source.read_chunk(&mut self.buf)?;
        trace!("refill at {}: {} bytes", self.source.position() - got as u64, got);
        self.pos = 0;
        self.filled = got;
        Ok(got)
    }

    fn discard_buffer(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }
}

impl<S: ByteSource> Read for WindowStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_block(buf)?)
    }
}

impl<S: ByteSource> BufRead for WindowStream<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos == self.filled {
            self.refill()?;
        }
        Ok(self.buffer())
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.filled);
    }
}

impl<S: ByteSource> Seek for WindowStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(self.seek_window(pos)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}

impl<S: ByteSource + fmt::Debug> fmt::Debug for WindowStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowStream")
            .field("source", &self.source)
            .field("position", &self.position())
            .field("buffer", &format_args!("{}/{}", self.filled - self.pos, self.buf.len()))
            .finish()
    }
}
