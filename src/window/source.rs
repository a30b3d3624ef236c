use std::path::Path;

use log::{debug, trace};

use crate::error::{Result, WindowError};
use crate::io::{ByteSource, OpenSource};
use crate::types::Window;

/// Owns one handle to the underlying file and translates window-relative
/// offsets to absolute ones. Reads never cross the end of the window.
#[derive(Debug)]
pub struct WindowedSource<S: ByteSource> {
    source: S,
    window: Window,
    // window-relative position of the underlying handle
    position: u64,
}

impl<S: OpenSource> WindowedSource<S> {
    /// Open `path` and expose `[origin, origin + size)` of it. When `size` is
    /// `None` the window extends to the end of the file.
    pub fn open<P: AsRef<Path>>(path: P, origin: u64, size: Option<u64>) -> Result<Self> {
        let path = path.as_ref();
        let source = S::open_path(path).map_err(|source| WindowError::Open {
            path: path.display().to_string(),
            source,
        })?;
        debug!("opened {} for window at {} ({:?} bytes)", path.display(), origin, size);
        Self::from_source(source, origin, size).map_err(|e| match e {
            WindowError::Size(source) => WindowError::Open {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }
}

impl<S: ByteSource> WindowedSource<S> {
    pub fn from_source(mut source: S, origin: u64, size: Option<u64>) -> Result<Self> {
        let file_size = source.len().map_err(WindowError::Size)?;
        let window = Window::resolve(file_size, origin, size).inspect_err(|e| {
            debug!("rejecting window: {}", e);
        })?;

        if origin != 0 {
            source.seek_to(origin).map_err(WindowError::Seek)?;
        }

        Ok(WindowedSource {
            source,
            window,
            position: 0,
        })
    }

    /// Position the underlying handle at `offset` bytes into the window.
    /// `offset == size` is allowed and leaves the source at end-of-window.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        let absolute = self
            .window
            .absolute(offset)
            .ok_or_else(|| WindowError::SeekOutOfRange {
                target: i128::from(offset),
                size: self.window.size(),
            })?;
        trace!("source seek to {} (absolute {})", offset, absolute);
        self.source.seek_to(absolute).map_err(WindowError::Seek)?;
        self.position = offset;
        Ok(())
    }

    /// Read the next block into `buf`, clamped to the bytes left in the
    /// window. Returns `0` at end-of-window.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.window.remaining(self.position);
        let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        if want == 0 {
            return Ok(0);
        }

        let got = self
            .source
            .read_into(&mut buf[..want])
            .map_err(WindowError::Read)?;
        self.position += got as u64;
        Ok(got)
    }

    pub fn size(&self) -> u64 {
        self.window.size()
    }

    pub fn origin(&self) -> u64 {
        self.window.origin()
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Window-relative position of the underlying handle.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn bytes(n: u8) -> Vec<u8> {
        (0..n).collect()
    }

    fn window_of_100(origin: u64, size: u64) -> Result<WindowedSource<Cursor<Vec<u8>>>> {
        WindowedSource::from_source(Cursor::new(bytes(100)), origin, Some(size))
    }

    #[derive(Debug)]
    struct UnsizedSource;

    impl ByteSource for UnsizedSource {
        fn len(&mut self) -> std::io::Result<u64> {
            Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "no size"))
        }

        fn seek_to(&mut self, _offset: u64) -> std::io::Result<()> {
            Ok(())
        }

        fn read_into(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn read_chunk_stops_at_window_end() {
        let mut source = window_of_100(10, 20).unwrap();
        let mut buf = [0u8; 64];

        assert_eq!(source.read_chunk(&mut buf).unwrap(), 20);
        assert_eq!(&buf[..20], &bytes(30)[10..30]);
        assert_eq!(source.position(), 20);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn seek_translates_to_absolute_offsets() {
        let mut source = window_of_100(10, 20).unwrap();
        source.seek(15).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 3);
        assert_eq!(buf, [25, 26, 27]);

        source.seek(20).unwrap();
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn seek_past_window_keeps_position() {
        let mut source = window_of_100(10, 20).unwrap();
        source.seek(4).unwrap();

        let err = source.seek(21).unwrap_err();
        assert!(matches!(err, WindowError::SeekOutOfRange { target: 21, size: 20 }));
        assert_eq!(source.position(), 4);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let err = window_of_100(90, 20).unwrap_err();
        assert!(matches!(err, WindowError::InvalidWindow(_)));
    }

    #[test]
    fn unknown_size_is_an_open_failure() {
        let err = WindowedSource::from_source(UnsizedSource, 0, None).unwrap_err();
        assert!(err.is_open());
        assert!(matches!(
            &err,
            WindowError::Size(e) if e.kind() == std::io::ErrorKind::Unsupported
        ));

        let io_err: std::io::Error = err.into();
        assert_eq!(io_err.kind(), std::io::ErrorKind::Unsupported);
    }
}
