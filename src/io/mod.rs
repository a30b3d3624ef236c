use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Minimal raw-file abstraction the window layer is built on.
pub trait ByteSource {
    /// Total size of the underlying file in bytes.
    fn len(&mut self) -> io::Result<u64>;

    /// Move the read position to the absolute `offset`.
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Read up to `buf.len()` bytes at the current position. Returns fewer
    /// bytes only at end of file, `0` once the file is exhausted.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// A [`ByteSource`] that can be opened by path.
pub trait OpenSource: ByteSource + Sized {
    fn open_path(path: &Path) -> io::Result<Self>;
}

/// Fill as much of `buf` as the reader allows, stopping only at EOF.
fn read_until_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Filesystem-backed byte source.
#[derive(Debug)]
pub struct FsSource {
    file: File,
}

impl FsSource {
    pub fn new(file: File) -> Self {
        FsSource { file }
    }

    pub fn into_file(self) -> File {
        self.file
    }
}

impl OpenSource for FsSource {
    fn open_path(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(FsSource { file })
    }
}

impl ByteSource for FsSource {
    fn len(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_until_full(&mut self.file, buf)
    }
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.set_position(offset);
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_until_full(self, buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn fs_source_reads_until_eof() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"0123456789").unwrap();

        let mut source = FsSource::open_path(tmp.path()).unwrap();
        assert_eq!(source.len().unwrap(), 10);

        source.seek_to(6).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(source.read_into(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"6789");
        assert_eq!(source.read_into(&mut buf).unwrap(), 0);
    }

    #[test]
    fn fs_source_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsSource::open_path(&dir.path().join("missing.bin")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn cursor_source_past_end_reads_nothing() {
        let mut source = Cursor::new(b"abc".to_vec());
        source.seek_to(10).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(source.read_into(&mut buf).unwrap(), 0);
    }
}
