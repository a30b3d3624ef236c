use std::fs::File;
use std::io::Result as IoResult;
use std::path::Path;

use memmap2::Mmap;

use crate::io::{ByteSource, OpenSource};

/// Memory-mapped [`ByteSource`]. Reads copy out of the mapping and advance
/// an internal cursor; a cursor past the end of the mapping reads as EOF.
#[derive(Debug)]
pub struct SeekableMmap {
    mmap: Mmap,
    pos: usize,
}

impl SeekableMmap {
    pub fn open(file: &File) -> IoResult<Self> {
        // SAFETY: the mapping is read-only and owned by this value; callers
        // must not truncate the file while it is mapped.
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, pos: 0 })
    }

    /// Offset of the next byte `read_into` copies.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl OpenSource for SeekableMmap {
    fn open_path(path: &Path) -> IoResult<Self> {
        let file = File::open(path)?;
        Self::open(&file)
    }
}

impl ByteSource for SeekableMmap {
    fn len(&mut self) -> IoResult<u64> {
        Ok(self.mmap.len() as u64)
    }

    fn seek_to(&mut self, offset: u64) -> IoResult<()> {
        self.pos = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        let Some(tail) = self.mmap.get(self.pos..) else {
            return Ok(0);
        };
        let n = tail.len().min(buf.len());
        buf[..n].copy_from_slice(&tail[..n]);
        self.pos += n;
        Ok(n)
    }
}
