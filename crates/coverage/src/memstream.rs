use std::io::{self, Read, Seek, SeekFrom, Write};

/// Growable in memory byte stream backing the TIFF, GIF and FAX blob codecs.
///
/// The buffer grows by block doubling on write; `eof` tracks the written
/// extent independently of the allocation, so `into_vec` never exposes
/// allocation slack.
#[derive(Debug, Default, Clone)]
pub struct MemoryStream {
    buffer: Vec<u8>,
    eof: usize,
    cursor: usize,
}

const MIN_BLOCK: usize = 1024;

impl MemoryStream {
    pub fn new() -> Self {
        MemoryStream::default()
    }

    /// Wraps existing data for reading; the cursor starts at the beginning.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let eof = data.len();
        MemoryStream {
            buffer: data,
            eof,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.eof
    }

    pub fn is_empty(&self) -> bool {
        self.eof == 0
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.eof]
    }

    pub fn into_vec(mut self) -> Vec<u8> {
        self.buffer.truncate(self.eof);
        self.buffer
    }

    fn grow_to(&mut self, required: usize) {
        if required <= self.buffer.len() {
            return;
        }

        let mut size = self.buffer.len().max(MIN_BLOCK);
        while size < required {
            size *= 2;
        }
        self.buffer.resize(size, 0);
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.eof.saturating_sub(self.cursor);
        let count = available.min(buf.len());
        if count == 0 {
            // the cursor may sit past the allocation after a seek beyond eof
            return Ok(0);
        }
        buf[..count].copy_from_slice(&self.buffer[self.cursor..self.cursor + count]);
        self.cursor += count;
        Ok(count)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let end = self
            .cursor
            .checked_add(buf.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write past addressable size"))?;

        self.grow_to(end);
        self.buffer[self.cursor..end].copy_from_slice(buf);
        self.cursor = end;
        self.eof = self.eof.max(end);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => self.cursor as i128 + i128::from(delta),
            SeekFrom::End(delta) => self.eof as i128 + i128::from(delta),
        };

        if target < 0 || target > usize::MAX as i128 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            ));
        }

        self.cursor = target as usize;
        Ok(self.cursor as u64)
    }
}
