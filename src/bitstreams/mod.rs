use crate::error::{BitIoError, Result};

/// Widest field a single `push_bits`/`read_int` call moves.
pub const MAX_FIELD_BITS: u64 = 64;

/// MSB-first bit packer over an in-memory byte buffer.
///
/// Completed bytes accumulate in `os` until the owner drains them; the byte being
/// filled lives in `current`, with `free` bits still unused.
#[derive(Debug)]
pub struct BitWriter {
    os: Vec<u8>,
    pub written_bits: u64,
    current: u64,
    free: usize,
}

impl Default for BitWriter {
    fn default() -> Self {
        BitWriter {
            os: Vec::default(),
            written_bits: 0,
            current: 0,
            free: 8,
        }
    }
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self { os: Vec::with_capacity(bytes), ..Default::default() }
    }

    /// Pads the pending byte with zeros and returns every byte written.
    pub fn build(mut self) -> Vec<u8> {
        self.flush();
        self.os
    }

    #[inline(always)]
    fn write(&mut self, b: u64) {
        self.os.push(b as u8);
    }

    #[inline(always)]
    fn write_in_current(&mut self, b: u64, len: u64) -> u64 {
        self.free -= len as usize;
        self.current |= (b & ((1 << len) - 1)) << self.free;

        if self.free == 0 {
            self.write(self.current);
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += len;
        len
    }

    /// Emits the low `len` bits of `x`, most significant first.
    #[inline(always)]
    pub fn push_bits(&mut self, x: u64, len: u64) -> Result<u64> {
        if len > MAX_FIELD_BITS {
            return Err(BitIoError::InvalidBitCount(len as u32).into());
        }

        let mut remaining = len;
        while remaining > 0 {
            let take = remaining.min(self.free as u64);
            let shift = remaining - take;
            self.write_in_current(x >> shift, take);
            remaining = shift;
        }

        Ok(len)
    }

    /// Writes whole bytes; the stream need not be byte aligned.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.push_bits(b as u64, 8)?;
        }
        Ok(())
    }

    /// Completes the pending partial byte with zero bits.
    pub fn flush(&mut self) {
        if self.free != 8 {
            self.write(self.current);
            self.free = 8;
            self.current = 0;
        }
    }

    /// Hands over the completed bytes, keeping the pending partial byte buffered.
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.os)
    }

    /// Number of completed bytes waiting to be drained.
    pub fn pending_bytes(&self) -> usize {
        self.os.len()
    }

    pub fn is_aligned(&self) -> bool {
        self.free == 8
    }
}

/// MSB-first bit reader over a reloadable in-memory buffer.
///
/// `position` is the byte cursor into the *current* buffer. Bits already pulled into
/// `current` survive a [`BitReader::load`], which is what lets a decoder continue
/// a code across buffer reloads.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct BitReader {
    is: Vec<u8>,
    position: usize,
    pub read_bits: u64,
    current: u64,
    fill: usize,
}

impl BitReader {
    pub fn new(input_stream: Vec<u8>) -> Self {
        BitReader {
            is: input_stream,
            position: 0,
            read_bits: 0,
            current: 0,
            fill: 0,
        }
    }

    /// Replaces the backing buffer and rewinds the byte cursor to its start.
    pub fn load(&mut self, input_stream: Vec<u8>) {
        self.is = input_stream;
        self.position = 0;
    }

    #[inline(always)]
    fn read(&mut self) -> Result<u64> {
        if self.position >= self.is.len() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        self.position += 1;
        Ok(self.is[self.position - 1] as u64)
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<u64> {
        if self.fill == 0 {
            self.current = self.read()?;
            self.fill = 8;
        }

        self.fill -= 1;
        self.read_bits += 1;
        Ok((self.current >> self.fill) & 1)
    }

    /// Reads the next `len` bits as an unsigned integer, first bit most significant.
    pub fn read_int(&mut self, len: u64) -> Result<u64> {
        if len > MAX_FIELD_BITS {
            return Err(BitIoError::InvalidBitCount(len as u32).into());
        }

        let mut x = 0u64;
        let mut len = len as usize;

        while len > 0 {
            if self.fill == 0 {
                self.current = self.read()?;
                self.fill = 8;
            }

            let take = len.min(self.fill);
            self.fill -= take;
            x = (x << take) | ((self.current >> self.fill) & ((1 << take) - 1));
            self.read_bits += take as u64;
            len -= take;
        }

        Ok(x)
    }

    /// Copies `n` raw bytes from the byte cursor, bypassing the bit buffer.
    pub fn read_n_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let end = self.position.checked_add(n).filter(|&end| end <= self.is.len());
        let Some(end) = end else {
            return Err(BitIoError::UnexpectedEof.into());
        };

        let bytes = self.is[self.position..end].to_vec();
        self.position = end;
        self.read_bits += 8 * n as u64;
        Ok(bytes)
    }

    /// True while the byte cursor has not reached the end of the current buffer.
    #[inline(always)]
    pub fn good(&self) -> bool {
        self.position < self.is.len()
    }

    /// True while at least one more bit can be read without a reload.
    #[inline(always)]
    pub fn has_bits(&self) -> bool {
        self.fill > 0 || self.good()
    }

    pub fn tell(&self) -> usize {
        self.position
    }

    /// Moves the byte cursor, dropping any buffered bits.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.is.len() {
            return Err(BitIoError::SeekOutOfRange { position, len: self.is.len() }.into());
        }

        self.position = position;
        self.fill = 0;
        self.current = 0;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.fill = 0;
        self.current = 0;
    }

    pub fn len(&self) -> usize {
        self.is.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is.is_empty()
    }
}
