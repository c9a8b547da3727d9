//! What the codec needs from the outside world: a randomly addressable input, an
//! append-only output and an estimate of free memory.

use std::{
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use sysinfo::{System, SystemExt};

use crate::error::Result;

pub trait ByteSource {
    /// Total length of the source in bytes.
    fn byte_len(&mut self) -> Result<u64>;

    /// Reads exactly `length` bytes starting at `offset`.
    fn read_chunk(&mut self, offset: u64, length: usize) -> Result<Vec<u8>>;
}

impl<R: Read + Seek> ByteSource for R {
    fn byte_len(&mut self) -> Result<u64> {
        Ok(self.seek(SeekFrom::End(0))?)
    }

    fn read_chunk(&mut self, offset: u64, length: usize) -> Result<Vec<u8>> {
        self.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; length];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<W: Write> ByteSink for W {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.write_all(bytes)?)
    }
}

pub trait MemoryProbe {
    /// Bytes of memory currently available, 0 when unknown.
    fn available_memory(&mut self) -> u64;
}

/// A constant memory estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedMemory(pub u64);

impl MemoryProbe for FixedMemory {
    fn available_memory(&mut self) -> u64 {
        self.0
    }
}

/// Live available-memory query against the operating system.
pub struct SystemMemory {
    system: System,
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self { system: System::new() }
    }
}

impl SystemMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryProbe for SystemMemory {
    fn available_memory(&mut self) -> u64 {
        self.system.refresh_memory();
        self.system.available_memory()
    }
}

/// Absolute form of `path`, which itself need not exist yet; its directory must.
fn resolve(path: &Path) -> Result<PathBuf> {
    if let Ok(path) = path.canonicalize() {
        return Ok(path);
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("{} has no file name", path.display())))?;

    Ok(parent.canonicalize()?.join(name))
}

/// Fails with `AlreadyExists` when writing `output` would clobber `input`.
pub fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if resolve(input)? == resolve(output)? {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} would overwrite its own input", output.display()),
        )
        .into());
    }
    Ok(())
}
