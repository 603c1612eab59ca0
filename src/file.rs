//! File helpers shared by the link, meta and blob components.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{Result, StorageError};

/// Open a file for reading and writing, creating it if absent
pub(crate) fn open_or_create(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

/// Read until `buf` is full or end-of-file; returns the number of bytes read
pub(crate) fn read_full(file: &mut File, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Write all of `buf` unless the file stops accepting bytes; returns the
/// number of bytes written
pub(crate) fn write_full(file: &mut File, buf: &[u8]) -> Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        match file.write(&buf[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(written)
}

/// Borrow the open handle, or fail if the component was closed
pub(crate) fn handle<'a>(slot: &'a mut Option<File>, name: &'static str) -> Result<&'a mut File> {
    slot.as_mut().ok_or(StorageError::Closed(name))
}

/// Sync and release the handle. A second close reports `Closed`.
pub(crate) fn close(slot: &mut Option<File>, name: &'static str) -> Result<()> {
    let file = slot.take().ok_or(StorageError::Closed(name))?;
    file.sync_all()?;
    tracing::debug!(component = name, "closed");
    Ok(())
}
