//! Read-only byte stream over a host-supplied file descriptor.
//!
//! The host keeps ownership of its descriptor. The stream works on a
//! duplicate, so dropping it never closes the caller's descriptor. The
//! duplicate shares the file offset with the caller's descriptor; the stream
//! rewinds to the start before any parser sees it.

use crate::error::{KtagError, Result};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::os::fd::{FromRawFd, OwnedFd, RawFd};

/// Byte stream bound to a duplicated file descriptor
#[derive(Debug)]
pub struct DescriptorStream {
    fd: RawFd,
    file: File,
}

impl DescriptorStream {
    /// Open a stream over `fd`
    ///
    /// Fails with `KtagError::InvalidDescriptor` if the descriptor is negative,
    /// not open, or not seekable (pipes and sockets).
    pub fn open(fd: RawFd) -> Result<Self> {
        if fd < 0 {
            return Err(KtagError::invalid_descriptor(fd));
        }

        let owned = duplicate(fd).map_err(|source| KtagError::InvalidDescriptor {
            fd,
            source: Some(source),
        })?;

        let mut file = File::from(owned);
        file.seek(SeekFrom::Start(0))
            .map_err(|source| KtagError::InvalidDescriptor {
                fd,
                source: Some(source),
            })?;

        Ok(Self { fd, file })
    }

    /// Descriptor this stream was opened from (not the duplicate)
    pub fn descriptor(&self) -> RawFd {
        self.fd
    }

    /// Total length of the underlying file
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Rewind to the first byte
    pub fn rewind(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

#[allow(unsafe_code)]
fn duplicate(fd: RawFd) -> io::Result<OwnedFd> {
    // SAFETY: fcntl(F_DUPFD_CLOEXEC) only reads the descriptor number and
    // reports EBADF for anything not open in this process.
    let dup = unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) };
    if dup < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `dup` was just returned by fcntl, is open, and nothing else owns it.
    Ok(unsafe { OwnedFd::from_raw_fd(dup) })
}

impl Read for DescriptorStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for DescriptorStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}
