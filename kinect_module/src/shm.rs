//! Named shared memory, one backing per platform.
//!
//! On Windows this is a pagefile-backed named file mapping, which is what the
//! companion creates. Elsewhere the region is a file under `/dev/shm` (or the
//! temp dir) mapped with memmap2, so the protocol can be exercised locally.

pub use imp::Region;

#[cfg(unix)]
pub use imp::backing_path;

#[cfg(unix)]
mod imp {
    use crate::error::{KinectError, Result};
    use memmap2::{MmapMut, MmapOptions};
    use std::fs::{self, OpenOptions};
    use std::io;
    use std::path::{Path, PathBuf};

    /// Where the region named `name` lives on disk.
    pub fn backing_path(name: &str) -> PathBuf {
        let shm_dir = Path::new("/dev/shm");
        let dir = if shm_dir.is_dir() {
            shm_dir.to_path_buf()
        } else {
            std::env::temp_dir()
        };
        let file_name: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        dir.join(file_name)
    }

    pub struct Region {
        map: MmapMut,
        path: PathBuf,
        is_owner: bool,
    }

    impl Region {
        pub fn create(name: &str, size: usize) -> Result<Self> {
            let path = backing_path(name);
            // Sized under a scratch name and renamed into place, so a reader
            // never sees a zero-length region.
            let staging = path.with_extension(format!("{}.tmp", std::process::id()));
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&staging)
                .map_err(|e| open_error(name, e))?;
            file.set_len(size as u64)
                .map_err(|e| open_error(name, e))?;

            // SAFETY: the file stays open for the lifetime of the mapping and
            // nothing in this process truncates it.
            let mut map = unsafe { MmapOptions::new().len(size).map_mut(&file) }
                .map_err(|e| open_error(name, e))?;
            map.fill(0);

            if let Err(e) = fs::rename(&staging, &path) {
                let _ = fs::remove_file(&staging);
                return Err(open_error(name, e));
            }

            Ok(Self {
                map,
                path,
                is_owner: true,
            })
        }

        pub fn open(name: &str, size: usize) -> Result<Self> {
            let path = backing_path(name);
            let file = match OpenOptions::new().read(true).write(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(KinectError::ChannelNotFound {
                        name: name.to_string(),
                        attempts: 1,
                    });
                }
                Err(e) => return Err(open_error(name, e)),
            };

            let actual = file.metadata().map_err(|e| open_error(name, e))?.len() as usize;
            if actual < size {
                return Err(KinectError::RegionTooSmall {
                    name: name.to_string(),
                    expected: size,
                    actual,
                });
            }

            // SAFETY: see `create`. A producer shrinking the file under us is
            // outside the protocol.
            let map = unsafe { MmapOptions::new().len(size).map_mut(&file) }
                .map_err(|e| open_error(name, e))?;

            Ok(Self {
                map,
                path,
                is_owner: false,
            })
        }

        pub fn len(&self) -> usize {
            self.map.len()
        }

        pub fn read_into(&self, buf: &mut [u8]) {
            let n = buf.len().min(self.map.len());
            buf[..n].copy_from_slice(&self.map[..n]);
        }

        pub fn write_from(&mut self, bytes: &[u8]) {
            let n = bytes.len().min(self.map.len());
            self.map[..n].copy_from_slice(&bytes[..n]);
        }
    }

    impl Drop for Region {
        fn drop(&mut self) {
            if self.is_owner {
                let _ = fs::remove_file(&self.path);
            }
        }
    }

    fn open_error(name: &str, source: io::Error) -> KinectError {
        KinectError::ChannelOpen {
            name: name.to_string(),
            source,
        }
    }
}

#[cfg(windows)]
mod imp {
    use crate::error::{KinectError, Result};
    use std::io;
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{
        CloseHandle, ERROR_FILE_NOT_FOUND, HANDLE, INVALID_HANDLE_VALUE,
    };
    use windows::Win32::System::Memory::{
        CreateFileMappingW, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile, FILE_MAP_READ,
        FILE_MAP_WRITE, MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READWRITE,
    };

    pub struct Region {
        handle: HANDLE,
        view: MEMORY_MAPPED_VIEW_ADDRESS,
        size: usize,
    }

    // SAFETY: the view is only touched through &self/&mut self of the owner.
    unsafe impl Send for Region {}

    fn wide(name: &str) -> Vec<u16> {
        name.encode_utf16().chain(std::iter::once(0)).collect()
    }

    impl Region {
        pub fn create(name: &str, size: usize) -> Result<Self> {
            let name_wide = wide(name);
            unsafe {
                let handle = CreateFileMappingW(
                    INVALID_HANDLE_VALUE,
                    None,
                    PAGE_READWRITE,
                    0,
                    size as u32,
                    PCWSTR(name_wide.as_ptr()),
                )
                .map_err(|e| open_error(name, e.into()))?;

                let region = Self::map(name, handle, size)?;
                std::ptr::write_bytes(region.view.Value as *mut u8, 0, size);
                Ok(region)
            }
        }

        pub fn open(name: &str, size: usize) -> Result<Self> {
            let name_wide = wide(name);
            unsafe {
                let handle = match OpenFileMappingW(
                    (FILE_MAP_READ | FILE_MAP_WRITE).0,
                    false,
                    PCWSTR(name_wide.as_ptr()),
                ) {
                    Ok(handle) if !handle.is_invalid() => handle,
                    Ok(_) => {
                        return Err(open_error(
                            name,
                            io::Error::new(io::ErrorKind::Other, "invalid mapping handle"),
                        ))
                    }
                    Err(e) if e.code() == ERROR_FILE_NOT_FOUND.to_hresult() => {
                        return Err(KinectError::ChannelNotFound {
                            name: name.to_string(),
                            attempts: 1,
                        });
                    }
                    Err(e) => return Err(open_error(name, e.into())),
                };

                Self::map(name, handle, size)
            }
        }

        unsafe fn map(name: &str, handle: HANDLE, size: usize) -> Result<Self> {
            let view = MapViewOfFile(handle, FILE_MAP_READ | FILE_MAP_WRITE, 0, 0, size);
            if view.Value.is_null() {
                let err = io::Error::last_os_error();
                let _ = CloseHandle(handle);
                return Err(open_error(name, err));
            }
            Ok(Self { handle, view, size })
        }

        pub fn len(&self) -> usize {
            self.size
        }

        pub fn read_into(&self, buf: &mut [u8]) {
            let n = buf.len().min(self.size);
            unsafe {
                std::ptr::copy_nonoverlapping(self.view.Value as *const u8, buf.as_mut_ptr(), n);
            }
        }

        pub fn write_from(&mut self, bytes: &[u8]) {
            let n = bytes.len().min(self.size);
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.view.Value as *mut u8, n);
            }
        }
    }

    impl Drop for Region {
        fn drop(&mut self) {
            unsafe {
                let _ = UnmapViewOfFile(self.view);
                let _ = CloseHandle(self.handle);
            }
        }
    }

    fn open_error(name: &str, source: io::Error) -> KinectError {
        KinectError::ChannelOpen {
            name: name.to_string(),
            source,
        }
    }
}
