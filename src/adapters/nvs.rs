//! NVS-backed EEPROM emulation.
//!
//! Implements [`EepromPort`] over a RAM image of a small byte-addressed
//! EEPROM.  Only cells whose value differs are touched by an update, and
//! an update that changes nothing never reaches flash.  The RAM image only
//! takes an update once it has been committed, so a failed commit is
//! retried in full by the next identical update.
//!
//! - **`target_os = "espidf"`**: the image is persisted as one NVS blob
//!   (`plantwater::eeprom`), committed after every effective update.
//! - **`not(target_os = "espidf")`**: the image lives in memory only;
//!   the cell-write counter lets tests observe wear, and commits can be
//!   made to fail.

use log::{debug, info};

#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::EepromPort;
use crate::error::StorageError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Emulated EEPROM size in bytes.
pub const EEPROM_SIZE: usize = 1024;

/// Value of a never-written cell.
pub const ERASED: u8 = 0xFF;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"plantwater\0";
#[cfg(target_os = "espidf")]
const BLOB_KEY: &[u8] = b"eeprom\0";

pub struct NvsEeprom {
    image: Vec<u8>,
    /// Cells physically rewritten since construction.
    cell_writes: u64,
    #[cfg(not(target_os = "espidf"))]
    fail_commits: bool,
}

impl NvsEeprom {
    /// Open the emulated EEPROM, loading any persisted image.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
        // single main-task context before any other NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
            warn!("NvsEeprom: erasing and re-initialising flash partition");
            if unsafe { nvs_flash_erase() } != ESP_OK as i32 || unsafe { nvs_flash_init() } != ESP_OK as i32 {
                return Err(StorageError::IoError);
            }
        } else if ret != ESP_OK as i32 {
            return Err(StorageError::IoError);
        }

        let mut image = vec![ERASED; EEPROM_SIZE];
        match Self::with_nvs_handle(false, |handle| {
            let mut size = EEPROM_SIZE;
            // SAFETY: `image` holds EEPROM_SIZE bytes; NVS writes at most `size`.
            let ret = unsafe {
                nvs_get_blob(handle, BLOB_KEY.as_ptr() as *const _, image.as_mut_ptr() as *mut _, &mut size)
            };
            if ret == ESP_OK as i32 { Ok(size) } else { Err(ret) }
        }) {
            Ok(size) => info!("NvsEeprom: loaded {size}-byte image"),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => info!("NvsEeprom: no stored image, blank EEPROM"),
            Err(e) => {
                warn!("NvsEeprom: NVS read error {e}, starting blank");
                image.fill(ERASED);
            }
        }
        Ok(Self::with_image(image))
    }

    /// Open a blank in-memory EEPROM.
    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("NvsEeprom: simulation backend ({EEPROM_SIZE} bytes)");
        Ok(Self::with_image(vec![ERASED; EEPROM_SIZE]))
    }

    /// Wrap an existing image (simulation, tests).  The image is resized
    /// to [`EEPROM_SIZE`], padding with erased cells.
    pub fn with_image(mut image: Vec<u8>) -> Self {
        image.resize(EEPROM_SIZE, ERASED);
        Self {
            image,
            cell_writes: 0,
            #[cfg(not(target_os = "espidf"))]
            fail_commits: false,
        }
    }

    /// Make every following commit fail with [`StorageError::IoError`].
    #[cfg(not(target_os = "espidf"))]
    pub fn set_commit_failure(&mut self, fail: bool) {
        self.fail_commits = fail;
    }

    pub fn cell_writes(&self) -> u64 {
        self.cell_writes
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    fn range(addr: u16, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = addr as usize;
        let end = start.checked_add(len).ok_or(StorageError::OutOfBounds)?;
        if end > EEPROM_SIZE {
            return Err(StorageError::OutOfBounds);
        }
        Ok(start..end)
    }

    /// Open the namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: NAMESPACE is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn persist(&self, image: &[u8]) -> Result<(), StorageError> {
        Self::with_nvs_handle(true, |handle| {
            // SAFETY: the image outlives the call; NVS copies the bytes.
            let ret = unsafe {
                nvs_set_blob(handle, BLOB_KEY.as_ptr() as *const _, image.as_ptr() as *const _, image.len())
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 { Err(ret) } else { Ok(()) }
        })
        .map_err(|e| {
            warn!("NvsEeprom: NVS write error {e}");
            StorageError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn persist(&self, _image: &[u8]) -> Result<(), StorageError> {
        if self.fail_commits {
            return Err(StorageError::IoError);
        }
        Ok(())
    }
}

impl EepromPort for NvsEeprom {
    fn read_block(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::range(addr, buf.len())?;
        buf.copy_from_slice(&self.image[range]);
        Ok(())
    }

    fn update_block(&mut self, addr: u16, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::range(addr, data.len())?;
        let changed = self.image[range.clone()]
            .iter()
            .zip(data)
            .filter(|(cell, byte)| cell != byte)
            .count() as u64;
        if changed == 0 {
            debug!("NvsEeprom: update at {addr} unchanged, skipped");
            return Ok(());
        }

        let mut staged = self.image.clone();
        staged[range].copy_from_slice(data);
        self.persist(&staged)?;
        self.image = staged;
        self.cell_writes += changed;
        debug!("NvsEeprom: {changed} cells rewritten at {addr}");
        Ok(())
    }
}
