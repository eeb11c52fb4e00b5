//! Persistent storage for the active page index.
//!
//! Uses the RP2040's QSPI flash via the `sequential-storage` crate. The
//! last 16 KB of flash are kept out of `memory.x` and hold a key-value map
//! with a single entry: the page index as one byte.
//!
//! `sequential-storage` handles wear levelling and garbage collection; we
//! only translate its errors into the [`PrefsError`] codes the display
//! understands.

use core::ops::Range;

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::Error as StorageError;

use crate::config::{PREFS_FLASH_END, PREFS_FLASH_START};
use crate::error::{PrefsError, SaveResult};

/// Key of the page index in the map storage.
const KEY_PAGE: u8 = 0x01;

/// Scratch buffer for one map item (key, length header and value).
const ITEM_BUFFER_SIZE: usize = 32;

pub struct PageStore<F> {
    flash: F,
    range: Range<u32>,
    usable: bool,
}

impl<F: NorFlash> PageStore<F> {
    /// Wraps `flash`. The reserved range must cover at least two erase
    /// pages on erase-page boundaries; otherwise every operation fails with
    /// [`PrefsError::NoStorage`].
    pub fn new(flash: F) -> Self {
        let range = PREFS_FLASH_START..PREFS_FLASH_END;
        let erase = F::ERASE_SIZE as u32;
        let usable = range.start % erase == 0
            && range.end % erase == 0
            && range.end.saturating_sub(range.start) >= 2 * erase
            && range.end as usize <= flash.capacity();
        if !usable {
            warn!(
                "Preference range {=u32:#x}..{=u32:#x} unusable",
                range.start,
                range.end
            );
        }
        Self {
            flash,
            range,
            usable,
        }
    }

    /// Reads the stored page index.
    pub async fn load(&mut self) -> Result<u8, PrefsError> {
        if !self.usable {
            return Err(PrefsError::NoStorage);
        }
        let mut buf = [0u8; ITEM_BUFFER_SIZE];

        match sequential_storage::map::fetch_item::<u8, u8, _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &KEY_PAGE,
        )
        .await
        {
            Ok(Some(page)) => {
                debug!("Loaded page {} from flash", page);
                Ok(page)
            }
            Ok(None) => Err(PrefsError::NoData),
            Err(e) => {
                error!("Flash read error: {:?}", defmt::Debug2Format(&e));
                Err(PrefsError::Read)
            }
        }
    }

    /// Persists `page`.
    pub async fn save(&mut self, page: u8) -> SaveResult {
        if !self.usable {
            return Err(PrefsError::NoStorage);
        }
        let mut buf = [0u8; ITEM_BUFFER_SIZE];

        match sequential_storage::map::store_item::<u8, u8, _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &KEY_PAGE,
            &page,
        )
        .await
        {
            Ok(()) => {
                debug!("Stored page {} to flash", page);
                Ok(())
            }
            Err(e) => {
                error!("Flash write error: {:?}", defmt::Debug2Format(&e));
                Err(save_error(&e))
            }
        }
    }
}

/// A full map means the garbage collector could not erase a page to make
/// room; everything else is a failed write.
fn save_error<E>(e: &StorageError<E>) -> PrefsError {
    match e {
        StorageError::FullStorage => PrefsError::Erase,
        _ => PrefsError::Write,
    }
}
