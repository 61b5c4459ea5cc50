//! EEPROM-backed configuration store.
//!
//! Loads and saves every channel's [`ChannelConfig`] together with the
//! shared [`CalibrationConfig`] as one fixed-size record at address 0.
//! See [`record`] for the byte layout and repair rules.

pub mod record;

use log::{info, warn};

use crate::app::ports::EepromPort;
use crate::channel::PumpChannel;
use crate::config::{CalibrationConfig, ChannelConfig, NUM_CHANNELS};
use crate::error::StorageError;

pub use record::{Decoded, RECORD_LEN};

/// EEPROM address of the configuration record.
pub const RECORD_ADDR: u16 = 0;

pub struct ConfigStore<E: EepromPort> {
    eeprom: E,
}

impl<E: EepromPort> ConfigStore<E> {
    pub fn new(eeprom: E) -> Self {
        Self { eeprom }
    }

    /// Read and repair the stored configuration.
    ///
    /// An unreadable device is treated as a blank (erased) block, which
    /// decodes to defaults.
    pub fn load(&mut self) -> Decoded {
        let mut buf = [0xFF; RECORD_LEN];
        if let Err(e) = self.eeprom.read_block(RECORD_ADDR, &mut buf) {
            warn!("ConfigStore: read failed ({e}), using defaults");
            buf = [0xFF; RECORD_LEN];
        }
        let decoded = record::decode(&buf);
        info!("ConfigStore: loaded {} channels", NUM_CHANNELS);
        decoded
    }

    /// Load straight into the live channels and calibration.
    pub fn load_into(&mut self, channels: &mut [PumpChannel; NUM_CHANNELS], cal: &mut CalibrationConfig) {
        let (configs, loaded_cal) = self.load();
        for (channel, config) in channels.iter_mut().zip(configs) {
            channel.set_config(config);
        }
        *cal = loaded_cal;
    }

    /// Persist the live configuration.
    ///
    /// Every channel's `last_run_at` is reset to 0, so all channels become
    /// due on their next evaluation.  The reset happens even if the write
    /// fails; the in-memory config stays authoritative either way.
    pub fn save(
        &mut self,
        channels: &mut [PumpChannel; NUM_CHANNELS],
        cal: &CalibrationConfig,
    ) -> Result<(), StorageError> {
        let configs: [ChannelConfig; NUM_CHANNELS] = core::array::from_fn(|i| *channels[i].config());
        for channel in channels.iter_mut() {
            channel.reset_last_run();
        }
        let buf = record::encode(&configs, cal);
        self.eeprom.update_block(RECORD_ADDR, &buf)?;
        info!("ConfigStore: saved {} bytes", RECORD_LEN);
        Ok(())
    }

    /// Borrow the underlying device (diagnostics, tests).
    pub fn eeprom(&self) -> &E {
        &self.eeprom
    }
}
