//! Three-button operator menu.
//!
//! ```text
//!  Home{ch} ──Advance──▶ Settings{0, Frequency}
//!                              │ Advance
//!                              ▼
//!   Frequency → RunSeconds → Power → SoilThreshold → LightThreshold
//!       → CalibrateSoil → Save ──(more channels)──▶ Settings{ch+1, Frequency}
//!                           │
//!                           └─(last channel)──▶ CalibrateLight ──▶ Home
//! ```
//!
//! The menu edits [`SchedulerState`] in place (field steps, calibration
//! capture).  Anything that needs I/O is returned as a [`MenuEffect`] for
//! the service to carry out.

use log::debug;

use super::commands::OperatorEvent;
use crate::channel::Field;
use crate::config::NUM_CHANNELS;
use crate::scheduler::SchedulerState;

/// A page of the settings sequence, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsPage {
    Frequency,
    RunSeconds,
    Power,
    SoilThreshold,
    LightThreshold,
    CalibrateSoil,
    Save,
    CalibrateLight,
}

impl SettingsPage {
    /// The tunable field edited on this page, if any.
    pub const fn field(self) -> Option<Field> {
        match self {
            Self::Frequency => Some(Field::Frequency),
            Self::RunSeconds => Some(Field::RunSeconds),
            Self::Power => Some(Field::Power),
            Self::SoilThreshold => Some(Field::SoilThreshold),
            Self::LightThreshold => Some(Field::LightThreshold),
            Self::CalibrateSoil | Self::Save | Self::CalibrateLight => None,
        }
    }

    /// Next page within one channel's sequence, up to `Save`.
    const fn next_in_channel(self) -> Option<Self> {
        match self {
            Self::Frequency => Some(Self::RunSeconds),
            Self::RunSeconds => Some(Self::Power),
            Self::Power => Some(Self::SoilThreshold),
            Self::SoilThreshold => Some(Self::LightThreshold),
            Self::LightThreshold => Some(Self::CalibrateSoil),
            Self::CalibrateSoil => Some(Self::Save),
            Self::Save | Self::CalibrateLight => None,
        }
    }
}

/// Where the operator currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPage {
    /// Status page of one channel.
    Home { channel: usize },
    /// Editing one channel (or the shared light calibration).
    Settings { channel: usize, page: SettingsPage },
}

impl Default for MenuPage {
    fn default() -> Self {
        Self::Home { channel: 0 }
    }
}

/// Which calibration endpoint a capture replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPoint {
    SoilDry { channel: usize },
    SoilWet { channel: usize },
    LightDay,
    LightNight,
}

/// Follow-up work the service must perform after a menu event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEffect {
    /// Page change only (or nothing at all).
    None,
    /// A field was stepped to `value`.
    Adjusted { channel: usize, field: Field, value: i32 },
    /// A calibration endpoint was captured.
    Calibrated { point: CalibrationPoint, raw: u16 },
    /// Persist the configuration.
    Save,
    /// Discard unsaved edits by reloading from storage.
    Revert,
    /// Start or stop a manual run of `channel`.
    ToggleRun { channel: usize },
}

/// Menu navigation state.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    page: MenuPage,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> MenuPage {
        self.page
    }

    /// Apply one operator event.
    pub fn handle(&mut self, event: OperatorEvent, state: &mut SchedulerState) -> MenuEffect {
        let effect = match self.page {
            MenuPage::Home { channel } => self.handle_home(event, channel),
            MenuPage::Settings { channel, page } => {
                self.handle_settings(event, channel, page, state)
            }
        };
        debug!("Menu: {event:?} -> {:?} ({effect:?})", self.page);
        effect
    }

    fn handle_home(&mut self, event: OperatorEvent, channel: usize) -> MenuEffect {
        match event {
            OperatorEvent::Advance => {
                self.page = MenuPage::Settings { channel: 0, page: SettingsPage::Frequency };
                MenuEffect::None
            }
            OperatorEvent::Increment => MenuEffect::ToggleRun { channel },
            OperatorEvent::Decrement => {
                self.page = MenuPage::Home { channel: (channel + 1) % NUM_CHANNELS };
                MenuEffect::None
            }
        }
    }

    fn handle_settings(
        &mut self,
        event: OperatorEvent,
        channel: usize,
        page: SettingsPage,
        state: &mut SchedulerState,
    ) -> MenuEffect {
        match event {
            OperatorEvent::Advance => {
                let effect = match page {
                    SettingsPage::Save => MenuEffect::Revert,
                    SettingsPage::CalibrateLight => MenuEffect::Save,
                    _ => MenuEffect::None,
                };
                self.rotate(channel, page);
                effect
            }
            OperatorEvent::Increment => match page {
                SettingsPage::CalibrateSoil => {
                    let raw = state.last_raw.soil[channel];
                    state.calibration.soil_dry_raw[channel] = raw;
                    MenuEffect::Calibrated { point: CalibrationPoint::SoilDry { channel }, raw }
                }
                SettingsPage::CalibrateLight => {
                    let raw = state.last_raw.light;
                    state.calibration.light_day_raw = raw;
                    MenuEffect::Calibrated { point: CalibrationPoint::LightDay, raw }
                }
                SettingsPage::Save => {
                    self.rotate(channel, page);
                    MenuEffect::Save
                }
                _ => Self::adjust(channel, page, true, state),
            },
            OperatorEvent::Decrement => match page {
                SettingsPage::CalibrateSoil => {
                    let raw = state.last_raw.soil[channel];
                    state.calibration.soil_wet_raw[channel] = raw;
                    MenuEffect::Calibrated { point: CalibrationPoint::SoilWet { channel }, raw }
                }
                SettingsPage::CalibrateLight => {
                    let raw = state.last_raw.light;
                    state.calibration.light_night_raw = raw;
                    MenuEffect::Calibrated { point: CalibrationPoint::LightNight, raw }
                }
                SettingsPage::Save => {
                    self.page = MenuPage::Home { channel: 0 };
                    MenuEffect::None
                }
                _ => Self::adjust(channel, page, false, state),
            },
        }
    }

    fn adjust(channel: usize, page: SettingsPage, up: bool, state: &mut SchedulerState) -> MenuEffect {
        match page.field() {
            Some(field) => {
                let value = state.channels[channel].adjust(field, up);
                MenuEffect::Adjusted { channel, field, value }
            }
            None => MenuEffect::None,
        }
    }

    fn rotate(&mut self, channel: usize, page: SettingsPage) {
        self.page = match page.next_in_channel() {
            Some(next) => MenuPage::Settings { channel, page: next },
            None if page == SettingsPage::Save && channel + 1 < NUM_CHANNELS => {
                MenuPage::Settings { channel: channel + 1, page: SettingsPage::Frequency }
            }
            None if page == SettingsPage::Save => {
                MenuPage::Settings { channel, page: SettingsPage::CalibrateLight }
            }
            None => MenuPage::Home { channel: 0 },
        };
    }
}
