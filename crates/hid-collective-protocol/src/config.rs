//! Encoder configuration

use crate::{USAGE_JOYSTICK, USAGE_PAGE_GENERIC_DESKTOP};
use collective_hid_common::HidUsage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait before the single construction retry.
pub const DEFAULT_RECOVERY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Usage page of the collection to locate.
    pub usage_page: u16,
    /// Usage of the collection to locate.
    pub usage: u16,
    /// Blocking wait between a failed probe report and its one retry.
    pub recovery_delay_ms: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            usage_page: USAGE_PAGE_GENERIC_DESKTOP,
            usage: USAGE_JOYSTICK,
            recovery_delay_ms: DEFAULT_RECOVERY_DELAY_MS,
        }
    }
}

impl EncoderConfig {
    pub fn usage(&self) -> HidUsage {
        HidUsage::new(self.usage_page, self.usage)
    }

    pub fn recovery_delay(&self) -> Duration {
        Duration::from_millis(self.recovery_delay_ms)
    }

    pub fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
