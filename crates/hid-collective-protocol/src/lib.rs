//! HID report encoder for the collective flight control
//!
//! The collective is a composite joystick: up to 33 momentary buttons and
//! four signed 16-bit axes (X, Y, Z/collective, Rz/throttle). This crate keeps
//! the logical state, serializes it into the fixed 13-byte input report and
//! suppresses reports identical to the last one sent.
//!
//! ## Wire format
//! | Offset | Bytes | Field |
//! |---|---|---|
//! | 0 | 5 | button bitfield, LE, bit 0 = button 1, bits 33..39 zero |
//! | 5 | 2 | X, `i16` LE |
//! | 7 | 2 | Y, `i16` LE |
//! | 9 | 2 | Z, `i16` LE |
//! | 11 | 2 | Rz, `i16` LE |
//!
//! ## Example
//! ```
//! use collective_hid_common::hid_traits::mock::{MockHidDevice, MockHidPort};
//! use hid_collective_protocol::{AxisMove, CollectiveEncoder, EncoderConfig, JOYSTICK_USAGE};
//!
//! let device = MockHidDevice::new(JOYSTICK_USAGE, "/dev/hidg0");
//! let mut port = MockHidPort::new();
//! port.add_device(device.clone());
//!
//! let mut collective = CollectiveEncoder::open(&port, &EncoderConfig::default())?;
//! collective.press([1, 17, 33])?;
//! collective.move_axis(AxisMove::new().x(-1).y(32767))?;
//!
//! assert_eq!(device.get_write_history().len(), 3);
//! # Ok::<(), hid_collective_protocol::CollectiveError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod descriptor;
pub mod encoder;
pub mod report;
pub mod types;

pub use config::EncoderConfig;
pub use descriptor::COLLECTIVE_REPORT_DESCRIPTOR;
pub use encoder::CollectiveEncoder;
pub use report::{CollectiveReport, HexBytes};
pub use types::*;

use collective_hid_common::{HidCommonError, HidUsage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectiveError {
    #[error("Button number must be in range 1 to 33, got {0}")]
    InvalidButton(i64),

    #[error("Axis {axis} value must be in range -32768 to 32767, got {value}")]
    InvalidAxis { axis: Axis, value: i32 },

    #[error("No joystick collection found (usage page {usage_page:#04x}, usage {usage:#04x})")]
    DeviceNotFound { usage_page: u16, usage: u16 },

    #[error("Transport error: {0}")]
    Transport(#[source] HidCommonError),

    #[error("Invalid report size: expected {expected}, got {actual}")]
    InvalidReportSize { expected: usize, actual: usize },

    #[error("Invalid report: {0}")]
    InvalidReport(String),
}

pub type CollectiveResult<T> = Result<T, CollectiveError>;

impl From<HidCommonError> for CollectiveError {
    fn from(e: HidCommonError) -> Self {
        match e {
            HidCommonError::DeviceNotFound { usage_page, usage } => {
                CollectiveError::DeviceNotFound { usage_page, usage }
            }
            other => CollectiveError::Transport(other),
        }
    }
}

/// Total input report length in bytes.
pub const REPORT_LEN: usize = 13;
/// Bytes holding the 40-bit button field.
pub const BUTTON_BYTES: usize = 5;
pub const BUTTON_COUNT: u8 = 33;
pub const AXIS_COUNT: usize = 4;

pub const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;
pub const USAGE_JOYSTICK: u16 = 0x04;
pub const JOYSTICK_USAGE: HidUsage = HidUsage::new(USAGE_PAGE_GENERIC_DESKTOP, USAGE_JOYSTICK);
