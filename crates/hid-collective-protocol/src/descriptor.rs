//! HID report descriptor for the collective
//!
//! This is the descriptor the device enumerates with; the input report it
//! describes is exactly the 13-byte layout produced by
//! [`CollectiveReport`](crate::CollectiveReport). It carries no Report ID.

#[rustfmt::skip]
pub const COLLECTIVE_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x04,       // Usage (Joystick)
    0xA1, 0x01,       // Collection (Application)
    0x05, 0x09,       //   Usage Page (Button)
    0x19, 0x01,       //   Usage Minimum (1)
    0x29, 0x21,       //   Usage Maximum (33)
    0x15, 0x00,       //   Logical Minimum (0)
    0x25, 0x01,       //   Logical Maximum (1)
    0x75, 0x01,       //   Report Size (1)
    0x95, 0x21,       //   Report Count (33)
    0x81, 0x02,       //   Input (Data, Variable, Absolute)
    0x75, 0x07,       //   Report Size (7)
    0x95, 0x01,       //   Report Count (1)
    0x81, 0x03,       //   Input (Constant, Variable, Absolute)
    0x05, 0x01,       //   Usage Page (Generic Desktop)
    0x09, 0x30,       //   Usage (X)
    0x09, 0x31,       //   Usage (Y)
    0x09, 0x32,       //   Usage (Z)
    0x09, 0x35,       //   Usage (Rz)
    0x16, 0x00, 0x80, //   Logical Minimum (-32768)
    0x26, 0xFF, 0x7F, //   Logical Maximum (32767)
    0x75, 0x10,       //   Report Size (16)
    0x95, 0x04,       //   Report Count (4)
    0x81, 0x02,       //   Input (Data, Variable, Absolute)
    0xC0,             // End Collection
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BUTTON_COUNT, JOYSTICK_USAGE, REPORT_LEN};
    use collective_hid_common::summarize;

    #[test]
    fn test_descriptor_matches_wire_format() {
        let summary = summarize(COLLECTIVE_REPORT_DESCRIPTOR).expect("valid descriptor");
        assert_eq!(summary.usage, JOYSTICK_USAGE);
        assert_eq!(summary.input_bits, 104);
        assert_eq!(summary.input_report_len(), REPORT_LEN);
        assert!(!summary.has_report_id);
    }

    #[test]
    fn test_descriptor_declares_every_button() {
        // Usage Maximum (Button) and Report Count of the button field
        assert_eq!(COLLECTIVE_REPORT_DESCRIPTOR[11], BUTTON_COUNT);
        assert_eq!(COLLECTIVE_REPORT_DESCRIPTOR[19], BUTTON_COUNT);
    }
}
