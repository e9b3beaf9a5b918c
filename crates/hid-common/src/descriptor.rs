//! HID usages and report descriptor scanning
//!
//! Only the items needed to identify a top-level collection and size its
//! input report are interpreted: Usage Page, Usage, Report Size, Report Count,
//! Report ID, Push, Pop, Input and Collection. Every other item is skipped.

use crate::{HidCommonError, HidCommonResult, ReportParser};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (usage page, usage) pair identifying what a HID collection is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HidUsage {
    pub usage_page: u16,
    pub usage: u16,
}

impl HidUsage {
    pub const fn new(usage_page: u16, usage: u16) -> Self {
        Self { usage_page, usage }
    }
}

impl fmt::Display for HidUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}:{:#06x}", self.usage_page, self.usage)
    }
}

const LONG_ITEM_PREFIX: u8 = 0xFE;

const ITEM_TYPE_MAIN: u8 = 0;
const ITEM_TYPE_GLOBAL: u8 = 1;
const ITEM_TYPE_LOCAL: u8 = 2;

const MAIN_INPUT: u8 = 0x8;
const MAIN_COLLECTION: u8 = 0xA;

const GLOBAL_USAGE_PAGE: u8 = 0x0;
const GLOBAL_REPORT_SIZE: u8 = 0x7;
const GLOBAL_REPORT_ID: u8 = 0x8;
const GLOBAL_REPORT_COUNT: u8 = 0x9;
const GLOBAL_PUSH: u8 = 0xA;
const GLOBAL_POP: u8 = 0xB;

const LOCAL_USAGE: u8 = 0x0;

/// What a report descriptor says about its first top-level collection and
/// the input report it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSummary {
    pub usage: HidUsage,
    /// Sum of Report Size x Report Count over every Input item.
    pub input_bits: u32,
    pub has_report_id: bool,
}

impl DescriptorSummary {
    /// Input report length in bytes, excluding any report ID prefix.
    pub fn input_report_len(&self) -> usize {
        self.input_bits.div_ceil(8) as usize
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct GlobalState {
    usage_page: u16,
    report_size: u32,
    report_count: u32,
}

fn truncated(offset: usize, source: HidCommonError) -> HidCommonError {
    HidCommonError::InvalidDescriptor(format!("truncated item at offset {offset}: {source}"))
}

/// A four-byte Usage carries its own page in the upper half.
fn resolve_usage(value: u32, size: usize, usage_page: u16) -> HidUsage {
    if size == 4 {
        HidUsage::new((value >> 16) as u16, (value & 0xFFFF) as u16)
    } else {
        HidUsage::new(usage_page, value as u16)
    }
}

pub fn summarize(descriptor: &[u8]) -> HidCommonResult<DescriptorSummary> {
    let mut parser = ReportParser::from_slice(descriptor);
    let mut globals = GlobalState::default();
    let mut stack: Vec<GlobalState> = Vec::new();
    let mut pending_usage: Option<(u32, usize)> = None;
    let mut top_level: Option<HidUsage> = None;
    let mut input_bits: u32 = 0;
    let mut has_report_id = false;

    while parser.remaining() > 0 {
        let offset = parser.position();
        let prefix = parser.read_u8()?;

        if prefix == LONG_ITEM_PREFIX {
            let size = parser.read_u8().map_err(|e| truncated(offset, e))?;
            parser
                .read_bytes(size as usize + 1)
                .map_err(|e| truncated(offset, e))?;
            continue;
        }

        let size = match prefix & 0x03 {
            3 => 4,
            n => n as usize,
        };
        let item_type = (prefix >> 2) & 0x03;
        let tag = prefix >> 4;
        let value = parser
            .read_uint_le(size)
            .map_err(|e| truncated(offset, e))? as u32;

        match (item_type, tag) {
            (ITEM_TYPE_MAIN, MAIN_COLLECTION) => {
                if top_level.is_none() {
                    top_level = pending_usage
                        .map(|(usage, size)| resolve_usage(usage, size, globals.usage_page));
                }
                pending_usage = None;
            }
            (ITEM_TYPE_MAIN, MAIN_INPUT) => {
                let bits = globals.report_size.saturating_mul(globals.report_count);
                input_bits = input_bits.saturating_add(bits);
                pending_usage = None;
            }
            (ITEM_TYPE_MAIN, _) => pending_usage = None,
            (ITEM_TYPE_GLOBAL, GLOBAL_USAGE_PAGE) => globals.usage_page = value as u16,
            (ITEM_TYPE_GLOBAL, GLOBAL_REPORT_SIZE) => globals.report_size = value,
            (ITEM_TYPE_GLOBAL, GLOBAL_REPORT_COUNT) => globals.report_count = value,
            (ITEM_TYPE_GLOBAL, GLOBAL_REPORT_ID) => has_report_id = true,
            (ITEM_TYPE_GLOBAL, GLOBAL_PUSH) => stack.push(globals),
            (ITEM_TYPE_GLOBAL, GLOBAL_POP) => {
                globals = stack.pop().ok_or_else(|| {
                    HidCommonError::InvalidDescriptor(format!(
                        "Pop without matching Push at offset {offset}"
                    ))
                })?;
            }
            (ITEM_TYPE_LOCAL, LOCAL_USAGE) => {
                if pending_usage.is_none() {
                    pending_usage = Some((value, size));
                }
            }
            _ => {}
        }
    }

    let usage = top_level.ok_or_else(|| {
        HidCommonError::InvalidDescriptor("no usage before the first collection".to_string())
    })?;

    Ok(DescriptorSummary {
        usage,
        input_bits,
        has_report_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const MOUSE: &[u8] = &[
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x02, // Usage (Mouse)
        0xA1, 0x01, // Collection (Application)
        0x85, 0x02, //   Report ID (2)
        0x09, 0x01, //   Usage (Pointer)
        0xA1, 0x00, //   Collection (Physical)
        0x05, 0x09, //     Usage Page (Button)
        0x19, 0x01, //     Usage Minimum (1)
        0x29, 0x03, //     Usage Maximum (3)
        0x75, 0x01, //     Report Size (1)
        0x95, 0x03, //     Report Count (3)
        0x81, 0x02, //     Input (Data, Variable, Absolute)
        0x75, 0x05, //     Report Size (5)
        0x95, 0x01, //     Report Count (1)
        0x81, 0x03, //     Input (Constant)
        0x05, 0x01, //     Usage Page (Generic Desktop)
        0x09, 0x30, //     Usage (X)
        0x09, 0x31, //     Usage (Y)
        0x75, 0x08, //     Report Size (8)
        0x95, 0x02, //     Report Count (2)
        0x81, 0x06, //     Input (Data, Variable, Relative)
        0xC0,       //   End Collection
        0xC0,       // End Collection
    ];

    #[test]
    fn test_summarize_mouse() {
        let summary = summarize(MOUSE).expect("valid descriptor");
        assert_eq!(summary.usage, HidUsage::new(0x01, 0x02));
        assert_eq!(summary.input_bits, 24);
        assert_eq!(summary.input_report_len(), 3);
        assert!(summary.has_report_id);
    }

    #[test]
    fn test_extended_usage_carries_page() {
        let descriptor = [0x0B, 0x04, 0x00, 0x01, 0x00, 0xA1, 0x01, 0xC0];
        let summary = summarize(&descriptor).expect("valid descriptor");
        assert_eq!(summary.usage, HidUsage::new(0x01, 0x04));
        assert_eq!(summary.input_bits, 0);
    }

    #[test]
    fn test_long_items_are_skipped() {
        let descriptor = [
            0xFE, 0x02, 0x10, 0xAA, 0xBB, // long item, 2 data bytes
            0x05, 0x0C, 0x09, 0x01, 0xA1, 0x01, 0xC0,
        ];
        let summary = summarize(&descriptor).expect("valid descriptor");
        assert_eq!(summary.usage, HidUsage::new(0x0C, 0x01));
    }

    #[test]
    fn test_push_pop_restores_report_size() {
        let descriptor = [
            0x05, 0x01, 0x09, 0x04, 0xA1, 0x01, // joystick collection
            0x75, 0x08, 0x95, 0x01, // 1 x 8 bits
            0xA4, // Push
            0x75, 0x10, 0x95, 0x02, 0x81, 0x02, // 2 x 16 bits
            0xB4, // Pop
            0x81, 0x02, // 1 x 8 bits again
            0xC0,
        ];
        let summary = summarize(&descriptor).expect("valid descriptor");
        assert_eq!(summary.input_bits, 40);
        assert!(!summary.has_report_id);
    }

    #[test]
    fn test_truncated_item_fails() {
        let descriptor = [0x05, 0x01, 0x16, 0x00];
        let result = summarize(&descriptor);
        assert!(matches!(result, Err(HidCommonError::InvalidDescriptor(_))));
    }

    #[test]
    fn test_unbalanced_pop_fails() {
        let result = summarize(&[0xB4]);
        assert!(matches!(result, Err(HidCommonError::InvalidDescriptor(_))));
    }

    #[test]
    fn test_missing_collection_fails() {
        let result = summarize(&[0x05, 0x01, 0x09, 0x04]);
        assert!(matches!(result, Err(HidCommonError::InvalidDescriptor(_))));
    }

    #[test]
    fn test_usage_display() {
        assert_eq!(HidUsage::new(0x01, 0x04).to_string(), "0x0001:0x0004");
    }
}
