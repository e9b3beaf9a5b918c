//! The 13-byte collective input report

use crate::{
    AXIS_COUNT, Axis, BUTTON_BYTES, ButtonBank, ButtonId, CollectiveError, CollectiveResult,
    REPORT_LEN,
};
use collective_hid_common::{HidCommonError, ReportParser, ReportWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectiveReport {
    pub buttons: ButtonBank,
    /// Indexed by [`Axis::index`].
    pub axes: [i16; AXIS_COUNT],
}

fn codec_error(e: HidCommonError) -> CollectiveError {
    CollectiveError::InvalidReport(e.to_string())
}

impl CollectiveReport {
    pub const NEUTRAL: CollectiveReport = CollectiveReport {
        buttons: ButtonBank::EMPTY,
        axes: [0; AXIS_COUNT],
    };

    pub fn axis(&self, axis: Axis) -> i16 {
        self.axes[axis.index()]
    }

    pub fn set_axis(&mut self, axis: Axis, value: i16) {
        self.axes[axis.index()] = value;
    }

    pub fn pressed(&self) -> impl Iterator<Item = ButtonId> {
        self.buttons.iter()
    }

    /// Serializes into the first [`REPORT_LEN`] bytes of `out`.
    pub fn encode_into(&self, out: &mut [u8]) -> CollectiveResult<()> {
        if out.len() < REPORT_LEN {
            return Err(CollectiveError::InvalidReportSize {
                expected: REPORT_LEN,
                actual: out.len(),
            });
        }

        let mut writer = ReportWriter::new(out);
        writer
            .write_uint_le(self.buttons.bits(), BUTTON_BYTES)
            .map_err(codec_error)?;
        for value in self.axes {
            writer.write_i16_le(value).map_err(codec_error)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> CollectiveResult<[u8; REPORT_LEN]> {
        let mut out = [0u8; REPORT_LEN];
        self.encode_into(&mut out)?;
        Ok(out)
    }

    pub fn decode(data: &[u8]) -> CollectiveResult<Self> {
        if data.len() != REPORT_LEN {
            return Err(CollectiveError::InvalidReportSize {
                expected: REPORT_LEN,
                actual: data.len(),
            });
        }

        let mut parser = ReportParser::from_slice(data);
        let buttons = ButtonBank::try_from(
            parser
                .read_uint_le(BUTTON_BYTES)
                .map_err(codec_error)?,
        )?;
        let mut axes = [0i16; AXIS_COUNT];
        for slot in &mut axes {
            *slot = parser.read_i16_le().map_err(codec_error)?;
        }

        Ok(Self { buttons, axes })
    }
}

/// Space-separated upper-case hex, e.g. `01 00 FF`.
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
