//! HID report parsing and writing utilities
//!
//! Both types work over caller-owned storage so the hot report path never
//! allocates.

use crate::{HidCommonError, HidCommonResult};

fn end_of_data() -> HidCommonError {
    HidCommonError::InvalidReport("Unexpected end of data".to_string())
}

fn buffer_overflow() -> HidCommonError {
    HidCommonError::InvalidReport("Report buffer overflow".to_string())
}

pub struct ReportParser<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportParser<'a> {
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_u8(&mut self) -> HidCommonResult<u8> {
        let value = *self.buffer.get(self.position).ok_or_else(end_of_data)?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16_le(&mut self) -> HidCommonResult<u16> {
        let lo = self.read_u8()? as u16;
        let hi = self.read_u8()? as u16;
        Ok(lo | (hi << 8))
    }

    pub fn read_i16_le(&mut self) -> HidCommonResult<i16> {
        Ok(self.read_u16_le()? as i16)
    }

    /// Reads an unsigned little-endian integer `width` bytes wide (at most 8).
    pub fn read_uint_le(&mut self, width: usize) -> HidCommonResult<u64> {
        if width > 8 {
            return Err(HidCommonError::InvalidReport(format!(
                "Integer width {width} exceeds 8 bytes"
            )));
        }
        let bytes = self.read_bytes(width)?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64))
    }

    pub fn read_bytes(&mut self, count: usize) -> HidCommonResult<&'a [u8]> {
        let end = self.position.checked_add(count).ok_or_else(end_of_data)?;
        let result = self.buffer.get(self.position..end).ok_or_else(end_of_data)?;
        self.position = end;
        Ok(result)
    }

    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.buffer.len());
    }

    pub fn slice(&self) -> &'a [u8] {
        self.buffer
    }
}

/// Sequential little-endian writer over a fixed, caller-owned buffer.
pub struct ReportWriter<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> ReportWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn write_u8(&mut self, value: u8) -> HidCommonResult<&mut Self> {
        let slot = self
            .buffer
            .get_mut(self.position)
            .ok_or_else(buffer_overflow)?;
        *slot = value;
        self.position += 1;
        Ok(self)
    }

    pub fn write_u16_le(&mut self, value: u16) -> HidCommonResult<&mut Self> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i16_le(&mut self, value: i16) -> HidCommonResult<&mut Self> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes the low `width` bytes of `value`; fails if `value` needs more.
    pub fn write_uint_le(&mut self, value: u64, width: usize) -> HidCommonResult<&mut Self> {
        if width > 8 || (width < 8 && value >> (width * 8) != 0) {
            return Err(HidCommonError::InvalidReport(format!(
                "Value {value:#x} does not fit in {width} bytes"
            )));
        }
        let bytes = value.to_le_bytes();
        let low = bytes.get(..width).ok_or_else(buffer_overflow)?;
        self.write_bytes(low)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> HidCommonResult<&mut Self> {
        let end = self
            .position
            .checked_add(data.len())
            .ok_or_else(buffer_overflow)?;
        let dest = self
            .buffer
            .get_mut(self.position..end)
            .ok_or_else(buffer_overflow)?;
        dest.copy_from_slice(data);
        self.position = end;
        Ok(self)
    }
}
