//! Button and axis types for the collective

use crate::{BUTTON_BYTES, BUTTON_COUNT, CollectiveError, CollectiveResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated 1-based button number in `1..=33`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ButtonId(u8);

impl ButtonId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = BUTTON_COUNT;

    pub fn new(number: u8) -> CollectiveResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&number) {
            Ok(Self(number))
        } else {
            Err(CollectiveError::InvalidButton(i64::from(number)))
        }
    }

    /// Validates any integer button number, naming it in full when it is
    /// out of range (`300` and `-1` are reported as such, not truncated).
    pub fn from_number(number: impl Into<i64>) -> CollectiveResult<Self> {
        let number = number.into();
        u8::try_from(number)
            .ok()
            .filter(|n| (Self::MIN..=Self::MAX).contains(n))
            .map(Self)
            .ok_or(CollectiveError::InvalidButton(number))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn bit(self) -> u64 {
        1u64 << (self.0 - 1)
    }

    pub fn all() -> impl Iterator<Item = ButtonId> {
        (Self::MIN..=Self::MAX).map(ButtonId)
    }
}

impl TryFrom<u8> for ButtonId {
    type Error = CollectiveError;

    fn try_from(number: u8) -> CollectiveResult<Self> {
        Self::new(number)
    }
}

impl From<ButtonId> for u8 {
    fn from(id: ButtonId) -> u8 {
        id.0
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The 40-bit button field: bit `n - 1` is button `n`, bits 33..39 are
/// padding and always clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ButtonBank(u64);

impl ButtonBank {
    pub const EMPTY: ButtonBank = ButtonBank(0);
    pub const VALID_MASK: u64 = (1u64 << BUTTON_COUNT) - 1;

    /// Returns `None` if any padding or out-of-field bit is set.
    pub fn from_bits(bits: u64) -> Option<Self> {
        (bits & !Self::VALID_MASK == 0).then_some(Self(bits))
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Validates every number before building the bank, so one bad id
    /// rejects the whole set.
    pub fn from_ids<I>(numbers: I) -> CollectiveResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        numbers
            .into_iter()
            .try_fold(Self::EMPTY, |bank, number| -> CollectiveResult<Self> {
                Ok(bank.with(ButtonId::from_number(number)?))
            })
    }

    pub fn with(self, id: ButtonId) -> Self {
        Self(self.0 | id.bit())
    }

    pub fn insert(&mut self, id: ButtonId) {
        self.0 |= id.bit();
    }

    pub fn remove(&mut self, id: ButtonId) {
        self.0 &= !id.bit();
    }

    pub fn contains(self, id: ButtonId) -> bool {
        self.0 & id.bit() != 0
    }

    pub fn union(self, other: ButtonBank) -> Self {
        Self(self.0 | other.0)
    }

    pub fn difference(self, other: ButtonBank) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = ButtonId> {
        ButtonId::all().filter(move |&id| self.contains(id))
    }

    pub fn to_le_bytes(self) -> [u8; BUTTON_BYTES] {
        let mut out = [0u8; BUTTON_BYTES];
        out.copy_from_slice(&self.0.to_le_bytes()[..BUTTON_BYTES]);
        out
    }

    pub fn from_le_bytes(bytes: [u8; BUTTON_BYTES]) -> Option<Self> {
        let mut wide = [0u8; 8];
        wide[..BUTTON_BYTES].copy_from_slice(&bytes);
        Self::from_bits(u64::from_le_bytes(wide))
    }
}

impl TryFrom<u64> for ButtonBank {
    type Error = CollectiveError;

    fn try_from(bits: u64) -> CollectiveResult<Self> {
        Self::from_bits(bits).ok_or_else(|| {
            CollectiveError::InvalidReport(format!(
                "button bits {bits:#x} set outside buttons 1 to 33"
            ))
        })
    }
}

impl From<ButtonBank> for u64 {
    fn from(bank: ButtonBank) -> u64 {
        bank.0
    }
}

impl FromIterator<ButtonId> for ButtonBank {
    fn from_iter<I: IntoIterator<Item = ButtonId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, ButtonBank::with)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    /// Collective.
    Z,
    /// Throttle.
    Rz,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::Rz];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::Rz => 3,
        }
    }

    /// Byte offset of this axis in the input report.
    pub fn offset(self) -> usize {
        BUTTON_BYTES + self.index() * 2
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::Rz => "rz",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejects values outside the `i16` range instead of clamping them.
pub fn validate_axis_value(axis: Axis, value: i32) -> CollectiveResult<i16> {
    i16::try_from(value).map_err(|_| CollectiveError::InvalidAxis { axis, value })
}

/// A partial axis update. `None` leaves the axis where it is; it never means zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisMove {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub z: Option<i32>,
    pub rz: Option<i32>,
}

impl AxisMove {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(self, value: i32) -> Self {
        self.with(Axis::X, value)
    }

    pub fn y(self, value: i32) -> Self {
        self.with(Axis::Y, value)
    }

    pub fn z(self, value: i32) -> Self {
        self.with(Axis::Z, value)
    }

    pub fn rz(self, value: i32) -> Self {
        self.with(Axis::Rz, value)
    }

    pub fn with(mut self, axis: Axis, value: i32) -> Self {
        *self.slot(axis) = Some(value);
        self
    }

    pub fn get(&self, axis: Axis) -> Option<i32> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::Rz => self.rz,
        }
    }

    fn slot(&mut self, axis: Axis) -> &mut Option<i32> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
            Axis::Rz => &mut self.rz,
        }
    }

    pub fn is_empty(&self) -> bool {
        Axis::ALL.iter().all(|&axis| self.get(axis).is_none())
    }

    /// Validates every supplied value, returning the accepted updates by
    /// axis index. Fails on the first out-of-range value.
    pub fn validate(&self) -> CollectiveResult<[Option<i16>; 4]> {
        let mut out = [None; 4];
        for (slot, axis) in out.iter_mut().zip(Axis::ALL) {
            *slot = self
                .get(axis)
                .map(|value| validate_axis_value(axis, value))
                .transpose()?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_id_range() {
        assert!(ButtonId::new(0).is_err());
        assert_eq!(ButtonId::new(1).map(ButtonId::get).ok(), Some(1));
        assert_eq!(ButtonId::new(33).map(ButtonId::get).ok(), Some(33));
        assert!(matches!(
            ButtonId::new(34),
            Err(CollectiveError::InvalidButton(34))
        ));
        assert_eq!(ButtonId::all().count(), 33);
    }

    #[test]
    fn test_button_id_serde_validates() {
        let id: ButtonId = serde_json::from_str("17").expect("valid id");
        assert_eq!(id.get(), 17);
        assert!(serde_json::from_str::<ButtonId>("0").is_err());
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "17");
    }

    #[test]
    fn test_bank_from_ids_is_all_or_nothing() {
        let bank = ButtonBank::from_ids([1, 17, 33]).expect("valid ids");
        assert_eq!(bank.bits(), (1 << 0) | (1 << 16) | (1 << 32));

        assert!(matches!(
            ButtonBank::from_ids([1, 40, 2]),
            Err(CollectiveError::InvalidButton(40))
        ));
    }

    #[test]
    fn test_wide_button_numbers_are_named_in_full() {
        assert_eq!(ButtonId::from_number(33i64).map(ButtonId::get).ok(), Some(33));
        assert!(matches!(
            ButtonId::from_number(300),
            Err(CollectiveError::InvalidButton(300))
        ));
        assert!(matches!(
            ButtonBank::from_ids([1i32, -1, 2]),
            Err(CollectiveError::InvalidButton(-1))
        ));
        assert!(matches!(
            ButtonBank::from_ids([2u16, 256]),
            Err(CollectiveError::InvalidButton(256))
        ));
    }

    #[test]
    fn test_bank_insert_remove() {
        let five = ButtonId::new(5).expect("valid id");
        let mut bank = ButtonBank::EMPTY;

        bank.insert(five);
        bank.insert(five);
        assert_eq!(bank.bits(), 1 << 4);
        assert!(bank.contains(five));

        bank.remove(five);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_bank_set_operations() {
        let a = ButtonBank::from_ids([1, 2, 3]).expect("valid ids");
        let b = ButtonBank::from_ids([3, 4]).expect("valid ids");

        assert_eq!(a.union(b).count(), 4);
        let ids: Vec<u8> = a.difference(b).iter().map(ButtonId::get).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_bank_byte_layout() {
        let bank = ButtonBank::from_ids([1, 17, 33]).expect("valid ids");
        assert_eq!(bank.to_le_bytes(), [0x01, 0x00, 0x01, 0x00, 0x01]);
        assert_eq!(ButtonBank::from_le_bytes(bank.to_le_bytes()), Some(bank));
    }

    #[test]
    fn test_bank_rejects_padding_bits() {
        assert!(ButtonBank::from_le_bytes([0, 0, 0, 0, 0x02]).is_none());
        assert!(ButtonBank::from_bits(1 << 33).is_none());
        assert!(ButtonBank::from_bits(ButtonBank::VALID_MASK).is_some());
    }

    #[test]
    fn test_bank_serde_rejects_padding() {
        let bank: ButtonBank = serde_json::from_str("5").expect("valid bits");
        assert_eq!(bank.count(), 2);
        assert!(serde_json::from_str::<ButtonBank>("8589934592").is_err());
    }

    #[test]
    fn test_axis_offsets() {
        let offsets: Vec<usize> = Axis::ALL.iter().map(|a| a.offset()).collect();
        assert_eq!(offsets, vec![5, 7, 9, 11]);
    }

    #[test]
    fn test_validate_axis_value() {
        assert_eq!(validate_axis_value(Axis::X, -32768).ok(), Some(i16::MIN));
        assert_eq!(validate_axis_value(Axis::X, 32767).ok(), Some(i16::MAX));
        assert!(matches!(
            validate_axis_value(Axis::Y, 32768),
            Err(CollectiveError::InvalidAxis {
                axis: Axis::Y,
                value: 32768
            })
        ));
        assert!(validate_axis_value(Axis::Z, -32769).is_err());
    }

    #[test]
    fn test_axis_move_unset_is_not_zero() {
        let update = AxisMove::new().y(0);
        assert_eq!(update.get(Axis::X), None);
        assert_eq!(update.get(Axis::Y), Some(0));
        assert!(!update.is_empty());
        assert!(AxisMove::new().is_empty());
    }

    #[test]
    fn test_axis_move_validate() {
        let update = AxisMove::new().x(-1).rz(32767);
        assert_eq!(
            update.validate().ok(),
            Some([Some(-1), None, None, Some(i16::MAX)])
        );

        let bad = AxisMove::new().x(5).z(-40_000);
        assert!(matches!(
            bad.validate(),
            Err(CollectiveError::InvalidAxis {
                axis: Axis::Z,
                value: -40_000
            })
        ));
    }
}
