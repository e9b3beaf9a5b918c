//! Device information types for HID collections

use crate::HidUsage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub usage: HidUsage,
    pub path: PathBuf,
    pub function_name: Option<String>,
    pub input_report_len: Option<usize>,
}

impl HidDeviceInfo {
    pub fn new(usage: HidUsage, path: impl Into<PathBuf>) -> Self {
        Self {
            usage,
            path: path.into(),
            function_name: None,
            input_report_len: None,
        }
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn with_input_report_len(mut self, len: usize) -> Self {
        self.input_report_len = Some(len);
        self
    }

    pub fn matches(&self, usage: HidUsage) -> bool {
        self.usage == usage
    }

    pub fn display_name(&self) -> String {
        self.function_name
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
