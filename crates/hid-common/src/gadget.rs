//! Linux USB gadget HID backend
//!
//! A board running Linux in USB device mode exposes every configfs HID
//! function as a `/dev/hidgN` node. Writing a buffer to that node queues one
//! input report for the host. Functions are discovered under
//! `<configfs>/<gadget>/functions/hid.*`, each with a binary `report_desc`
//! and a `dev` file holding `MAJOR:MINOR`; minor `N` is `/dev/hidgN`.

use crate::{
    HidCommonError, HidCommonResult, HidDeviceInfo, HidLocator, ReportSink, descriptor::summarize,
};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

pub const DEFAULT_CONFIGFS_ROOT: &str = "/sys/kernel/config/usb_gadget";
pub const DEFAULT_DEV_ROOT: &str = "/dev";

const HID_FUNCTION_PREFIX: &str = "hid.";

#[derive(Debug, Clone)]
pub struct GadgetLocator {
    configfs_root: PathBuf,
    dev_root: PathBuf,
}

impl GadgetLocator {
    pub fn new() -> Self {
        Self::with_roots(DEFAULT_CONFIGFS_ROOT, DEFAULT_DEV_ROOT)
    }

    pub fn with_roots(configfs_root: impl Into<PathBuf>, dev_root: impl Into<PathBuf>) -> Self {
        Self {
            configfs_root: configfs_root.into(),
            dev_root: dev_root.into(),
        }
    }

    pub fn configfs_root(&self) -> &Path {
        &self.configfs_root
    }

    pub fn dev_root(&self) -> &Path {
        &self.dev_root
    }

    fn describe_function(
        &self,
        gadget: &str,
        function: &str,
        function_dir: &Path,
    ) -> HidCommonResult<HidDeviceInfo> {
        let descriptor = fs::read(function_dir.join("report_desc"))?;
        let summary = summarize(&descriptor)?;
        let minor = parse_minor(&fs::read_to_string(function_dir.join("dev"))?)?;

        Ok(
            HidDeviceInfo::new(summary.usage, self.dev_root.join(format!("hidg{minor}")))
                .with_function_name(format!("{gadget}/{function}"))
                .with_input_report_len(summary.input_report_len()),
        )
    }
}

impl Default for GadgetLocator {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_minor(dev: &str) -> HidCommonResult<u32> {
    dev.trim()
        .split_once(':')
        .and_then(|(_, minor)| minor.parse().ok())
        .ok_or_else(|| {
            HidCommonError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed device number {:?}", dev.trim()),
            ))
        })
}

fn sorted_entries(dir: &Path) -> HidCommonResult<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            entries.push((name.to_string(), entry.path()));
        }
    }
    entries.sort();
    Ok(entries)
}

impl HidLocator for GadgetLocator {
    type Device = GadgetDevice;

    fn devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>> {
        if !self.configfs_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut devices = Vec::new();
        for (gadget, gadget_dir) in sorted_entries(&self.configfs_root)? {
            let functions_dir = gadget_dir.join("functions");
            if !functions_dir.is_dir() {
                continue;
            }
            for (function, function_dir) in sorted_entries(&functions_dir)? {
                if !function.starts_with(HID_FUNCTION_PREFIX) {
                    continue;
                }
                match self.describe_function(&gadget, &function, &function_dir) {
                    Ok(info) => devices.push(info),
                    Err(e) => warn!(
                        %gadget,
                        %function,
                        error = %e,
                        "Skipping unreadable HID gadget function"
                    ),
                }
            }
        }
        Ok(devices)
    }

    fn open(&self, info: &HidDeviceInfo) -> HidCommonResult<GadgetDevice> {
        GadgetDevice::open(&info.path)
    }
}

/// Write handle on a `/dev/hidgN` node.
#[derive(Debug)]
pub struct GadgetDevice {
    file: File,
    path: PathBuf,
}

impl GadgetDevice {
    /// Opens the node non-blocking: a report the host has not collected yet
    /// makes the next write fail with `WouldBlock` instead of stalling.
    pub fn open(path: impl AsRef<Path>) -> HidCommonResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        options.write(true);
        #[cfg(unix)]
        options.custom_flags(libc::O_NONBLOCK);
        let file = options.open(&path)?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for GadgetDevice {
    fn send_report(&mut self, report: &[u8]) -> HidCommonResult<()> {
        // hidg queues one report per write(2); a partial write is a lost report.
        let written = self.file.write(report)?;
        if written != report.len() {
            return Err(HidCommonError::ShortWrite {
                written,
                expected: report.len(),
            });
        }
        trace!(path = %self.path.display(), len = written, "Wrote gadget report");
        Ok(())
    }
}
