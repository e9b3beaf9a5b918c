//! HID transport traits

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo, HidUsage};
use tracing::debug;

/// An endpoint that accepts complete input reports.
///
/// Implementations send the whole slice or fail; a partial transmission is
/// reported as an error, never as success.
pub trait ReportSink {
    fn send_report(&mut self, report: &[u8]) -> HidCommonResult<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn send_report(&mut self, report: &[u8]) -> HidCommonResult<()> {
        (**self).send_report(report)
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn send_report(&mut self, report: &[u8]) -> HidCommonResult<()> {
        (**self).send_report(report)
    }
}

/// Resolves HID collections to openable report sinks.
pub trait HidLocator {
    type Device: ReportSink;

    fn devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>>;

    fn open(&self, info: &HidDeviceInfo) -> HidCommonResult<Self::Device>;

    /// Opens the first collection whose top-level usage matches `usage`.
    fn locate(&self, usage: HidUsage) -> HidCommonResult<Self::Device> {
        let info = self
            .devices()?
            .into_iter()
            .find(|info| info.matches(usage))
            .ok_or(HidCommonError::DeviceNotFound {
                usage_page: usage.usage_page,
                usage: usage.usage,
            })?;
        debug!(device = %info.display_name(), %usage, "Located HID collection");
        self.open(&info)
    }
}

pub mod mock {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};

    #[derive(Debug, Default)]
    struct MockState {
        write_history: Vec<Vec<u8>>,
        send_attempts: usize,
        pending_failures: usize,
        disconnected: bool,
    }

    /// In-memory report sink. Clones share history and failure script, so a
    /// test can keep one handle while the code under test owns another.
    #[derive(Debug, Clone)]
    pub struct MockHidDevice {
        info: HidDeviceInfo,
        state: Arc<Mutex<MockState>>,
    }

    impl MockHidDevice {
        pub fn new(usage: HidUsage, path: impl Into<PathBuf>) -> Self {
            Self {
                info: HidDeviceInfo::new(usage, path),
                state: Arc::new(Mutex::new(MockState::default())),
            }
        }

        fn state(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn info(&self) -> &HidDeviceInfo {
            &self.info
        }

        /// Makes the next `count` sends fail with an I/O error.
        pub fn fail_next(&self, count: usize) {
            self.state().pending_failures = count;
        }

        pub fn get_write_history(&self) -> Vec<Vec<u8>> {
            self.state().write_history.clone()
        }

        pub fn last_report(&self) -> Option<Vec<u8>> {
            self.state().write_history.last().cloned()
        }

        /// Every call to `send_report`, failed ones included.
        pub fn send_attempts(&self) -> usize {
            self.state().send_attempts
        }

        pub fn clear_history(&self) {
            let mut state = self.state();
            state.write_history.clear();
            state.send_attempts = 0;
        }

        pub fn disconnect(&self) {
            self.state().disconnected = true;
        }

        pub fn reconnect(&self) {
            self.state().disconnected = false;
        }

        pub fn is_connected(&self) -> bool {
            !self.state().disconnected
        }
    }

    impl ReportSink for MockHidDevice {
        fn send_report(&mut self, report: &[u8]) -> HidCommonResult<()> {
            let mut state = self.state();
            state.send_attempts += 1;

            if state.disconnected {
                return Err(HidCommonError::Disconnected);
            }
            if state.pending_failures > 0 {
                state.pending_failures -= 1;
                return Err(HidCommonError::IoError(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "host not listening",
                )));
            }

            state.write_history.push(report.to_vec());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct MockHidPort {
        devices: Vec<MockHidDevice>,
    }

    impl MockHidPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_device(&mut self, device: MockHidDevice) {
            self.devices.push(device);
        }

        pub fn device_count(&self) -> usize {
            self.devices.len()
        }
    }

    impl HidLocator for MockHidPort {
        type Device = MockHidDevice;

        fn devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>> {
            Ok(self.devices.iter().map(|d| d.info.clone()).collect())
        }

        fn open(&self, info: &HidDeviceInfo) -> HidCommonResult<MockHidDevice> {
            self.devices
                .iter()
                .find(|d| d.info.path == info.path)
                .cloned()
                .ok_or(HidCommonError::DeviceNotFound {
                    usage_page: info.usage.usage_page,
                    usage: info.usage.usage,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockHidDevice, MockHidPort};
    use super::*;

    const JOYSTICK: HidUsage = HidUsage::new(0x01, 0x04);
    const KEYBOARD: HidUsage = HidUsage::new(0x01, 0x06);

    #[test]
    fn test_mock_device_write() {
        let mut device = MockHidDevice::new(JOYSTICK, "/dev/hidg0");

        device.send_report(&[0x01, 0x02, 0x03]).expect("send");

        let history = device.get_write_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], vec![0x01, 0x02, 0x03]);
        assert_eq!(device.send_attempts(), 1);
    }

    #[test]
    fn test_mock_device_scripted_failures() {
        let mut device = MockHidDevice::new(JOYSTICK, "/dev/hidg0");
        device.fail_next(1);

        let result = device.send_report(&[0xAA]);
        assert!(matches!(result, Err(HidCommonError::IoError(_))));
        device.send_report(&[0xBB]).expect("second send succeeds");

        assert_eq!(device.send_attempts(), 2);
        assert_eq!(device.get_write_history(), vec![vec![0xBB]]);
    }

    #[test]
    fn test_mock_device_disconnect() {
        let mut device = MockHidDevice::new(JOYSTICK, "/dev/hidg0");

        device.disconnect();
        assert!(!device.is_connected());
        let result = device.send_report(&[0x01]);
        assert!(matches!(result, Err(HidCommonError::Disconnected)));

        device.reconnect();
        assert!(device.send_report(&[0x01]).is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let observer = MockHidDevice::new(JOYSTICK, "/dev/hidg0");
        let mut owned = observer.clone();

        owned.send_report(&[0x42]).expect("send");
        assert_eq!(observer.last_report(), Some(vec![0x42]));

        observer.clear_history();
        assert!(owned.get_write_history().is_empty());
        assert_eq!(owned.send_attempts(), 0);
    }

    fn send_via<S: ReportSink>(mut sink: S, report: &[u8]) -> HidCommonResult<()> {
        sink.send_report(report)
    }

    #[test]
    fn test_forwarding_impls() {
        let observer = MockHidDevice::new(JOYSTICK, "/dev/hidg0");

        let mut owned = observer.clone();
        send_via(&mut owned, &[0x01]).expect("send through &mut");

        let boxed: Box<dyn ReportSink> = Box::new(observer.clone());
        send_via(boxed, &[0x02]).expect("send through Box<dyn>");

        assert_eq!(observer.get_write_history(), vec![vec![0x01], vec![0x02]]);
    }

    #[test]
    fn test_mock_port_locate() {
        let mut port = MockHidPort::new();
        port.add_device(MockHidDevice::new(KEYBOARD, "/dev/hidg0"));
        port.add_device(MockHidDevice::new(JOYSTICK, "/dev/hidg1"));
        assert_eq!(port.device_count(), 2);

        let device = port.locate(JOYSTICK).expect("joystick present");
        assert_eq!(device.info().path, std::path::PathBuf::from("/dev/hidg1"));
    }

    #[test]
    fn test_mock_port_locate_missing() {
        let mut port = MockHidPort::new();
        port.add_device(MockHidDevice::new(KEYBOARD, "/dev/hidg0"));

        let result = port.locate(JOYSTICK);
        assert!(matches!(
            result,
            Err(HidCommonError::DeviceNotFound {
                usage_page: 0x01,
                usage: 0x04
            })
        ));
    }
}
