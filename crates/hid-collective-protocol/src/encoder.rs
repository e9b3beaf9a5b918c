//! Collective report state machine
//!
//! [`CollectiveEncoder`] owns the logical button and axis state, serializes it
//! into a fixed scratch buffer after every change and transmits only when the
//! bytes differ from the last report the sink accepted. `reset_all` bypasses
//! that suppression.
//!
//! Every operation validates its whole input before touching state, so a
//! rejected call leaves the encoder exactly as it was. Transport failures are
//! different: state has already been updated when the send fails, and the
//! next successful send carries it.

use crate::{
    AXIS_COUNT, Axis, AxisMove, ButtonBank, CollectiveError, CollectiveReport, CollectiveResult,
    EncoderConfig, HexBytes, REPORT_LEN,
};
use collective_hid_common::{HidLocator, ReportSink};
use std::thread;
use tracing::{debug, info, trace, warn};

pub struct CollectiveEncoder<S: ReportSink> {
    sink: S,
    buttons: ButtonBank,
    axes: [i16; AXIS_COUNT],
    // Both buffers are overwritten in place on every send; never reallocated.
    report: [u8; REPORT_LEN],
    last_report: [u8; REPORT_LEN],
    reports_sent: u64,
}

impl<S: ReportSink> CollectiveEncoder<S> {
    /// Locates the configured collection and probes it with a reset report.
    pub fn open<L>(locator: &L, config: &EncoderConfig) -> CollectiveResult<Self>
    where
        L: HidLocator<Device = S>,
    {
        let sink = locator.locate(config.usage())?;
        debug!(usage = %config.usage(), "Opened collective collection");
        Self::with_sink(sink, config)
    }

    /// Takes an already-resolved sink and probes it with a reset report.
    ///
    /// A failed probe is retried exactly once after
    /// [`EncoderConfig::recovery_delay`]; the host may not be listening yet
    /// right after enumeration. A second failure is returned.
    pub fn with_sink(sink: S, config: &EncoderConfig) -> CollectiveResult<Self> {
        let mut encoder = Self {
            sink,
            buttons: ButtonBank::EMPTY,
            axes: [0; AXIS_COUNT],
            report: [0; REPORT_LEN],
            last_report: [0; REPORT_LEN],
            reports_sent: 0,
        };

        match encoder.reset_all() {
            Ok(()) => {}
            Err(CollectiveError::Transport(e)) => {
                warn!(
                    error = %e,
                    delay_ms = config.recovery_delay_ms,
                    "Collective probe report failed, retrying once"
                );
                thread::sleep(config.recovery_delay());
                encoder.reset_all()?;
            }
            Err(e) => return Err(e),
        }

        info!("Collective encoder ready");
        Ok(encoder)
    }

    /// Presses and holds `buttons` (1-based, `1..=33`).
    ///
    /// Any integer type is accepted; an out-of-range number is reported as
    /// given in [`CollectiveError::InvalidButton`].
    pub fn press<I>(&mut self, buttons: I) -> CollectiveResult<()>
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        let mask = ButtonBank::from_ids(buttons)?;
        self.buttons = self.buttons.union(mask);
        self.send(false)
    }

    pub fn release<I>(&mut self, buttons: I) -> CollectiveResult<()>
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        let mask = ButtonBank::from_ids(buttons)?;
        self.buttons = self.buttons.difference(mask);
        self.send(false)
    }

    pub fn release_all(&mut self) -> CollectiveResult<()> {
        self.buttons = ButtonBank::EMPTY;
        self.send(false)
    }

    /// Press then release, as two separate reports.
    pub fn click<I>(&mut self, buttons: I) -> CollectiveResult<()>
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        let mask = ButtonBank::from_ids(buttons)?;
        self.buttons = self.buttons.union(mask);
        self.send(false)?;
        self.buttons = self.buttons.difference(mask);
        self.send(false)
    }

    /// Moves the supplied axes; axes left unset in `update` keep their value.
    pub fn move_axis(&mut self, update: AxisMove) -> CollectiveResult<()> {
        let values = update.validate()?;
        for (axis, value) in self.axes.iter_mut().zip(values) {
            if let Some(value) = value {
                *axis = value;
            }
        }
        self.send(false)
    }

    /// Releases every button, centres every axis and always transmits.
    pub fn reset_all(&mut self) -> CollectiveResult<()> {
        self.buttons = ButtonBank::EMPTY;
        self.axes = [0; AXIS_COUNT];
        self.send(true)
    }

    fn send(&mut self, force: bool) -> CollectiveResult<()> {
        self.state().encode_into(&mut self.report)?;

        if !force && self.report == self.last_report {
            trace!("Collective report unchanged, suppressed");
            return Ok(());
        }

        self.sink.send_report(&self.report)?;
        self.last_report.copy_from_slice(&self.report);
        self.reports_sent += 1;
        trace!(report = %HexBytes(&self.report), force, "Sent collective report");
        Ok(())
    }

    pub fn buttons(&self) -> ButtonBank {
        self.buttons
    }

    pub fn axis(&self, axis: Axis) -> i16 {
        self.axes[axis.index()]
    }

    /// Current logical state, whether or not it has been transmitted.
    pub fn state(&self) -> CollectiveReport {
        CollectiveReport {
            buttons: self.buttons,
            axes: self.axes,
        }
    }

    /// Bytes of the last report the sink accepted.
    pub fn last_report(&self) -> &[u8; REPORT_LEN] {
        &self.last_report
    }

    pub fn reports_sent(&self) -> u64 {
        self.reports_sent
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
