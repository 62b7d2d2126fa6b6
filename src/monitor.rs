//! Monitor - the top-level capture handle.

use crossbeam_channel::Receiver;
use midispy_core::{Endpoint, FilterSpec};
use midispy_io::{CaptureSession, CapturedBatch, MidiBackend};

use crate::builder::MonitorBuilder;
use crate::Result;

/// A capture session plus, in channel mode, the receiving end of its
/// batches. Closing or dropping the monitor releases the platform port.
pub struct Monitor<B: MidiBackend> {
    session: CaptureSession<B>,
    batches: Option<Receiver<CapturedBatch>>,
}

impl<B: MidiBackend> Monitor<B> {
    pub fn builder(backend: B) -> MonitorBuilder<B> {
        MonitorBuilder::new(backend)
    }

    pub(crate) fn from_parts(
        session: CaptureSession<B>,
        batches: Option<Receiver<CapturedBatch>>,
    ) -> Self {
        Self { session, batches }
    }

    pub fn session(&self) -> &CaptureSession<B> {
        &self.session
    }

    /// `None` for callback monitors.
    pub fn batches(&self) -> Option<&Receiver<CapturedBatch>> {
        self.batches.as_ref()
    }

    /// Display names of every endpoint the backend currently lists.
    pub fn endpoint_names(&self) -> Result<Vec<String>> {
        Ok(self.session.directory()?.names())
    }

    pub fn connected(&self) -> Vec<Endpoint> {
        self.session.connected_endpoints()
    }

    pub fn connect(&self, name: &str) -> Result<()> {
        Ok(self.session.connect_by_name(name)?)
    }

    pub fn disconnect(&self, name: &str) -> Result<()> {
        Ok(self.session.disconnect_by_name(name)?)
    }

    pub fn set_filter(&self, spec: FilterSpec) {
        self.session.set_filter(spec);
    }

    pub fn filter(&self) -> FilterSpec {
        self.session.filter()
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    pub fn close(&self) {
        self.session.close();
    }
}

#[cfg(feature = "midir")]
impl Monitor<midispy_io::MidirInputBackend> {
    /// Builder over the platform's MIDI sources through midir.
    pub fn midir() -> MonitorBuilder<midispy_io::MidirInputBackend> {
        MonitorBuilder::new(midispy_io::MidirInputBackend::new())
    }
}

impl<B: MidiBackend> std::fmt::Debug for Monitor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("session", &self.session)
            .field("channel", &self.batches.is_some())
            .finish()
    }
}
