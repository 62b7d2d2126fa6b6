//! Builder for configuring and constructing a `Monitor`.

use crossbeam_channel::Receiver;
use midispy_core::{ByteOrder, FilterSpec, MessageTag, TagSet};
use midispy_io::{CaptureConfig, CaptureSession, CapturedBatch, MidiBackend};
use std::path::PathBuf;

use crate::{Monitor, Result};

/// Endpoints queued with [`connect`](Self::connect) are connected while
/// building, after [`connect_all`](Self::connect_all) if set. If any of them
/// fails the session is closed and the error returned.
///
/// # Example
///
/// ```
/// use midispy::{Monitor, VirtualBackend};
///
/// let backend = VirtualBackend::inputs();
/// backend.add_endpoint(1, "Keys");
///
/// let monitor = Monitor::builder(backend.clone())
///     .client_name("keys-monitor")
///     .filter_str("note_on, note_off")?
///     .connect("keys")
///     .build()?;
///
/// backend.send(1, 0, &[0xF8]);
/// backend.send(1, 1, &[0x90, 60, 100]);
///
/// let batch = monitor.batches().unwrap().try_recv().unwrap();
/// assert_eq!(batch.len(), 1);
/// # Ok::<(), midispy::Error>(())
/// ```
pub struct MonitorBuilder<B: MidiBackend> {
    backend: B,
    config: CaptureConfig,
    filter: FilterSpec,
    endpoints: Vec<String>,
    connect_all: bool,
}

impl<B: MidiBackend> MonitorBuilder<B> {
    pub(crate) fn new(backend: B) -> Self {
        Self {
            backend,
            config: CaptureConfig::default(),
            filter: FilterSpec::default(),
            endpoints: Vec::new(),
            connect_all: false,
        }
    }

    /// Replaces the whole capture config.
    pub fn config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.config.client_name = name.into();
        self
    }

    /// Default: native
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.config.byte_order = order;
        self
    }

    /// Default: 1024
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    pub fn framework_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.framework_path = Some(path.into());
        self
    }

    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filter = spec;
        self
    }

    /// Restricts capture to a comma-separated list of tag names, e.g.
    /// `"note_on, control_change"`. Blank entries are skipped, and a list
    /// with no names leaves the filter unchanged.
    pub fn filter_str(mut self, tags: &str) -> Result<Self> {
        let tags = tags
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(str::parse::<MessageTag>)
            .collect::<std::result::Result<TagSet, _>>()?;
        if !tags.is_empty() {
            self.filter = self.filter.types(tags.iter());
        }
        Ok(self)
    }

    /// Queues an endpoint to connect by name at build time.
    pub fn connect(mut self, name: impl Into<String>) -> Self {
        self.endpoints.push(name.into());
        self
    }

    /// Connects every endpoint the backend lists at build time.
    pub fn connect_all(mut self) -> Self {
        self.connect_all = true;
        self
    }

    /// Opens a channel-backed monitor. Batches are read from
    /// [`Monitor::batches`].
    pub fn build(self) -> Result<Monitor<B>> {
        let (session, receiver) =
            CaptureSession::with_channel(self.backend, self.config)?;
        Self::finish(session, Some(receiver), self.filter, &self.endpoints, self.connect_all)
    }

    /// Opens a monitor that calls `callback` on the platform's delivery
    /// thread.
    pub fn build_with_callback<F>(self, callback: F) -> Result<Monitor<B>>
    where
        F: Fn(CapturedBatch) + Send + Sync + 'static,
    {
        let session = CaptureSession::with_callback(self.backend, self.config, callback)?;
        Self::finish(session, None, self.filter, &self.endpoints, self.connect_all)
    }

    fn finish(
        session: CaptureSession<B>,
        receiver: Option<Receiver<CapturedBatch>>,
        filter: FilterSpec,
        endpoints: &[String],
        connect_all: bool,
    ) -> Result<Monitor<B>> {
        session.set_filter(filter);

        {
            let directory = session.directory()?;
            if connect_all {
                for endpoint in directory.endpoints() {
                    session.connect(endpoint)?;
                }
            }
            for name in endpoints {
                let endpoint = directory
                    .by_name(name)
                    .ok_or_else(|| midispy_io::Error::EndpointNotFound(name.clone()))?;
                if !session.is_connected(endpoint) {
                    session.connect(endpoint)?;
                }
            }
        }

        tracing::debug!(
            connected = session.connected_endpoints().len(),
            "monitor ready"
        );
        Ok(Monitor::from_parts(session, receiver))
    }
}
