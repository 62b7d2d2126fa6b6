//! Capture sessions.
//!
//! A [`CaptureSession`] owns one platform port and the set of endpoints
//! connected to it. Packet lists arriving on the port are decoded, filtered
//! with the session's current [`FilterSpec`] and delivered as
//! [`CapturedBatch`]es to a callback or a bounded channel.
//!
//! The connected set sits behind one mutex, held only for the membership
//! check and the backend call that changes it. Delivery never takes it.

use crossbeam_channel::{bounded, Receiver};
use midispy_core::{Endpoint, FilterSpec};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::backend::{Direction, MidiBackend};
use crate::config::CaptureConfig;
use crate::directory::{find_by_name, EndpointDirectory};
use crate::error::{Error, Result};
use crate::sink::{CapturedBatch, Delivery, PacketSink, Shared};

struct SessionState<P> {
    /// `None` once closed.
    port: Option<P>,
    connected: Vec<Endpoint>,
}

pub struct CaptureSession<B: MidiBackend> {
    backend: B,
    config: CaptureConfig,
    shared: Arc<Shared>,
    state: Mutex<SessionState<B::Port>>,
}

impl<B: MidiBackend> CaptureSession<B> {
    /// Opens a session that calls `callback` on the platform's delivery
    /// thread. The callback must not block.
    pub fn with_callback<F>(backend: B, config: CaptureConfig, callback: F) -> Result<Self>
    where
        F: Fn(CapturedBatch) + Send + Sync + 'static,
    {
        Self::open(backend, config, Delivery::Callback(Box::new(callback)))
    }

    /// Opens a session that queues batches on a bounded channel of
    /// `config.channel_capacity`. Batches arriving while it is full are
    /// dropped.
    pub fn with_channel(backend: B, config: CaptureConfig) -> Result<(Self, Receiver<CapturedBatch>)> {
        config.validate()?;
        let (sender, receiver) = bounded(config.channel_capacity);
        let session = Self::open(backend, config, Delivery::Channel(sender))?;
        Ok((session, receiver))
    }

    fn open(backend: B, config: CaptureConfig, delivery: Delivery) -> Result<Self> {
        config.validate()?;
        let shared = Arc::new(Shared::new(config.byte_order, delivery));
        let port = backend.open_port(&config.client_name, PacketSink::new(Arc::clone(&shared)))?;

        tracing::debug!(
            client = %config.client_name,
            direction = %backend.direction(),
            "capture session opened"
        );

        Ok(Self {
            backend,
            config,
            shared,
            state: Mutex::new(SessionState {
                port: Some(port),
                connected: Vec::new(),
            }),
        })
    }

    pub fn direction(&self) -> Direction {
        self.backend.direction()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// A fresh snapshot of the endpoints this session can connect to.
    pub fn directory(&self) -> Result<EndpointDirectory<'_, B>> {
        EndpointDirectory::new(&self.backend)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Replaces the active filter. Takes effect from the next packet list.
    pub fn set_filter(&self, spec: FilterSpec) {
        self.shared.filter.store(Arc::new(spec));
    }

    pub fn filter(&self) -> FilterSpec {
        **self.shared.filter.load()
    }

    pub fn connect(&self, endpoint: &Endpoint) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }

        let mut state = self.state.lock();
        let SessionState { port, connected } = &mut *state;
        let port = port.as_mut().ok_or(Error::Closed)?;
        if connected.contains(endpoint) {
            return Err(Error::ConnectionExists {
                name: endpoint.display_name(),
            });
        }

        self.backend.connect(port, endpoint)?;
        connected.push(endpoint.clone());
        tracing::debug!(
            endpoint = %endpoint.display_name(),
            unique_id = endpoint.unique_id,
            "connected"
        );
        Ok(())
    }

    /// Stops capturing `endpoint`. A no-op once the session is closed.
    pub fn disconnect(&self, endpoint: &Endpoint) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }

        let mut state = self.state.lock();
        let SessionState { port, connected } = &mut *state;
        let Some(port) = port.as_mut() else {
            return Ok(());
        };
        let Some(index) = connected.iter().position(|e| e == endpoint) else {
            return Err(Error::ConnectionNotFound {
                name: endpoint.display_name(),
            });
        };

        self.backend.disconnect(port, endpoint)?;
        connected.remove(index);
        tracing::debug!(
            endpoint = %endpoint.display_name(),
            unique_id = endpoint.unique_id,
            "disconnected"
        );
        Ok(())
    }

    /// Connects the endpoint best matching `name`; see [`find_by_name`].
    pub fn connect_by_name(&self, name: &str) -> Result<()> {
        let endpoint = self.lookup(name)?;
        self.connect(&endpoint)
    }

    pub fn disconnect_by_name(&self, name: &str) -> Result<()> {
        let endpoint = self.lookup(name)?;
        self.disconnect(&endpoint)
    }

    fn lookup(&self, name: &str) -> Result<Endpoint> {
        let endpoints = self.backend.endpoints()?;
        find_by_name(&endpoints, name)
            .cloned()
            .ok_or_else(|| Error::EndpointNotFound(name.to_string()))
    }

    /// Disconnects everything, ignoring individual failures.
    pub fn disconnect_all(&self) {
        if self.is_closed() {
            return;
        }
        let mut state = self.state.lock();
        let SessionState { port, connected } = &mut *state;
        let endpoints = std::mem::take(connected);
        if let Some(port) = port.as_mut() {
            self.disconnect_each(port, endpoints);
        }
    }

    fn disconnect_each(&self, port: &mut B::Port, endpoints: Vec<Endpoint>) {
        for endpoint in endpoints {
            if let Err(e) = self.backend.disconnect(port, &endpoint) {
                tracing::warn!(
                    endpoint = %endpoint.display_name(),
                    error = %e,
                    "disconnect failed"
                );
            }
        }
    }

    pub fn connected_endpoints(&self) -> Vec<Endpoint> {
        self.state.lock().connected.clone()
    }

    pub fn is_connected(&self, endpoint: &Endpoint) -> bool {
        self.state.lock().connected.contains(endpoint)
    }

    /// Disconnects everything and releases the port. Safe to call repeatedly
    /// and from any thread, including from inside the delivery callback.
    ///
    /// The session lock is released before the backend is called, so a
    /// callback still running on the platform thread cannot block teardown.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let (port, endpoints) = {
            let mut state = self.state.lock();
            (state.port.take(), std::mem::take(&mut state.connected))
        };
        if let Some(mut port) = port {
            self.disconnect_each(&mut port, endpoints);
            if let Err(e) = self.backend.dispose(port) {
                tracing::warn!(error = %e, "port dispose failed");
            }
        }
        tracing::debug!(client = %self.config.client_name, "capture session closed");
    }
}

impl<B: MidiBackend> Drop for CaptureSession<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: MidiBackend> fmt::Debug for CaptureSession<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("client_name", &self.config.client_name)
            .field("direction", &self.direction())
            .field("closed", &self.is_closed())
            .field("connected", &self.state.lock().connected.len())
            .finish()
    }
}
