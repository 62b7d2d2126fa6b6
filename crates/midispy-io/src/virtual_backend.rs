//! In-memory backend.
//!
//! Endpoints are added by hand and traffic is injected with [`send`] or
//! [`inject_packet_list`]. Output-direction backends frame packet lists the
//! way the spy driver does, so both delivery paths get exercised.
//!
//! [`send`]: VirtualBackend::send
//! [`inject_packet_list`]: VirtualBackend::inject_packet_list

use midispy_core::{spy_frame, Endpoint, EndpointRef, PacketListBuilder};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::backend::{Direction, MidiBackend};
use crate::error::{Error, Result};
use crate::sink::PacketSink;

struct PortSlot {
    id: u64,
    client_name: String,
    sink: PacketSink,
    connected: Vec<i32>,
}

#[derive(Default)]
struct VirtualState {
    endpoints: Vec<Endpoint>,
    ports: Vec<PortSlot>,
    next_ref: u64,
    next_port: u64,
    fail_connect: Option<i32>,
    fail_disconnect: Option<i32>,
}

/// Cloning yields a handle onto the same virtual MIDI graph.
#[derive(Clone)]
pub struct VirtualBackend {
    direction: Direction,
    state: Arc<Mutex<VirtualState>>,
}

#[derive(Debug)]
pub struct VirtualPort {
    id: u64,
}

impl VirtualBackend {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            state: Arc::new(Mutex::new(VirtualState::default())),
        }
    }

    pub fn inputs() -> Self {
        Self::new(Direction::Input)
    }

    pub fn outputs() -> Self {
        Self::new(Direction::Output)
    }

    pub fn add_endpoint(&self, unique_id: i32, name: impl Into<String>) -> Endpoint {
        let mut state = self.state.lock();
        state.next_ref += 1;
        let endpoint = Endpoint::new(EndpointRef(state.next_ref), unique_id, name);
        state.endpoints.retain(|e| e.unique_id != unique_id);
        state.endpoints.push(endpoint.clone());
        endpoint
    }

    /// Removes the endpoint and drops every connection to it.
    pub fn remove_endpoint(&self, unique_id: i32) -> bool {
        let mut state = self.state.lock();
        for slot in &mut state.ports {
            slot.connected.retain(|id| *id != unique_id);
        }
        let before = state.endpoints.len();
        state.endpoints.retain(|e| e.unique_id != unique_id);
        state.endpoints.len() != before
    }

    /// Sends one message from `unique_id`. Returns the number of ports it
    /// reached.
    pub fn send(&self, unique_id: i32, timestamp: u64, data: &[u8]) -> usize {
        self.send_all(unique_id, &[(timestamp, data)])
    }

    /// Sends several messages from `unique_id` as one packet list.
    pub fn send_all(&self, unique_id: i32, messages: &[(u64, &[u8])]) -> usize {
        let sinks = self.connected_sinks(unique_id);
        for sink in &sinks {
            let mut builder = PacketListBuilder::with_byte_order(sink.byte_order());
            for (timestamp, data) in messages {
                builder.push(*timestamp, data);
            }
            self.dispatch(sink, unique_id, &builder);
        }
        sinks.len()
    }

    /// Hands a raw packet list to every port connected to `unique_id`.
    /// The list must already be in each sink's byte order.
    pub fn inject_packet_list(&self, unique_id: i32, packet_list: &[u8]) -> usize {
        let sinks = self.connected_sinks(unique_id);
        for sink in &sinks {
            match self.direction {
                Direction::Input => sink.deliver(packet_list, unique_id),
                Direction::Output => {
                    sink.deliver_spy(&spy_frame(unique_id, packet_list, sink.byte_order()))
                }
            }
        }
        sinks.len()
    }

    fn dispatch(&self, sink: &PacketSink, unique_id: i32, builder: &PacketListBuilder) {
        match self.direction {
            Direction::Input => sink.deliver(&builder.build(), unique_id),
            Direction::Output => sink.deliver_spy(&builder.build_spy_frame(unique_id)),
        }
    }

    /// Sinks are collected under the lock and called after releasing it,
    /// so delivery callbacks may call back into the backend.
    fn connected_sinks(&self, unique_id: i32) -> Vec<PacketSink> {
        self.state
            .lock()
            .ports
            .iter()
            .filter(|slot| slot.connected.contains(&unique_id))
            .map(|slot| slot.sink.clone())
            .collect()
    }

    /// Makes the next `connect` fail with the given platform status.
    pub fn fail_next_connect(&self, status: i32) {
        self.state.lock().fail_connect = Some(status);
    }

    /// Makes the next `disconnect` fail with the given platform status.
    pub fn fail_next_disconnect(&self, status: i32) {
        self.state.lock().fail_disconnect = Some(status);
    }

    pub fn open_ports(&self) -> usize {
        self.state.lock().ports.len()
    }

    pub fn port_names(&self) -> Vec<String> {
        self.state
            .lock()
            .ports
            .iter()
            .map(|slot| slot.client_name.clone())
            .collect()
    }

    /// Number of ports connected to `unique_id`.
    pub fn connection_count(&self, unique_id: i32) -> usize {
        self.state
            .lock()
            .ports
            .iter()
            .filter(|slot| slot.connected.contains(&unique_id))
            .count()
    }
}

impl MidiBackend for VirtualBackend {
    type Port = VirtualPort;

    fn direction(&self) -> Direction {
        self.direction
    }

    fn endpoints(&self) -> Result<Vec<Endpoint>> {
        Ok(self.state.lock().endpoints.clone())
    }

    fn open_port(&self, client_name: &str, sink: PacketSink) -> Result<VirtualPort> {
        let mut state = self.state.lock();
        state.next_port += 1;
        let id = state.next_port;
        state.ports.push(PortSlot {
            id,
            client_name: client_name.to_string(),
            sink,
            connected: Vec::new(),
        });
        Ok(VirtualPort { id })
    }

    fn connect(&self, port: &mut VirtualPort, endpoint: &Endpoint) -> Result<()> {
        let mut state = self.state.lock();
        let name = endpoint.display_name();
        if let Some(status) = state.fail_connect.take() {
            return Error::check_status(status, "connect", &name);
        }
        if !state.endpoints.contains(endpoint) {
            return Err(Error::EndpointNotFound(name));
        }

        let slot = state
            .ports
            .iter_mut()
            .find(|slot| slot.id == port.id)
            .ok_or(Error::Closed)?;
        if slot.connected.contains(&endpoint.unique_id) {
            return Err(Error::ConnectionExists { name });
        }
        slot.connected.push(endpoint.unique_id);
        Ok(())
    }

    fn disconnect(&self, port: &mut VirtualPort, endpoint: &Endpoint) -> Result<()> {
        let mut state = self.state.lock();
        let name = endpoint.display_name();
        if let Some(status) = state.fail_disconnect.take() {
            return Error::check_status(status, "disconnect", &name);
        }

        let slot = state
            .ports
            .iter_mut()
            .find(|slot| slot.id == port.id)
            .ok_or(Error::Closed)?;
        slot.connected.retain(|id| *id != endpoint.unique_id);
        Ok(())
    }

    fn dispose(&self, port: VirtualPort) -> Result<()> {
        self.state.lock().ports.retain(|slot| slot.id != port.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CapturedBatch, Delivery, Shared};
    use midispy_core::ByteOrder;

    fn collecting_sink() -> (PacketSink, Arc<Mutex<Vec<CapturedBatch>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let target = Arc::clone(&seen);
        let shared = Shared::new(
            ByteOrder::Native,
            Delivery::Callback(Box::new(move |batch: CapturedBatch| target.lock().push(batch))),
        );
        (PacketSink::new(Arc::new(shared)), seen)
    }

    #[test]
    fn test_only_connected_ports_receive() {
        let backend = VirtualBackend::inputs();
        let keys = backend.add_endpoint(1, "Keys");
        let (sink, seen) = collecting_sink();
        let mut port = backend.open_port("test", sink).unwrap();

        assert_eq!(backend.send(1, 0, &[0x90, 60, 100]), 0);
        backend.connect(&mut port, &keys).unwrap();
        assert_eq!(backend.send(1, 0, &[0x90, 60, 100]), 1);
        assert_eq!(backend.send(2, 0, &[0x90, 60, 100]), 0);

        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_output_direction_uses_spy_frames() {
        let backend = VirtualBackend::outputs();
        let synth = backend.add_endpoint(-5, "Synth");
        let (sink, seen) = collecting_sink();
        let mut port = backend.open_port("test", sink).unwrap();
        backend.connect(&mut port, &synth).unwrap();

        backend.send(-5, 9, &[0xC0, 3]);
        let seen = seen.lock();
        assert_eq!(seen[0].endpoint_id, -5);
        assert_eq!(seen[0].messages[0].bytes(), &[0xC0, 3]);
    }

    #[test]
    fn test_failure_injection_is_one_shot() {
        let backend = VirtualBackend::inputs();
        let keys = backend.add_endpoint(1, "Keys");
        let (sink, _) = collecting_sink();
        let mut port = backend.open_port("test", sink).unwrap();

        backend.fail_next_connect(2);
        assert!(matches!(
            backend.connect(&mut port, &keys),
            Err(Error::DriverCommunication(_))
        ));
        assert!(backend.connect(&mut port, &keys).is_ok());
    }

    #[test]
    fn test_remove_endpoint_drops_connections() {
        let backend = VirtualBackend::inputs();
        let keys = backend.add_endpoint(1, "Keys");
        let (sink, _) = collecting_sink();
        let mut port = backend.open_port("test", sink).unwrap();
        backend.connect(&mut port, &keys).unwrap();

        assert!(backend.remove_endpoint(1));
        assert!(!backend.remove_endpoint(1));
        assert_eq!(backend.connection_count(1), 0);
        assert!(matches!(
            backend.connect(&mut port, &keys),
            Err(Error::EndpointNotFound(_))
        ));
    }

    #[test]
    fn test_dispose_removes_port() {
        let backend = VirtualBackend::inputs();
        let (sink, _) = collecting_sink();
        let port = backend.open_port("monitor", sink).unwrap();
        assert_eq!(backend.port_names(), vec!["monitor".to_string()]);
        backend.dispose(port).unwrap();
        assert_eq!(backend.open_ports(), 0);
    }
}
