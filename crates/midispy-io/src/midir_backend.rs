//! Source capture through midir. Requires the `midir` feature.
//!
//! midir hands over one message per callback, so each message is wrapped in
//! a one-packet list before it reaches the sink. Connections live on a
//! dedicated thread for platform thread-safety.
//!
//! Closing a connection may join midir's handler thread, so requests made
//! from inside a delivery callback never wait for the connection thread.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use midir::{Ignore, MidiInput, MidiInputConnection};
use midispy_core::{Endpoint, EndpointRef, PacketListBuilder};
use std::cell::Cell;
use std::thread;

use crate::backend::{Direction, MidiBackend};
use crate::error::{Error, Result};
use crate::sink::PacketSink;

thread_local! {
    static IN_DELIVERY: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running a delivery callback until dropped.
struct DeliveryGuard;

impl DeliveryGuard {
    fn enter() -> Self {
        IN_DELIVERY.with(|flag| flag.set(true));
        DeliveryGuard
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        IN_DELIVERY.with(|flag| flag.set(false));
    }
}

fn on_delivery_thread() -> bool {
    IN_DELIVERY.with(Cell::get)
}

/// Stable endpoint ID derived from a port name (32-bit FNV-1a).
fn port_id(name: &str) -> i32 {
    let hash = name.bytes().fold(0x811c_9dc5u32, |hash, byte| {
        (hash ^ byte as u32).wrapping_mul(0x0100_0193)
    });
    hash as i32
}

#[derive(Debug, Clone, Default)]
pub struct MidirInputBackend;

impl MidirInputBackend {
    pub fn new() -> Self {
        Self
    }
}

enum Command {
    Connect {
        unique_id: i32,
        reply: Sender<Result<()>>,
    },
    Disconnect {
        unique_id: i32,
        reply: Sender<Result<()>>,
    },
    Shutdown,
}

pub struct MidirPort {
    commands: Sender<Command>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MidirPort {
    fn request(&self, make: impl FnOnce(Sender<Result<()>>) -> Command) -> Result<()> {
        let (reply, response) = bounded(1);
        if on_delivery_thread() {
            // Queued only; the outcome is not reported
            return self.commands.try_send(make(reply)).map_err(|e| match e {
                TrySendError::Full(_) => Error::DriverCommunication("midir thread busy".into()),
                TrySendError::Disconnected(_) => {
                    Error::DriverCommunication("midir thread not running".into())
                }
            });
        }

        self.commands
            .send(make(reply))
            .map_err(|_| Error::DriverCommunication("midir thread not running".into()))?;
        response
            .recv()
            .map_err(|_| Error::DriverCommunication("midir thread exited".into()))?
    }
}

impl Drop for MidirPort {
    fn drop(&mut self) {
        if on_delivery_thread() {
            // Detach: the connection thread may be waiting to join this one
            let _ = self.commands.try_send(Command::Shutdown);
            self.thread.take();
            return;
        }
        let _ = self.commands.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn connect_port(
    client_name: &str,
    unique_id: i32,
    sink: PacketSink,
) -> Result<MidiInputConnection<()>> {
    let mut input = MidiInput::new(client_name)?;
    input.ignore(Ignore::None);

    let port = input
        .ports()
        .into_iter()
        .find(|p| input.port_name(p).is_ok_and(|name| port_id(&name) == unique_id))
        .ok_or_else(|| Error::EndpointNotFound(format!("midir port {unique_id}")))?;

    let connection = input.connect(
        &port,
        client_name,
        move |timestamp, message, _| {
            let _guard = DeliveryGuard::enter();
            let mut builder = PacketListBuilder::with_byte_order(sink.byte_order());
            builder.push(timestamp, message);
            sink.deliver(&builder.build(), unique_id);
        },
        (),
    )?;
    Ok(connection)
}

fn connection_thread(client_name: String, sink: PacketSink, commands: Receiver<Command>) {
    let mut connections: Vec<(i32, MidiInputConnection<()>)> = Vec::new();

    while let Ok(command) = commands.recv() {
        match command {
            Command::Connect { unique_id, reply } => {
                let result = connect_port(&client_name, unique_id, sink.clone())
                    .map(|conn| connections.push((unique_id, conn)));
                let _ = reply.send(result);
            }
            Command::Disconnect { unique_id, reply } => {
                if let Some(index) = connections.iter().position(|(id, _)| *id == unique_id) {
                    let (_, conn) = connections.swap_remove(index);
                    conn.close();
                }
                let _ = reply.send(Ok(()));
            }
            Command::Shutdown => break,
        }
    }

    for (_, conn) in connections {
        conn.close();
    }
    tracing::debug!(client = %client_name, "midir connection thread stopped");
}

impl MidiBackend for MidirInputBackend {
    type Port = MidirPort;

    fn direction(&self) -> Direction {
        Direction::Input
    }

    fn endpoints(&self) -> Result<Vec<Endpoint>> {
        let input = MidiInput::new("midispy-enumerate")?;
        input
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| -> Result<Endpoint> {
                let name = input.port_name(port)?;
                Ok(Endpoint::new(EndpointRef(index as u64), port_id(&name), name))
            })
            .collect()
    }

    fn open_port(&self, client_name: &str, sink: PacketSink) -> Result<MidirPort> {
        let (commands, receiver) = bounded(16);
        let client_name = client_name.to_string();
        let thread = thread::Builder::new()
            .name("midispy-midir".to_string())
            .spawn(move || connection_thread(client_name, sink, receiver))?;
        Ok(MidirPort {
            commands,
            thread: Some(thread),
        })
    }

    fn connect(&self, port: &mut MidirPort, endpoint: &Endpoint) -> Result<()> {
        let unique_id = endpoint.unique_id;
        port.request(|reply| Command::Connect { unique_id, reply })
    }

    fn disconnect(&self, port: &mut MidirPort, endpoint: &Endpoint) -> Result<()> {
        let unique_id = endpoint.unique_id;
        port.request(|reply| Command::Disconnect { unique_id, reply })
    }

    fn dispose(&self, port: MidirPort) -> Result<()> {
        drop(port);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_id_is_stable() {
        assert_eq!(port_id("IAC Driver Bus 1"), port_id("IAC Driver Bus 1"));
        assert_ne!(port_id("IAC Driver Bus 1"), port_id("IAC Driver Bus 2"));
        assert_eq!(port_id(""), 0x811c_9dc5u32 as i32);
    }

    #[test]
    fn test_delivery_guard_scopes_flag() {
        assert!(!on_delivery_thread());
        {
            let _guard = DeliveryGuard::enter();
            assert!(on_delivery_thread());
        }
        assert!(!on_delivery_thread());
    }

    #[test]
    fn test_requests_from_delivery_do_not_wait() {
        // No connection thread answers, so a blocking request would hang
        let (commands, queued) = bounded(4);
        let port = MidirPort {
            commands,
            thread: None,
        };

        {
            let _guard = DeliveryGuard::enter();
            assert!(port
                .request(|reply| Command::Disconnect { unique_id: 1, reply })
                .is_ok());
        }
        assert!(matches!(
            queued.try_recv(),
            Ok(Command::Disconnect { unique_id: 1, .. })
        ));

        {
            let _guard = DeliveryGuard::enter();
            drop(port);
        }
        assert!(matches!(queued.try_recv(), Ok(Command::Shutdown)));
    }

    #[test]
    fn test_list_endpoints() {
        // Hardware dependent; only checks enumeration doesn't fail hard
        if let Ok(endpoints) = MidirInputBackend::new().endpoints() {
            for endpoint in endpoints {
                assert!(endpoint.name.is_some());
            }
        }
    }
}
