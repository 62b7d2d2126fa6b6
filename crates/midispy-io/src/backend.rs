//! The platform seam.
//!
//! A [`MidiBackend`] covers what a capture session needs from the host MIDI
//! service. Sources and spied destinations differ only in which backend a
//! session is built over.

use midispy_core::Endpoint;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::sink::PacketSink;

/// Which side of the MIDI graph a backend captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sources: traffic arriving at the host.
    Input,
    /// Destinations: traffic other applications send, seen through the spy driver.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Input => "input",
            Direction::Output => "output",
        })
    }
}

pub trait MidiBackend: Send + Sync + 'static {
    /// Platform port handle owned by a session.
    type Port: Send;

    fn direction(&self) -> Direction;

    /// Enumerates the endpoints currently visible on this side.
    fn endpoints(&self) -> Result<Vec<Endpoint>>;

    /// Opens a port whose incoming packet lists go to `sink`.
    fn open_port(&self, client_name: &str, sink: PacketSink) -> Result<Self::Port>;

    /// Starts delivering traffic of `endpoint` to the port. Packet lists must
    /// be tagged with `endpoint.unique_id`.
    fn connect(&self, port: &mut Self::Port, endpoint: &Endpoint) -> Result<()>;

    fn disconnect(&self, port: &mut Self::Port, endpoint: &Endpoint) -> Result<()>;

    /// Releases the port and its platform client.
    fn dispose(&self, port: Self::Port) -> Result<()>;
}
