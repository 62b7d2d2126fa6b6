//! # midispy - MIDI traffic capture
//!
//! Watches MIDI flowing through the system's sources and destinations.
//!
//! ## Architecture
//!
//! midispy is an umbrella crate that coordinates:
//! - **midispy-core** - Packet-list decoding, message classification, filtering
//! - **midispy-io** - Capture sessions, endpoint discovery, platform bindings
//!
//! ## Quick Start
//!
//! ```
//! use midispy::prelude::*;
//!
//! let backend = VirtualBackend::inputs();
//! backend.add_endpoint(1, "Keys");
//!
//! let monitor = Monitor::builder(backend.clone())
//!     .filter(FilterSpec::new().exclude_types([MessageTag::Realtime]))
//!     .connect_all()
//!     .build()?;
//!
//! backend.send(1, 0, &[0xB0, 7, 100]);
//!
//! for batch in monitor.batches().unwrap().try_iter() {
//!     for msg in batch.classified() {
//!         assert_eq!(msg.to_string(), "Control Change Ch1 CC7=100");
//!     }
//! }
//! # Ok::<(), midispy::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Pipeline, sessions and the virtual backend
//! - `midir` - Source capture through midir

/// Re-export of midispy-core for direct access
pub use midispy_core as core;

/// Re-export of midispy-io for direct access
pub use midispy_io as io;

// Pipeline
pub use midispy_core::{
    classify, controller_name, decode, decode_with, filter, matches, note_name, ByteOrder,
    ChannelSet, ClassifiedMessage, Endpoint, EndpointRef, FilterSpec, MessageKind, MessageTag,
    PacketListBuilder, RawMidiMessage, TagSet, U7Set,
};

// Capture
pub use midispy_io::{
    BindingRegistry, CaptureConfig, CaptureSession, CapturedBatch, Direction, EndpointDirectory,
    MidiBackend, PacketSink, VirtualBackend,
};

#[cfg(feature = "midir")]
pub use midispy_io::MidirInputBackend;

mod error;
pub use error::{Error, Result};

mod builder;
mod monitor;

pub use builder::MonitorBuilder;
pub use monitor::Monitor;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Monitor, MonitorBuilder};

    pub use crate::core::{ClassifiedMessage, FilterSpec, MessageKind, MessageTag, RawMidiMessage};

    pub use crate::io::{CaptureConfig, CapturedBatch, Direction, VirtualBackend};

    #[cfg(feature = "midir")]
    pub use crate::io::MidirInputBackend;
}
