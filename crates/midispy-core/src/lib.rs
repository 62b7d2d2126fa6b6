//! Core MIDI capture pipeline for midispy.
//!
//! Turns the packet-list buffers a platform MIDI service delivers into
//! structured, filterable messages. Everything here is pure: no I/O, no
//! locks, no threads. The capture layer lives in `midispy-io`.
//!
//! # Pipeline
//!
//! - **Decode**: packet-list bytes to [`RawMidiMessage`]s ([`decode`])
//! - **Classify**: raw bytes to a [`ClassifiedMessage`] ([`classify`])
//! - **Filter**: a [`FilterSpec`] predicate over raw bytes ([`matches`], [`filter`])
//!
//! # Example
//!
//! ```
//! use midispy_core::{decode_with, ByteOrder, FilterSpec, MessageTag, PacketListBuilder};
//!
//! let buf = PacketListBuilder::with_byte_order(ByteOrder::Little)
//!     .push(1000, &[0x90, 60, 100])
//!     .push(1010, &[0xF8])
//!     .build();
//!
//! let spec = FilterSpec::new().exclude_types([MessageTag::Realtime]);
//! let kept = spec.filter(decode_with(&buf, ByteOrder::Little));
//!
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].classify().to_string(), "Note On Ch1 Note=C4 Vel=100");
//! ```

pub mod controller;
pub mod endpoint;
pub mod filter;
mod live;
pub mod message;
pub mod note;
pub mod packet;

pub use controller::controller_name;
pub use endpoint::{Endpoint, EndpointRef};
pub use filter::{
    filter, matches, ChannelSet, FilterSpec, MessageTag, OutOfRange, ParseTagError, TagSet, U7Set,
};
pub use message::{classify, ClassifiedMessage, MessageKind, PITCH_BEND_CENTER};
pub use note::{note_name, note_number};
pub use packet::{
    decode, decode_with, packets, split_spy_frame, spy_frame, ByteOrder, MidiBytes,
    PacketListBuilder, PacketRef, Packets, RawMidiMessage,
};

// Re-exported so callers of `RawMidiMessage::to_live_event` need no direct dependency
pub use midly;
