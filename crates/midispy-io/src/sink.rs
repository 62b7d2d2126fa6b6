//! Delivery of decoded batches from the platform callback thread.

use arc_swap::ArcSwap;
use crossbeam_channel::{Sender, TrySendError};
use midispy_core::{
    decode_with, split_spy_frame, ByteOrder, ClassifiedMessage, FilterSpec, RawMidiMessage,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Messages captured from one packet list, after filtering. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedBatch {
    /// Unique ID of the endpoint the packet list came from.
    pub endpoint_id: i32,
    pub messages: Vec<RawMidiMessage>,
}

impl CapturedBatch {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn classified(&self) -> impl Iterator<Item = ClassifiedMessage> + '_ {
        self.messages.iter().map(RawMidiMessage::classify)
    }
}

pub(crate) type BatchCallback = Box<dyn Fn(CapturedBatch) + Send + Sync>;

pub(crate) enum Delivery {
    Callback(BatchCallback),
    Channel(Sender<CapturedBatch>),
}

/// State shared between a session and the sinks its backend holds.
pub(crate) struct Shared {
    pub(crate) closed: AtomicBool,
    pub(crate) filter: ArcSwap<FilterSpec>,
    pub(crate) byte_order: ByteOrder,
    delivery: Delivery,
}

impl Shared {
    pub(crate) fn new(byte_order: ByteOrder, delivery: Delivery) -> Self {
        Self {
            closed: AtomicBool::new(false),
            filter: ArcSwap::from_pointee(FilterSpec::default()),
            byte_order,
            delivery,
        }
    }
}

/// Entry point for packet lists arriving from the platform.
///
/// Backends receive one when a port is opened and call [`deliver`] from
/// whatever thread the platform uses for callbacks. Once the owning session
/// is closed every call is a no-op.
///
/// [`deliver`]: PacketSink::deliver
#[derive(Clone)]
pub struct PacketSink {
    shared: Arc<Shared>,
}

impl PacketSink {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Byte order the sink decodes with. Backends that synthesize packet
    /// lists must write them in this order.
    pub fn byte_order(&self) -> ByteOrder {
        self.shared.byte_order
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Decodes, filters and hands on one packet list.
    pub fn deliver(&self, packet_list: &[u8], endpoint_id: i32) {
        if self.is_closed() {
            return;
        }

        let mut messages = decode_with(packet_list, self.shared.byte_order);
        self.shared.filter.load().filter_in_place(&mut messages);
        if messages.is_empty() {
            return;
        }

        let batch = CapturedBatch {
            endpoint_id,
            messages,
        };
        match &self.shared.delivery {
            Delivery::Callback(callback) => callback(batch),
            Delivery::Channel(sender) => match sender.try_send(batch) {
                Ok(()) => {}
                Err(TrySendError::Full(batch)) => {
                    tracing::debug!(
                        endpoint_id,
                        dropped = batch.len(),
                        "capture channel full, dropping batch"
                    );
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::trace!(endpoint_id, "capture receiver gone");
                }
            },
        }
    }

    /// Delivers a spy-driver frame: endpoint ID followed by a packet list.
    pub fn deliver_spy(&self, frame: &[u8]) {
        if let Some((endpoint_id, packet_list)) =
            split_spy_frame(frame, self.shared.byte_order)
        {
            self.deliver(packet_list, endpoint_id);
        }
    }
}

impl fmt::Debug for PacketSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketSink")
            .field("byte_order", &self.shared.byte_order)
            .field("closed", &self.is_closed())
            .finish()
    }
}
