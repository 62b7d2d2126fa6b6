//! Packet-list decoding.
//!
//! The platform batches MIDI traffic into a packet list:
//!
//! ```text
//! offset 0   u32  packet count N
//! offset 4   N x { u64 timestamp, u16 length L, L payload bytes, pad to 4 }
//! ```
//!
//! Padding aligns every packet header to a multiple of 4 bytes measured from
//! the start of the buffer. Integers use the host byte order, so the order is
//! a parameter here rather than a constant.
//!
//! Decoding never fails. A truncated buffer yields the packets that were
//! complete, and zero-length packets are skipped.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::message::{classify, ClassifiedMessage};

/// Size of the packet-count field that opens every packet list.
pub const PACKET_COUNT_LEN: usize = 4;

/// Timestamp (8 bytes) plus payload length (2 bytes).
pub const PACKET_HEADER_LEN: usize = 10;

/// Packet headers start on multiples of this, relative to the buffer start.
pub const PACKET_ALIGNMENT: usize = 4;

/// Byte order of the integer fields in a packet list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    Little,
    Big,
    /// Whatever the running host uses.
    #[default]
    Native,
}

impl ByteOrder {
    /// Resolves `Native` to the concrete order of the running host.
    #[inline]
    pub const fn resolve(self) -> ByteOrder {
        match self {
            ByteOrder::Native => {
                if cfg!(target_endian = "big") {
                    ByteOrder::Big
                } else {
                    ByteOrder::Little
                }
            }
            order => order,
        }
    }

    #[inline]
    fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self.resolve() {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            _ => u16::from_le_bytes(bytes),
        }
    }

    #[inline]
    fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self.resolve() {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            _ => u32::from_le_bytes(bytes),
        }
    }

    #[inline]
    fn read_i32(self, bytes: [u8; 4]) -> i32 {
        match self.resolve() {
            ByteOrder::Big => i32::from_be_bytes(bytes),
            _ => i32::from_le_bytes(bytes),
        }
    }

    #[inline]
    fn read_u64(self, bytes: [u8; 8]) -> u64 {
        match self.resolve() {
            ByteOrder::Big => u64::from_be_bytes(bytes),
            _ => u64::from_le_bytes(bytes),
        }
    }

    fn write_u16(self, value: u16) -> [u8; 2] {
        match self.resolve() {
            ByteOrder::Big => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        }
    }

    fn write_u32(self, value: u32) -> [u8; 4] {
        match self.resolve() {
            ByteOrder::Big => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        }
    }

    fn write_i32(self, value: i32) -> [u8; 4] {
        match self.resolve() {
            ByteOrder::Big => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        }
    }

    fn write_u64(self, value: u64) -> [u8; 8] {
        match self.resolve() {
            ByteOrder::Big => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        }
    }
}

/// Raw bytes of one MIDI message. Inline up to 3 bytes.
pub type MidiBytes = SmallVec<[u8; 3]>;

/// A timestamped MIDI message copied out of a packet list.
///
/// `data` is never empty when produced by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawMidiMessage {
    /// Host time units. Monotonic, otherwise opaque.
    pub timestamp: u64,
    pub data: MidiBytes,
}

impl RawMidiMessage {
    #[inline]
    pub fn new(timestamp: u64, data: &[u8]) -> Self {
        Self {
            timestamp,
            data: SmallVec::from_slice(data),
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn status(&self) -> Option<u8> {
        self.data.first().copied()
    }

    /// Classification is recomputed on every call.
    #[inline]
    pub fn classify(&self) -> ClassifiedMessage {
        classify(&self.data)
    }
}

impl AsRef<[u8]> for RawMidiMessage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<PacketRef<'_>> for RawMidiMessage {
    fn from(packet: PacketRef<'_>) -> Self {
        Self::new(packet.timestamp, packet.data)
    }
}

impl fmt::Display for RawMidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.timestamp)?;
        for (i, byte) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        f.write_str("]")
    }
}

/// A packet borrowed from the decode buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketRef<'a> {
    pub timestamp: u64,
    pub data: &'a [u8],
}

#[inline]
const fn align_up(offset: usize) -> usize {
    (offset + PACKET_ALIGNMENT - 1) & !(PACKET_ALIGNMENT - 1)
}

#[inline]
fn read_array<const N: usize>(buf: &[u8], at: usize) -> Option<[u8; N]> {
    buf.get(at..at.checked_add(N)?)?.try_into().ok()
}

/// Zero-copy iterator over the non-empty packets of a packet list.
///
/// Stops at the declared count or at the first truncated packet, whichever
/// comes first.
#[derive(Debug, Clone)]
pub struct Packets<'a> {
    buf: &'a [u8],
    cursor: usize,
    remaining: u32,
    order: ByteOrder,
}

impl<'a> Packets<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        let remaining = read_array(buf, 0)
            .map(|bytes| order.read_u32(bytes))
            .unwrap_or(0);
        Self {
            buf,
            cursor: PACKET_COUNT_LEN,
            remaining,
            order,
        }
    }

    /// Packet count from the header, before any truncation is detected.
    pub fn declared_count(&self) -> u32 {
        read_array(self.buf, 0)
            .map(|bytes| self.order.read_u32(bytes))
            .unwrap_or(0)
    }

    fn stop(&mut self, reason: &'static str) -> Option<PacketRef<'a>> {
        tracing::trace!(
            cursor = self.cursor,
            len = self.buf.len(),
            skipped = self.remaining,
            "packet list truncated: {reason}"
        );
        self.remaining = 0;
        None
    }
}

impl<'a> Iterator for Packets<'a> {
    type Item = PacketRef<'a>;

    fn next(&mut self) -> Option<PacketRef<'a>> {
        while self.remaining > 0 {
            self.remaining -= 1;

            let start = self.cursor;
            let (Some(stamp), Some(length)) = (
                read_array::<8>(self.buf, start),
                read_array::<2>(self.buf, start + 8),
            ) else {
                return self.stop("incomplete header");
            };
            let timestamp = self.order.read_u64(stamp);
            let length = self.order.read_u16(length) as usize;

            let payload = start + PACKET_HEADER_LEN;
            let Some(data) = self.buf.get(payload..payload + length) else {
                return self.stop("payload exceeds buffer");
            };
            self.cursor = align_up(payload + length);

            if data.is_empty() {
                continue;
            }
            return Some(PacketRef { timestamp, data });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let room = self.buf.len().saturating_sub(self.cursor) / (PACKET_HEADER_LEN + 1);
        (0, Some((self.remaining as usize).min(room)))
    }
}

/// Iterates the packets of `buf` without copying.
pub fn packets(buf: &[u8], order: ByteOrder) -> Packets<'_> {
    Packets::new(buf, order)
}

/// Decodes a packet list laid out in the host byte order.
pub fn decode(buf: &[u8]) -> Vec<RawMidiMessage> {
    decode_with(buf, ByteOrder::Native)
}

/// Decodes a packet list, copying every non-empty payload out of `buf`.
pub fn decode_with(buf: &[u8], order: ByteOrder) -> Vec<RawMidiMessage> {
    let packets = Packets::new(buf, order);
    let mut messages = Vec::with_capacity(packets.size_hint().1.unwrap_or(0));
    messages.extend(packets.map(RawMidiMessage::from));
    messages
}

/// Splits the endpoint unique ID off a spy-driver frame.
///
/// The spy driver prepends a 4-byte endpoint ID to the packet list. Frames
/// too short to hold the ID and a packet count are rejected.
pub fn split_spy_frame(frame: &[u8], order: ByteOrder) -> Option<(i32, &[u8])> {
    if frame.len() < 4 + PACKET_COUNT_LEN {
        return None;
    }
    let id = order.read_i32(read_array(frame, 0)?);
    Some((id, &frame[4..]))
}

/// Prefixes a packet list with an endpoint ID, as the spy driver does.
pub fn spy_frame(endpoint_id: i32, packet_list: &[u8], order: ByteOrder) -> Vec<u8> {
    let mut frame = Vec::with_capacity(4 + packet_list.len());
    frame.extend_from_slice(&order.write_i32(endpoint_id));
    frame.extend_from_slice(packet_list);
    frame
}

/// Builds packet lists in the platform layout.
///
/// Backends that receive one message at a time use this to hand the capture
/// pipeline the same shape of buffer the platform would.
#[derive(Debug, Clone)]
pub struct PacketListBuilder {
    buf: Vec<u8>,
    count: u32,
    order: ByteOrder,
}

impl Default for PacketListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketListBuilder {
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::Native)
    }

    pub fn with_byte_order(order: ByteOrder) -> Self {
        Self {
            buf: vec![0; PACKET_COUNT_LEN],
            count: 0,
            order,
        }
    }

    /// Appends one packet. Payloads beyond `u16::MAX` bytes are truncated.
    pub fn push(&mut self, timestamp: u64, data: &[u8]) -> &mut Self {
        let len = data.len().min(u16::MAX as usize);
        if len < data.len() {
            tracing::warn!(len = data.len(), "packet payload truncated to {}", len);
        }
        self.buf.extend_from_slice(&self.order.write_u64(timestamp));
        self.buf.extend_from_slice(&self.order.write_u16(len as u16));
        self.buf.extend_from_slice(&data[..len]);
        self.buf.resize(align_up(self.buf.len()), 0);
        self.count += 1;
        self
    }

    pub fn push_message(&mut self, message: &RawMidiMessage) -> &mut Self {
        self.push(message.timestamp, &message.data)
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = self.buf.clone();
        buf[..PACKET_COUNT_LEN].copy_from_slice(&self.order.write_u32(self.count));
        buf
    }

    /// Builds a spy-driver frame: the endpoint ID followed by the packet list.
    pub fn build_spy_frame(&self, endpoint_id: i32) -> Vec<u8> {
        spy_frame(endpoint_id, &self.build(), self.order)
    }
}
