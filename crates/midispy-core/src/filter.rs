//! Declarative message filtering.
//!
//! A [`FilterSpec`] holds optional constraints over message tags, channels,
//! controller numbers and note numbers. A missing constraint does not
//! restrict anything, so `FilterSpec::default()` accepts every message.
//!
//! Every message carries a set of [`MessageTag`]s rather than a single kind.
//! A Note On is `{note_on, note, channel}` and a timing clock is
//! `{timing_clock, realtime, system}`. That lets a spec combine a narrow
//! inclusion with a broad exclusion, such as "everything except realtime".
//!
//! Evaluation order:
//! 1. `exclude_types` intersecting the tags rejects.
//! 2. `exclude_channels` containing the channel rejects.
//! 3. `types` not intersecting the tags rejects.
//! 4. `channels` not containing the channel rejects. Messages without a
//!    channel pass.
//! 5. `controllers` not containing a Control Change's controller rejects.
//! 6. `notes` not containing the message's note rejects.
//!
//! All sets are bitmasks, so evaluating a spec never allocates.
//!
//! ```
//! use midispy_core::{FilterSpec, MessageTag};
//!
//! let spec = FilterSpec::new().exclude_types([MessageTag::Realtime]);
//! assert!(!spec.matches(&[0xF8]));
//! assert!(spec.matches(&[0x90, 60, 100]));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::message::{classify, ClassifiedMessage, MessageKind};
use crate::packet::RawMidiMessage;

/// A filterable property of a message. One message carries several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MessageTag {
    NoteOn,
    NoteOff,
    /// Note On or Note Off.
    Note,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    /// Any channel voice message.
    Channel,
    #[serde(rename = "sysex")]
    SysEx,
    #[serde(rename = "sysex_end")]
    SysExEnd,
    MtcQuarterFrame,
    SongPosition,
    SongSelect,
    TuneRequest,
    /// `0xF1..=0xF7`.
    SystemCommon,
    TimingClock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    SystemReset,
    /// `0xF8..=0xFF`.
    Realtime,
    /// Any status `0xF0..=0xFF`.
    System,
    RunningStatus,
    Unknown,
}

impl MessageTag {
    pub const ALL: [MessageTag; 26] = [
        MessageTag::NoteOn,
        MessageTag::NoteOff,
        MessageTag::Note,
        MessageTag::PolyPressure,
        MessageTag::ControlChange,
        MessageTag::ProgramChange,
        MessageTag::ChannelPressure,
        MessageTag::PitchBend,
        MessageTag::Channel,
        MessageTag::SysEx,
        MessageTag::SysExEnd,
        MessageTag::MtcQuarterFrame,
        MessageTag::SongPosition,
        MessageTag::SongSelect,
        MessageTag::TuneRequest,
        MessageTag::SystemCommon,
        MessageTag::TimingClock,
        MessageTag::Start,
        MessageTag::Continue,
        MessageTag::Stop,
        MessageTag::ActiveSensing,
        MessageTag::SystemReset,
        MessageTag::Realtime,
        MessageTag::System,
        MessageTag::RunningStatus,
        MessageTag::Unknown,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            MessageTag::NoteOn => "note_on",
            MessageTag::NoteOff => "note_off",
            MessageTag::Note => "note",
            MessageTag::PolyPressure => "poly_pressure",
            MessageTag::ControlChange => "control_change",
            MessageTag::ProgramChange => "program_change",
            MessageTag::ChannelPressure => "channel_pressure",
            MessageTag::PitchBend => "pitch_bend",
            MessageTag::Channel => "channel",
            MessageTag::SysEx => "sysex",
            MessageTag::SysExEnd => "sysex_end",
            MessageTag::MtcQuarterFrame => "mtc_quarter_frame",
            MessageTag::SongPosition => "song_position",
            MessageTag::SongSelect => "song_select",
            MessageTag::TuneRequest => "tune_request",
            MessageTag::SystemCommon => "system_common",
            MessageTag::TimingClock => "timing_clock",
            MessageTag::Start => "start",
            MessageTag::Continue => "continue",
            MessageTag::Stop => "stop",
            MessageTag::ActiveSensing => "active_sensing",
            MessageTag::SystemReset => "system_reset",
            MessageTag::Realtime => "realtime",
            MessageTag::System => "system",
            MessageTag::RunningStatus => "running_status",
            MessageTag::Unknown => "unknown",
        }
    }

    #[inline]
    const fn bit(self) -> u32 {
        1 << self as u8
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown message tag: {0:?}")]
pub struct ParseTagError(pub String);

impl FromStr for MessageTag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        MessageTag::ALL
            .into_iter()
            .find(|tag| tag.name() == wanted)
            .ok_or_else(|| ParseTagError(s.to_string()))
    }
}

/// Set of [`MessageTag`]s as a bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<MessageTag>", into = "Vec<MessageTag>")]
pub struct TagSet(u32);

impl TagSet {
    pub const EMPTY: TagSet = TagSet(0);

    #[inline]
    pub const fn with(self, tag: MessageTag) -> Self {
        TagSet(self.0 | tag.bit())
    }

    #[inline]
    pub fn insert(&mut self, tag: MessageTag) {
        self.0 |= tag.bit();
    }

    #[inline]
    pub const fn contains(self, tag: MessageTag) -> bool {
        self.0 & tag.bit() != 0
    }

    #[inline]
    pub const fn intersects(self, other: TagSet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = MessageTag> {
        MessageTag::ALL.into_iter().filter(move |tag| self.contains(*tag))
    }

    /// Tags carried by a classified message.
    pub fn of(msg: &ClassifiedMessage) -> TagSet {
        use MessageTag as T;

        let kind = msg.kind();
        let mut tags = TagSet::EMPTY;
        if kind.is_channel_voice() {
            tags.insert(T::Channel);
        }
        if kind.is_realtime() {
            tags = tags.with(T::Realtime).with(T::System);
        }
        if kind.is_system_common() {
            tags = tags.with(T::SystemCommon).with(T::System);
        }

        let specific = match kind {
            MessageKind::NoteOn => return tags.with(T::NoteOn).with(T::Note),
            MessageKind::NoteOff => return tags.with(T::NoteOff).with(T::Note),
            MessageKind::PolyPressure => T::PolyPressure,
            MessageKind::ControlChange => T::ControlChange,
            MessageKind::ProgramChange => T::ProgramChange,
            MessageKind::ChannelPressure => T::ChannelPressure,
            MessageKind::PitchBend => T::PitchBend,
            MessageKind::SysEx => return tags.with(T::SysEx).with(T::System),
            MessageKind::SysExEnd => T::SysExEnd,
            MessageKind::MtcQuarterFrame => T::MtcQuarterFrame,
            MessageKind::SongPosition => T::SongPosition,
            MessageKind::SongSelect => T::SongSelect,
            MessageKind::TuneRequest => T::TuneRequest,
            MessageKind::TimingClock => T::TimingClock,
            MessageKind::Start => T::Start,
            MessageKind::Continue => T::Continue,
            MessageKind::Stop => T::Stop,
            MessageKind::ActiveSensing => T::ActiveSensing,
            MessageKind::SystemReset => T::SystemReset,
            MessageKind::RunningStatus => T::RunningStatus,
            MessageKind::Unknown(_) => T::Unknown,
            MessageKind::Empty => return tags,
        };
        tags.with(specific)
    }
}

impl FromIterator<MessageTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = MessageTag>>(iter: I) -> Self {
        iter.into_iter().fold(TagSet::EMPTY, TagSet::with)
    }
}

impl From<Vec<MessageTag>> for TagSet {
    fn from(tags: Vec<MessageTag>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<MessageTag> {
    fn from(set: TagSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Value outside the range a set accepts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{value} is outside {min}..={max}")]
pub struct OutOfRange {
    pub value: u8,
    pub min: u8,
    pub max: u8,
}

/// MIDI channels 1..=16 as a bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ChannelSet(u16);

impl ChannelSet {
    /// Channels outside 1..=16 are ignored.
    #[inline]
    pub fn insert(&mut self, channel: u8) {
        if (1..=16).contains(&channel) {
            self.0 |= 1 << (channel - 1);
        }
    }

    #[inline]
    pub fn contains(self, channel: u8) -> bool {
        (1..=16).contains(&channel) && self.0 & (1 << (channel - 1)) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=16u8).filter(move |ch| self.contains(*ch))
    }
}

impl FromIterator<u8> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ChannelSet::default();
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for ChannelSet {
    type Error = OutOfRange;

    fn try_from(channels: Vec<u8>) -> Result<Self, Self::Error> {
        match channels.iter().find(|ch| !(1..=16).contains(*ch)) {
            Some(&value) => Err(OutOfRange {
                value,
                min: 1,
                max: 16,
            }),
            None => Ok(channels.into_iter().collect()),
        }
    }
}

impl From<ChannelSet> for Vec<u8> {
    fn from(set: ChannelSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// 7-bit data values (0..=127) as a bitmask. Used for notes and controllers.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct U7Set(u128);

impl U7Set {
    /// Values above 127 are ignored.
    #[inline]
    pub fn insert(&mut self, value: u8) {
        if value <= 127 {
            self.0 |= 1 << value;
        }
    }

    #[inline]
    pub fn contains(self, value: u8) -> bool {
        value <= 127 && self.0 & (1 << value) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=127u8).filter(move |v| self.contains(*v))
    }
}

impl FromIterator<u8> for U7Set {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = U7Set::default();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for U7Set {
    type Error = OutOfRange;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        match values.iter().find(|v| **v > 127) {
            Some(&value) => Err(OutOfRange {
                value,
                min: 0,
                max: 127,
            }),
            None => Ok(values.into_iter().collect()),
        }
    }
}

impl From<U7Set> for Vec<u8> {
    fn from(set: U7Set) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for U7Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Declarative inclusion/exclusion rules over messages.
///
/// Built with chained setters; each setter replaces that dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    types: Option<TagSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_types: Option<TagSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channels: Option<ChannelSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_channels: Option<ChannelSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    controllers: Option<U7Set>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<U7Set>,
}

impl FilterSpec {
    /// A spec with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(mut self, tags: impl IntoIterator<Item = MessageTag>) -> Self {
        self.types = Some(tags.into_iter().collect());
        self
    }

    pub fn exclude_types(mut self, tags: impl IntoIterator<Item = MessageTag>) -> Self {
        self.exclude_types = Some(tags.into_iter().collect());
        self
    }

    /// 1-based channels.
    pub fn channels(mut self, channels: impl IntoIterator<Item = u8>) -> Self {
        self.channels = Some(channels.into_iter().collect());
        self
    }

    pub fn exclude_channels(mut self, channels: impl IntoIterator<Item = u8>) -> Self {
        self.exclude_channels = Some(channels.into_iter().collect());
        self
    }

    pub fn controllers(mut self, controllers: impl IntoIterator<Item = u8>) -> Self {
        self.controllers = Some(controllers.into_iter().collect());
        self
    }

    pub fn notes(mut self, notes: impl IntoIterator<Item = u8>) -> Self {
        self.notes = Some(notes.into_iter().collect());
        self
    }

    pub fn type_constraint(&self) -> Option<TagSet> {
        self.types
    }

    pub fn excluded_types(&self) -> Option<TagSet> {
        self.exclude_types
    }

    pub fn channel_constraint(&self) -> Option<ChannelSet> {
        self.channels
    }

    pub fn excluded_channels(&self) -> Option<ChannelSet> {
        self.exclude_channels
    }

    pub fn controller_constraint(&self) -> Option<U7Set> {
        self.controllers
    }

    pub fn note_constraint(&self) -> Option<U7Set> {
        self.notes
    }

    /// True when no dimension is constrained.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluates the spec against the raw bytes of one message.
    #[inline]
    pub fn matches(&self, data: &[u8]) -> bool {
        self.is_unconstrained() || self.matches_classified(&classify(data))
    }

    pub fn matches_classified(&self, msg: &ClassifiedMessage) -> bool {
        let tags = TagSet::of(msg);
        let channel = msg.channel();

        if let Some(excluded) = self.exclude_types {
            if tags.intersects(excluded) {
                return false;
            }
        }
        if let (Some(excluded), Some(ch)) = (self.exclude_channels, channel) {
            if excluded.contains(ch) {
                return false;
            }
        }
        if let Some(wanted) = self.types {
            if !tags.intersects(wanted) {
                return false;
            }
        }
        if let (Some(wanted), Some(ch)) = (self.channels, channel) {
            if !wanted.contains(ch) {
                return false;
            }
        }
        if let Some(wanted) = self.controllers {
            // A Control Change too short to carry a controller cannot be a member
            if msg.kind() == MessageKind::ControlChange
                && !msg.controller().is_some_and(|cc| wanted.contains(cc))
            {
                return false;
            }
        }
        if let (Some(wanted), Some(note)) = (self.notes, msg.note()) {
            if !wanted.contains(note) {
                return false;
            }
        }
        true
    }

    /// Keeps the matching messages, in their original order.
    pub fn filter(&self, mut messages: Vec<RawMidiMessage>) -> Vec<RawMidiMessage> {
        self.filter_in_place(&mut messages);
        messages
    }

    pub fn filter_in_place(&self, messages: &mut Vec<RawMidiMessage>) {
        if !self.is_unconstrained() {
            messages.retain(|msg| self.matches(&msg.data));
        }
    }
}

/// Evaluates `spec` against one message.
#[inline]
pub fn matches(spec: &FilterSpec, data: &[u8]) -> bool {
    spec.matches(data)
}

/// Keeps the messages `spec` accepts, preserving order.
pub fn filter(spec: &FilterSpec, messages: Vec<RawMidiMessage>) -> Vec<RawMidiMessage> {
    spec.filter(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(data: &[u8]) -> TagSet {
        TagSet::of(&classify(data))
    }

    #[test]
    fn test_tag_sets() {
        use MessageTag as T;
        let set = |t: &[T]| t.iter().copied().collect::<TagSet>();

        assert_eq!(tags(&[0x90, 60, 100]), set(&[T::NoteOn, T::Note, T::Channel]));
        assert_eq!(tags(&[0x90, 60, 0]), set(&[T::NoteOff, T::Note, T::Channel]));
        assert_eq!(tags(&[0xB0, 1, 2]), set(&[T::ControlChange, T::Channel]));
        assert_eq!(tags(&[0xF8]), set(&[T::TimingClock, T::Realtime, T::System]));
        assert_eq!(tags(&[0xF0, 1, 0xF7]), set(&[T::SysEx, T::System]));
        assert_eq!(
            tags(&[0xF2, 0, 0]),
            set(&[T::SongPosition, T::SystemCommon, T::System])
        );
        assert_eq!(
            tags(&[0xF7]),
            set(&[T::SysExEnd, T::SystemCommon, T::System])
        );
        assert_eq!(tags(&[0xFD]), set(&[T::Unknown, T::Realtime, T::System]));
        assert_eq!(tags(&[0x40]), set(&[T::RunningStatus]));
        assert!(tags(&[]).is_empty());
    }

    #[test]
    fn test_empty_spec_accepts_everything() {
        let spec = FilterSpec::new();
        assert!(spec.is_unconstrained());
        for byte in 0..=255u8 {
            assert!(spec.matches(&[byte, 1, 2]));
        }
        assert!(spec.matches(&[0xF4]));
        assert!(spec.matches(&[]));
    }

    #[test]
    fn test_exclude_realtime() {
        let spec = FilterSpec::new().exclude_types([MessageTag::Realtime]);
        assert!(!spec.matches(&[0xF8]));
        assert!(!spec.matches(&[0xFE]));
        assert!(spec.matches(&[0x90, 60, 100]));
        assert!(spec.matches(&[0xF0, 0x7E, 0xF7]));
    }

    #[test]
    fn test_type_and_channel_both_required() {
        let spec = FilterSpec::new().types([MessageTag::Note]).channels([1]);
        assert!(spec.matches(&[0x90, 60, 100]));
        assert!(!spec.matches(&[0x91, 60, 100]));
        assert!(!spec.matches(&[0xB0, 7, 100]));
    }

    #[test]
    fn test_velocity_zero_excluded_as_note_off() {
        let spec = FilterSpec::new().exclude_types([MessageTag::NoteOff]);
        assert!(!spec.matches(&[0x90, 60, 0]));
        assert!(!spec.matches(&[0x80, 60, 0]));
        assert!(spec.matches(&[0x90, 60, 1]));
    }

    #[test]
    fn test_exclusion_wins_over_inclusion() {
        let spec = FilterSpec::new()
            .types([MessageTag::Channel])
            .exclude_types([MessageTag::PitchBend]);
        assert!(spec.matches(&[0xB0, 1, 1]));
        assert!(!spec.matches(&[0xE0, 0, 64]));
    }

    #[test]
    fn test_channel_constraints_ignore_system_messages() {
        let spec = FilterSpec::new().channels([10]);
        assert!(spec.matches(&[0x99, 36, 100]));
        assert!(!spec.matches(&[0x90, 36, 100]));
        assert!(spec.matches(&[0xF8]));

        let spec = FilterSpec::new().exclude_channels([10]);
        assert!(!spec.matches(&[0x99, 36, 100]));
        assert!(spec.matches(&[0x90, 36, 100]));
        assert!(spec.matches(&[0xFA]));
    }

    #[test]
    fn test_controllers_only_constrain_control_change() {
        let spec = FilterSpec::new().controllers([1, 64]);
        assert!(spec.matches(&[0xB0, 64, 127]));
        assert!(!spec.matches(&[0xB0, 7, 100]));
        assert!(!spec.matches(&[0xB0]));
        assert!(spec.matches(&[0x90, 60, 100]));
        assert!(spec.matches(&[0xF8]));
    }

    #[test]
    fn test_notes_constrain_anything_carrying_a_note() {
        let spec = FilterSpec::new().notes([60, 62]);
        assert!(spec.matches(&[0x90, 60, 100]));
        assert!(!spec.matches(&[0x90, 61, 100]));
        assert!(!spec.matches(&[0xA0, 61, 10]));
        assert!(spec.matches(&[0xB0, 61, 10]));
        assert!(spec.matches(&[0x90]));
    }

    #[test]
    fn test_status_bytes_in_data_positions_are_not_folded() {
        let spec = FilterSpec::new().exclude_types([MessageTag::NoteOff]);
        assert!(spec.matches(&[0x90, 60, 0x80]));

        let spec = FilterSpec::new().notes([60]);
        assert!(!spec.matches(&[0x90, 0xBC, 0x40]));

        let spec = FilterSpec::new().controllers([7]);
        assert!(!spec.matches(&[0xB0, 0x87, 100]));
    }

    #[test]
    fn test_out_of_range_channels_match_nothing() {
        let spec = FilterSpec::new().channels([0, 17]);
        assert!(spec.channel_constraint().is_some_and(ChannelSet::is_empty));
        assert!(!spec.matches(&[0x90, 60, 100]));
        assert!(spec.matches(&[0xF8]));
    }

    #[test]
    fn test_filter_preserves_order() {
        let messages = vec![
            RawMidiMessage::new(1, &[0xF8]),
            RawMidiMessage::new(2, &[0x90, 60, 100]),
            RawMidiMessage::new(3, &[0xF8]),
            RawMidiMessage::new(4, &[0x80, 60, 0]),
            RawMidiMessage::new(5, &[0xB0, 1, 5]),
        ];
        let spec = FilterSpec::new().exclude_types([MessageTag::TimingClock]);
        let kept = filter(&spec, messages);
        let stamps: Vec<u64> = kept.iter().map(|m| m.timestamp).collect();
        assert_eq!(stamps, vec![2, 4, 5]);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("note_on".parse::<MessageTag>(), Ok(MessageTag::NoteOn));
        assert_eq!("Realtime".parse::<MessageTag>(), Ok(MessageTag::Realtime));
        assert_eq!("timing-clock".parse::<MessageTag>(), Ok(MessageTag::TimingClock));
        assert_eq!("sysex".parse::<MessageTag>(), Ok(MessageTag::SysEx));
        assert!("bogus".parse::<MessageTag>().is_err());
        for tag in MessageTag::ALL {
            assert_eq!(tag.name().parse::<MessageTag>(), Ok(tag));
        }
    }

    #[test]
    fn test_tag_bits_are_distinct() {
        let all: TagSet = MessageTag::ALL.into_iter().collect();
        assert_eq!(all.len(), MessageTag::ALL.len());
    }

    #[test]
    fn test_serde_round_trip() {
        let spec = FilterSpec::new()
            .types([MessageTag::Note, MessageTag::ControlChange])
            .exclude_types([MessageTag::Realtime])
            .channels([1, 10])
            .controllers([64]);
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"{"types":["note","control_change"],"exclude_types":["realtime"],"channels":[1,10],"controllers":[64]}"#
        );
        let back: FilterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_serde_rejects_bad_values() {
        assert!(serde_json::from_str::<FilterSpec>(r#"{"channels":[0]}"#).is_err());
        assert!(serde_json::from_str::<FilterSpec>(r#"{"notes":[128]}"#).is_err());
        assert!(serde_json::from_str::<FilterSpec>(r#"{"types":["bogus"]}"#).is_err());
        assert!(serde_json::from_str::<FilterSpec>(r#"{"colour":"red"}"#).is_err());

        let empty: FilterSpec = serde_json::from_str("{}").unwrap();
        assert!(empty.is_unconstrained());
    }
}
