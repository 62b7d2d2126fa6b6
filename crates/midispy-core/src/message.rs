//! MIDI message classification.
//!
//! [`classify`] turns the raw bytes of one message into a [`ClassifiedMessage`]:
//! a kind plus whichever typed fields apply to that kind. It is total. Short
//! packets leave fields absent, and unrecognised system status bytes become
//! [`MessageKind::Unknown`].

use std::fmt;

use crate::note::note_name;

/// Status byte constants.
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_PRESSURE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;
    pub const SYSEX_START: u8 = 0xF0;
    pub const MTC_QUARTER_FRAME: u8 = 0xF1;
    pub const SONG_POSITION: u8 = 0xF2;
    pub const SONG_SELECT: u8 = 0xF3;
    pub const TUNE_REQUEST: u8 = 0xF6;
    pub const SYSEX_END: u8 = 0xF7;
    pub const TIMING_CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
    pub const ACTIVE_SENSING: u8 = 0xFE;
    pub const SYSTEM_RESET: u8 = 0xFF;
}

/// Pitch bend value at rest.
pub const PITCH_BEND_CENTER: i16 = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    SysEx,
    MtcQuarterFrame,
    SongPosition,
    SongSelect,
    TuneRequest,
    SysExEnd,
    TimingClock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    SystemReset,
    /// Data byte in status position; the sender relied on running status.
    RunningStatus,
    /// No bytes at all. The decoder never produces this.
    Empty,
    /// System status byte with no assigned meaning.
    Unknown(u8),
}

impl MessageKind {
    /// Matches a status byte in `0xF0..=0xFF` exactly.
    pub const fn from_system_status(byte: u8) -> Self {
        match byte {
            status::SYSEX_START => MessageKind::SysEx,
            status::MTC_QUARTER_FRAME => MessageKind::MtcQuarterFrame,
            status::SONG_POSITION => MessageKind::SongPosition,
            status::SONG_SELECT => MessageKind::SongSelect,
            status::TUNE_REQUEST => MessageKind::TuneRequest,
            status::SYSEX_END => MessageKind::SysExEnd,
            status::TIMING_CLOCK => MessageKind::TimingClock,
            status::START => MessageKind::Start,
            status::CONTINUE => MessageKind::Continue,
            status::STOP => MessageKind::Stop,
            status::ACTIVE_SENSING => MessageKind::ActiveSensing,
            status::SYSTEM_RESET => MessageKind::SystemReset,
            other => MessageKind::Unknown(other),
        }
    }

    pub const fn is_channel_voice(self) -> bool {
        matches!(
            self,
            MessageKind::NoteOff
                | MessageKind::NoteOn
                | MessageKind::PolyPressure
                | MessageKind::ControlChange
                | MessageKind::ProgramChange
                | MessageKind::ChannelPressure
                | MessageKind::PitchBend
        )
    }

    pub const fn is_realtime(self) -> bool {
        match self {
            MessageKind::TimingClock
            | MessageKind::Start
            | MessageKind::Continue
            | MessageKind::Stop
            | MessageKind::ActiveSensing
            | MessageKind::SystemReset => true,
            MessageKind::Unknown(byte) => byte >= status::TIMING_CLOCK,
            _ => false,
        }
    }

    /// System common, SysEx end included. SysEx start is exclusive, not common.
    pub const fn is_system_common(self) -> bool {
        match self {
            MessageKind::MtcQuarterFrame
            | MessageKind::SongPosition
            | MessageKind::SongSelect
            | MessageKind::TuneRequest
            | MessageKind::SysExEnd => true,
            MessageKind::Unknown(byte) => byte < status::TIMING_CLOCK,
            _ => false,
        }
    }

    /// Human-readable name. `Unknown` has no static label.
    pub const fn label(self) -> Option<&'static str> {
        Some(match self {
            MessageKind::NoteOff => "Note Off",
            MessageKind::NoteOn => "Note On",
            MessageKind::PolyPressure => "Poly Pressure",
            MessageKind::ControlChange => "Control Change",
            MessageKind::ProgramChange => "Program Change",
            MessageKind::ChannelPressure => "Channel Pressure",
            MessageKind::PitchBend => "Pitch Bend",
            MessageKind::SysEx => "SysEx",
            MessageKind::MtcQuarterFrame => "MTC Quarter Frame",
            MessageKind::SongPosition => "Song Position",
            MessageKind::SongSelect => "Song Select",
            MessageKind::TuneRequest => "Tune Request",
            MessageKind::SysExEnd => "SysEx End",
            MessageKind::TimingClock => "Timing Clock",
            MessageKind::Start => "Start",
            MessageKind::Continue => "Continue",
            MessageKind::Stop => "Stop",
            MessageKind::ActiveSensing => "Active Sensing",
            MessageKind::SystemReset => "System Reset",
            MessageKind::RunningStatus => "Running Status",
            MessageKind::Empty => "Empty",
            MessageKind::Unknown(_) => return None,
        })
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Unknown(byte) => write!(f, "Unknown (0x{byte:02X})"),
            kind => f.write_str(kind.label().unwrap_or_default()),
        }
    }
}

/// Read-only view of one MIDI message.
///
/// A field is `Some` only for kinds it applies to, and only when the packet
/// was long enough to carry it. `channel` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassifiedMessage {
    kind: MessageKind,
    status: Option<u8>,
    channel: Option<u8>,
    note: Option<u8>,
    velocity: Option<u8>,
    controller: Option<u8>,
    value: Option<u8>,
    program: Option<u8>,
    pressure: Option<u8>,
    pitch_bend: Option<i16>,
}

impl ClassifiedMessage {
    const fn bare(kind: MessageKind, status: Option<u8>) -> Self {
        Self {
            kind,
            status,
            channel: None,
            note: None,
            velocity: None,
            controller: None,
            value: None,
            program: None,
            pressure: None,
            pitch_bend: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// First byte of the message, as received.
    #[inline]
    pub fn status(&self) -> Option<u8> {
        self.status
    }

    #[inline]
    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    #[inline]
    pub fn velocity(&self) -> Option<u8> {
        self.velocity
    }

    #[inline]
    pub fn controller(&self) -> Option<u8> {
        self.controller
    }

    #[inline]
    pub fn value(&self) -> Option<u8> {
        self.value
    }

    #[inline]
    pub fn program(&self) -> Option<u8> {
        self.program
    }

    #[inline]
    pub fn pressure(&self) -> Option<u8> {
        self.pressure
    }

    /// Signed, centred at 0. Range -8192..=8191.
    #[inline]
    pub fn pitch_bend(&self) -> Option<i16> {
        self.pitch_bend
    }

    pub fn note_name(&self) -> Option<String> {
        self.note.map(note_name)
    }
}

impl fmt::Display for ClassifiedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(channel) = self.channel {
            write!(f, " Ch{channel}")?;
        }
        if let Some(note) = self.note {
            write!(f, " Note={}", note_name(note))?;
        }
        if let Some(velocity) = self.velocity {
            write!(f, " Vel={velocity}")?;
        }
        if let Some(controller) = self.controller {
            write!(f, " CC{controller}")?;
            if let Some(value) = self.value {
                write!(f, "={value}")?;
            }
        }
        if let Some(program) = self.program {
            write!(f, " Prog={program}")?;
        }
        if let Some(pressure) = self.pressure {
            write!(f, " Press={pressure}")?;
        }
        if let Some(bend) = self.pitch_bend {
            write!(f, " PB={bend}")?;
        }
        Ok(())
    }
}

/// Classifies the raw bytes of one MIDI message.
///
/// Fields carry the bytes as received. A byte above 0x7F in a data position
/// is reported as is, never folded onto a valid value, so filters on notes
/// or controllers reject it. Pitch bend is absent unless both of its bytes
/// are valid data bytes.
pub fn classify(data: &[u8]) -> ClassifiedMessage {
    let Some(&first) = data.first() else {
        return ClassifiedMessage::bare(MessageKind::Empty, None);
    };

    if first < 0x80 {
        return ClassifiedMessage::bare(MessageKind::RunningStatus, Some(first));
    }
    if first >= status::SYSEX_START {
        return ClassifiedMessage::bare(MessageKind::from_system_status(first), Some(first));
    }

    let data1 = data.get(1).copied();
    let data2 = data.get(2).copied();

    let mut msg = ClassifiedMessage::bare(MessageKind::NoteOff, Some(first));
    msg.channel = Some((first & 0x0F) + 1);

    match first & 0xF0 {
        status::NOTE_OFF => {
            msg.note = data1;
            msg.velocity = Some(data2.unwrap_or(0));
        }
        status::NOTE_ON => {
            let velocity = data2.unwrap_or(0);
            if velocity > 0 {
                msg.kind = MessageKind::NoteOn;
            }
            msg.note = data1;
            msg.velocity = Some(velocity);
        }
        status::POLY_PRESSURE => {
            msg.kind = MessageKind::PolyPressure;
            msg.note = data1;
            msg.pressure = data2;
        }
        status::CONTROL_CHANGE => {
            msg.kind = MessageKind::ControlChange;
            msg.controller = data1;
            msg.value = data2;
        }
        status::PROGRAM_CHANGE => {
            msg.kind = MessageKind::ProgramChange;
            msg.program = data1;
        }
        status::CHANNEL_PRESSURE => {
            msg.kind = MessageKind::ChannelPressure;
            msg.pressure = data1;
        }
        _ => {
            msg.kind = MessageKind::PitchBend;
            // LSB first, then MSB
            msg.pitch_bend = match (data1, data2) {
                (Some(lsb), Some(msb)) if lsb < 0x80 && msb < 0x80 => {
                    Some((((msb as i16) << 7) | lsb as i16) - PITCH_BEND_CENTER)
                }
                _ => None,
            };
        }
    }
    msg
}
