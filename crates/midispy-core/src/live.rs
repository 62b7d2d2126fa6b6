//! Views of captured messages as [`midly`] live events.

use midly::live::LiveEvent;

use crate::packet::RawMidiMessage;

impl RawMidiMessage {
    /// Parses the message bytes as a `midly` live event.
    ///
    /// Returns `None` where midly rejects the bytes, e.g. running status or
    /// a channel message missing its data bytes. The event borrows from
    /// `self`.
    pub fn to_live_event(&self) -> Option<LiveEvent<'_>> {
        LiveEvent::parse(&self.data).ok()
    }
}
