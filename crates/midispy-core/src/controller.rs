//! Controller number names.

use std::borrow::Cow;

/// Name of a well-known controller, or `None`.
pub const fn controller_label(cc: u8) -> Option<&'static str> {
    Some(match cc {
        0 => "Bank Select MSB",
        1 => "Modulation Wheel",
        2 => "Breath Controller",
        4 => "Foot Controller",
        5 => "Portamento Time",
        6 => "Data Entry MSB",
        7 => "Channel Volume",
        8 => "Balance",
        10 => "Pan",
        11 => "Expression",
        32 => "Bank Select LSB",
        64 => "Sustain Pedal",
        65 => "Portamento",
        66 => "Sostenuto",
        67 => "Soft Pedal",
        68 => "Legato Footswitch",
        69 => "Hold 2",
        120 => "All Sound Off",
        121 => "Reset All Controllers",
        122 => "Local Control",
        123 => "All Notes Off",
        124 => "Omni Off",
        125 => "Omni On",
        126 => "Mono On",
        127 => "Poly On",
        _ => return None,
    })
}

/// Human-readable controller name, falling back to `"CC <n>"`.
pub fn controller_name(cc: u8) -> Cow<'static, str> {
    match controller_label(cc) {
        Some(label) => Cow::Borrowed(label),
        None => Cow::Owned(format!("CC {cc}")),
    }
}
