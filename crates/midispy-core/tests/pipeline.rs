//! End-to-end decode, classify and filter behaviour.

use midispy_core::{
    classify, decode_with, ByteOrder, FilterSpec, MessageKind, MessageTag, PacketListBuilder,
    RawMidiMessage,
};
use proptest::prelude::*;

fn message() -> impl Strategy<Value = (u64, Vec<u8>)> {
    (any::<u64>(), prop::collection::vec(any::<u8>(), 1..40))
}

fn byte_order() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::Little), Just(ByteOrder::Big)]
}

fn build(order: ByteOrder, messages: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let mut builder = PacketListBuilder::with_byte_order(order);
    for (ts, data) in messages {
        builder.push(*ts, data);
    }
    builder.build()
}

fn channel_voice() -> impl Strategy<Value = Vec<u8>> {
    (0x80u8..0xF0, 0u8..128, 0u8..128).prop_map(|(s, a, b)| vec![s, a, b])
}

fn any_message() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4)
}

fn tag() -> impl Strategy<Value = MessageTag> {
    prop::sample::select(MessageTag::ALL.to_vec())
}

#[test]
fn test_round_trip_fixed_sizes() {
    for n in [0usize, 1, 16] {
        let messages: Vec<(u64, Vec<u8>)> = (0..n)
            .map(|i| (i as u64 * 100, vec![0x90 | (i as u8 % 16), 60, 100]))
            .collect();
        let buf = build(ByteOrder::Little, &messages);
        let decoded = decode_with(&buf, ByteOrder::Little);

        assert_eq!(decoded.len(), n);
        for (got, (ts, data)) in decoded.iter().zip(&messages) {
            assert_eq!(got.timestamp, *ts);
            assert_eq!(got.bytes(), data.as_slice());
        }
    }
}

#[test]
fn test_note_on_velocity_zero_equals_note_off() {
    for note in 0..128u8 {
        let on = classify(&[0x95, note, 0]);
        let off = classify(&[0x85, note, 0]);
        assert_eq!(on.kind(), MessageKind::NoteOff);
        assert_eq!(on.kind(), off.kind());
        assert_eq!(on.channel(), off.channel());
        assert_eq!(on.note(), off.note());
        assert_eq!(on.velocity(), off.velocity());
    }
}

#[test]
fn test_pitch_bend_centering() {
    assert_eq!(classify(&[0xE0, 0x00, 0x40]).pitch_bend(), Some(0));
    assert_eq!(classify(&[0xE0, 0x00, 0x00]).pitch_bend(), Some(-8192));
    assert_eq!(classify(&[0xE0, 0x7F, 0x7F]).pitch_bend(), Some(8191));
}

#[test]
fn test_clock_heavy_stream_filtered() {
    let mut builder = PacketListBuilder::with_byte_order(ByteOrder::Little);
    for i in 0..96u64 {
        builder.push(i, &[0xF8]);
        if i % 24 == 0 {
            builder.push(i, &[0x90, 60 + (i / 24) as u8, 100]);
        }
    }
    let buf = builder.build();

    let spec = FilterSpec::new().exclude_types([MessageTag::Realtime]);
    let kept = spec.filter(decode_with(&buf, ByteOrder::Little));
    let notes: Vec<Option<u8>> = kept.iter().map(|m| m.classify().note()).collect();
    assert_eq!(notes, vec![Some(60), Some(61), Some(62), Some(63)]);
}

proptest! {
    #[test]
    fn prop_round_trip(order in byte_order(), messages in prop::collection::vec(message(), 0..24)) {
        let buf = build(order, &messages);
        let decoded = decode_with(&buf, order);

        prop_assert_eq!(decoded.len(), messages.len());
        for (got, (ts, data)) in decoded.iter().zip(&messages) {
            prop_assert_eq!(got.timestamp, *ts);
            prop_assert_eq!(got.bytes(), data.as_slice());
        }
    }

    #[test]
    fn prop_every_prefix_decodes_a_prefix(messages in prop::collection::vec(message(), 0..8)) {
        let buf = build(ByteOrder::Little, &messages);
        let full = decode_with(&buf, ByteOrder::Little);

        for cut in 0..=buf.len() {
            let partial = decode_with(&buf[..cut], ByteOrder::Little);
            prop_assert!(partial.len() <= full.len());
            prop_assert_eq!(&partial[..], &full[..partial.len()]);
        }
    }

    #[test]
    fn prop_headers_aligned_from_start(messages in prop::collection::vec(message(), 1..12)) {
        let buf = build(ByteOrder::Little, &messages);
        let mut offset = 4;
        for (ts, data) in &messages {
            prop_assert_eq!(offset % 4, 0);
            prop_assert_eq!(&buf[offset..offset + 8], &ts.to_le_bytes()[..]);
            offset = (offset + 10 + data.len() + 3) & !3;
        }
        prop_assert_eq!(offset, buf.len());
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(buf in prop::collection::vec(any::<u8>(), 0..256)) {
        for message in decode_with(&buf, ByteOrder::Little) {
            prop_assert!(!message.data.is_empty());
            let _ = message.classify().to_string();
        }
    }

    #[test]
    fn prop_classified_fields_echo_data(data in any_message()) {
        let msg = classify(&data);
        if let Some(ch) = msg.channel() {
            prop_assert!((1..=16).contains(&ch));
        }
        // Data fields echo the byte at their position, in range or not
        for field in [msg.note(), msg.velocity(), msg.controller(), msg.value(), msg.program(), msg.pressure()] {
            if let Some(v) = field {
                prop_assert!(data[1..].contains(&v) || v == 0);
            }
        }
        if let Some(bend) = msg.pitch_bend() {
            prop_assert!((-8192..=8191).contains(&bend));
        }
    }

    #[test]
    fn prop_empty_spec_accepts_all(data in any_message()) {
        prop_assert!(FilterSpec::new().matches(&data));
    }

    #[test]
    fn prop_type_and_channel_compose(data in channel_voice(), wanted in tag(), channel in 1u8..=16) {
        let both = FilterSpec::new().types([wanted]).channels([channel]);
        let by_type = FilterSpec::new().types([wanted]);
        let by_channel = FilterSpec::new().channels([channel]);
        prop_assert_eq!(both.matches(&data), by_type.matches(&data) && by_channel.matches(&data));
    }

    #[test]
    fn prop_exclusion_beats_inclusion(data in any_message(), excluded in tag()) {
        let spec = FilterSpec::new().types([excluded]).exclude_types([excluded]);
        prop_assert!(!spec.matches(&data));
    }

    #[test]
    fn prop_filter_preserves_order(
        messages in prop::collection::vec(channel_voice(), 0..32),
        channel in 1u8..=16,
    ) {
        let raw: Vec<RawMidiMessage> = messages
            .iter()
            .enumerate()
            .map(|(i, data)| RawMidiMessage::new(i as u64, data))
            .collect();
        let spec = FilterSpec::new().exclude_channels([channel]);
        let kept = spec.filter(raw.clone());

        let expected: Vec<RawMidiMessage> =
            raw.into_iter().filter(|m| spec.matches(&m.data)).collect();
        prop_assert_eq!(&kept, &expected);
        prop_assert!(kept.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
