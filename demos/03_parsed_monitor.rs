//! # 03 - Parsed Monitor
//!
//! Classify every captured message and print its fields, with note and
//! controller names.
//!
//! **Concepts:** `ClassifiedMessage`, `controller_name`, filtering by tag
//!
//! ```bash
//! cargo run --example 03_parsed_monitor
//! cargo run --example 03_parsed_monitor --features midir   # real MIDI sources
//! ```

use midispy::prelude::*;
use midispy::{controller_name, EndpointDirectory, MidiBackend};
use std::collections::HashMap;
use std::time::Duration;

fn describe(msg: &RawMidiMessage) -> String {
    let parsed = msg.classify();
    let mut line = parsed.kind().to_string();
    if let Some(channel) = parsed.channel() {
        line.push_str(&format!(" Ch{channel}"));
    }
    match parsed.kind() {
        MessageKind::NoteOn | MessageKind::NoteOff | MessageKind::PolyPressure => {
            if let Some(name) = parsed.note_name() {
                line.push_str(&format!(" {name}"));
            }
            if let Some(velocity) = parsed.velocity() {
                line.push_str(&format!(" vel={velocity}"));
            }
            if let Some(pressure) = parsed.pressure() {
                line.push_str(&format!(" pressure={pressure}"));
            }
        }
        MessageKind::ControlChange => {
            if let (Some(cc), Some(value)) = (parsed.controller(), parsed.value()) {
                line.push_str(&format!(" {}={value}", controller_name(cc)));
            }
        }
        MessageKind::ProgramChange => {
            if let Some(program) = parsed.program() {
                line.push_str(&format!(" program={program}"));
            }
        }
        MessageKind::ChannelPressure => {
            if let Some(pressure) = parsed.pressure() {
                line.push_str(&format!(" pressure={pressure}"));
            }
        }
        MessageKind::PitchBend => {
            if let Some(bend) = parsed.pitch_bend() {
                line.push_str(&format!(" bend={bend:+}"));
            }
        }
        MessageKind::SysEx | MessageKind::Unknown(_) => {
            let hex: Vec<String> = msg.bytes().iter().map(|b| format!("{b:02X}")).collect();
            line.push_str(&format!(" [{}]", hex.join(" ")));
        }
        _ => {}
    }
    line
}

fn run<B: MidiBackend>(backend: B, names: HashMap<i32, String>) -> midispy::Result<Monitor<B>> {
    let monitor = Monitor::builder(backend)
        .filter(FilterSpec::new().exclude_types([MessageTag::Realtime]))
        .connect_all()
        .build_with_callback(move |batch| {
            let source = names
                .get(&batch.endpoint_id)
                .map(String::as_str)
                .unwrap_or("?");
            for msg in &batch.messages {
                println!("[{source:20}] {}", describe(msg));
            }
        })?;
    println!("Monitoring {} source(s), clock filtered out", monitor.connected().len());
    println!();
    Ok(monitor)
}

fn names<B: MidiBackend>(backend: &B) -> midispy::Result<HashMap<i32, String>> {
    let directory = EndpointDirectory::new(backend)?;
    Ok(directory
        .endpoints()
        .iter()
        .map(|e| (e.unique_id, e.display_name()))
        .collect())
}

#[cfg(feature = "midir")]
fn main() -> midispy::Result<()> {
    let backend = midispy::MidirInputBackend::new();
    let names = names(&backend)?;
    let monitor = run(backend, names)?;
    println!("Listening for 30 seconds...");
    std::thread::sleep(Duration::from_secs(30));
    monitor.close();
    Ok(())
}

#[cfg(not(feature = "midir"))]
fn main() -> midispy::Result<()> {
    let backend = VirtualBackend::outputs();
    backend.add_endpoint(1, "Keys");
    backend.add_endpoint(2, "Controller");

    let monitor = run(backend.clone(), names(&backend)?)?;

    backend.send(1, 0, &[0x90, 60, 100]);
    backend.send(1, 0, &[0xF8]);
    backend.send(1, 120, &[0x80, 60, 0]);
    backend.send_all(2, &[(200, &[0xB0, 7, 100]), (200, &[0xB0, 64, 127]), (210, &[0xB0, 102, 5])]);
    backend.send(2, 220, &[0xC0, 12]);
    backend.send(2, 230, &[0xD0, 80]);
    backend.send(2, 240, &[0xE0, 0x05, 0x40]);
    backend.send(2, 300, &[0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7]);
    std::thread::sleep(Duration::from_millis(50));

    monitor.close();
    Ok(())
}
