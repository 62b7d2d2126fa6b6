//! # 01 - List Endpoints
//!
//! Enumerate the endpoints a backend can capture from.
//!
//! **Concepts:** `EndpointDirectory`, endpoint identity, the `midir` feature
//!
//! ```bash
//! cargo run --example 01_list_endpoints
//! cargo run --example 01_list_endpoints --features midir   # real MIDI sources
//! ```

use midispy::{EndpointDirectory, MidiBackend};

fn list<B: MidiBackend>(backend: &B) -> midispy::Result<()> {
    let directory = EndpointDirectory::new(backend)?;

    println!("MIDI {}s:", backend.direction());
    println!("{}", "-".repeat(40));
    if directory.is_empty() {
        println!("  (none found)");
        return Ok(());
    }
    for endpoint in directory.endpoints() {
        println!("  Name: {}", endpoint.display_name());
        println!("    Unique ID: {}", endpoint.unique_id);
        println!("    Endpoint Ref: {}", endpoint.opaque_ref);
        println!();
    }
    Ok(())
}

#[cfg(feature = "midir")]
fn main() -> midispy::Result<()> {
    list(&midispy::MidirInputBackend::new())
}

#[cfg(not(feature = "midir"))]
fn main() -> midispy::Result<()> {
    // Without platform MIDI, list a small virtual setup
    let backend = midispy::VirtualBackend::outputs();
    backend.add_endpoint(-1_201_543, "IAC Driver Bus 1");
    backend.add_endpoint(88_112, "Synth");
    backend.add_endpoint(42, "");
    list(&backend)
}
