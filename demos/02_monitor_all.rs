//! # 02 - Monitor All
//!
//! Connect to every endpoint and print each captured batch as raw bytes.
//!
//! **Concepts:** `Monitor::builder`, `connect_all`, callback delivery
//!
//! ```bash
//! cargo run --example 02_monitor_all
//! cargo run --example 02_monitor_all --features midir   # real MIDI sources
//! ```

use midispy::prelude::*;
use midispy::MidiBackend;
use std::time::Duration;

fn print_batch(batch: CapturedBatch) {
    println!("[{}] {} message(s)", batch.endpoint_id, batch.len());
    for msg in &batch.messages {
        println!("    {msg}");
    }
}

fn start<B: MidiBackend>(builder: MonitorBuilder<B>) -> midispy::Result<Monitor<B>> {
    let monitor = builder.connect_all().build_with_callback(print_batch)?;
    println!("Monitoring {} endpoint(s):", monitor.connected().len());
    for endpoint in monitor.connected() {
        println!("  - {endpoint}");
    }
    println!();
    Ok(monitor)
}

#[cfg(feature = "midir")]
fn main() -> midispy::Result<()> {
    let monitor = start(Monitor::midir())?;
    println!("Listening for 10 seconds...");
    std::thread::sleep(Duration::from_secs(10));
    monitor.close();
    Ok(())
}

#[cfg(not(feature = "midir"))]
fn main() -> midispy::Result<()> {
    let backend = VirtualBackend::outputs();
    backend.add_endpoint(1, "Synth");
    backend.add_endpoint(2, "Drum Machine");

    let monitor = start(Monitor::builder(backend.clone()))?;

    // Simulated traffic: a chord to the synth, clock plus a kick to the drums
    backend.send_all(1, &[(0, &[0x90, 60, 100]), (0, &[0x90, 64, 100]), (0, &[0x90, 67, 100])]);
    for tick in 0..3 {
        backend.send(2, tick * 10, &[0xF8]);
        std::thread::sleep(Duration::from_millis(20));
    }
    backend.send(2, 40, &[0x99, 36, 127]);
    backend.send_all(1, &[(500, &[0x80, 60, 0]), (500, &[0x80, 64, 0]), (500, &[0x80, 67, 0])]);

    monitor.close();
    Ok(())
}
