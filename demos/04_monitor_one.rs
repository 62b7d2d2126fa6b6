//! # 04 - Monitor One
//!
//! Capture a single named MIDI source through midir.
//!
//! **Concepts:** `Monitor::midir`, connecting by name, channel delivery
//!
//! ```bash
//! cargo run --example 04_monitor_one --features midir -- "IAC Driver Bus 1"
//! ```

use midispy::prelude::*;
use std::time::{Duration, Instant};

fn main() -> midispy::Result<()> {
    let Some(name) = std::env::args().nth(1) else {
        let names = Monitor::midir().build()?.endpoint_names()?;
        println!("Usage: 04_monitor_one <source name>");
        println!("Available sources:");
        for name in names {
            println!("  - {name}");
        }
        return Ok(());
    };

    let monitor = Monitor::midir().connect(name.as_str()).build()?;
    let Some(batches) = monitor.batches() else {
        return Ok(());
    };
    println!("Monitoring '{name}' for 10 seconds...");

    let deadline = Instant::now() + Duration::from_secs(10);
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        let Ok(batch) = batches.recv_timeout(remaining) else {
            break;
        };
        for (msg, parsed) in batch.messages.iter().zip(batch.classified()) {
            println!("{msg}  {parsed}");
        }
    }

    monitor.close();
    Ok(())
}
