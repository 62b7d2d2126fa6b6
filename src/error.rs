//! Centralized error type for the midispy umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Capture: {0}")]
    Capture(#[from] midispy_io::Error),

    #[error("Filter: {0}")]
    Filter(#[from] midispy_core::ParseTagError),
}

pub type Result<T> = std::result::Result<T, Error>;
