//! Capture layer for midispy.
//!
//! Connects the pure pipeline in `midispy-core` to a platform MIDI service:
//! endpoint discovery, connection lifecycle and delivery of filtered batches.
//!
//! Feature gates: `midir` (source capture through midir).
//!
//! # Example
//!
//! ```
//! use midispy_io::{CaptureConfig, CaptureSession, VirtualBackend};
//! use midispy_core::{FilterSpec, MessageTag};
//!
//! let backend = VirtualBackend::inputs();
//! let keys = backend.add_endpoint(7, "Keys");
//!
//! let (session, batches) =
//!     CaptureSession::with_channel(backend.clone(), CaptureConfig::default())?;
//! session.set_filter(FilterSpec::new().exclude_types([MessageTag::Realtime]));
//! session.connect(&keys)?;
//!
//! backend.send(7, 0, &[0xF8]);
//! backend.send(7, 1, &[0x90, 60, 100]);
//!
//! let batch = batches.try_recv().unwrap();
//! assert_eq!(batch.endpoint_id, 7);
//! assert_eq!(batch.messages[0].bytes(), &[0x90, 60, 100]);
//! # Ok::<(), midispy_io::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::{
    CaptureConfig, CaptureConfigBuilder, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CLIENT_NAME,
};

mod backend;
pub use backend::{Direction, MidiBackend};

mod sink;
pub use sink::{CapturedBatch, PacketSink};

pub mod directory;
pub use directory::EndpointDirectory;

pub mod registry;
pub use registry::{
    load_spy_driver, locate_spy_framework, BindingKind, BindingRegistry, PlatformBinding,
    SpyFramework,
};

mod session;
pub use session::CaptureSession;

mod virtual_backend;
pub use virtual_backend::{VirtualBackend, VirtualPort};

#[cfg(feature = "midir")]
mod midir_backend;
#[cfg(feature = "midir")]
pub use midir_backend::{MidirInputBackend, MidirPort};
