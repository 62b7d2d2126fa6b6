//! Error types for the capture layer.

use thiserror::Error;

/// Status codes reported by the MIDI spy driver.
pub mod status {
    pub const DRIVER_MISSING: i32 = 1;
    pub const DRIVER_COULD_NOT_COMMUNICATE: i32 = 2;
    pub const CONNECTION_ALREADY_EXISTS: i32 = 3;
    pub const CONNECTION_DOES_NOT_EXIST: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI spy driver missing: {0}")]
    DriverMissing(String),

    #[error("Could not communicate with MIDI spy driver: {0}")]
    DriverCommunication(String),

    #[error("Already connected to {name}")]
    ConnectionExists { name: String },

    #[error("Not connected to {name}")]
    ConnectionNotFound { name: String },

    #[error("No endpoint found matching '{0}'")]
    EndpointNotFound(String),

    #[error("Capture session is closed")]
    Closed,

    #[error("{operation} failed with status {status}")]
    Platform { operation: String, status: i32 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Checks a platform status code. Zero is success; anything else maps
    /// to the matching error.
    ///
    /// `endpoint` names the endpoint involved, for the connection errors.
    pub fn check_status(status: i32, operation: &str, endpoint: &str) -> Result<()> {
        let name = || endpoint.to_string();
        Err(match status {
            0 => return Ok(()),
            status::DRIVER_MISSING => Error::DriverMissing(operation.to_string()),
            status::DRIVER_COULD_NOT_COMMUNICATE => {
                Error::DriverCommunication(operation.to_string())
            }
            status::CONNECTION_ALREADY_EXISTS => Error::ConnectionExists { name: name() },
            status::CONNECTION_DOES_NOT_EXIST => Error::ConnectionNotFound { name: name() },
            status => Error::Platform {
                operation: operation.to_string(),
                status,
            },
        })
    }
}

#[cfg(feature = "midir")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::DriverCommunication(e.to_string())
    }
}

#[cfg(feature = "midir")]
impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::DriverCommunication(e.to_string())
    }
}

#[cfg(feature = "midir")]
impl From<midir::PortInfoError> for Error {
    fn from(e: midir::PortInfoError) -> Self {
        Error::DriverCommunication(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
