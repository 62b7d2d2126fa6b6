//! Platform MIDI endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque platform handle for an endpoint.
///
/// Only meaningful to the backend that produced it. Two lookups of the same
/// endpoint may yield different refs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EndpointRef(pub u64);

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A MIDI source or destination.
///
/// Identity is the platform unique ID: `PartialEq` and `Hash` ignore the
/// opaque ref and the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub opaque_ref: EndpointRef,
    pub unique_id: i32,
    pub name: Option<String>,
}

impl Endpoint {
    pub fn new(opaque_ref: EndpointRef, unique_id: i32, name: impl Into<String>) -> Self {
        Self {
            opaque_ref,
            unique_id,
            name: Some(name.into()),
        }
    }

    /// An endpoint the platform reported without a name.
    pub fn unnamed(opaque_ref: EndpointRef, unique_id: i32) -> Self {
        Self {
            opaque_ref,
            unique_id,
            name: None,
        }
    }

    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Unknown Endpoint {}", self.opaque_ref),
        }
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id == other.unique_id
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_id.hash(state);
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.display_name(), self.unique_id)
    }
}
