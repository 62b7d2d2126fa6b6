//! Endpoint lookup by ID and name.

use midispy_core::Endpoint;

use crate::backend::MidiBackend;
use crate::error::Result;

/// Finds an endpoint by name, case-insensitively.
///
/// An exact match wins over a substring match; otherwise the first
/// endpoint whose name contains `name` is returned.
pub fn find_by_name<'a>(endpoints: &'a [Endpoint], name: &str) -> Option<&'a Endpoint> {
    fn lowered(endpoint: &Endpoint) -> Option<String> {
        endpoint.name.as_deref().map(str::to_lowercase)
    }

    let wanted = name.to_lowercase();

    endpoints
        .iter()
        .find(|endpoint| lowered(endpoint).is_some_and(|n| n == wanted))
        .or_else(|| {
            endpoints
                .iter()
                .find(|endpoint| lowered(endpoint).is_some_and(|n| n.contains(&wanted)))
        })
}

/// A snapshot of the endpoints a backend exposes.
pub struct EndpointDirectory<'a, B: MidiBackend> {
    backend: &'a B,
    endpoints: Vec<Endpoint>,
}

impl<'a, B: MidiBackend> EndpointDirectory<'a, B> {
    pub fn new(backend: &'a B) -> Result<Self> {
        Ok(Self {
            backend,
            endpoints: backend.endpoints()?,
        })
    }

    /// Re-enumerates through the backend.
    pub fn refresh(&mut self) -> Result<()> {
        self.endpoints = self.backend.endpoints()?;
        Ok(())
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn by_unique_id(&self, unique_id: i32) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.unique_id == unique_id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Endpoint> {
        find_by_name(&self.endpoints, name)
    }

    pub fn names(&self) -> Vec<String> {
        self.endpoints.iter().map(Endpoint::display_name).collect()
    }
}
