//! Process-wide platform bindings.
//!
//! Platform libraries (the MIDI service, the spy driver framework) are
//! loaded lazily, at most once per process, and released together.

use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::CaptureConfig;
use crate::error::{Error, Result};

/// Environment variable overriding the spy framework location.
pub const FRAMEWORK_ENV_VAR: &str = "MIDISPY_FRAMEWORK";

const FRAMEWORK_BINARY: &str = "SnoizeMIDISpy.framework/SnoizeMIDISpy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    MidiService,
    SpyDriver,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingKind::MidiService => "midi service",
            BindingKind::SpyDriver => "spy driver",
        })
    }
}

/// A loaded platform library.
pub trait PlatformBinding: Send + Sync {
    fn name(&self) -> &str;

    /// Called once on teardown.
    fn release(&self) {}
}

/// The spy driver framework found on disk.
#[derive(Debug, Clone)]
pub struct SpyFramework {
    path: PathBuf,
}

impl SpyFramework {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlatformBinding for SpyFramework {
    fn name(&self) -> &str {
        "SnoizeMIDISpy"
    }
}

type Entry = (BindingKind, Arc<dyn PlatformBinding>);

#[derive(Default)]
pub struct BindingRegistry {
    bindings: Mutex<Vec<Entry>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static BindingRegistry {
        static REGISTRY: OnceLock<BindingRegistry> = OnceLock::new();
        REGISTRY.get_or_init(BindingRegistry::new)
    }

    pub fn get(&self, kind: BindingKind) -> Option<Arc<dyn PlatformBinding>> {
        self.bindings
            .lock()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, binding)| Arc::clone(binding))
    }

    /// Returns the binding for `kind`, loading it on first use.
    ///
    /// The lock is held while `loader` runs, so concurrent callers never load
    /// twice. A failed load is not cached.
    pub fn get_or_init<F>(&self, kind: BindingKind, loader: F) -> Result<Arc<dyn PlatformBinding>>
    where
        F: FnOnce() -> Result<Arc<dyn PlatformBinding>>,
    {
        let mut bindings = self.bindings.lock();
        if let Some((_, binding)) = bindings.iter().find(|(k, _)| *k == kind) {
            return Ok(Arc::clone(binding));
        }

        let binding = loader()?;
        tracing::debug!(%kind, name = binding.name(), "platform binding loaded");
        bindings.push((kind, Arc::clone(&binding)));
        Ok(binding)
    }

    pub fn is_initialized(&self, kind: BindingKind) -> bool {
        self.bindings.lock().iter().any(|(k, _)| *k == kind)
    }

    /// Releases every binding, most recently loaded first. Idempotent.
    pub fn teardown(&self) {
        let released = std::mem::take(&mut *self.bindings.lock());
        for (kind, binding) in released.into_iter().rev() {
            tracing::debug!(%kind, name = binding.name(), "releasing platform binding");
            binding.release();
        }
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<BindingKind> = self.bindings.lock().iter().map(|(k, _)| *k).collect();
        f.debug_struct("BindingRegistry")
            .field("loaded", &kinds)
            .finish()
    }
}

/// Candidate framework locations, in search order.
pub fn spy_framework_candidates(config: &CaptureConfig) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = &config.framework_path {
        candidates.push(path.clone());
    }
    if let Some(path) = std::env::var_os(FRAMEWORK_ENV_VAR).filter(|p| !p.is_empty()) {
        candidates.push(PathBuf::from(path));
    }
    if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        candidates.push(dir.join("lib").join(FRAMEWORK_BINARY));
    }
    candidates.push(Path::new("/Library/Frameworks").join(FRAMEWORK_BINARY));
    if let Ok(home) = std::env::var("HOME") {
        candidates.push(Path::new(&home).join("Library/Frameworks").join(FRAMEWORK_BINARY));
    }
    candidates
}

/// Finds the spy driver framework. The first existing candidate wins.
pub fn locate_spy_framework(config: &CaptureConfig) -> Result<PathBuf> {
    let candidates = spy_framework_candidates(config);
    candidates
        .iter()
        .find(|path| path.exists())
        .cloned()
        .ok_or_else(|| {
            Error::DriverMissing(format!(
                "SnoizeMIDISpy framework not found (searched {} locations)",
                candidates.len()
            ))
        })
}

/// Locates the spy framework once per process and registers it.
pub fn load_spy_driver(config: &CaptureConfig) -> Result<Arc<dyn PlatformBinding>> {
    BindingRegistry::global().get_or_init(BindingKind::SpyDriver, || {
        let path = locate_spy_framework(config)?;
        Ok(Arc::new(SpyFramework { path }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Recorder {
        name: &'static str,
        released: Arc<Mutex<Vec<&'static str>>>,
    }

    impl PlatformBinding for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn release(&self) {
            self.released.lock().push(self.name);
        }
    }

    fn recorder(
        name: &'static str,
        released: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Result<Arc<dyn PlatformBinding>> {
        Ok(Arc::new(Recorder {
            name,
            released: Arc::clone(released),
        }))
    }

    #[test]
    fn test_loader_runs_once() {
        let registry = BindingRegistry::new();
        let loads = AtomicUsize::new(0);
        let released = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..3 {
            let binding = registry
                .get_or_init(BindingKind::MidiService, || {
                    loads.fetch_add(1, Ordering::SeqCst);
                    recorder("CoreMIDI", &released)
                })
                .unwrap();
            assert_eq!(binding.name(), "CoreMIDI");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(registry.is_initialized(BindingKind::MidiService));
        assert!(!registry.is_initialized(BindingKind::SpyDriver));
    }

    #[test]
    fn test_failed_load_not_cached() {
        let registry = BindingRegistry::new();
        let result = registry.get_or_init(BindingKind::SpyDriver, || {
            Err(Error::DriverMissing("nope".into()))
        });
        assert!(matches!(result, Err(Error::DriverMissing(_))));
        assert!(!registry.is_initialized(BindingKind::SpyDriver));
    }

    #[test]
    fn test_teardown_reverse_order_and_idempotent() {
        let registry = BindingRegistry::new();
        let released = Arc::new(Mutex::new(Vec::new()));
        registry
            .get_or_init(BindingKind::MidiService, || recorder("CoreMIDI", &released))
            .unwrap();
        registry
            .get_or_init(BindingKind::SpyDriver, || recorder("SnoizeMIDISpy", &released))
            .unwrap();

        registry.teardown();
        registry.teardown();

        assert_eq!(*released.lock(), vec!["SnoizeMIDISpy", "CoreMIDI"]);
        assert!(!registry.is_initialized(BindingKind::MidiService));
        assert!(registry.get(BindingKind::SpyDriver).is_none());
    }

    #[test]
    fn test_explicit_path_searched_first() {
        let dir = std::env::temp_dir();
        let config = CaptureConfig::builder()
            .framework_path(dir.clone())
            .build()
            .unwrap();
        assert_eq!(spy_framework_candidates(&config)[0], dir);
        assert_eq!(locate_spy_framework(&config).unwrap(), dir);
    }

    #[test]
    fn test_missing_explicit_path_is_skipped() {
        let config = CaptureConfig::builder()
            .framework_path("/nonexistent/midispy/SnoizeMIDISpy")
            .build()
            .unwrap();
        let candidates = spy_framework_candidates(&config);
        assert!(candidates
            .iter()
            .any(|p| p.ends_with("Library/Frameworks/SnoizeMIDISpy.framework/SnoizeMIDISpy")));
        if let Ok(found) = locate_spy_framework(&config) {
            assert_ne!(found, PathBuf::from("/nonexistent/midispy/SnoizeMIDISpy"));
        }
    }
}
