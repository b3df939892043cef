//! The registry and its producer handle.

use crate::entry::{FunctionEntry, RegisteredModule};
use crate::error::RegistryError;
use offload_sourcemap::SourceMap;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

/// A change published by a module build.
#[derive(Clone, Debug, PartialEq)]
pub enum RegistryEvent {
    /// The module's functions, replacing whatever it registered before.
    Register(RegisteredModule),
    /// The module no longer uses the capability.
    Unregister(PathBuf),
}

/// Producer handle, cloned into every pass that extracts functions.
#[derive(Clone, Debug)]
pub struct RegistrySender {
    tx: Sender<RegistryEvent>,
}

impl RegistrySender {
    /// Publishes a module's functions. A module with no functions is
    /// unregistered instead.
    pub fn register_module(&self, module: RegisteredModule) -> Result<(), RegistryError> {
        if module.functions.is_empty() {
            return self.unregister_module(&module.path);
        }
        let path = module.path.clone();
        self.tx
            .send(RegistryEvent::Register(module))
            .map_err(|_| RegistryError::Disconnected { path })
    }

    /// Withdraws everything `path` registered.
    pub fn unregister_module(&self, path: &Path) -> Result<(), RegistryError> {
        self.tx
            .send(RegistryEvent::Unregister(path.to_path_buf()))
            .map_err(|_| RegistryError::Disconnected {
                path: path.to_path_buf(),
            })
    }
}

/// Reports which modules use the parallel-execution capability.
pub trait CapabilityUsers {
    /// Whether the module at `path` currently contributes worker functions.
    fn uses_capability(&self, path: &Path) -> bool;
}

/// The registered functions at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrySnapshot {
    /// Modules in first-registration order.
    pub modules: Vec<RegisteredModule>,
}

impl RegistrySnapshot {
    /// Every function, module by module, in registration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.modules.iter().flat_map(|m| m.functions.iter())
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.modules.iter().map(|m| m.functions.len()).sum()
    }

    /// Whether no function is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map fragments keyed by the originating module's path.
    pub fn fragments(&self) -> impl Iterator<Item = (String, &SourceMap)> {
        self.modules.iter().filter_map(|m| {
            m.map
                .as_ref()
                .map(|map| (m.path.to_string_lossy().replace('\\', "/"), map))
        })
    }
}

/// Consumer side: applies published events and answers queries.
///
/// Shared through `Rc`; all methods take `&self`.
#[derive(Debug)]
pub struct FunctionRegistry {
    tx: Sender<RegistryEvent>,
    rx: Receiver<RegistryEvent>,
    modules: RefCell<Vec<RegisteredModule>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            modules: RefCell::new(Vec::new()),
        }
    }

    /// A new producer handle.
    pub fn sender(&self) -> RegistrySender {
        RegistrySender {
            tx: self.tx.clone(),
        }
    }

    /// Applies every queued event.
    fn apply_pending(&self) {
        let mut modules = self.modules.borrow_mut();
        while let Ok(event) = self.rx.try_recv() {
            match event {
                RegistryEvent::Register(module) => {
                    tracing::debug!(
                        module = %module.path.display(),
                        functions = module.functions.len(),
                        "registering worker functions"
                    );
                    match modules.iter_mut().find(|m| m.path == module.path) {
                        Some(existing) => *existing = module,
                        None => modules.push(module),
                    }
                }
                RegistryEvent::Unregister(path) => {
                    let before = modules.len();
                    modules.retain(|m| m.path != path);
                    if modules.len() != before {
                        tracing::debug!(module = %path.display(), "unregistering worker functions");
                    }
                }
            }
        }
    }

    /// Applies queued events and returns the current contents.
    pub fn drain(&self) -> RegistrySnapshot {
        self.apply_pending();
        let snapshot = RegistrySnapshot {
            modules: self.modules.borrow().clone(),
        };
        tracing::debug!(
            modules = snapshot.modules.len(),
            functions = snapshot.len(),
            "drained function registry"
        );
        snapshot
    }

    /// Whether `path` currently has functions registered.
    pub fn is_known_user(&self, path: &Path) -> bool {
        self.apply_pending();
        self.modules.borrow().iter().any(|m| m.path == path)
    }

    /// Paths of every module with registered functions.
    pub fn known_users(&self) -> Vec<PathBuf> {
        self.apply_pending();
        self.modules.borrow().iter().map(|m| m.path.clone()).collect()
    }
}

impl CapabilityUsers for FunctionRegistry {
    fn uses_capability(&self, path: &Path) -> bool {
        self.is_known_user(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ExtractedFunction;
    use crate::id::FunctionId;
    use offload_js_parser::ast::{Expr, ExprKind};

    fn entry(origin: &str, id: &str) -> FunctionEntry {
        FunctionEntry {
            id: FunctionId::new(id),
            function: ExtractedFunction::Expression(Expr::synthetic(ExprKind::Null)),
            origin: PathBuf::from(origin),
        }
    }

    fn module(path: &str, ids: &[&str]) -> RegisteredModule {
        RegisteredModule::new(path, ids.iter().map(|id| entry(path, id)).collect())
    }

    #[test]
    fn events_are_applied_on_drain() {
        let registry = FunctionRegistry::new();
        let sender = registry.sender();
        sender.register_module(module("a.js", &["a1", "a2"])).unwrap();
        sender.register_module(module("b.js", &["b1"])).unwrap();

        let snapshot = registry.drain();
        let ids: Vec<_> = snapshot.functions().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "b1"]);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn reregistration_replaces_in_place() {
        let registry = FunctionRegistry::new();
        let sender = registry.sender();
        sender.register_module(module("a.js", &["a1"])).unwrap();
        sender.register_module(module("b.js", &["b1"])).unwrap();
        sender.register_module(module("a.js", &["a2"])).unwrap();

        let snapshot = registry.drain();
        let ids: Vec<_> = snapshot.functions().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a2", "b1"]);
    }

    #[test]
    fn empty_registration_unregisters() {
        let registry = FunctionRegistry::new();
        let sender = registry.sender();
        sender.register_module(module("a.js", &["a1"])).unwrap();
        assert!(registry.is_known_user(Path::new("a.js")));

        sender.register_module(module("a.js", &[])).unwrap();
        assert!(!registry.is_known_user(Path::new("a.js")));
        assert!(registry.drain().is_empty());
    }

    #[test]
    fn known_users_and_capability_query() {
        let registry = FunctionRegistry::new();
        let sender = registry.sender();
        sender.register_module(module("x.js", &["x"])).unwrap();
        sender.register_module(module("y.js", &["y"])).unwrap();
        sender.unregister_module(Path::new("x.js")).unwrap();

        assert_eq!(registry.known_users(), vec![PathBuf::from("y.js")]);
        assert!(registry.uses_capability(Path::new("y.js")));
        assert!(!registry.uses_capability(Path::new("x.js")));
    }

    #[test]
    fn entries_persist_across_drains() {
        let registry = FunctionRegistry::new();
        registry.sender().register_module(module("a.js", &["a1"])).unwrap();
        assert_eq!(registry.drain().len(), 1);
        assert_eq!(registry.drain().len(), 1);
    }

    #[test]
    fn sender_fails_once_registry_is_dropped() {
        let registry = FunctionRegistry::new();
        let sender = registry.sender();
        drop(registry);
        let err = sender.register_module(module("a.js", &["a1"])).unwrap_err();
        assert!(matches!(err, RegistryError::Disconnected { path } if path == Path::new("a.js")));
    }

    #[test]
    fn fragments_are_keyed_by_module_path() {
        let registry = FunctionRegistry::new();
        let map = SourceMap::from_json(r#"{"version":3,"sources":["f.ts"],"names":[],"mappings":"AAAA"}"#)
            .unwrap();
        registry
            .sender()
            .register_module(module("src/f.js", &["f"]).with_map(map.clone()))
            .unwrap();
        registry.sender().register_module(module("src/g.js", &["g"])).unwrap();
        let snapshot = registry.drain();
        let fragments: Vec<_> = snapshot.fragments().collect();
        assert_eq!(fragments, vec![("src/f.js".to_string(), &map)]);
    }
}
