//! Module loading
//!
//! A [`ModuleLoader`] turns a module path into a component implementation.
//! [`ModuleRegistry`] is the in-process host environment: a path map filled
//! at start-up.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rsc_core::Component;
use thiserror::Error;

/// Module loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleLoadError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Failed to load module `{path}`: {reason}")]
    Failed { path: String, reason: String },
}

impl ModuleLoadError {
    /// Path of the module that failed
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(path) => path,
            Self::Failed { path, .. } => path,
        }
    }
}

pub type ModuleLoadResult<T> = Result<T, ModuleLoadError>;

/// Resolves module paths to component implementations
#[async_trait::async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Load the component exported by `path`
    async fn load(&self, path: &str) -> ModuleLoadResult<Component>;
}

#[async_trait::async_trait]
impl<L: ModuleLoader + ?Sized> ModuleLoader for Arc<L> {
    async fn load(&self, path: &str) -> ModuleLoadResult<Component> {
        (**self).load(path).await
    }
}

/// In-process module table
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Component>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, returning the one it replaces
    pub fn register(&self, path: impl Into<String>, component: Component) -> Option<Component> {
        self.modules.write().insert(path.into(), component)
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(self, path: impl Into<String>, component: Component) -> Self {
        self.register(path, component);
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.read().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.modules.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait::async_trait]
impl ModuleLoader for ModuleRegistry {
    async fn load(&self, path: &str) -> ModuleLoadResult<Component> {
        self.modules
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| ModuleLoadError::NotFound(path.to_string()))
    }
}
