//! BackendRegistry - バックエンドの登録と管理
//!
//! 名前 → `Arc<dyn ImageBackend>` の対応表。起動時に組み立て、実行中は読むだけです。

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::BackendName;
use crate::ports::ImageBackend;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("backend '{0}' is already registered")]
    AlreadyRegistered(BackendName),
}

#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<BackendName, Arc<dyn ImageBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, backend: Arc<dyn ImageBackend>) -> Result<(), RegistryError> {
        let name = backend.name().clone();
        if self.backends.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.backends.insert(name, backend);
        Ok(())
    }

    pub fn get(&self, name: &BackendName) -> Option<Arc<dyn ImageBackend>> {
        self.backends.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<BackendName> {
        let mut names: Vec<BackendName> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
