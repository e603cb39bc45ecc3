use super::SimpleFunc;
use crate::funcs::builtin::BUILTINS;
use crate::funcs::catalog::{Catalog, CatalogError};
use crate::types::FuncValue;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a simple func named `{0}` is already registered")]
    Duplicate(String),

    #[error("simple func name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Builder for a function registered at compile time
pub type StaticFuncBuilder = fn() -> FuncValue;

/// A simple func declared with `inventory::submit!` anywhere in the crate
/// graph, picked up by [`SimpleRegistry::load_static`]
pub struct StaticFunc {
    pub name: &'static str,
    pub build: StaticFuncBuilder,
}

inventory::collect!(StaticFunc);

/// Maps names to simple, static, pure functions.
///
/// Filled once while the process starts up, before any graph runs, and
/// read-only afterwards.
#[derive(Default)]
pub struct SimpleRegistry {
    funcs: HashMap<String, Arc<FuncValue>>,
}

impl SimpleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pure function and install a node factory for it in the
    /// engine catalog. Each node the factory builds shares `func`.
    pub fn register(
        &mut self,
        catalog: &mut Catalog,
        name: &str,
        func: FuncValue,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.funcs.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }

        let func = Arc::new(func);
        let node_name = name.to_string();
        let node_func = func.clone();
        catalog.register(name, move || {
            Box::new(SimpleFunc::new(node_name.clone(), node_func.clone()))
        })?;

        log::debug!("registered simple func {} {}", name, func.sig());
        self.funcs.insert(name.to_string(), func);
        Ok(())
    }

    /// Register every `StaticFunc` submitted through `inventory`.
    ///
    /// # Panics
    ///
    /// Panics if two registrations share a name. Two independent sites
    /// collided, and the process cannot start with an ambiguous catalog.
    pub fn load_static(&mut self, catalog: &mut Catalog) {
        let mut statics: Vec<&StaticFunc> = Vec::new();
        for s in inventory::iter::<StaticFunc> {
            statics.push(s);
        }
        statics.sort_by_key(|s| s.name);
        self.load(catalog, statics);
    }

    /// Register a fixed set of static funcs.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name, like [`load_static`](Self::load_static).
    pub fn load<'a, I>(&mut self, catalog: &mut Catalog, statics: I)
    where
        I: IntoIterator<Item = &'a StaticFunc>,
    {
        let before = self.funcs.len();
        for s in statics {
            if let Err(e) = self.register(catalog, s.name, (s.build)()) {
                panic!("failed to register static func {}: {}", s.name, e);
            }
        }
        log::info!("loaded {} static simple funcs", self.funcs.len() - before);
    }

    /// Registry and catalog holding the builtins plus every func submitted
    /// through `inventory`
    pub fn bootstrap() -> (Self, Catalog) {
        let mut registry = Self::new();
        let mut catalog = Catalog::new();
        registry.load(&mut catalog, BUILTINS);
        registry.load_static(&mut catalog);
        (registry, catalog)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Sorted list of registered names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.funcs.keys().cloned().collect();
        names.sort();
        names
    }
}
