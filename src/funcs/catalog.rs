use crate::core::Func;
use std::collections::HashMap;
use thiserror::Error;

type FuncFactory = Box<dyn Fn() -> Box<dyn Func> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("a func named `{0}` is already in the catalog")]
    Duplicate(String),

    #[error("unknown func `{0}`")]
    Unknown(String),
}

/// The engine's function catalog: every kind of function node a graph can
/// instantiate, keyed by name
#[derive(Default)]
pub struct Catalog {
    factories: HashMap<String, FuncFactory>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), CatalogError>
    where
        F: Fn() -> Box<dyn Func> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(CatalogError::Duplicate(name.to_string()));
        }
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    /// Build a fresh, not yet validated node for one use-site
    pub fn create(&self, name: &str) -> Result<Box<dyn Func>, CatalogError> {
        self.factories
            .get(name)
            .ok_or_else(|| CatalogError::Unknown(name.to_string()))
            .map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Sorted list of registered names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}
