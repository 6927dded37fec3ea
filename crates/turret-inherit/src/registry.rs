//! Ordered registry of chain strategies
//!
//! Order is priority: the first strategy that yields a value wins.

use crate::strategies::{
    ChainStrategy, ClusterNodeStrategy, ModelStrategy, SpecificZoneStrategy, SystemZoneStrategy,
};

/// Chain strategies in priority order
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn ChainStrategy>>,
}

impl StrategyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Most-specific-wins order: cluster node, specific zone, model, system zone
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ClusterNodeStrategy);
        registry.register(SpecificZoneStrategy);
        registry.register(ModelStrategy);
        registry.register(SystemZoneStrategy);
        registry
    }

    /// Append a strategy at the lowest priority
    pub fn register<S: ChainStrategy + 'static>(&mut self, strategy: S) {
        self.strategies.push(Box::new(strategy));
    }

    /// Remove a strategy by name
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.strategies.len();
        self.strategies.retain(|s| s.name() != name);
        self.strategies.len() != before
    }

    /// Strategy names in priority order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Iterate strategies in priority order
    pub fn iter(&self) -> impl Iterator<Item = &dyn ChainStrategy> {
        self.strategies.iter().map(|s| &**s)
    }

    /// Get number of registered strategies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
