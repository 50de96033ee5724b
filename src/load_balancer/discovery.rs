//! Instance discovery.
//!
//! Discovery produces a snapshot once, when the pool is built. The pool
//! never grows or shrinks afterwards.

use crate::load_balancer::instance::{Instance, InstanceError};

/// Source of the instance snapshot.
pub trait Discovery {
    fn instances(&self) -> Vec<Instance>;
}

/// A fixed list of instances, usually from a comma-separated flag.
#[derive(Debug, Clone, Default)]
pub struct FixedDiscovery {
    instances: Vec<Instance>,
}

impl FixedDiscovery {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self { instances }
    }

    /// Parse a comma-separated list. An empty list is valid and disables proxying.
    pub fn parse(list: &str) -> Result<Self, InstanceError> {
        let instances = split_instances(list)
            .into_iter()
            .map(Instance::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { instances })
    }
}

impl Discovery for FixedDiscovery {
    fn instances(&self) -> Vec<Instance> {
        self.instances.clone()
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_instances(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
