//! Explicit schedule registration.
//!
//! Schedules are plain values registered explicitly with a repository;
//! nothing is collected through global state as a side effect of definition.
//! The scheduling daemon iterates a repository to know what to tick.

use crate::error::{Error, Result};
use crate::schedule::ScheduleDefinition;
use std::collections::BTreeMap;

/// A named collection of schedule definitions.
///
/// Iteration order is by name, so daemons observe a stable ordering.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRepository {
    schedules: BTreeMap<String, ScheduleDefinition>,
}

impl ScheduleRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schedule under its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSchedule`] if a schedule with the same name
    /// is already registered.
    pub fn register(&mut self, schedule: ScheduleDefinition) -> Result<()> {
        let name = schedule.name().to_string();
        if self.schedules.contains_key(&name) {
            return Err(Error::DuplicateSchedule { name });
        }
        self.schedules.insert(name, schedule);
        Ok(())
    }

    /// Looks up a schedule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScheduleDefinition> {
        self.schedules.get(name)
    }

    /// Iterates the registered schedules in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduleDefinition> {
        self.schedules.values()
    }

    /// The registered schedule names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.schedules.keys().map(String::as_str).collect()
    }

    /// The number of registered schedules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    /// Returns true if no schedules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}
