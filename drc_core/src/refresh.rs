//! The active holiday rule set and its replacement on refresh.

use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;

use crate::holiday::HolidayRuleSet;

/// A consistent view of the active rule set.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Incremented on every successful replacement.
    pub version: u64,
    pub rules: Arc<HolidayRuleSet>,
}

/// Owns the active rule set.
///
/// Readers clone an [`Arc`] of the whole set. The lock is only held to clone or swap it,
/// so a replacement never exposes a partially updated set.
#[derive(Debug)]
pub struct RuleSetHandle {
    active: RwLock<Snapshot>,
}

impl RuleSetHandle {
    pub fn new(rules: HolidayRuleSet) -> Self {
        Self {
            active: RwLock::new(Snapshot {
                version: 0,
                rules: Arc::new(rules),
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current(&self) -> Arc<HolidayRuleSet> {
        self.snapshot().rules
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Install a new rule set and get its version.
    pub fn replace(&self, rules: HolidayRuleSet) -> u64 {
        let rules = Arc::new(rules);
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        active.version += 1;
        active.rules = rules;
        active.version
    }

    /// Build a new rule set and install it.
    ///
    /// If building fails the active rule set stays in place.
    pub fn refresh<F>(&self, build: F) -> Result<u64>
    where
        F: FnOnce() -> Result<HolidayRuleSet>,
    {
        match build() {
            Ok(rules) => {
                let (year, len) = (rules.year(), rules.len());
                let version = self.replace(rules);
                log::info!("activated {len} holiday rules for {year} as version {version}");
                Ok(version)
            }
            Err(err) => {
                log::warn!(
                    "keeping holiday rules version {} after failed refresh: {err:#}",
                    self.version()
                );
                Err(err)
            }
        }
    }
}
