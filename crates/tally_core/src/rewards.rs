//! Reward tiers derived from the lifetime items-created counter
//!
//! The catalog is static and ordered ascending by threshold; the first
//! tier starts at 0 so every user has a current tier. Crossing into a new
//! tier fires one unlock notification per tier id per session.

use serde::Serialize;
use std::collections::HashSet;

/// One unlockable tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardTier {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// Lifetime items-created count required to unlock
    pub threshold: u64,
    /// Color token unlocked by this tier
    pub color: &'static str,
    pub color_name: &'static str,
}

/// The built-in catalog, ascending by threshold
pub const CATALOG: &[RewardTier] = &[
    RewardTier {
        id: "starter",
        title: "Getting Started",
        description: "Add your first items",
        icon: "seedling",
        threshold: 0,
        color: "slate",
        color_name: "Slate",
    },
    RewardTier {
        id: "lister",
        title: "Lister",
        description: "10 items added",
        icon: "pencil",
        threshold: 10,
        color: "teal",
        color_name: "Teal",
    },
    RewardTier {
        id: "organizer",
        title: "Organizer",
        description: "50 items added",
        icon: "clipboard",
        threshold: 50,
        color: "indigo",
        color_name: "Indigo",
    },
    RewardTier {
        id: "planner",
        title: "Planner",
        description: "150 items added",
        icon: "calendar",
        threshold: 150,
        color: "amber",
        color_name: "Amber",
    },
    RewardTier {
        id: "achiever",
        title: "Achiever",
        description: "400 items added",
        icon: "trophy",
        threshold: 400,
        color: "crimson",
        color_name: "Crimson",
    },
    RewardTier {
        id: "legend",
        title: "List Legend",
        description: "1000 items added",
        icon: "crown",
        threshold: 1000,
        color: "gold",
        color_name: "Gold",
    },
];

/// Derived reward state for presentation
#[derive(Debug, Clone, Serialize)]
pub struct RewardStatus {
    pub counter: u64,
    pub current: RewardTier,
    pub next: Option<RewardTier>,
    /// Fraction of the way from the current threshold to the next, 0..=1
    pub progress: f64,
    pub unlocked_colors: Vec<&'static str>,
}

/// Tracks the counter against the catalog and de-duplicates unlock
/// notifications within a session
pub struct RewardTracker {
    catalog: &'static [RewardTier],
    counter: u64,
    celebrated: HashSet<&'static str>,
}

impl RewardTracker {
    pub fn new(counter: u64) -> Self {
        Self::with_catalog(CATALOG, counter)
    }

    pub fn with_catalog(catalog: &'static [RewardTier], counter: u64) -> Self {
        debug_assert!(!catalog.is_empty());
        debug_assert!(catalog.windows(2).all(|w| w[0].threshold < w[1].threshold));
        debug_assert_eq!(catalog[0].threshold, 0);
        Self {
            catalog,
            counter,
            celebrated: HashSet::new(),
        }
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Highest tier whose threshold is at or below the counter
    pub fn current(&self) -> &RewardTier {
        self.catalog
            .iter()
            .rev()
            .find(|t| t.threshold <= self.counter)
            .unwrap_or(&self.catalog[0])
    }

    /// First tier above the counter, `None` once everything is unlocked
    pub fn next(&self) -> Option<&RewardTier> {
        self.catalog.iter().find(|t| t.threshold > self.counter)
    }

    /// Progress from the current threshold toward the next, clamped 0..=1
    pub fn progress(&self) -> f64 {
        let current = self.current().threshold;
        match self.next() {
            Some(next) => {
                let span = (next.threshold - current) as f64;
                (((self.counter - current) as f64) / span).clamp(0.0, 1.0)
            }
            None => 1.0,
        }
    }

    /// Color tokens of every unlocked tier
    pub fn unlocked_colors(&self) -> Vec<&'static str> {
        self.catalog
            .iter()
            .filter(|t| t.threshold <= self.counter)
            .map(|t| t.color)
            .collect()
    }

    /// Update the counter. Returns the newly entered tier the first time
    /// the counter crosses into it this session, `None` otherwise.
    pub fn set_counter(&mut self, counter: u64) -> Option<&RewardTier> {
        let previous_id = self.current().id;
        self.counter = counter;
        let current_id = self.current().id;

        if current_id != previous_id && self.celebrated.insert(current_id) {
            return Some(self.current());
        }
        None
    }

    pub fn status(&self) -> RewardStatus {
        RewardStatus {
            counter: self.counter,
            current: *self.current(),
            next: self.next().copied(),
            progress: self.progress(),
            unlocked_colors: self.unlocked_colors(),
        }
    }
}
