//! Population statistics for charting.

use crate::types::{RuleFamily, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of cells per status in one generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    counts: BTreeMap<Status, usize>,
}

impl PopulationCounts {
    /// Counts with a zero entry for every status of the family
    pub fn for_family(family: RuleFamily) -> Self {
        Self {
            counts: (0..family.status_count()).map(|s| (Status(s), 0)).collect(),
        }
    }

    pub fn record(&mut self, status: Status) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// All cells counted
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Cells whose status is anything but the background status 0
    pub fn occupied(&self) -> usize {
        self.total() - self.get(Status::EMPTY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Status, usize)> + '_ {
        self.counts.iter().map(|(s, c)| (*s, *c))
    }

    /// Status name → count, for logs and chart labels
    pub fn labelled(&self, family: RuleFamily) -> Vec<(String, usize)> {
        self.iter()
            .map(|(status, count)| {
                let label = family
                    .status_name(status)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Status {}", status));
                (label, count)
            })
            .collect()
    }
}

impl FromIterator<Status> for PopulationCounts {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.record(status);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let counts: PopulationCounts = [Status(0), Status(1), Status(1), Status(2)]
            .into_iter()
            .collect();
        assert_eq!(counts.get(Status(1)), 2);
        assert_eq!(counts.get(Status(3)), 0);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.occupied(), 3);
    }

    #[test]
    fn test_family_counts_start_at_zero() {
        let mut counts = PopulationCounts::for_family(RuleFamily::Fire);
        assert_eq!(counts.iter().count(), 4);
        counts.record(Status(2));
        let labelled = counts.labelled(RuleFamily::Fire);
        assert_eq!(labelled[2], ("burning".to_string(), 1));
        assert_eq!(labelled[0], ("empty".to_string(), 0));
    }
}
