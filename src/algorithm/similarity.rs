use std::collections::HashMap;
use std::hash::Hash;

use super::matcher::SequenceMatcher;

/// `2 * matches / length`, or 1.0 when both sequences are empty.
pub fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        2.0 * matches as f64 / length as f64
    }
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Similarity in `[0, 1]`: twice the number of matched elements over the
    /// total length. Depends on the matching blocks, so it is the expensive one.
    pub fn ratio(&self) -> f64 {
        let matches = self.matching_blocks().iter().map(|m| m.size).sum();
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from the multiset intersection of both sequences.
    pub fn quick_ratio(&self) -> f64 {
        let full_b_count = self.full_b_count.get_or_init(|| {
            let mut counts = HashMap::new();
            for elt in self.b {
                *counts.entry(elt).or_insert(0) += 1;
            }
            counts
        });

        let mut avail: HashMap<&T, usize> = HashMap::new();
        let mut matches = 0;
        for elt in self.a {
            let remaining = avail
                .entry(elt)
                .or_insert_with(|| full_b_count.get(elt).copied().unwrap_or(0));
            if *remaining > 0 {
                matches += 1;
                *remaining -= 1;
            }
        }
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on [`quick_ratio`](Self::quick_ratio) from the lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let (la, lb) = (self.a.len(), self.b.len());
        calculate_ratio(la.min(lb), la + lb)
    }
}
