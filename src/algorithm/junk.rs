use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Sequences shorter than this are never subject to the popularity heuristic.
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// `Send` so that a matcher holding one can be handed to another thread.
pub type JunkPredicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + 'a>;

/// How elements of the second sequence are classified as junk.
///
/// Junk elements never start a match; they can only be absorbed at the edges
/// of a match that was found without them. Popular elements (the automatic
/// heuristic) are dropped from the position index but are not junk.
pub enum JunkPolicy<'a, T> {
    /// Nothing is junk and nothing is popular.
    NoJunk,
    /// Only the caller's predicate decides.
    Predicate(JunkPredicate<'a, T>),
    /// Only the popularity heuristic applies.
    Popularity,
    /// The predicate first, then the popularity heuristic over what remains.
    Combined(JunkPredicate<'a, T>),
}

impl<'a, T> JunkPolicy<'a, T> {
    pub fn predicate(&self) -> Option<&(dyn Fn(&T) -> bool + 'a)> {
        match self {
            JunkPolicy::Predicate(f) | JunkPolicy::Combined(f) => Some(f.as_ref()),
            JunkPolicy::NoJunk | JunkPolicy::Popularity => None,
        }
    }

    pub fn autojunk(&self) -> bool {
        matches!(self, JunkPolicy::Popularity | JunkPolicy::Combined(_))
    }

    /// Builds a policy from an optional predicate and the autojunk flag.
    pub fn from_parts(predicate: Option<JunkPredicate<'a, T>>, autojunk: bool) -> Self {
        match (predicate, autojunk) {
            (None, false) => JunkPolicy::NoJunk,
            (None, true) => JunkPolicy::Popularity,
            (Some(f), false) => JunkPolicy::Predicate(f),
            (Some(f), true) => JunkPolicy::Combined(f),
        }
    }
}

impl<T> Default for JunkPolicy<'_, T> {
    fn default() -> Self {
        JunkPolicy::Popularity
    }
}

impl<T> std::fmt::Debug for JunkPolicy<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JunkPolicy::NoJunk => "NoJunk",
            JunkPolicy::Predicate(_) => "Predicate",
            JunkPolicy::Popularity => "Popularity",
            JunkPolicy::Combined(_) => "Combined",
        };
        f.write_str(name)
    }
}

/// Per-sequence bookkeeping: where each non-junk, non-popular value occurs,
/// and which values were classified as junk or popular.
#[derive(Debug)]
pub struct Classification<'a, T> {
    positions: HashMap<&'a T, Vec<usize>>,
    junk: HashSet<&'a T>,
    popular: HashSet<&'a T>,
}

impl<'a, T: Eq + Hash> Classification<'a, T> {
    pub fn classify(seq: &'a [T], policy: &JunkPolicy<'_, T>) -> Self {
        let mut positions: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (i, elt) in seq.iter().enumerate() {
            positions.entry(elt).or_default().push(i);
        }

        let mut junk = HashSet::new();
        if let Some(is_junk) = policy.predicate() {
            junk.extend(positions.keys().copied().filter(|elt| is_junk(*elt)));
            for elt in &junk {
                positions.remove(elt);
            }
        }

        // User junk is already gone from `positions`, so it can't also be popular.
        let mut popular = HashSet::new();
        let n = seq.len();
        if policy.autojunk() && n >= AUTOJUNK_MIN_LEN {
            let threshold = n / 100 + 1;
            popular.extend(
                positions
                    .iter()
                    .filter(|(_, indices)| indices.len() > threshold)
                    .map(|(elt, _)| *elt),
            );
            for elt in &popular {
                positions.remove(elt);
            }
        }

        tracing::trace!(
            len = n,
            distinct = positions.len(),
            junk = junk.len(),
            popular = popular.len(),
            ?policy,
            "classified sequence"
        );

        Classification {
            positions,
            junk,
            popular,
        }
    }

    /// Ascending indices at which `elt` occurs; empty for junk and popular values.
    pub fn positions(&self, elt: &T) -> &[usize] {
        self.positions.get(elt).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_junk(&self, elt: &T) -> bool {
        self.junk.contains(elt)
    }

    pub fn is_popular(&self, elt: &T) -> bool {
        self.popular.contains(elt)
    }

    pub fn junk(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.junk.iter().copied()
    }

    pub fn popular(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.popular.iter().copied()
    }
}

/// True for a blank line or a line holding a single `#` and whitespace.
pub fn is_line_junk(line: &str) -> bool {
    let rest = line.trim_start();
    let rest = rest.strip_prefix('#').unwrap_or(rest);
    rest.trim_start().is_empty()
}

/// True for a space or a tab.
pub fn is_character_junk(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn predicate_removes_values_from_index() {
        let b = chars("a b a");
        let policy = JunkPolicy::Predicate(Box::new(|c: &char| *c == ' '));
        let classes = Classification::classify(&b, &policy);
        assert!(classes.is_junk(&' '));
        assert!(classes.positions(&' ').is_empty());
        assert_eq!(classes.positions(&'a'), &[0, 4]);
        assert_eq!(classes.popular().count(), 0);
    }

    #[test]
    fn popularity_threshold_at_minimum_length() {
        // n = 200 -> a value is popular once it occurs more than 3 times.
        let mut b = vec![0u32; 0];
        b.extend([1, 1, 1]);
        b.extend([2, 2, 2, 2]);
        b.extend(100..(100 + 193));
        assert_eq!(b.len(), 200);
        let classes = Classification::classify(&b, &JunkPolicy::Popularity);
        assert!(!classes.is_popular(&1));
        assert!(classes.is_popular(&2));
        assert!(!classes.is_junk(&2));
        assert!(classes.positions(&2).is_empty());
        assert_eq!(classes.positions(&1), &[0, 1, 2]);
    }

    #[test]
    fn short_sequences_have_no_popular_values() {
        let b = vec![7u8; 199];
        let classes = Classification::classify(&b, &JunkPolicy::Popularity);
        assert_eq!(classes.popular().count(), 0);
        assert_eq!(classes.positions(&7).len(), 199);
    }

    #[test]
    fn user_junk_is_never_popular() {
        let mut b = vec!['x'; 100];
        b.extend(std::iter::repeat('y').take(100));
        let policy = JunkPolicy::Combined(Box::new(|c: &char| *c == 'x'));
        let classes = Classification::classify(&b, &policy);
        assert!(classes.is_junk(&'x'));
        assert!(!classes.is_popular(&'x'));
        assert!(classes.is_popular(&'y'));
    }

    #[test]
    fn disabled_autojunk_keeps_everything() {
        let b = vec!['z'; 500];
        let classes = Classification::classify(&b, &JunkPolicy::NoJunk);
        assert_eq!(classes.positions(&'z').len(), 500);
        assert_eq!(classes.junk().count() + classes.popular().count(), 0);
    }

    #[test]
    fn builtin_predicates() {
        assert!(is_line_junk("\n"));
        assert!(is_line_junk("  #   \n"));
        assert!(is_line_junk(""));
        assert!(!is_line_junk("hello\n"));
        assert!(!is_line_junk("## \n"));
        assert!(is_character_junk(' '));
        assert!(is_character_junk('\t'));
        assert!(!is_character_junk('\n'));
        assert!(!is_character_junk('x'));
    }
}
