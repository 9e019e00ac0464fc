use std::cell::OnceCell;
use std::collections::HashMap;
use std::hash::Hash;

use super::junk::{Classification, JunkPolicy};
use super::opcodes::{group_opcodes, opcodes_from_blocks, Opcode};

/// `a[a..a + size]` equals `b[b..b + size]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

impl Match {
    pub fn new(a: usize, b: usize, size: usize) -> Match {
        Match { a, b, size }
    }

    pub fn a_end(&self) -> usize {
        self.a + self.size
    }

    pub fn b_end(&self) -> usize {
        self.b + self.size
    }
}

/// Compares two sequences by recursively finding the longest matching block
/// that contains no junk, then repeating on the pieces to its left and right.
///
/// The classification of `b` and the derived matching blocks are cached and
/// thrown away whenever a sequence is replaced. When comparing one sequence
/// against many, keep the fixed one as `b` and vary `a` with [`set_seq1`].
///
/// A matcher can be moved to another thread once built (it is `Send` when
/// `T` is `Sync`), but the lazy caches make it `!Sync`.
///
/// [`set_seq1`]: SequenceMatcher::set_seq1
pub struct SequenceMatcher<'a, T> {
    pub(super) a: &'a [T],
    pub(super) b: &'a [T],
    policy: JunkPolicy<'a, T>,
    classification: Classification<'a, T>,
    pub(super) full_b_count: OnceCell<HashMap<&'a T, usize>>,
    matching_blocks: OnceCell<Vec<Match>>,
    opcodes: OnceCell<Vec<Opcode>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// A matcher with no junk predicate and the popularity heuristic enabled.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::with_policy(JunkPolicy::default(), a, b)
    }

    pub fn with_policy(policy: JunkPolicy<'a, T>, a: &'a [T], b: &'a [T]) -> Self {
        let classification = Classification::classify(b, &policy);
        SequenceMatcher {
            a,
            b,
            policy,
            classification,
            full_b_count: OnceCell::new(),
            matching_blocks: OnceCell::new(),
            opcodes: OnceCell::new(),
        }
    }

    pub fn a(&self) -> &'a [T] {
        self.a
    }

    pub fn b(&self) -> &'a [T] {
        self.b
    }

    pub fn policy(&self) -> &JunkPolicy<'a, T> {
        &self.policy
    }

    pub fn classification(&self) -> &Classification<'a, T> {
        &self.classification
    }

    pub fn set_seqs(&mut self, a: &'a [T], b: &'a [T]) {
        self.set_seq1(a);
        self.set_seq2(b);
    }

    pub fn set_seq1(&mut self, a: &'a [T]) {
        if std::ptr::eq(a, self.a) {
            return;
        }
        self.a = a;
        self.matching_blocks.take();
        self.opcodes.take();
    }

    pub fn set_seq2(&mut self, b: &'a [T]) {
        if std::ptr::eq(b, self.b) {
            return;
        }
        self.b = b;
        self.matching_blocks.take();
        self.opcodes.take();
        self.full_b_count.take();
        self.classification = Classification::classify(b, &self.policy);
    }

    /// Finds the longest matching block in `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
    ///
    /// Among blocks of maximal size, the one starting earliest in `a` wins,
    /// and among those the one starting earliest in `b`. The block is first
    /// searched without junk, then grown through equal non-junk (popular)
    /// elements, then through equal junk elements on both ends. If nothing
    /// matches, the result has size 0 and starts at `(a_lo, b_lo)`.
    pub fn find_longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> Match {
        let (a, b) = (self.a, self.b);
        let classes = &self.classification;
        assert!(a_hi <= a.len() && b_hi <= b.len(), "match bounds out of range");

        let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);
        // j2len[j] = length of the longest match ending with a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        let mut new_j2len: HashMap<usize, usize> = HashMap::new();
        for i in a_lo..a_hi {
            for &j in classes.positions(&a[i]) {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let k = j.checked_sub(1).and_then(|prev| j2len.get(&prev)).copied().unwrap_or(0) + 1;
                new_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
            std::mem::swap(&mut j2len, &mut new_j2len);
            new_j2len.clear();
        }

        // Popular elements never enter the index, so grow through them here.
        while best_i > a_lo && best_j > b_lo && !classes.is_junk(&b[best_j - 1]) && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < a_hi
            && best_j + best_size < b_hi
            && !classes.is_junk(&b[best_j + best_size])
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        // Absorb equal junk on both sides, e.g. shared blank lines next to the match.
        while best_i > a_lo && best_j > b_lo && classes.is_junk(&b[best_j - 1]) && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < a_hi
            && best_j + best_size < b_hi
            && classes.is_junk(&b[best_j + best_size])
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        Match::new(best_i, best_j, best_size)
    }

    /// Longest match over the full extent of both sequences.
    pub fn longest_match(&self) -> Match {
        self.find_longest_match(0, self.a.len(), 0, self.b.len())
    }

    /// Non-overlapping matching blocks, increasing in both `a` and `b`, with
    /// adjacent blocks merged and the sentinel `(len(a), len(b), 0)` last.
    pub fn matching_blocks(&self) -> &[Match] {
        self.matching_blocks.get_or_init(|| self.compute_matching_blocks())
    }

    fn compute_matching_blocks(&self) -> Vec<Match> {
        let (len_a, len_b) = (self.a.len(), self.b.len());

        let mut pending = vec![(0, len_a, 0, len_b)];
        let mut blocks = vec![];
        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let found = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if found.size == 0 {
                continue;
            }
            blocks.push(found);
            if a_lo < found.a && b_lo < found.b {
                pending.push((a_lo, found.a, b_lo, found.b));
            }
            if found.a_end() < a_hi && found.b_end() < b_hi {
                pending.push((found.a_end(), a_hi, found.b_end(), b_hi));
            }
        }
        blocks.sort_unstable();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a_end() == block.a && last.b_end() == block.b => last.size += block.size,
                _ => merged.push(block),
            }
        }
        tracing::trace!(len_a, len_b, blocks = merged.len(), "computed matching blocks");
        merged.push(Match::new(len_a, len_b, 0));
        merged
    }

    /// Edit operations turning `a` into `b`, covering both sequences contiguously.
    pub fn opcodes(&self) -> &[Opcode] {
        self.opcodes.get_or_init(|| opcodes_from_blocks(self.matching_blocks()))
    }

    /// Opcodes split into hunks with at most `context` unchanged elements around each change.
    pub fn grouped_opcodes(&self, context: usize) -> Vec<Vec<Opcode>> {
        group_opcodes(self.opcodes(), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn space_is_junk<'a>() -> JunkPolicy<'a, char> {
        JunkPolicy::Combined(Box::new(|c: &char| *c == ' '))
    }

    #[test]
    fn longest_match_prefers_earliest_in_a() {
        let (a, b) = (chars(" abcd"), chars("abcd abcd"));
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(matcher.find_longest_match(0, 5, 0, 9), Match::new(0, 4, 5));
    }

    #[test]
    fn junk_cannot_start_a_match() {
        let (a, b) = (chars(" abcd"), chars("abcd abcd"));
        let matcher = SequenceMatcher::with_policy(space_is_junk(), &a, &b);
        assert_eq!(matcher.find_longest_match(0, 5, 0, 9), Match::new(1, 0, 4));
    }

    #[test]
    fn junk_is_absorbed_at_the_edges() {
        let (a, b) = (chars(" abcd"), chars(" abcd"));
        let matcher = SequenceMatcher::with_policy(space_is_junk(), &a, &b);
        assert_eq!(matcher.longest_match(), Match::new(0, 0, 5));

        let (a, b) = (chars(" "), chars(" "));
        let matcher = SequenceMatcher::with_policy(space_is_junk(), &a, &b);
        assert_eq!(matcher.longest_match(), Match::new(0, 0, 1));
    }

    #[test]
    fn empty_ranges_give_empty_match_at_low_bounds() {
        let (a, b) = (chars("abcabc"), chars("abc"));
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(matcher.find_longest_match(2, 2, 1, 3), Match::new(2, 1, 0));
        assert_eq!(matcher.find_longest_match(1, 6, 0, 3), Match::new(3, 0, 3));
    }

    #[test]
    fn matching_blocks_end_with_sentinel() {
        let (a, b) = (chars("abxcd"), chars("abcd"));
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(
            matcher.matching_blocks(),
            &[Match::new(0, 0, 2), Match::new(3, 2, 2), Match::new(5, 4, 0)]
        );
    }

    #[test]
    fn adjacent_blocks_are_merged() {
        // With blanks as junk, "a " and "b" are found separately.
        let (a, b) = (chars("a b"), chars("a b"));
        let matcher = SequenceMatcher::with_policy(space_is_junk(), &a, &b);
        assert_eq!(matcher.longest_match(), Match::new(0, 0, 2));
        assert_eq!(matcher.matching_blocks(), &[Match::new(0, 0, 3), Match::new(3, 3, 0)]);
    }

    #[test]
    fn blocks_with_junk_predicate() {
        let a = chars("private Thread currentThread;");
        let b = chars("private volatile Thread currentThread;");
        let matcher = SequenceMatcher::with_policy(space_is_junk(), &a, &b);
        assert_eq!(
            matcher.matching_blocks(),
            &[Match::new(0, 0, 8), Match::new(8, 17, 21), Match::new(29, 38, 0)]
        );
    }

    #[test]
    fn empty_sequences() {
        let empty: Vec<char> = vec![];
        let abc = chars("abc");
        let matcher = SequenceMatcher::new(&empty, &empty);
        assert_eq!(matcher.matching_blocks(), &[Match::new(0, 0, 0)]);
        let matcher = SequenceMatcher::new(&abc, &empty);
        assert_eq!(matcher.matching_blocks(), &[Match::new(3, 0, 0)]);
        let xyz = chars("xyz");
        let matcher = SequenceMatcher::new(&abc, &xyz);
        assert_eq!(matcher.matching_blocks(), &[Match::new(3, 3, 0)]);
    }

    #[test]
    fn popular_elements_change_the_alignment() {
        let mut a = vec!['b'];
        a.extend(std::iter::repeat('a').take(199));
        a.push('c');
        let mut b: Vec<char> = std::iter::repeat('a').take(199).collect();
        b.extend(['b', 'c']);

        let matcher = SequenceMatcher::new(&a, &b);
        assert!(matcher.classification().is_popular(&'a'));
        assert_eq!(
            matcher.matching_blocks(),
            &[Match::new(0, 199, 1), Match::new(200, 200, 1), Match::new(201, 201, 0)]
        );

        let matcher = SequenceMatcher::with_policy(JunkPolicy::NoJunk, &a, &b);
        assert_eq!(
            matcher.matching_blocks(),
            &[Match::new(1, 0, 199), Match::new(200, 200, 1), Match::new(201, 201, 0)]
        );
    }

    #[test]
    fn matcher_moves_to_another_thread() {
        let (a, b) = (chars("private Thread currentThread;"), chars("private volatile Thread currentThread;"));
        let matcher = SequenceMatcher::with_policy(space_is_junk(), &a, &b);
        let blocks = std::thread::scope(|scope| scope.spawn(move || matcher.matching_blocks().to_vec()).join().unwrap());
        assert_eq!(blocks, vec![Match::new(0, 0, 8), Match::new(8, 17, 21), Match::new(29, 38, 0)]);
    }

    #[test]
    fn replacing_a_sequence_invalidates_the_cache() {
        let (a, b, c) = (chars("abxcd"), chars("abcd"), chars("abcd"));
        let mut matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(matcher.matching_blocks().len(), 3);
        matcher.set_seq1(&c);
        assert_eq!(matcher.matching_blocks(), &[Match::new(0, 0, 4), Match::new(4, 4, 0)]);
        matcher.set_seq2(&a);
        assert_eq!(matcher.matching_blocks(), &[Match::new(0, 0, 2), Match::new(2, 3, 2), Match::new(4, 5, 0)]);
    }
}
