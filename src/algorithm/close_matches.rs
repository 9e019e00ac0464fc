use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;

use float_ord::FloatOrd;

use super::matcher::SequenceMatcher;
use crate::error::{Error, Result};

pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const DEFAULT_CUTOFF: f64 = 0.6;

fn check_arguments(n: usize, cutoff: f64) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidArgument(format!("n must be > 0: {n}")));
    }
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(Error::InvalidArgument(format!("cutoff must be in [0.0, 1.0]: {cutoff}")));
    }
    Ok(())
}

/// Indices of the best `n` candidates scoring at least `cutoff` against `word`,
/// best first. Equal scores keep their input order.
fn rank_candidates<'a, T, I>(word: &'a [T], candidates: I, n: usize, cutoff: f64) -> Result<Vec<usize>>
where
    T: Eq + Hash,
    I: IntoIterator<Item = &'a [T]>,
{
    check_arguments(n, cutoff)?;

    // `word` stays as the second sequence so its classification is built once.
    let mut matcher = SequenceMatcher::new(&word[..0], word);
    let mut best: BinaryHeap<Reverse<(FloatOrd<f64>, Reverse<usize>)>> = BinaryHeap::with_capacity(n + 1);
    for (index, candidate) in candidates.into_iter().enumerate() {
        matcher.set_seq1(candidate);
        if matcher.real_quick_ratio() < cutoff || matcher.quick_ratio() < cutoff {
            continue;
        }
        let ratio = matcher.ratio();
        if ratio < cutoff {
            continue;
        }
        best.push(Reverse((FloatOrd(ratio), Reverse(index))));
        if best.len() > n {
            best.pop();
        }
    }

    let mut ranked: Vec<_> = best.into_iter().map(|Reverse(entry)| entry).collect();
    ranked.sort_unstable_by(|x, y| y.cmp(x));
    tracing::debug!(matches = ranked.len(), n, cutoff, "ranked close matches");
    Ok(ranked.into_iter().map(|(_, Reverse(index))| index).collect())
}

/// The best "good enough" matches for `word` among `possibilities`.
///
/// At most `n` candidates with a similarity ratio of at least `cutoff` are
/// returned, most similar first. Fails with [`Error::InvalidArgument`] when
/// `n` is zero or `cutoff` lies outside `[0, 1]`.
pub fn close_matches<'p, T, P>(word: &[T], possibilities: &'p [P], n: usize, cutoff: f64) -> Result<Vec<&'p P>>
where
    T: Eq + Hash,
    P: AsRef<[T]>,
{
    let ranked = rank_candidates(word, possibilities.iter().map(|p| p.as_ref()), n, cutoff)?;
    Ok(ranked.into_iter().map(|index| &possibilities[index]).collect())
}

/// [`close_matches`] for strings, compared character by character.
pub fn get_close_matches<'p, S: AsRef<str>>(
    word: &str,
    possibilities: &'p [S],
    n: usize,
    cutoff: f64,
) -> Result<Vec<&'p str>> {
    let word: Vec<char> = word.chars().collect();
    let candidates: Vec<Vec<char>> = possibilities.iter().map(|p| p.as_ref().chars().collect()).collect();
    let ranked = rank_candidates(&word, candidates.iter().map(Vec::as_slice), n, cutoff)?;
    Ok(ranked.into_iter().map(|index| possibilities[index].as_ref()).collect())
}
