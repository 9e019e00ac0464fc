use std::collections::HashSet;
use std::ops::Range;

use string_interner::{DefaultSymbol, StringInterner};

use super::junk::{is_character_junk, JunkPolicy, JunkPredicate};
use super::matcher::SequenceMatcher;
use super::opcodes::{Opcode, Tag};
use crate::error::{Error, Result};

/// Line pairs of a replace block at least this similar get intraline markers.
pub const DEFAULT_FANCY_CUTOFF: f64 = 0.75;

pub type LineJunk<'j> = Box<dyn Fn(&str) -> bool + 'j>;
pub type CharJunk<'j> = Box<dyn Fn(char) -> bool + Send + Sync + 'j>;

/// Produces human-readable deltas between two sequences of lines.
///
/// Every output line starts with a two-letter code:
///
/// | code  | meaning                                   |
/// |-------|-------------------------------------------|
/// | `- `  | line unique to the first sequence         |
/// | `+ `  | line unique to the second sequence        |
/// | `  `  | line common to both sequences             |
/// | `? `  | intraline markers, not in either sequence |
///
/// Lines keep their own terminators; marker lines always end with `\n`.
pub struct Differ<'j> {
    line_junk: Option<LineJunk<'j>>,
    char_junk: Option<CharJunk<'j>>,
    cutoff: f64,
}

impl Default for Differ<'_> {
    fn default() -> Self {
        Differ {
            line_junk: None,
            char_junk: None,
            cutoff: DEFAULT_FANCY_CUTOFF,
        }
    }
}

impl<'j> Differ<'j> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for which `f` holds can't start a line-level match.
    pub fn with_line_junk(mut self, f: impl Fn(&str) -> bool + 'j) -> Self {
        self.line_junk = Some(Box::new(f));
        self
    }

    /// Characters for which `f` holds can't start an intraline match.
    pub fn with_char_junk(mut self, f: impl Fn(char) -> bool + Send + Sync + 'j) -> Self {
        self.char_junk = Some(Box::new(f));
        self
    }

    /// Fails with [`Error::InvalidArgument`] unless `cutoff` lies in `[0, 1]`.
    pub fn with_cutoff(mut self, cutoff: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(Error::InvalidArgument(format!("cutoff must be in [0.0, 1.0]: {cutoff}")));
        }
        self.cutoff = cutoff;
        Ok(self)
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Lazily yields the delta turning `a` into `b`. Call again to start over.
    pub fn compare<'s, S: AsRef<str>>(&'s self, a: &'s [S], b: &'s [S]) -> Compare<'s, S> {
        let char_junk = self.char_junk.as_ref().map(|f| f.as_ref() as &(dyn Fn(char) -> bool + Sync));
        let line_junk = self.line_junk.as_ref().map(|f| f.as_ref() as &dyn Fn(&str) -> bool);
        Compare::new(a, b, line_junk, char_junk, self.cutoff)
    }
}

/// The delta between `a` and `b` with no line junk and blanks and tabs as
/// character junk.
pub fn ndiff<'s, S: AsRef<str>>(a: &'s [S], b: &'s [S]) -> Compare<'s, S> {
    Compare::new(a, b, None, Some(&is_character_junk as &(dyn Fn(char) -> bool + Sync)), DEFAULT_FANCY_CUTOFF)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Which {
    Old,
    New,
}

/// Recovers one of the two sequences a delta was produced from.
pub fn restore<I>(delta: I, which: Which) -> impl Iterator<Item = String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let tag = match which {
        Which::Old => "- ",
        Which::New => "+ ",
    };
    delta.into_iter().filter_map(move |line| {
        let line = line.as_ref();
        line.strip_prefix("  ")
            .or_else(|| line.strip_prefix(tag))
            .map(str::to_string)
    })
}

enum Step {
    Block(Range<usize>, Range<usize>),
    Pair { i: usize, j: usize, identical: bool },
}

/// Iterator over the lines of a delta, rendered one line-level opcode at a time.
pub struct Compare<'s, S> {
    a: &'s [S],
    b: &'s [S],
    char_junk: Option<&'s (dyn Fn(char) -> bool + Sync)>,
    cutoff: f64,
    opcodes: std::vec::IntoIter<Opcode>,
    pending: std::vec::IntoIter<String>,
}

impl<'s, S: AsRef<str>> Compare<'s, S> {
    fn new(
        a: &'s [S],
        b: &'s [S],
        line_junk: Option<&dyn Fn(&str) -> bool>,
        char_junk: Option<&'s (dyn Fn(char) -> bool + Sync)>,
        cutoff: f64,
    ) -> Self {
        let mut interner = StringInterner::default();
        let a_symbols: Vec<DefaultSymbol> = a.iter().map(|line| interner.get_or_intern(line.as_ref())).collect();
        let b_symbols: Vec<DefaultSymbol> = b.iter().map(|line| interner.get_or_intern(line.as_ref())).collect();

        let predicate: Option<JunkPredicate<DefaultSymbol>> = line_junk.map(|is_junk| {
            let junk: HashSet<DefaultSymbol> = b
                .iter()
                .zip(&b_symbols)
                .filter(|(line, _)| is_junk(line.as_ref()))
                .map(|(_, symbol)| *symbol)
                .collect();
            Box::new(move |symbol: &DefaultSymbol| junk.contains(symbol)) as JunkPredicate<DefaultSymbol>
        });
        let matcher = SequenceMatcher::with_policy(JunkPolicy::from_parts(predicate, true), &a_symbols, &b_symbols);
        let opcodes = matcher.opcodes().to_vec();
        tracing::debug!(
            a_lines = a.len(),
            b_lines = b.len(),
            opcodes = opcodes.len(),
            "compared lines"
        );

        Compare {
            a,
            b,
            char_junk,
            cutoff,
            opcodes: opcodes.into_iter(),
            pending: Vec::new().into_iter(),
        }
    }

    fn render(&self, op: Opcode) -> Vec<String> {
        let mut out = vec![];
        match op.tag {
            Tag::Equal => dump(&mut out, ' ', &self.a[op.a_range()]),
            Tag::Delete => dump(&mut out, '-', &self.a[op.a_range()]),
            Tag::Insert => dump(&mut out, '+', &self.b[op.b_range()]),
            Tag::Replace => self.fancy_replace(&mut out, op),
        }
        out
    }

    fn char_policy(&self) -> JunkPolicy<'s, char> {
        let predicate = self
            .char_junk
            .map(|f| Box::new(move |c: &char| f(*c)) as JunkPredicate<'s, char>);
        JunkPolicy::from_parts(predicate, true)
    }

    /// Renders a replace block. The most similar pair of lines (if similar
    /// enough) gets intraline markers and splits the block in two; the halves
    /// are handled the same way. Blocks without such a pair fall back to
    /// [`plain_replace`].
    fn fancy_replace(&self, out: &mut Vec<String>, op: Opcode) {
        let (a, b) = (self.a, self.b);
        let a_chars: Vec<Vec<char>> = a[op.a_range()].iter().map(|line| line.as_ref().chars().collect()).collect();
        let b_chars: Vec<Vec<char>> = b[op.b_range()].iter().map(|line| line.as_ref().chars().collect()).collect();
        let a_chars = |i: usize| a_chars[i - op.a_start].as_slice();
        let b_chars = |j: usize| b_chars[j - op.b_start].as_slice();

        let mut cruncher = SequenceMatcher::with_policy(self.char_policy(), &[], &[]);
        let mut pending = vec![Step::Block(op.a_range(), op.b_range())];
        while let Some(step) = pending.pop() {
            let (a_range, b_range) = match step {
                Step::Pair { i, identical: true, .. } => {
                    out.push(format!("  {}", a[i].as_ref()));
                    continue;
                }
                Step::Pair { i, j, identical: false } => {
                    cruncher.set_seqs(a_chars(i), b_chars(j));
                    let (mut a_tags, mut b_tags) = (String::new(), String::new());
                    for code in cruncher.opcodes() {
                        let (a_mark, b_mark) = match code.tag {
                            Tag::Replace => ('^', '^'),
                            Tag::Delete => ('-', ' '),
                            Tag::Insert => (' ', '+'),
                            Tag::Equal => (' ', ' '),
                        };
                        a_tags.extend(std::iter::repeat(a_mark).take(code.a_len()));
                        b_tags.extend(std::iter::repeat(b_mark).take(code.b_len()));
                    }
                    qformat(out, a[i].as_ref(), b[j].as_ref(), &a_tags, &b_tags);
                    continue;
                }
                Step::Block(a_range, b_range) => (a_range, b_range),
            };

            if a_range.is_empty() {
                dump(out, '+', &b[b_range]);
                continue;
            }
            if b_range.is_empty() {
                dump(out, '-', &a[a_range]);
                continue;
            }

            // Lines are compared character by character; the fixed line goes second.
            let mut best_ratio = self.cutoff - 0.01;
            let mut best = None;
            let mut first_identical = None;
            for j in b_range.clone() {
                cruncher.set_seq2(b_chars(j));
                for i in a_range.clone() {
                    if a[i].as_ref() == b[j].as_ref() {
                        first_identical.get_or_insert((i, j));
                        continue;
                    }
                    cruncher.set_seq1(a_chars(i));
                    if cruncher.real_quick_ratio() > best_ratio && cruncher.quick_ratio() > best_ratio {
                        let ratio = cruncher.ratio();
                        if ratio > best_ratio {
                            best_ratio = ratio;
                            best = Some((i, j));
                        }
                    }
                }
            }

            let (i, j, identical) = match (best.filter(|_| best_ratio >= self.cutoff), first_identical) {
                (Some((i, j)), _) => (i, j, false),
                (None, Some((i, j))) => (i, j, true),
                (None, None) => {
                    plain_replace(out, &a[a_range], &b[b_range]);
                    continue;
                }
            };
            tracing::trace!(i, j, identical, ratio = best_ratio, "synchronising replace block");
            pending.push(Step::Block(i + 1..a_range.end, j + 1..b_range.end));
            pending.push(Step::Pair { i, j, identical });
            pending.push(Step::Block(a_range.start..i, b_range.start..j));
        }
    }
}

impl<S: AsRef<str>> Iterator for Compare<'_, S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.pending.next() {
                return Some(line);
            }
            let op = self.opcodes.next()?;
            self.pending = self.render(op).into_iter();
        }
    }
}

fn dump<S: AsRef<str>>(out: &mut Vec<String>, tag: char, lines: &[S]) {
    out.extend(lines.iter().map(|line| format!("{tag} {}", line.as_ref())));
}

/// Both sides as whole blocks, the shorter one first.
fn plain_replace<S: AsRef<str>>(out: &mut Vec<String>, a: &[S], b: &[S]) {
    if b.len() < a.len() {
        dump(out, '+', b);
        dump(out, '-', a);
    } else {
        dump(out, '-', a);
        dump(out, '+', b);
    }
}

/// Where a marker is blank and the marked character is whitespace, the
/// character itself is used so that tabs line up.
fn keep_original_ws(line: &str, tags: &str) -> String {
    line.chars()
        .zip(tags.chars())
        .map(|(c, tag)| if tag == ' ' && c.is_whitespace() { c } else { tag })
        .collect()
}

fn qformat(out: &mut Vec<String>, a_line: &str, b_line: &str, a_tags: &str, b_tags: &str) {
    let a_tags = keep_original_ws(a_line, a_tags);
    let b_tags = keep_original_ws(b_line, b_tags);
    out.push(format!("- {a_line}"));
    if !a_tags.trim_end().is_empty() {
        out.push(format!("? {}\n", a_tags.trim_end()));
    }
    out.push(format!("+ {b_line}"));
    if !b_tags.trim_end().is_empty() {
        out.push(format!("? {}\n", b_tags.trim_end()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::is_line_junk;

    fn compare(differ: &Differ, a: &[&str], b: &[&str]) -> Vec<String> {
        differ.compare(a, b).collect()
    }

    const ZEN_OLD: [&str; 4] = [
        "  1. Beautiful is better than ugly.\n",
        "  2. Explicit is better than implicit.\n",
        "  3. Simple is better than complex.\n",
        "  4. Complex is better than complicated.\n",
    ];
    const ZEN_NEW: [&str; 4] = [
        "  1. Beautiful is better than ugly.\n",
        "  3.   Simple is better than complex.\n",
        "  4. Complicated is better than complex.\n",
        "  5. Flat is better than nested.\n",
    ];

    #[test]
    fn near_matches_get_markers() {
        let result = compare(&Differ::new(), &ZEN_OLD, &ZEN_NEW);
        assert_eq!(
            result,
            vec![
                "    1. Beautiful is better than ugly.\n",
                "-   2. Explicit is better than implicit.\n",
                "-   3. Simple is better than complex.\n",
                "+   3.   Simple is better than complex.\n",
                "?     ++\n",
                "-   4. Complex is better than complicated.\n",
                "?            ^                     ---- ^\n",
                "+   4. Complicated is better than complex.\n",
                "?           ++++ ^                      ^\n",
                "+   5. Flat is better than nested.\n",
            ]
        );
    }

    #[test]
    fn char_junk_changes_alignment() {
        let result: Vec<String> = ndiff(&ZEN_OLD, &ZEN_NEW).collect();
        assert_eq!(result.len(), 8);
        assert_eq!(result[4], "?     ++\n");
        assert_eq!(result[5], "-   4. Complex is better than complicated.\n");
        assert_eq!(result[6], "+   4. Complicated is better than complex.\n");
        assert_eq!(result[7], "+   5. Flat is better than nested.\n");
    }

    #[test]
    fn ndiff_of_short_words() {
        let result: Vec<String> = ndiff(&["one\n", "two\n", "three\n"], &["ore\n", "tree\n", "emu\n"]).collect();
        assert_eq!(
            result,
            vec!["- one\n", "?  ^\n", "+ ore\n", "?  ^\n", "- two\n", "- three\n", "?  -\n", "+ tree\n", "+ emu\n"]
        );
    }

    #[test]
    fn markers_keep_tabs() {
        let result = compare(&Differ::new(), &["\tabcDefghiJkl\n"], &["\tabcdefGhijkl\n"]);
        assert_eq!(
            result,
            vec!["- \tabcDefghiJkl\n", "? \t   ^  ^  ^\n", "+ \tabcdefGhijkl\n", "? \t   ^  ^  ^\n"]
        );
    }

    #[test]
    fn dissimilar_lines_use_plain_replace() {
        let result = compare(&Differ::new(), &["abc\n", "same\n"], &["xyz\n", "same\n"]);
        assert_eq!(result, vec!["- abc\n", "+ xyz\n", "  same\n"]);
    }

    #[test]
    fn plain_replace_dumps_shorter_block_first() {
        let result = compare(&Differ::new(), &["a\n", "b\n", "c\n"], &["x\n", "y\n"]);
        assert_eq!(result, vec!["+ x\n", "+ y\n", "- a\n", "- b\n", "- c\n"]);
        let result = compare(&Differ::new(), &["x\n", "y\n"], &["a\n", "b\n", "c\n"]);
        assert_eq!(result, vec!["- x\n", "- y\n", "+ a\n", "+ b\n", "+ c\n"]);
    }

    #[test]
    fn replace_block_is_split_at_close_pair() {
        let result = compare(&Differ::new(), &["abc\n", "abc\n", "zzz\n"], &["abc\n", "qqq\n", "abd\n"]);
        assert_eq!(
            result,
            vec!["  abc\n", "+ qqq\n", "- abc\n", "?   ^\n", "+ abd\n", "?   ^\n", "- zzz\n"]
        );
    }

    #[test]
    fn replace_block_is_split_at_identical_pair() {
        let result = compare(&Differ::new(), &["abcdefgh\n", "xyz\n"], &["xyz\n", "abcdefgh\n"]);
        assert_eq!(result, vec!["+ xyz\n", "  abcdefgh\n", "- xyz\n"]);
    }

    #[test]
    fn missing_line_terminator() {
        let result = compare(&Differ::new(), &["abcdefgh"], &["abcdefgX"]);
        assert_eq!(result, vec!["- abcdefgh", "?        ^\n", "+ abcdefgX", "?        ^\n"]);
    }

    #[test]
    fn line_junk() {
        let differ = Differ::new().with_line_junk(is_line_junk);
        let result = compare(&differ, &["x\n", "\n", "y\n"], &["x\n", "\n", "z\n"]);
        assert_eq!(result, vec!["  x\n", "  \n", "- y\n", "+ z\n"]);
    }

    #[test]
    fn char_junk() {
        let differ = Differ::new().with_char_junk(is_character_junk);
        let result = compare(&differ, &["a b c\n"], &["a b d\n"]);
        assert_eq!(result, vec!["- a b c\n", "?     ^\n", "+ a b d\n", "?     ^\n"]);
    }

    #[test]
    fn strict_cutoff_disables_markers() {
        let differ = Differ::new().with_cutoff(1.0).unwrap();
        let result = compare(&differ, &["abcdefgh\n"], &["abcdefgX\n"]);
        assert_eq!(result, vec!["- abcdefgh\n", "+ abcdefgX\n"]);
    }

    #[test]
    fn cutoff_out_of_range() {
        for cutoff in [-0.5, 1.01, f64::NAN] {
            assert!(matches!(Differ::new().with_cutoff(cutoff), Err(Error::InvalidArgument(_))));
        }
        assert_eq!(Differ::new().with_cutoff(0.0).unwrap().cutoff(), 0.0);
    }

    #[test]
    fn compare_can_be_restarted() {
        let differ = Differ::new();
        let first: Vec<String> = differ.compare(&ZEN_OLD, &ZEN_NEW).collect();
        let second: Vec<String> = differ.compare(&ZEN_OLD, &ZEN_NEW).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn restore_both_sides() {
        let delta: Vec<String> = ndiff(&ZEN_OLD, &ZEN_NEW).collect();
        assert_eq!(restore(&delta, Which::Old).collect::<Vec<_>>(), ZEN_OLD);
        assert_eq!(restore(&delta, Which::New).collect::<Vec<_>>(), ZEN_NEW);
    }

    #[test]
    fn empty_inputs() {
        let empty: [&str; 0] = [];
        assert_eq!(compare(&Differ::new(), &empty, &empty), Vec::<String>::new());
        assert_eq!(compare(&Differ::new(), &empty, &["a\n"]), vec!["+ a\n"]);
    }
}
