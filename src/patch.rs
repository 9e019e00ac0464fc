//! Context and unified diffs, in the format `diff -c` and `diff -u` produce.

use crate::algorithm::{group_opcodes, Opcode, SequenceMatcher, Tag};

/// File names and dates for the two header lines of a patch.
#[derive(Debug, Clone)]
pub struct PatchHeader {
    pub from_file: String,
    pub to_file: String,
    pub from_date: String,
    pub to_date: String,
    /// Appended to every line the renderer makes up (headers and hunk markers).
    pub line_term: String,
}

impl Default for PatchHeader {
    fn default() -> Self {
        PatchHeader {
            from_file: String::new(),
            to_file: String::new(),
            from_date: String::new(),
            to_date: String::new(),
            line_term: "\n".to_string(),
        }
    }
}

impl PatchHeader {
    pub fn new(from_file: impl Into<String>, to_file: impl Into<String>) -> Self {
        PatchHeader {
            from_file: from_file.into(),
            to_file: to_file.into(),
            ..Default::default()
        }
    }

    pub fn with_dates(mut self, from_date: impl Into<String>, to_date: impl Into<String>) -> Self {
        self.from_date = from_date.into();
        self.to_date = to_date.into();
        self
    }

    pub fn with_line_term(mut self, line_term: impl Into<String>) -> Self {
        self.line_term = line_term.into();
        self
    }

    fn file_line(&self, marker: &str, file: &str, date: &str) -> String {
        if date.is_empty() {
            format!("{marker} {file}{}", self.line_term)
        } else {
            format!("{marker} {file}\t{date}{}", self.line_term)
        }
    }
}

fn line_opcodes<S: AsRef<str>>(a: &[S], b: &[S]) -> Vec<Opcode> {
    let a: Vec<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: Vec<&str> = b.iter().map(AsRef::as_ref).collect();
    let matcher = SequenceMatcher::new(&a, &b);
    let opcodes = matcher.opcodes().to_vec();
    opcodes
}

/// `start,length` with 1-based `start`. A single line is just `start`; an
/// empty range names the line before it.
fn format_range_unified(start: usize, stop: usize) -> String {
    let length = stop - start;
    match length {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{length}", start + 1),
    }
}

/// `first,last` with 1-based line numbers; a single number when at most one line.
fn format_range_context(start: usize, stop: usize) -> String {
    let length = stop - start;
    let beginning = if length == 0 { start } else { start + 1 };
    if length <= 1 {
        format!("{beginning}")
    } else {
        format!("{beginning},{}", beginning + length - 1)
    }
}

pub fn unified_diff<S: AsRef<str>>(a: &[S], b: &[S], header: &PatchHeader, context: usize) -> Vec<String> {
    unified_diff_from_opcodes(a, b, &line_opcodes(a, b), header, context)
}

/// Renders hunks with up to `context` unchanged lines around each change.
/// Produces nothing at all when the inputs are equal.
pub fn unified_diff_from_opcodes<S: AsRef<str>>(
    a: &[S],
    b: &[S],
    opcodes: &[Opcode],
    header: &PatchHeader,
    context: usize,
) -> Vec<String> {
    let groups = group_opcodes(opcodes, context);
    let mut out = vec![];
    if groups.is_empty() {
        return out;
    }
    out.push(header.file_line("---", &header.from_file, &header.from_date));
    out.push(header.file_line("+++", &header.to_file, &header.to_date));

    for group in &groups {
        let (first, last) = (group[0], group[group.len() - 1]);
        out.push(format!(
            "@@ -{} +{} @@{}",
            format_range_unified(first.a_start, last.a_end),
            format_range_unified(first.b_start, last.b_end),
            header.line_term
        ));
        for op in group {
            if op.tag == Tag::Equal {
                out.extend(a[op.a_range()].iter().map(|line| format!(" {}", line.as_ref())));
                continue;
            }
            if matches!(op.tag, Tag::Replace | Tag::Delete) {
                out.extend(a[op.a_range()].iter().map(|line| format!("-{}", line.as_ref())));
            }
            if matches!(op.tag, Tag::Replace | Tag::Insert) {
                out.extend(b[op.b_range()].iter().map(|line| format!("+{}", line.as_ref())));
            }
        }
    }
    tracing::debug!(hunks = groups.len(), lines = out.len(), "rendered unified diff");
    out
}

pub fn context_diff<S: AsRef<str>>(a: &[S], b: &[S], header: &PatchHeader, context: usize) -> Vec<String> {
    context_diff_from_opcodes(a, b, &line_opcodes(a, b), header, context)
}

fn context_prefix(tag: Tag) -> &'static str {
    match tag {
        Tag::Insert => "+ ",
        Tag::Delete => "- ",
        Tag::Replace => "! ",
        Tag::Equal => "  ",
    }
}

/// Renders hunks as a before block and an after block. A block with no
/// changes of its own is left out, keeping only its range line.
pub fn context_diff_from_opcodes<S: AsRef<str>>(
    a: &[S],
    b: &[S],
    opcodes: &[Opcode],
    header: &PatchHeader,
    context: usize,
) -> Vec<String> {
    let groups = group_opcodes(opcodes, context);
    let mut out = vec![];
    if groups.is_empty() {
        return out;
    }
    out.push(header.file_line("***", &header.from_file, &header.from_date));
    out.push(header.file_line("---", &header.to_file, &header.to_date));

    for group in &groups {
        let (first, last) = (group[0], group[group.len() - 1]);
        out.push(format!("***************{}", header.line_term));

        out.push(format!(
            "*** {} ****{}",
            format_range_context(first.a_start, last.a_end),
            header.line_term
        ));
        if group.iter().any(|op| matches!(op.tag, Tag::Replace | Tag::Delete)) {
            for op in group.iter().filter(|op| op.tag != Tag::Insert) {
                let prefix = context_prefix(op.tag);
                out.extend(a[op.a_range()].iter().map(|line| format!("{prefix}{}", line.as_ref())));
            }
        }

        out.push(format!(
            "--- {} ----{}",
            format_range_context(first.b_start, last.b_end),
            header.line_term
        ));
        if group.iter().any(|op| matches!(op.tag, Tag::Replace | Tag::Insert)) {
            for op in group.iter().filter(|op| op.tag != Tag::Delete) {
                let prefix = context_prefix(op.tag);
                out.extend(b[op.b_range()].iter().map(|line| format!("{prefix}{}", line.as_ref())));
            }
        }
    }
    tracing::debug!(hunks = groups.len(), lines = out.len(), "rendered context diff");
    out
}
