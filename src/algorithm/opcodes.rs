use std::fmt;
use std::ops::Range;

use super::matcher::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Equal => "equal",
            Tag::Replace => "replace",
            Tag::Delete => "delete",
            Tag::Insert => "insert",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// `a[a_start..a_end]` should be turned into `b[b_start..b_end]` as described by `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode {
    pub tag: Tag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl Opcode {
    pub fn new(tag: Tag, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Opcode {
        Opcode {
            tag,
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }

    pub fn a_range(&self) -> Range<usize> {
        self.a_start..self.a_end
    }

    pub fn b_range(&self) -> Range<usize> {
        self.b_start..self.b_end
    }

    pub fn a_len(&self) -> usize {
        self.a_end - self.a_start
    }

    pub fn b_len(&self) -> usize {
        self.b_end - self.b_start
    }
}

/// Turns matching blocks (sentinel included) into opcodes. Each gap before a
/// block becomes a replace, delete or insert; each non-empty block an equal.
pub fn opcodes_from_blocks(blocks: &[Match]) -> Vec<Opcode> {
    let mut result = vec![];
    let (mut i, mut j) = (0, 0);
    for block in blocks {
        let tag = match (i < block.a, j < block.b) {
            (true, true) => Some(Tag::Replace),
            (true, false) => Some(Tag::Delete),
            (false, true) => Some(Tag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            result.push(Opcode::new(tag, i, block.a, j, block.b));
        }
        (i, j) = (block.a_end(), block.b_end());
        if block.size > 0 {
            result.push(Opcode::new(Tag::Equal, block.a, i, block.b, j));
        }
    }
    result
}

/// Splits opcodes into hunks, keeping at most `context` unchanged elements
/// before and after each change. Runs of more than `2 * context` unchanged
/// elements separate hunks. Input without changes produces no hunks.
pub fn group_opcodes(codes: &[Opcode], context: usize) -> Vec<Vec<Opcode>> {
    let mut codes = codes.to_vec();
    if codes.is_empty() {
        codes.push(Opcode::new(Tag::Equal, 0, 1, 0, 1));
    }
    if let Some(first) = codes.first_mut().filter(|op| op.tag == Tag::Equal) {
        first.a_start = first.a_start.max(first.a_end.saturating_sub(context));
        first.b_start = first.b_start.max(first.b_end.saturating_sub(context));
    }
    if let Some(last) = codes.last_mut().filter(|op| op.tag == Tag::Equal) {
        last.a_end = last.a_end.min(last.a_start + context);
        last.b_end = last.b_end.min(last.b_start + context);
    }

    let mut groups = vec![];
    let mut group = vec![];
    for mut op in codes {
        if op.tag == Tag::Equal && op.a_len() > 2 * context {
            group.push(Opcode::new(
                Tag::Equal,
                op.a_start,
                op.a_end.min(op.a_start + context),
                op.b_start,
                op.b_end.min(op.b_start + context),
            ));
            groups.push(std::mem::take(&mut group));
            op.a_start = op.a_start.max(op.a_end.saturating_sub(context));
            op.b_start = op.b_start.max(op.b_end.saturating_sub(context));
        }
        group.push(op);
    }
    if !(group.is_empty() || (group.len() == 1 && group[0].tag == Tag::Equal)) {
        groups.push(group);
    }
    groups
}
