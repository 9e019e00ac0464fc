//! Sequence comparison: junk classification, matching blocks, opcodes,
//! similarity ratios and the line differ built on top of them.

pub mod close_matches;
pub mod differ;
pub mod junk;
pub mod matcher;
pub mod opcodes;
pub mod similarity;

pub use self::{
    close_matches::{close_matches, get_close_matches, DEFAULT_CUTOFF, DEFAULT_MAX_RESULTS},
    differ::{ndiff, restore, Compare, Differ, Which, DEFAULT_FANCY_CUTOFF},
    junk::{is_character_junk, is_line_junk, Classification, JunkPolicy, JunkPredicate},
    matcher::{Match, SequenceMatcher},
    opcodes::{group_opcodes, opcodes_from_blocks, Opcode, Tag},
    similarity::calculate_ratio,
};
