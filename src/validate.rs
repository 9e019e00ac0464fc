use super::algorithm::{Match, Opcode, Tag};

pub fn validate_matching_blocks<T: PartialEq>(blocks: &[Match], a: &[T], b: &[T]) -> Vec<String> {
    let mut errors = vec![];

    let sentinel = Match::new(a.len(), b.len(), 0);
    let Some((last, body)) = blocks.split_last() else {
        errors.push("The block list is empty, but it should at least contain the sentinel".to_string());
        return errors;
    };
    if *last != sentinel {
        errors.push(format!("The last block is {last:?}, but it should be the sentinel {sentinel:?}"));
    }

    // Each block other than the sentinel should be non-empty, in range, and actually match.
    for (index, block) in body.iter().enumerate() {
        if block.size == 0 {
            errors.push(format!("Block {index} is empty but it is not the sentinel"));
        }
        if block.a_end() > a.len() || block.b_end() > b.len() {
            errors.push(format!(
                "Block {index} {block:?} is out of range for lengths {} and {}",
                a.len(),
                b.len()
            ));
            continue;
        }
        if a[block.a..block.a_end()] != b[block.b..block.b_end()] {
            errors.push(format!("Block {index} {block:?} covers unequal elements"));
        }
    }

    // Blocks should be strictly increasing in both sequences, and never contiguous in both.
    for (index, pair) in blocks.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        if prev.a_end() > next.a || prev.b_end() > next.b {
            errors.push(format!("Block {} {next:?} overlaps or precedes block {index} {prev:?}", index + 1));
        } else if next.size > 0 && prev.a_end() == next.a && prev.b_end() == next.b {
            errors.push(format!("Blocks {index} and {} are contiguous and should have been merged", index + 1));
        }
    }

    errors
}

pub fn validate_opcodes(opcodes: &[Opcode], len_a: usize, len_b: usize) -> Vec<String> {
    let mut errors = vec![];

    // Each tag should agree with the sizes of its ranges.
    for (index, op) in opcodes.iter().enumerate() {
        if op.a_start > op.a_end || op.b_start > op.b_end {
            errors.push(format!("Opcode {index} {op:?} has a reversed range"));
            continue;
        }
        let consistent = match op.tag {
            Tag::Equal => op.a_len() == op.b_len() && op.a_len() > 0,
            Tag::Replace => op.a_len() > 0 && op.b_len() > 0,
            Tag::Delete => op.a_len() > 0 && op.b_len() == 0,
            Tag::Insert => op.a_len() == 0 && op.b_len() > 0,
        };
        if !consistent {
            errors.push(format!("Opcode {index} {op:?} has ranges that don't fit its tag"));
        }
    }

    // The opcodes should cover both sequences contiguously from start to end.
    let mut position = (0, 0);
    for (index, op) in opcodes.iter().enumerate() {
        if (op.a_start, op.b_start) != position {
            errors.push(format!(
                "Opcode {index} starts at {:?}, but it should start at {position:?}",
                (op.a_start, op.b_start)
            ));
        }
        position = (op.a_end, op.b_end);
    }
    if position != (len_a, len_b) {
        errors.push(format!(
            "The opcodes end at {position:?}, but the sequences have lengths {:?}",
            (len_a, len_b)
        ));
    }

    errors
}

pub fn print_errors(errors: &[String]) {
    if !errors.is_empty() {
        tracing::error!(count = errors.len(), "diff validation errors");
        for error in errors {
            tracing::error!("  {error}");
        }
    }
}
