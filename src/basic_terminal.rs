use super::algorithm::{group_opcodes, Opcode, Tag};
use std::io;
use unicode_width::UnicodeWidthChar;

/// Column layout of the side-by-side view.
#[derive(Debug, Clone, Copy)]
pub struct SideBySideLayout {
    /// Display width of each of the two text columns.
    pub width: usize,
    pub tab_size: usize,
    /// Show only hunks with this many unchanged lines around each change.
    pub context: Option<usize>,
}

impl Default for SideBySideLayout {
    fn default() -> Self {
        SideBySideLayout {
            width: 60,
            tab_size: 8,
            context: None,
        }
    }
}

fn gutter_mark(tag: Tag, has_left: bool, has_right: bool) -> char {
    match (tag, has_left, has_right) {
        (Tag::Equal, _, _) => ' ',
        (_, true, true) => '|',
        (_, true, false) => '<',
        (_, false, _) => '>',
    }
}

/// Expands tabs, drops the line terminator and fits `line` into exactly
/// `width` columns, truncating or padding with spaces.
fn fit_to_width(line: &str, width: usize, tab_size: usize) -> String {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut result = String::with_capacity(width);
    let mut used = 0;
    for c in line.chars() {
        if c == '\t' {
            let stop = if tab_size == 0 { used } else { (used / tab_size + 1) * tab_size };
            let stop = stop.min(width);
            result.extend(std::iter::repeat(' ').take(stop - used));
            used = stop;
            continue;
        }
        let char_width = c.width().unwrap_or(0);
        if used + char_width > width {
            break;
        }
        result.push(c);
        used += char_width;
    }
    result.extend(std::iter::repeat(' ').take(width - used));
    result
}

fn print_opcode<S: AsRef<str>>(a: &[S], b: &[S], op: &Opcode, layout: &SideBySideLayout, out: &mut Vec<String>) {
    let empty = " ".repeat(layout.width);
    for k in 0..op.a_len().max(op.b_len()) {
        let left = (k < op.a_len()).then(|| a[op.a_start + k].as_ref());
        let right = (k < op.b_len()).then(|| b[op.b_start + k].as_ref());
        let mark = gutter_mark(op.tag, left.is_some(), right.is_some());
        let left = left.map_or_else(|| empty.clone(), |line| fit_to_width(line, layout.width, layout.tab_size));
        let right = right.map_or_else(String::new, |line| fit_to_width(line, layout.width, layout.tab_size));
        out.push(format!("{left} {mark} {right}").trim_end().to_string() + "\n");
    }
}

/// Renders the two sequences as two columns with a change mark between them:
/// ` ` for equal lines, `|` for changed, `<` for deleted and `>` for inserted.
pub fn side_by_side<S: AsRef<str>>(a: &[S], b: &[S], opcodes: &[Opcode], layout: &SideBySideLayout) -> Vec<String> {
    let mut out = vec![];
    match layout.context {
        None => {
            for op in opcodes {
                print_opcode(a, b, op, layout, &mut out);
            }
        }
        Some(context) => {
            for (index, group) in group_opcodes(opcodes, context).iter().enumerate() {
                if index > 0 {
                    out.push("---\n".to_string());
                }
                for op in group {
                    print_opcode(a, b, op, layout, &mut out);
                }
            }
        }
    }
    out
}

pub fn write_lines<I>(lines: I, output: &mut impl io::Write) -> io::Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for line in lines {
        output.write_all(line.as_ref().as_bytes())?;
    }
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::SequenceMatcher;

    fn render(a: &[&str], b: &[&str], layout: &SideBySideLayout) -> Vec<String> {
        let matcher = SequenceMatcher::new(a, b);
        side_by_side(a, b, matcher.opcodes(), layout)
    }

    #[test]
    fn marks_each_kind_of_change() {
        let layout = SideBySideLayout {
            width: 6,
            ..Default::default()
        };
        let a = ["same\n", "old\n", "gone\n", "tail\n"];
        let b = ["same\n", "new\n", "tail\n", "added\n"];
        assert_eq!(
            render(&a, &b, &layout),
            vec![
                "same     same\n",
                "old    | new\n",
                "gone   <\n",
                "tail     tail\n",
                "       > added\n",
            ]
        );
    }

    #[test]
    fn uneven_replace_block() {
        let layout = SideBySideLayout {
            width: 3,
            ..Default::default()
        };
        let result = render(&["a\n"], &["x\n", "y\n"], &layout);
        assert_eq!(result, vec!["a   | x\n", "    > y\n"]);
    }

    #[test]
    fn tabs_and_wide_characters() {
        assert_eq!(fit_to_width("\tx\n", 6, 4), "    x ");
        assert_eq!(fit_to_width("ab\tc", 6, 4), "ab  c ");
        assert_eq!(fit_to_width("日本語", 5, 4), "日本 ");
        assert_eq!(fit_to_width("abcdefgh", 4, 4), "abcd");
        assert_eq!(fit_to_width("\t\tx", 6, 4), "      ");
    }

    #[test]
    fn context_hunks() {
        let layout = SideBySideLayout {
            width: 2,
            tab_size: 4,
            context: Some(1),
        };
        let a: Vec<String> = (0..10).map(|i| format!("{i}\n")).collect();
        let mut b = a.clone();
        b[1] = "x\n".to_string();
        b[8] = "y\n".to_string();
        let matcher = SequenceMatcher::new(&a, &b);
        let result = side_by_side(&a, &b, matcher.opcodes(), &layout);
        assert_eq!(
            result,
            vec!["0    0\n", "1  | x\n", "2    2\n", "---\n", "7    7\n", "8  | y\n", "9    9\n"]
        );
    }

    #[test]
    fn write_lines_concatenates() {
        let mut output = vec![];
        write_lines(["a\n", "b"], &mut output).unwrap();
        assert_eq!(output, b"a\nb");
    }
}
