//! Grid table of failing cases

use std::fmt::Write;

use crate::runner::FailedCase;
use crate::value::format_case;

const HEADERS: [&str; 3] = ["Input", "Expected Output", "Actual Output"];

/// Characters of the expected output kept in the table
pub const EXPECTED_WIDTH: usize = 10;

/// Render `cases` as a grid with a heavy rule under the header row
#[must_use]
pub fn render(cases: &[FailedCase]) -> String {
    let rows: Vec<[String; 3]> = cases
        .iter()
        .map(|case| {
            [
                format_case(&case.input),
                case.expected.to_string().chars().take(EXPECTED_WIDTH).collect(),
                case.actual.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count() + 2);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    rule(&mut out, &widths, '-');
    line(&mut out, &widths, &HEADERS);
    rule(&mut out, &widths, '=');
    for row in &rows {
        line(&mut out, &widths, row);
        rule(&mut out, &widths, '-');
    }
    // Trailing newline belongs to the caller's layout
    out.pop();
    out
}

fn rule(out: &mut String, widths: &[usize; 3], fill: char) {
    out.push('+');
    for &width in widths {
        out.extend(std::iter::repeat(fill).take(width + 2));
        out.push('+');
    }
    out.push('\n');
}

fn line<S: AsRef<str>>(out: &mut String, widths: &[usize; 3], cells: &[S; 3]) {
    out.push('|');
    for (&width, cell) in widths.iter().zip(cells) {
        let _ = write!(out, " {:<width$} |", cell.as_ref());
    }
    out.push('\n');
}
