//! Bundled sample submissions
//!
//! Learner-style implementations used by the CLI and by the worker
//! process, which has to rebuild a candidate from its label. Each label is
//! `<exercise>` for a correct solution or `<exercise>/<variant>` for a
//! flawed one.

use std::f64::consts::PI;
use std::thread;
use std::time::Duration;

use crate::capture::Printer;
use crate::function::Function;
use crate::value::Value;

/// A labeled sample submission
#[derive(Debug, Clone, Copy)]
pub struct Submission {
    /// Lookup key
    pub label: &'static str,
    /// What the submission gets wrong, if anything
    pub description: &'static str,
    build: fn() -> Function,
}

impl Submission {
    /// Build the candidate function
    #[must_use]
    pub fn function(&self) -> Function {
        (self.build)().with_label(self.label)
    }
}

const SUBMISSIONS: &[Submission] = &[
    Submission {
        label: "calculate_sum",
        description: "correct",
        build: || {
            Function::returning("calculate_sum", |(x, y): (i64, i64)| {
                (y * (y + 1) - (x - 1) * x) / 2
            })
        },
    },
    Submission {
        label: "calculate_sum/off_by_one",
        description: "leaves out the upper bound",
        build: || {
            Function::returning("calculate_sum", |(x, y): (i64, i64)| {
                (x + y - 1) * (y - x) / 2
            })
        },
    },
    Submission {
        label: "calculate_sum/slow",
        description: "correct, but sleeps 10ms per call",
        build: || {
            Function::returning("calculate_sum", |(x, y): (i64, i64)| {
                thread::sleep(Duration::from_millis(10));
                (x + y) * (y - x + 1) / 2
            })
        },
    },
    Submission {
        label: "calculate_sum/spin",
        description: "never returns",
        build: || {
            Function::returning("calculate_sum", |(_x, _y): (i64, i64)| -> i64 {
                loop {
                    std::hint::spin_loop();
                }
            })
        },
    },
    Submission {
        label: "sphere_volume",
        description: "correct, with a different float evaluation order",
        build: || {
            Function::returning("sphere_volume", |(radius,): (f64,)| {
                4.0 * PI * radius * radius * radius / 3.0
            })
        },
    },
    Submission {
        label: "nearest_odd/rounding",
        description: "rounds to the nearest even number first",
        build: || {
            Function::returning("nearest_odd", |(x,): (f64,)| {
                (x / 2.0).round() as i64 * 2 - 1
            })
        },
    },
    Submission {
        label: "display_time",
        description: "correct",
        build: || {
            Function::printing("display_time", |out: &mut Printer, (ms,): (i64,)| {
                let days = ms / 86_400_000;
                let hours = ms / 3_600_000 % 24;
                let minutes = ms / 60_000 % 60;
                let seconds = ms / 1000 % 60;
                out.println(format!(
                    "{days} day(s), {hours} hour(s), {minutes} minute(s), {seconds} second(s), and {} millisecond(s)",
                    ms % 1000
                ));
            })
        },
    },
    Submission {
        label: "display_time/returns_string",
        description: "returns the text instead of printing it",
        build: || {
            Function::returning("display_time", |(ms,): (i64,)| {
                format!("{} second(s)", ms / 1000)
            })
        },
    },
    Submission {
        label: "life_path",
        description: "correct",
        build: || {
            Function::returning("life_path", |(n,): (i64,)| {
                // Repeated digit sums land on n mod 9, with 9 for multiples
                (n - 1) % 9 + 1
            })
        },
    },
    Submission {
        label: "life_path/divides_by_zero",
        description: "panics on multiples of 7",
        build: || {
            Function::returning("life_path", |(n,): (i64,)| {
                let week = 7 / (n % 7);
                let _ = week;
                (n - 1) % 9 + 1
            })
        },
    },
    Submission {
        label: "dest_rotate_list",
        description: "correct",
        build: || {
            Function::raw("dest_rotate_list", |args: &mut [Value], _: &mut Printer| {
                let steps = match args.get(1) {
                    Some(Value::Int(steps)) => *steps,
                    _ => 0,
                };
                if let Some(items) = args.first_mut().and_then(Value::as_list_mut) {
                    let len = items.len() as i64;
                    items.rotate_right((steps % len + len) as usize % len as usize);
                }
                Value::None
            })
        },
    },
    Submission {
        label: "dest_rotate_list/copy",
        description: "returns a rotated copy and leaves the list alone",
        build: || {
            Function::raw("dest_rotate_list", |args: &mut [Value], _: &mut Printer| {
                let steps = match args.get(1) {
                    Some(Value::Int(steps)) => *steps,
                    _ => 0,
                };
                match args.first() {
                    Some(Value::List(items)) if !items.is_empty() => {
                        let mut rotated = items.clone();
                        rotated.rotate_right(steps.rem_euclid(items.len() as i64) as usize);
                        Value::List(rotated)
                    }
                    _ => Value::None,
                }
            })
        },
    },
];

/// Every bundled submission
#[must_use]
pub fn all() -> &'static [Submission] {
    SUBMISSIONS
}

/// Build the submission with `label`
#[must_use]
pub fn find(label: &str) -> Option<Function> {
    SUBMISSIONS
        .iter()
        .find(|submission| submission.label == label)
        .map(Submission::function)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::exercise::Catalog;

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<_> = all().iter().map(|s| s.label).collect();
        assert_eq!(labels.len(), all().len());
    }

    #[test]
    fn test_every_submission_targets_an_exercise() {
        let catalog = Catalog::for_year(2023).unwrap();
        for submission in all() {
            let function = submission.function();
            assert!(catalog.get(function.name()).is_ok(), "{}", submission.label);
            assert!(submission.label.starts_with(function.name()));
        }
    }

    #[test]
    fn test_find_sets_label() {
        let function = find("calculate_sum/off_by_one").unwrap();
        assert_eq!(function.name(), "calculate_sum");
        assert_eq!(function.label(), "calculate_sum/off_by_one");
        assert!(find("calculate_sum/unknown").is_none());
    }

    #[test]
    fn test_correct_life_path_matches_digit_sums() {
        let function = find("life_path").unwrap();
        let mut out = Printer::new();
        let result = function.call(&mut [Value::Int(1_999)], &mut out);
        assert_eq!(result, Value::Int(1));
    }
}
