//! Exercises for the 2023 course
//!
//! Arithmetic formulas, digit manipulation, pattern printing and a few
//! recursive problems. Integer ranges are chosen so every reference stays
//! inside `i64`.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;

use super::Exercise;
use crate::capture::Printer;
use crate::function::{Function, Signature};
use crate::value::{TestCase, Value, ValueType};
use crate::Result;

const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;
const ASCII_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub(super) fn exercises() -> Result<Vec<Exercise>> {
    Ok(vec![
        Exercise::new(
            Function::returning("calculate_sum", |(x, y): (i64, i64)| calculate_sum(x, y)),
            calculate_sum_cases,
        )?,
        Exercise::new(
            Function::returning("calculate_new_price", |(old_price,): (f64,)| {
                ((old_price - 50.0) / 100.0) as i64 * 100 + 98
            }),
            |n, rng| floats(n, rng, 1, 0.0, 1000.0),
        )?,
        Exercise::new(
            Function::returning("calculate_triangle_area", |(a, b, c): (f64, f64, f64)| {
                let s = (a + b + c) / 2.0;
                (s * (s - a) * (s - b) * (s - c)).sqrt()
            }),
            triangle_cases,
        )?,
        Exercise::new(
            Function::printing("display_time", |out: &mut Printer, (ms,): (i64,)| {
                display_time(out, ms);
            }),
            |n, rng| ints(n, rng, 1, 1, 1_000_000_000_000_000_000),
        )?,
        Exercise::new(
            Function::returning("find_intersection", |(m1, b1, m2, b2): (f64, f64, f64, f64)| {
                let x = (b2 - b1) / (m1 - m2);
                (x, m1 * x + b1)
            }),
            |n, rng| floats(n, rng, 4, 0.0, 1000.0),
        )?,
        Exercise::new(
            Function::returning("find_r_from_surface_area", |(surface_area,): (f64,)| {
                (surface_area / (4.0 * PI)).sqrt()
            }),
            |n, rng| floats(n, rng, 1, 0.0, 1000.0),
        )?,
        Exercise::new(
            Function::returning("sphere_volume", |(radius,): (f64,)| {
                (4.0 / 3.0) * PI * radius.powi(3)
            }),
            |n, rng| floats(n, rng, 1, 0.0, 1000.0),
        )?,
        Exercise::new(
            Function::returning("kth_digit", |(number, k): (i64, i64)| kth_digit(number, k)),
            kth_digit_cases,
        )?,
        Exercise::new(
            Function::returning("nearest_odd", |(x,): (f64,)| {
                (x / 2.0).ceil() as i64 * 2 - 1
            }),
            |n, rng| floats(n, rng, 1, 0.0, 1000.0),
        )?,
        Exercise::new(
            Function::returning("octagon_area", |(side,): (f64,)| {
                side.powi(2) - (side / 3.0).powi(2) * 2.0
            }),
            |n, rng| floats(n, rng, 1, 0.0, 1000.0),
        )?,
        Exercise::new(
            Function::returning("set_kth_digit", |(number, k, value): (i64, i64, i64)| {
                let coeff = 10_i64.pow(k as u32);
                number - kth_digit(number, k) * coeff + value * coeff
            }),
            set_kth_digit_cases,
        )?,
        Exercise::new(
            Function::printing(
                "patterned_message",
                |out: &mut Printer, (message, pattern): (String, String)| {
                    patterned_message(out, &message, &pattern);
                },
            ),
            patterned_message_cases,
        )?,
        Exercise::new(
            Function::returning("life_path", |(n,): (i64,)| life_path(n)),
            |n, rng| ints(n, rng, 1, 1, 1_000_000_000),
        )?,
        Exercise::new(
            Function::returning("median_of_median", |(list_a,): (Vec<f64>,)| {
                median_of_median(&list_a)
            }),
            float_lists,
        )?,
        Exercise::new(
            Function::returning("left_max", |(list_a,): (Vec<f64>,)| left_max(&list_a)),
            float_lists,
        )?,
        Exercise::new(
            Function::returning(
                "arrival_sequences",
                |(left, right): (Vec<String>, Vec<String>)| {
                    let mut result = Vec::new();
                    queue_bus(&mut result, &mut Vec::new(), &left, &right);
                    result
                },
            ),
            arrival_sequences_cases,
        )?,
        Exercise::new(
            Function::raw("dest_rotate_list", dest_rotate_list)
                .with_signature(Signature::value(ValueType::None).destructive())
                .with_params(vec![ValueType::List, ValueType::Int]),
            dest_rotate_list_cases,
        )?,
    ])
}

fn calculate_sum(x: i64, y: i64) -> i64 {
    (x + y) * (y - x + 1) / 2
}

fn display_time(out: &mut Printer, ms: i64) {
    let (sec, ms) = (ms / 1000, ms % 1000);
    let (minute, sec) = (sec / 60, sec % 60);
    let (hr, minute) = (minute / 60, minute % 60);
    let (day, hr) = (hr / 24, hr % 24);
    out.println(format!(
        "{day} day(s), {hr} hour(s), {minute} minute(s), {sec} second(s), and {ms} millisecond(s)"
    ));
}

fn kth_digit(number: i64, k: i64) -> i64 {
    number.abs() / 10_i64.pow(k as u32) % 10
}

fn patterned_message(out: &mut Printer, message: &str, pattern: &str) {
    let Some(head) = pattern.chars().next() else {
        return;
    };
    let mut message: String = message.chars().filter(|c| *c != ' ').collect();
    if head == '*' {
        let first = message.remove(0);
        out.print(first.to_string());
        message.push(first);
    } else {
        out.print(head.to_string());
    }
    patterned_message(out, &message, &pattern[head.len_utf8()..]);
}

fn life_path(mut n: i64) -> i64 {
    while n >= 10 {
        n = n / 10 + n % 10;
    }
    n
}

fn median_of_median(list_a: &[f64]) -> f64 {
    match list_a.len() {
        1 => return list_a[0],
        2 => return (list_a[0] + list_a[1]) / 2.0,
        _ => {}
    }
    let sub_size = list_a.len() / 3;
    let mut medians = [
        median_of_median(&list_a[..sub_size]),
        median_of_median(&list_a[sub_size..2 * sub_size]),
        median_of_median(&list_a[2 * sub_size..]),
    ];
    medians.sort_by(f64::total_cmp);
    medians[1]
}

fn left_max(list_a: &[f64]) -> Vec<f64> {
    list_a
        .iter()
        .scan(f64::NEG_INFINITY, |max, &value| {
            *max = max.max(value);
            Some(*max)
        })
        .collect()
}

/// Every interleaving of the two lanes that keeps each lane's order
fn queue_bus(result: &mut Vec<String>, prefix: &mut Vec<String>, left: &[String], right: &[String]) {
    if left.is_empty() && right.is_empty() {
        result.push(prefix.join(">"));
    }
    if let Some((head, rest)) = left.split_first() {
        prefix.push(head.clone());
        queue_bus(result, prefix, rest, right);
        prefix.pop();
    }
    if let Some((head, rest)) = right.split_first() {
        prefix.push(head.clone());
        queue_bus(result, prefix, left, rest);
        prefix.pop();
    }
}

fn dest_rotate_list(args: &mut [Value], _: &mut Printer) -> Value {
    let steps = match args.get(1) {
        Some(Value::Int(n)) => *n,
        other => panic!("argument 1: expected int, found {other:?}"),
    };
    let Some(items) = args.first_mut().and_then(Value::as_list_mut) else {
        panic!("argument 0: expected list");
    };
    let len = items.len() as i64;
    // Empty lists divide by zero, as the modulo in the exercise statement does
    assert!(len != 0, "integer division or modulo by zero");
    items.rotate_right(steps.rem_euclid(len) as usize);
    Value::None
}

fn ints(n: usize, rng: &mut StdRng, arity: usize, low: i64, high: i64) -> Vec<TestCase> {
    (0..n)
        .map(|_| (0..arity).map(|_| Value::Int(rng.gen_range(low..=high))).collect())
        .collect()
}

fn floats(n: usize, rng: &mut StdRng, arity: usize, low: f64, high: f64) -> Vec<TestCase> {
    (0..n)
        .map(|_| (0..arity).map(|_| Value::Float(rng.gen_range(low..high))).collect())
        .collect()
}

fn calculate_sum_cases(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    (0..n)
        .map(|_| {
            let x = rng.gen_range(1..=1_000_000_000_i64);
            let y = rng.gen_range(x..=1_000_000_000_i64);
            vec![Value::Int(x), Value::Int(y)]
        })
        .collect()
}

fn triangle_cases(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    (0..n)
        .map(|_| {
            let a: f64 = rng.gen_range(1.0..100.0);
            let b = rng.gen_range(1.0..100.0);
            // Keep the triangle inequality strict
            let c = rng.gen_range((a - b).abs() + 0.0001..a + b - 0.0001);
            vec![Value::Float(a), Value::Float(b), Value::Float(c)]
        })
        .collect()
}

fn kth_digit_cases(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    (0..n)
        .map(|_| {
            vec![
                Value::Int(rng.gen_range(0..=1_000_000_000)),
                Value::Int(rng.gen_range(0..=9)),
            ]
        })
        .collect()
}

fn set_kth_digit_cases(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    (0..n)
        .map(|_| {
            vec![
                Value::Int(rng.gen_range(0..=1_000_000_000)),
                Value::Int(rng.gen_range(0..=9)),
                Value::Int(rng.gen_range(0..=9)),
            ]
        })
        .collect()
}

fn random_string(rng: &mut StdRng, alphabet: &[char], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

fn patterned_message_cases(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    let alphabet: Vec<char> = PUNCTUATION.chars().chain(ASCII_LETTERS.chars()).collect();
    (0..n)
        .map(|_| {
            let message_len = rng.gen_range(1..=10);
            let pattern_len = rng.gen_range(1..=100);
            vec![
                Value::Str(random_string(rng, &alphabet, message_len)),
                Value::Str(random_string(rng, &['*', ' '], pattern_len)),
            ]
        })
        .collect()
}

fn float_lists(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    (0..n)
        .map(|_| {
            let len = rng.gen_range(1..=100);
            let items = (0..len)
                .map(|_| Value::Float(rng.gen_range(0.0..1000.0)))
                .collect();
            vec![Value::List(items)]
        })
        .collect()
}

fn arrival_sequences_cases(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    // Lane lengths stay small: the number of interleavings is C(l + r, l)
    let lane = |rng: &mut StdRng| {
        let len = rng.gen_range(1..=5);
        Value::List(
            (0..len)
                .map(|_| Value::Str(if rng.gen_bool(0.5) { "R" } else { "O" }.to_string()))
                .collect(),
        )
    };
    (0..n).map(|_| vec![lane(rng), lane(rng)]).collect()
}

fn dest_rotate_list_cases(n: usize, rng: &mut StdRng) -> Vec<TestCase> {
    (0..n)
        .map(|_| {
            let len = rng.gen_range(1..=20);
            let items = (0..len)
                .map(|_| Value::Int(rng.gen_range(-100..=100)))
                .collect();
            vec![Value::List(items), Value::Int(rng.gen_range(-50..=50))]
        })
        .collect()
}
