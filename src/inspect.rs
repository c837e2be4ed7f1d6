//! Signature inspection and contract checks
//!
//! References always declare their contract. Candidates usually do too
//! (through [`Function::returning`] or [`Function::printing`]); a raw
//! candidate is probed once on a sample case instead. The probe's output
//! goes to a throwaway sink, so it never reaches the terminal.

use rand::rngs::StdRng;

use crate::capture::capture;
use crate::exercise::Exercise;
use crate::function::{Effect, Function, ReturnKind, Signature};
use crate::runner::values_match;
use crate::value::{TestCase, Value, ValueType};
use crate::{Error, Result};

/// Infer a signature by calling `function` once on `sample`
///
/// Any argument that differs after the call marks the function
/// destructive. A no-value result means the function prints, unless it
/// printed nothing and mutated its arguments. A call that returns nothing,
/// prints nothing and leaves its arguments alone proves nothing (a rotate
/// by a multiple of the length looks like that), so it yields `None`.
///
/// # Errors
///
/// Returns [`Error::Probe`] if the call panics
pub fn probe_signature(function: &Function, sample: &TestCase) -> Result<Option<Signature>> {
    let mut args = sample.clone();
    let captured = capture(|args, out| function.call(args, out), &mut args).map_err(|message| {
        Error::Probe {
            function: function.name().to_string(),
            message,
        }
    })?;

    let effect = detect_effect(sample, &args);
    let printed = !captured.printed_text.is_empty();
    if captured.result.is_none() && !printed && effect == Effect::Pure {
        return Ok(None);
    }
    // A silent destructive function communicates only through its arguments
    let silent_mutation = effect == Effect::Destructive && !printed;
    let returns = if captured.result.is_none() && !silent_mutation {
        ReturnKind::PrintsText
    } else {
        ReturnKind::ReturnsValue(captured.result.value_type())
    };
    Ok(Some(Signature { returns, effect }))
}

/// Compare argument state before and after a call
#[must_use]
pub fn detect_effect(before: &TestCase, after: &TestCase) -> Effect {
    let unchanged = values_match(
        &Value::Tuple(before.clone()),
        &Value::Tuple(after.clone()),
        0.0,
    );
    if unchanged {
        Effect::Pure
    } else {
        Effect::Destructive
    }
}

/// Declared signature of `function`, or one inferred by probing
///
/// An inconclusive probe resolves to the exercise's signature when a
/// silent no-value call is consistent with it, and to a pure `None` return
/// otherwise.
///
/// # Errors
///
/// Returns an error if a sample cannot be generated or the probe panics
pub fn inspect_signature(
    function: &Function,
    exercise: &Exercise,
    rng: &mut StdRng,
) -> Result<Signature> {
    if let Some(signature) = function.signature() {
        return Ok(signature);
    }
    let sample = exercise.sample(rng)?;
    let signature = match probe_signature(function, &sample)? {
        Some(signature) => signature,
        None => {
            let expected = exercise.signature();
            match expected.returns {
                ReturnKind::PrintsText | ReturnKind::ReturnsValue(ValueType::None) => expected,
                ReturnKind::ReturnsValue(_) => Signature::value(ValueType::None),
            }
        }
    };
    tracing::debug!(function = function.name(), %signature, "inferred signature");
    Ok(signature)
}

/// Check that `candidate` can be graded against `exercise`
///
/// Returns the contract the batch is compared under.
///
/// # Errors
///
/// Returns [`Error::MismatchedContract`] when the return kind, return
/// type, effect or declared parameter types disagree
pub fn check_candidate(
    candidate: &Function,
    exercise: &Exercise,
    rng: &mut StdRng,
) -> Result<Signature> {
    let expected = exercise.signature();
    let found = inspect_signature(candidate, exercise, rng)?;

    if expected != found {
        return Err(Error::MismatchedContract {
            function: exercise.name().to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }

    if let Some(params) = candidate.params() {
        if params != exercise.params() {
            return Err(Error::MismatchedContract {
                function: exercise.name().to_string(),
                expected: format!("parameters {:?}", exercise.params()),
                found: format!("parameters {params:?}"),
            });
        }
    }

    Ok(expected)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::capture::Printer;
    use crate::exercise::Catalog;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn catalog() -> Catalog {
        Catalog::for_year(2023).unwrap()
    }

    #[test]
    fn test_probe_value_function() {
        let f = Function::raw("f", |args, _| args[0].clone());
        let signature = probe_signature(&f, &vec![Value::Int(3)]).unwrap();
        assert_eq!(signature, Some(Signature::value(ValueType::Int)));
    }

    #[test]
    fn test_probe_print_only_function() {
        let f = Function::raw("f", |_, out| {
            out.println("hello");
            Value::None
        });
        let signature = probe_signature(&f, &vec![]).unwrap();
        assert_eq!(signature, Some(Signature::printed()));
    }

    #[test]
    fn test_probe_detects_mutation() {
        let f = Function::raw("f", |args, _| {
            if let Some(items) = args[0].as_list_mut() {
                items.reverse();
            }
            Value::None
        });
        let sample = vec![Value::List(vec![Value::Int(1), Value::Int(2)])];
        let signature = probe_signature(&f, &sample).unwrap().unwrap();
        assert_eq!(signature.effect, Effect::Destructive);
    }

    #[test]
    fn test_probe_panic_is_configuration_error() {
        let f = Function::raw("f", |_, _| panic!("not ready"));
        let err = probe_signature(&f, &vec![]).unwrap_err();
        assert!(matches!(&err, Error::Probe { message, .. } if message == "not ready"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_nan_arguments_are_not_mutation() {
        let case = vec![Value::Float(f64::NAN)];
        assert_eq!(detect_effect(&case, &case.clone()), Effect::Pure);
    }

    #[test]
    fn test_matching_candidate_passes() {
        let catalog = catalog();
        let exercise = catalog.get("calculate_sum").unwrap();
        let candidate =
            Function::returning("calculate_sum", |(x, y): (i64, i64)| (x + y) * (y - x + 1) / 2);
        let signature = check_candidate(&candidate, exercise, &mut rng()).unwrap();
        assert_eq!(signature, Signature::value(ValueType::Int));
    }

    #[test]
    fn test_returning_string_instead_of_printing_is_rejected() {
        let catalog = catalog();
        let exercise = catalog.get("display_time").unwrap();
        let candidate = Function::returning("display_time", |(ms,): (i64,)| format!("{ms} ms"));
        let err = check_candidate(&candidate, exercise, &mut rng()).unwrap_err();
        match err {
            Error::MismatchedContract {
                expected, found, ..
            } => {
                assert_eq!(expected, "prints text");
                assert_eq!(found, "returns str");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_undeclared_string_return_is_rejected() {
        let catalog = catalog();
        let exercise = catalog.get("display_time").unwrap();
        let candidate = Function::raw("display_time", |args, _| Value::Str(args[0].to_string()));
        let err = check_candidate(&candidate, exercise, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::MismatchedContract { .. }));
    }

    #[test]
    fn test_wrong_return_type_is_rejected() {
        let catalog = catalog();
        let exercise = catalog.get("calculate_sum").unwrap();
        let candidate =
            Function::returning("calculate_sum", |(x, y): (i64, i64)| (x + y) as f64);
        assert!(check_candidate(&candidate, exercise, &mut rng()).is_err());
    }

    #[test]
    fn test_wrong_parameter_types_are_rejected() {
        let catalog = catalog();
        let exercise = catalog.get("calculate_sum").unwrap();
        let candidate = Function::returning("calculate_sum", |(x, y): (f64, f64)| (x + y) as i64);
        let err = check_candidate(&candidate, exercise, &mut rng()).unwrap_err();
        assert!(err.to_string().contains("parameters"));
    }

    #[test]
    fn test_pure_candidate_for_destructive_exercise_is_rejected() {
        let catalog = catalog();
        let exercise = catalog.get("dest_rotate_list").unwrap();
        let candidate = Function::raw("dest_rotate_list", |args, _| args[0].clone());
        assert!(matches!(
            check_candidate(&candidate, exercise, &mut rng()),
            Err(Error::MismatchedContract { .. })
        ));
    }

    #[test]
    fn test_undeclared_destructive_candidate_is_accepted() {
        let catalog = catalog();
        let exercise = catalog.get("dest_rotate_list").unwrap();
        let candidate = Function::raw("dest_rotate_list", |args: &mut [Value], _: &mut Printer| {
            if let Some(items) = args[0].as_list_mut() {
                items.push(Value::Int(0));
            }
            Value::None
        });
        let signature = check_candidate(&candidate, exercise, &mut rng()).unwrap();
        assert_eq!(signature, Signature::value(ValueType::None).destructive());
    }

    #[test]
    fn test_probe_silent_mutation_returns_none() {
        let f = Function::raw("f", |args, _| {
            args[0] = Value::Int(0);
            Value::None
        });
        let signature = probe_signature(&f, &vec![Value::Int(1)]).unwrap();
        assert_eq!(signature, Some(Signature::value(ValueType::None).destructive()));
    }

    #[test]
    fn test_probe_of_silent_no_op_is_inconclusive() {
        let f = Function::raw("f", |_, _| Value::None);
        let sample = vec![Value::List(vec![Value::Int(4)]), Value::Int(3)];
        assert_eq!(probe_signature(&f, &sample).unwrap(), None);
    }

    #[test]
    fn test_silent_no_op_is_checked_against_value_return() {
        let catalog = catalog();
        let exercise = catalog.get("calculate_sum").unwrap();
        let candidate = Function::raw("calculate_sum", |_, _| Value::None);
        match check_candidate(&candidate, exercise, &mut rng()).unwrap_err() {
            Error::MismatchedContract { found, .. } => assert_eq!(found, "returns None"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_undeclared_rotate_is_accepted_for_every_seed() {
        let catalog = catalog();
        let exercise = catalog.get("dest_rotate_list").unwrap();
        let rotate = Function::raw("dest_rotate_list", |args: &mut [Value], _: &mut Printer| {
            let steps = match args.get(1) {
                Some(Value::Int(steps)) => *steps,
                _ => 0,
            };
            if let Some(items) = args.first_mut().and_then(Value::as_list_mut) {
                let len = items.len() as i64;
                items.rotate_right(steps.rem_euclid(len) as usize);
            }
            Value::None
        });
        for seed in 0..200 {
            let signature = check_candidate(&rotate, exercise, &mut StdRng::seed_from_u64(seed))
                .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            assert_eq!(signature, exercise.signature());
        }
    }
}
