//! Reference exercises and their case generators
//!
//! Every exercise pairs a known-correct reference [`Function`] with a
//! generator of random argument tuples. Exercises are grouped into a
//! [`Catalog`] per course year and looked up by name, which is how a
//! candidate is matched with the reference it is graded against.

mod y2023;

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;

use crate::function::{Function, Signature};
use crate::value::{TestCase, ValueType};
use crate::{Error, Result};

/// Produces `n` random argument tuples
pub type Generator = fn(usize, &mut StdRng) -> Vec<TestCase>;

/// A reference implementation with its case generator
#[derive(Debug, Clone)]
pub struct Exercise {
    signature: Signature,
    params: Vec<ValueType>,
    reference: Function,
    generator: Generator,
}

impl Exercise {
    /// Pair a reference with its generator
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the reference does not declare
    /// both its signature and its parameter types
    pub fn new(reference: Function, generator: Generator) -> Result<Self> {
        let signature = reference.signature().ok_or_else(|| {
            Error::Configuration(format!(
                "reference {} does not declare a signature",
                reference.name()
            ))
        })?;
        let params = reference
            .params()
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "reference {} does not declare parameter types",
                    reference.name()
                ))
            })?
            .to_vec();
        Ok(Self {
            signature,
            params,
            reference,
            generator,
        })
    }

    /// Exercise name
    #[must_use]
    pub fn name(&self) -> &str {
        self.reference.name()
    }

    /// Contract of the reference implementation
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Parameter types of the reference implementation
    #[must_use]
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Reference implementation
    #[must_use]
    pub fn reference(&self) -> &Function {
        &self.reference
    }

    /// Generate `n` cases and check their shape
    ///
    /// Exercises with a naturally small domain may return a different
    /// number of cases; every returned case still has to fit the
    /// parameter list.
    ///
    /// # Errors
    ///
    /// Returns a generation error if no cases come back or a case does
    /// not match the declared parameter types
    pub fn generate(&self, n: usize, rng: &mut StdRng) -> Result<Vec<TestCase>> {
        let cases = (self.generator)(n, rng);
        if cases.is_empty() {
            return Err(Error::Generation(format!(
                "{} produced no test cases",
                self.name()
            )));
        }
        if cases.len() != n {
            tracing::debug!(
                exercise = self.name(),
                requested = n,
                generated = cases.len(),
                "generator returned a different number of cases"
            );
        }
        for (index, case) in cases.iter().enumerate() {
            self.check_shape(index, case)?;
        }
        Ok(cases)
    }

    /// Generate a single case for signature probing
    ///
    /// # Errors
    ///
    /// Same as [`Exercise::generate`]
    pub fn sample(&self, rng: &mut StdRng) -> Result<TestCase> {
        let mut cases = self.generate(1, rng)?;
        Ok(cases.swap_remove(0))
    }

    fn check_shape(&self, index: usize, case: &TestCase) -> Result<()> {
        if case.len() != self.params.len() {
            return Err(Error::Generation(format!(
                "{} case {index} has {} argument(s), expected {}",
                self.name(),
                case.len(),
                self.params.len()
            )));
        }
        for (position, (value, expected)) in case.iter().zip(&self.params).enumerate() {
            if value.value_type() != *expected {
                return Err(Error::Generation(format!(
                    "{} case {index} argument {position} is {}, expected {expected}",
                    self.name(),
                    value.value_type()
                )));
            }
        }
        Ok(())
    }
}

/// Exercises available for one course year
#[derive(Debug, Clone)]
pub struct Catalog {
    year: u16,
    exercises: BTreeMap<String, Exercise>,
}

impl Catalog {
    /// Years that ship exercises
    pub const YEARS: &'static [u16] = &[2023];

    /// Load the catalog for `year`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a year without exercises
    pub fn for_year(year: u16) -> Result<Self> {
        let exercises = match year {
            2023 => y2023::exercises()?,
            other => {
                return Err(Error::Configuration(format!(
                    "no exercises for year {other} (available: {:?})",
                    Self::YEARS
                )))
            }
        };
        Ok(Self::from_exercises(year, exercises))
    }

    /// Build a catalog from explicit exercises
    #[must_use]
    pub fn from_exercises(year: u16, exercises: Vec<Exercise>) -> Self {
        let exercises = exercises
            .into_iter()
            .map(|exercise| (exercise.name().to_string(), exercise))
            .collect();
        Self { year, exercises }
    }

    /// Course year
    #[must_use]
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Look up an exercise by name
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFunction`] if no exercise has this name
    pub fn get(&self, name: &str) -> Result<&Exercise> {
        self.exercises
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))
    }

    /// Exercise names in sorted order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.exercises.keys().map(String::as_str).collect()
    }

    /// Number of exercises
    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Available functions for y{}: {:?}",
            self.year,
            self.names()
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::value::Value;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn bad_arity(n: usize, _: &mut StdRng) -> Vec<TestCase> {
        vec![vec![Value::Int(1)]; n]
    }

    fn bad_type(n: usize, _: &mut StdRng) -> Vec<TestCase> {
        vec![vec![Value::Float(1.0), Value::Int(1)]; n]
    }

    fn nothing(_: usize, _: &mut StdRng) -> Vec<TestCase> {
        Vec::new()
    }

    fn small_domain(n: usize, _: &mut StdRng) -> Vec<TestCase> {
        (0..n.min(2) + 1)
            .map(|i| vec![Value::Int(i as i64), Value::Int(1)])
            .collect()
    }

    fn add() -> Function {
        Function::returning("add", |(x, y): (i64, i64)| x + y)
    }

    #[test]
    fn test_catalog_2023_loads() {
        let catalog = Catalog::for_year(2023).unwrap();
        assert_eq!(catalog.year(), 2023);
        assert!(catalog.len() >= 17);
        assert!(catalog.get("calculate_sum").is_ok());
        assert!(catalog.get("display_time").unwrap().signature().prints_text());
        assert!(catalog
            .get("dest_rotate_list")
            .unwrap()
            .signature()
            .is_destructive());
    }

    #[test]
    fn test_unknown_year() {
        let err = Catalog::for_year(1999).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_unknown_function() {
        let catalog = Catalog::for_year(2023).unwrap();
        let err = catalog.get("add").unwrap_err();
        assert!(matches!(err, Error::UnknownFunction(name) if name == "add"));
    }

    #[test]
    fn test_catalog_display_lists_names() {
        let catalog = Catalog::from_exercises(2023, vec![Exercise::new(add(), bad_arity).unwrap()]);
        assert_eq!(catalog.to_string(), "Available functions for y2023: [\"add\"]");
    }

    #[test]
    fn test_undeclared_reference_is_rejected() {
        let raw = Function::raw("add", |_, _| Value::None);
        let err = Exercise::new(raw, bad_arity).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_shape_check_arity() {
        let exercise = Exercise::new(add(), bad_arity).unwrap();
        let err = exercise.generate(3, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::Generation(msg) if msg.contains("1 argument(s), expected 2")));
    }

    #[test]
    fn test_shape_check_types() {
        let exercise = Exercise::new(add(), bad_type).unwrap();
        let err = exercise.generate(3, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::Generation(msg) if msg.contains("argument 0 is float, expected int")));
    }

    #[test]
    fn test_empty_generation_is_rejected() {
        let exercise = Exercise::new(add(), nothing).unwrap();
        assert!(exercise.generate(3, &mut rng()).is_err());
    }

    #[test]
    fn test_small_domain_generator_is_accepted() {
        let exercise = Exercise::new(add(), small_domain).unwrap();
        let cases = exercise.generate(10, &mut rng()).unwrap();
        assert_eq!(cases.len(), 3);
    }

    #[test]
    fn test_every_2023_generator_fits_its_reference() {
        let catalog = Catalog::for_year(2023).unwrap();
        let mut rng = rng();
        for name in catalog.names() {
            let exercise = catalog.get(name).unwrap();
            let cases = exercise.generate(25, &mut rng).unwrap();
            assert_eq!(cases.len(), 25, "{name}");
        }
    }
}
