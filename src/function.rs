//! Callables under test and their declared contracts
//!
//! Both reference implementations and learner candidates are wrapped in
//! a [`Function`]. A function is called with a mutable argument tuple and
//! its own output sink. Its contract is declared up front through the
//! typed constructors, so no runtime reflection is needed to tell a
//! value-returning exercise from a print-only one.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capture::Printer;
use crate::value::{Arguments, IntoValue, Value, ValueType};

/// How a function communicates its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnKind {
    /// The result is the return value, of the given type
    ReturnsValue(ValueType),
    /// The result is the printed text; the return value is ignored
    PrintsText,
}

/// Whether a function mutates its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Arguments are left untouched
    Pure,
    /// Mutating an argument is part of the contract
    Destructive,
}

/// Contract of a graded function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Result channel
    pub returns: ReturnKind,
    /// Argument mutation
    pub effect: Effect,
}

impl Signature {
    /// Pure function returning a value of `ty`
    #[must_use]
    pub fn value(ty: ValueType) -> Self {
        Self {
            returns: ReturnKind::ReturnsValue(ty),
            effect: Effect::Pure,
        }
    }

    /// Pure print-only function
    #[must_use]
    pub fn printed() -> Self {
        Self {
            returns: ReturnKind::PrintsText,
            effect: Effect::Pure,
        }
    }

    /// Same contract, marked destructive
    #[must_use]
    pub fn destructive(mut self) -> Self {
        self.effect = Effect::Destructive;
        self
    }

    /// Whether results are compared on printed text
    #[must_use]
    pub fn prints_text(&self) -> bool {
        self.returns == ReturnKind::PrintsText
    }

    /// Whether argument state is part of the result
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.effect == Effect::Destructive
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.returns {
            ReturnKind::ReturnsValue(ty) => write!(f, "returns {ty}")?,
            ReturnKind::PrintsText => write!(f, "prints text")?,
        }
        match self.effect {
            Effect::Pure => Ok(()),
            Effect::Destructive => write!(f, ", mutates arguments"),
        }
    }
}

type Callable = dyn Fn(&mut [Value], &mut Printer) -> Value + Send + Sync;

/// A named function that can be graded or used as a reference
#[derive(Clone)]
pub struct Function {
    name: String,
    label: Option<String>,
    signature: Option<Signature>,
    params: Option<Vec<ValueType>>,
    call: Arc<Callable>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("signature", &self.signature)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Function {
    /// Wrap an untyped callable; its signature is inferred by probing
    pub fn raw<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut [Value], &mut Printer) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            label: None,
            signature: None,
            params: None,
            call: Arc::new(func),
        }
    }

    /// Wrap a pure function whose result is its return value
    ///
    /// Arguments arrive as a tuple: `|(x, y): (i64, i64)| x + y`.
    pub fn returning<A, R, F>(name: impl Into<String>, func: F) -> Self
    where
        A: Arguments + 'static,
        R: IntoValue + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let mut function = Self::raw(name, move |args: &mut [Value], _: &mut Printer| {
            match A::extract(args) {
                Ok(typed) => func(typed).into_value(),
                Err(message) => panic!("{message}"),
            }
        });
        function.signature = Some(Signature::value(R::TYPE));
        function.params = Some(A::types());
        function
    }

    /// Wrap a pure function whose result is the text it prints
    pub fn printing<A, F>(name: impl Into<String>, func: F) -> Self
    where
        A: Arguments + 'static,
        F: Fn(&mut Printer, A) + Send + Sync + 'static,
    {
        let mut function = Self::raw(name, move |args: &mut [Value], out: &mut Printer| {
            match A::extract(args) {
                Ok(typed) => func(out, typed),
                Err(message) => panic!("{message}"),
            }
            Value::None
        });
        function.signature = Some(Signature::printed());
        function.params = Some(A::types());
        function
    }

    /// Declare the contract explicitly
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Declare parameter types explicitly
    #[must_use]
    pub fn with_params(mut self, params: Vec<ValueType>) -> Self {
        self.params = Some(params);
        self
    }

    /// Attach a label that identifies this implementation among others
    /// for the same exercise
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Exercise name this function implements
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label, falling back to the name
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Declared contract, if any
    #[must_use]
    pub fn signature(&self) -> Option<Signature> {
        self.signature
    }

    /// Declared parameter types, if any
    #[must_use]
    pub fn params(&self) -> Option<&[ValueType]> {
        self.params.as_deref()
    }

    /// Invoke with the given arguments and output sink
    pub fn call(&self, args: &mut [Value], out: &mut Printer) -> Value {
        (self.call)(args, out)
    }
}
