//! Output capture for print-only functions
//!
//! Graded functions never write to the process's standard output. Each
//! call receives its own [`Printer`], an explicit output sink that lives
//! exactly as long as the call. Whatever was printed is handed back next
//! to the return value, and the sink is dropped on every exit path,
//! including a panic unwinding out of the function.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::value::Value;

/// Output sink handed to every graded call
#[derive(Debug, Default)]
pub struct Printer {
    buffer: String,
}

impl Printer {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text without a terminator
    pub fn print(&mut self, text: impl AsRef<str>) {
        self.buffer.push_str(text.as_ref());
    }

    /// Append text followed by a newline
    pub fn println(&mut self, text: impl AsRef<str>) {
        self.buffer.push_str(text.as_ref());
        self.buffer.push('\n');
    }

    /// Text printed so far
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Consume the sink, returning the accumulated text
    #[must_use]
    pub fn into_text(self) -> String {
        self.buffer
    }
}

impl fmt::Write for Printer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}

/// Result of one captured call
#[derive(Debug, Clone, PartialEq)]
pub struct Captured {
    /// Return value (possibly [`Value::None`])
    pub result: Value,
    /// Exact text printed during the call
    pub printed_text: String,
}

/// Invoke `func` with a fresh sink and collect what it returns and prints
///
/// # Errors
///
/// Returns the panic message when `func` panics. Text printed before the
/// panic is discarded with the sink.
///
/// The panic is caught, but the process-wide panic hook still runs first.
/// With the default hook the message reaches stderr; embedders that grade
/// panicking code quietly install their own hook, as the `mygrader` binary
/// does.
pub fn capture<F>(func: F, args: &mut [Value]) -> std::result::Result<Captured, String>
where
    F: FnOnce(&mut [Value], &mut Printer) -> Value,
{
    let mut printer = Printer::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| func(args, &mut printer)));
    match outcome {
        Ok(result) => Ok(Captured {
            result,
            printed_text: printer.into_text(),
        }),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

/// Best-effort text of a panic payload
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use super::*;

    #[test]
    fn test_capture_printed_text() {
        let mut args = vec![Value::Str("Hello, world!".to_string())];
        let captured = capture(
            |args, out| {
                if let Value::Str(s) = &args[0] {
                    out.println(s);
                }
                Value::None
            },
            &mut args,
        )
        .unwrap();
        assert_eq!(captured.printed_text, "Hello, world!\n");
        assert_eq!(captured.result, Value::None);
    }

    #[test]
    fn test_capture_keeps_terminators() {
        let captured = capture(
            |_, out| {
                out.print("a");
                out.print("b");
                let _ = write!(out, "{}", 3);
                out.println("");
                Value::Int(1)
            },
            &mut [],
        )
        .unwrap();
        assert_eq!(captured.printed_text, "ab3\n");
        assert_eq!(captured.result, Value::Int(1));
    }

    #[test]
    fn test_capture_panic_message() {
        let err = capture(|_, _| panic!("boom"), &mut []).unwrap_err();
        assert_eq!(err, "boom");
    }

    #[test]
    fn test_capture_formatted_panic_message() {
        let divisor = 0;
        let err = capture(|_, _| panic!("bad divisor {divisor}"), &mut []).unwrap_err();
        assert_eq!(err, "bad divisor 0");
    }

    #[test]
    fn test_capture_sees_argument_mutation() {
        let mut args = vec![Value::List(vec![Value::Int(1)])];
        capture(
            |args, _| {
                if let Some(items) = args[0].as_list_mut() {
                    items.clear();
                }
                Value::None
            },
            &mut args,
        )
        .unwrap();
        assert_eq!(args[0], Value::List(vec![]));
    }

    #[test]
    fn test_separate_calls_do_not_share_output() {
        let first = capture(
            |_, out| {
                out.print("first");
                Value::None
            },
            &mut [],
        )
        .unwrap();
        let second = capture(|_, _| Value::None, &mut []).unwrap();
        assert_eq!(first.printed_text, "first");
        assert_eq!(second.printed_text, "");
    }
}
