//! Unwrap helpers that fail tests with the error value and caller location.

use std::fmt::Debug;

/// Unwrap a `Result`, panicking with the error on failure.
///
/// ```rust
/// use padhaptics_test_helpers::must;
///
/// let value = must("42".parse::<u8>());
/// assert_eq!(value, 42);
/// ```
///
/// # Panics
///
/// Panics if the result is `Err`.
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with `msg` if `None`.
///
/// # Panics
///
/// Panics if the option is `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

/// Assert that two floats differ by at most `tolerance`.
///
/// ```rust
/// use padhaptics_test_helpers::assert_close;
///
/// assert_close!(0.1 + 0.2, 0.3, 1e-12);
/// ```
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {{
        let left: f64 = $left;
        let right: f64 = $right;
        let tolerance: f64 = $tolerance;
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{left:?}`,\n right: `{right:?}`,\n  diff: `{diff:?}`,\n  tolerance: `{tolerance:?}`"
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn must_returns_ok_value() {
        let r: Result<i32, &str> = Ok(7);
        assert_eq!(must(r), 7);
        assert_eq!(must_some(Some("x"), "present"), "x");
    }

    #[test]
    #[should_panic(expected = "must_some: missing frame")]
    fn must_some_panics_with_message() {
        let none: Option<u8> = None;
        must_some(none, "missing frame");
    }

    #[test]
    #[should_panic(expected = "left ≈ right")]
    fn assert_close_rejects_distant_values() {
        assert_close!(1.0, 1.1, 0.01);
    }
}
