//! Floating-point comparisons for kernel and scenario tests.
//!
//! Everything this crate compares numerically has magnitude O(1): survival
//! probabilities are products of factors in `[0, 1]`, and disease periods
//! are a handful of days sampled from Gamma distributions. Absolute
//! tolerances are therefore the right tool, with bounds chosen from how much
//! rounding the kernels can actually introduce.

/// Tolerance for survival-probability comparisons. A day's kernels multiply
/// at most a few dozen factors into an agent's accumulator and each
/// multiplication contributes at most half an ulp, which keeps the error
/// orders of magnitude below this bound.
pub const PROB_ACC: f64 = 1e-12;

/// Tolerance for comparing sampled period lengths and timer values in days.
pub const DAYS_ACC: f64 = 1e-9;

/// True when `a` and `b` differ by at most `tol` absolutely.
#[must_use]
pub fn almost_eq(a: f64, b: f64, tol: f64) -> bool {
    approx::abs_diff_eq!(a, b, epsilon = tol)
}

/// Asserts two floats are equal to within an absolute tolerance; with two
/// arguments the survival-probability tolerance [`crate::numeric::PROB_ACC`]
/// is used.
#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr $(,)?) => {
        $crate::assert_almost_eq!($a, $b, $crate::numeric::PROB_ACC)
    };
    ($a:expr, $b:expr, $tol:expr $(,)?) => {{
        let (left, right) = ($a, $b);
        assert!(
            $crate::numeric::almost_eq(left, right, $tol),
            "values differ by more than {:e}: left = {left}, right = {right}",
            $tol
        );
    }};
}
