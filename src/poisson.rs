use crate::error::{EngineError, Result, ensure_non_negative};

/// Poisson probability mass `P(X = goal)` for a goal rate `mean`.
///
/// Evaluated as `exp(goal * ln(mean) - mean - ln(goal!))` so that goal counts far
/// beyond what a 64-bit factorial can hold stay finite. `goal == 0` reduces to
/// exactly `exp(-mean)`.
pub fn poisson_probability(mean: f64, goal: u32) -> Result<f64> {
    let mean = ensure_non_negative("mean", mean)?;

    if goal == 0 {
        return Ok((-mean).exp());
    }
    // ln(0) is -inf; a zero rate puts all mass on zero goals.
    if mean == 0.0 {
        return Ok(0.0);
    }

    let log_p = goal as f64 * mean.ln() - mean - ln_factorial(goal);
    let p = log_p.exp();
    if !p.is_finite() {
        return Err(EngineError::unstable(format!(
            "poisson pmf (mean={mean}, goal={goal})"
        )));
    }
    Ok(p.min(1.0))
}

/// `ln(n!)` as a running sum of logs.
pub(crate) fn ln_factorial(n: u32) -> f64 {
    (2..=n).map(|k| (k as f64).ln()).sum()
}
