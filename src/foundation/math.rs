/// `i / (n - 1)` with the single-point case pinned to zero.
pub(crate) fn strip_param(i: usize, n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    i as f64 / (n - 1) as f64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
