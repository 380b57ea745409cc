use crate::utils::math::normal_inverse;
use tracing::warn;

/// Extra errors to add to the observed `e` errors out of `n` for the C4.5
/// pessimistic estimate at confidence `cf`.
pub fn add_errs(n: f64, e: f64, cf: f64) -> f64 {
    if cf > 0.5 {
        warn!(cf, "confidence value for pruning too high, error estimate not modified");
        return 0.0;
    }

    if e < 1.0 {
        let base = n * (1.0 - cf.powf(1.0 / n));
        if e == 0.0 {
            return base;
        }
        return base + e * (add_errs(n, 1.0, cf) - base);
    }

    if e + 0.5 >= n {
        return (n - e).max(0.0);
    }

    let Some(z) = normal_inverse(1.0 - cf) else {
        return 0.0;
    };
    let f = (e + 0.5) / n;
    let r = (f + (z * z) / (2.0 * n)
        + z * ((f / n) - (f * f / n) + (z * z / (4.0 * n * n))).sqrt())
        / (1.0 + (z * z) / n);

    (r * n) - e
}
