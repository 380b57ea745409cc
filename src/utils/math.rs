/// Tolerance used by the tolerant comparisons below.
pub const SMALL: f64 = 1e-6;

pub fn normal_probability(a: f64) -> f64 {
    0.5 * (1.0 + libm::erf(a / (2.0f64).sqrt()))
}

/// Quantile of the standard normal distribution, `None` outside (0, 1).
pub fn normal_inverse(p: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    let (mut lo, mut hi) = (-40.0f64, 40.0f64);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if normal_probability(mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-15 {
            break;
        }
    }
    Some(0.5 * (lo + hi))
}

#[inline]
pub fn eq(a: f64, b: f64) -> bool {
    a - b < SMALL && b - a < SMALL
}

#[inline]
pub fn gr(a: f64, b: f64) -> bool {
    a - b > SMALL
}

#[inline]
pub fn gr_or_eq(a: f64, b: f64) -> bool {
    b - a < SMALL || a >= b
}

#[inline]
pub fn sm(a: f64, b: f64) -> bool {
    b - a > SMALL
}

#[inline]
pub fn sm_or_eq(a: f64, b: f64) -> bool {
    a - b < SMALL || a <= b
}

#[inline]
pub fn log2(a: f64) -> f64 {
    a.ln() / std::f64::consts::LN_2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn normal_inverse_matches_known_quantiles() {
        assert!(approx_eq(normal_inverse(0.5).unwrap(), 0.0, 1e-9));
        assert!(approx_eq(normal_inverse(0.75).unwrap(), 0.674_489_750_196, 1e-7));
        assert!(approx_eq(normal_inverse(0.975).unwrap(), 1.959_963_984_540, 1e-7));
        assert!(approx_eq(normal_inverse(0.025).unwrap(), -1.959_963_984_540, 1e-7));
    }

    #[test]
    fn normal_inverse_rejects_out_of_range() {
        assert!(normal_inverse(0.0).is_none());
        assert!(normal_inverse(1.0).is_none());
        assert!(normal_inverse(f64::NAN).is_none());
    }

    #[test]
    fn tolerant_comparisons() {
        assert!(eq(1.0, 1.0 + 1e-7));
        assert!(!eq(1.0, 1.0 + 1e-5));
        assert!(gr(1.0 + 1e-5, 1.0));
        assert!(!gr(1.0 + 1e-7, 1.0));
        assert!(gr_or_eq(1.0 - 1e-7, 1.0));
        assert!(sm(1.0, 1.0 + 1e-5));
        assert!(sm_or_eq(1.0 + 1e-7, 1.0));
        assert!(gr_or_eq(f64::INFINITY, f64::INFINITY));
    }

    #[test]
    fn log2_of_powers_of_two() {
        assert!(approx_eq(log2(8.0), 3.0, 1e-12));
        assert!(approx_eq(log2(1.0), 0.0, 1e-12));
    }
}
