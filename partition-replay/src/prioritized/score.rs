//! Transform from raw priorities to priority scores.
use crate::error::{BufferError, Result};

/// Floor added to every score, keeping scores strictly positive.
pub const EPS: f64 = 1e-6;

/// Exponent of the priority magnitude.
pub const ALPHA: f64 = 0.6;

/// Returns the priority score `EPS + |p|^ALPHA` of a raw priority `p`.
///
/// Fails with [`BufferError::InvalidPriority`] if `p` is NaN or infinite.
pub fn priority_score(p: f64) -> Result<f64> {
    if !p.is_finite() {
        return Err(BufferError::InvalidPriority(p));
    }
    Ok(EPS + p.abs().powf(ALPHA))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_score() {
        assert_eq!(priority_score(0.0).unwrap(), EPS);
        assert!((priority_score(1.0).unwrap() - (1.0 + EPS)).abs() < 1e-12);
        assert_eq!(priority_score(-2.5).unwrap(), priority_score(2.5).unwrap());

        // 0.1^0.6 = 0.2511886...
        assert!((priority_score(0.1).unwrap() - 0.251_189).abs() < 1e-5);
        assert!(priority_score(5.0).unwrap() > priority_score(1.0).unwrap());
    }

    #[test]
    fn test_non_finite_priority() {
        assert!(priority_score(f64::NAN).is_err());
        assert_eq!(
            priority_score(f64::INFINITY),
            Err(BufferError::InvalidPriority(f64::INFINITY))
        );
    }
}
