//! Rounding and ratio helpers shared by the generators.

/// Rounds to two decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Integer efficiency percentage `round(base / actual * 100)`.
///
/// Zero or non-finite `actual` yields 0 so no NaN or infinity reaches a snapshot.
pub fn efficiency_pct(base: f64, actual: f64) -> u32 {
    if actual <= 0.0 || !actual.is_finite() {
        return 0;
    }
    let pct = (base / actual * 100.0).round();
    if pct.is_finite() && pct > 0.0 {
        pct as u32
    } else {
        0
    }
}

/// Draws `(U[0,1) - 0.5) * span`, i.e. uniform over `[-span/2, +span/2)`.
pub fn centered_draw<R: rand::Rng + ?Sized>(rng: &mut R, span: f64) -> f64 {
    (rng.random::<f64>() - 0.5) * span
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(88.0), 88.0);
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn efficiency_matches_reference_example() {
        assert_eq!(efficiency_pct(80.0, 88.0), 91);
        assert_eq!(efficiency_pct(150.0, 150.0), 100);
    }

    #[test]
    fn efficiency_guards_zero_consumption() {
        assert_eq!(efficiency_pct(80.0, 0.0), 0);
        assert_eq!(efficiency_pct(80.0, f64::NAN), 0);
    }

    #[test]
    fn centered_draw_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = centered_draw(&mut rng, 30.0);
            assert!((-15.0..15.0).contains(&v));
        }
    }

    #[test]
    fn centered_draw_with_zero_span_is_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(centered_draw(&mut rng, 0.0), 0.0);
    }
}
