//! Water balance: system input minus authorized consumption

/// Result of a water-balance calculation for one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterBalance {
    pub system_input_volume_m3: f64,
    pub billed_authorized_m3: f64,
    pub unbilled_authorized_m3: f64,
    pub nrw_m3: f64,
    pub nrw_pct: f64,
}

/// Compute NRW volume and percentage from raw balance volumes
///
/// Missing unbilled consumption counts as 0 and non-finite inputs are
/// treated as 0. A non-positive system input short-circuits the percentage
/// to 0; the volume is still reported and may be negative. Results that
/// overflow are reported as 0 so no non-finite value leaves the calculator.
pub fn water_balance(
    system_input_volume_m3: f64,
    billed_authorized_m3: f64,
    unbilled_authorized_m3: Option<f64>,
) -> WaterBalance {
    let system_input_volume_m3 = finite_or_zero(system_input_volume_m3);
    let billed_authorized_m3 = finite_or_zero(billed_authorized_m3);
    let unbilled_authorized_m3 = unbilled_authorized_m3.map_or(0.0, finite_or_zero);

    let nrw_m3 =
        finite_or_zero(system_input_volume_m3 - billed_authorized_m3 - unbilled_authorized_m3);
    let nrw_pct = if system_input_volume_m3 <= 0.0 {
        0.0
    } else {
        finite_or_zero(nrw_m3 / system_input_volume_m3 * 100.0)
    };

    WaterBalance {
        system_input_volume_m3,
        billed_authorized_m3,
        unbilled_authorized_m3,
        nrw_m3,
        nrw_pct,
    }
}

/// Sum of separately reported apparent and real losses, for display
///
/// `None` when neither component was reported. Never feeds `nrw_m3`.
pub fn reported_losses_m3(apparent: Option<f64>, real: Option<f64>) -> Option<f64> {
    match (apparent, real) {
        (None, None) => None,
        (a, r) => Some(finite_or_zero(
            a.map_or(0.0, finite_or_zero) + r.map_or(0.0, finite_or_zero),
        )),
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_basic() {
        let b = water_balance(10_000.0, 7_000.0, None);
        assert_eq!(b.nrw_m3, 3_000.0);
        assert!((b.nrw_pct - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_balance_with_unbilled() {
        let b = water_balance(5_000.0, 3_500.0, Some(250.0));
        assert_eq!(b.nrw_m3, 1_250.0);
        assert!((b.nrw_pct - b.nrw_m3 / 5_000.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_balance_zero_input() {
        let b = water_balance(0.0, 100.0, None);
        assert_eq!(b.nrw_m3, -100.0);
        assert_eq!(b.nrw_pct, 0.0);
    }

    #[test]
    fn test_balance_negative_input() {
        let b = water_balance(-50.0, 0.0, None);
        assert_eq!(b.nrw_pct, 0.0);
        assert_eq!(b.nrw_m3, -50.0);
    }

    #[test]
    fn test_balance_negative_pct_is_preserved() {
        // Billed more than was put in: a data-entry anomaly, kept visible
        let b = water_balance(1_000.0, 1_200.0, None);
        assert_eq!(b.nrw_m3, -200.0);
        assert!((b.nrw_pct + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_balance_non_finite_inputs() {
        let b = water_balance(f64::NAN, f64::INFINITY, Some(f64::NEG_INFINITY));
        assert_eq!(b.nrw_m3, 0.0);
        assert_eq!(b.nrw_pct, 0.0);
    }

    #[test]
    fn test_balance_overflow_stays_finite() {
        let b = water_balance(1.5e308, -1.5e308, None);
        assert!(b.nrw_m3.is_finite());
        assert!(b.nrw_pct.is_finite());
        assert_eq!(b.nrw_m3, 0.0);
        assert_eq!(b.nrw_pct, 0.0);

        // Volume fits, percentage overflows
        let b = water_balance(f64::MIN_POSITIVE, -f64::MAX / 2.0, None);
        assert!(b.nrw_m3.is_finite());
        assert_eq!(b.nrw_pct, 0.0);
    }

    #[test]
    fn test_reported_losses_overflow_stays_finite() {
        assert_eq!(reported_losses_m3(Some(f64::MAX), Some(f64::MAX)), Some(0.0));
    }

    #[test]
    fn test_reported_losses() {
        assert_eq!(reported_losses_m3(None, None), None);
        assert_eq!(reported_losses_m3(Some(10.0), None), Some(10.0));
        assert_eq!(reported_losses_m3(Some(10.0), Some(5.5)), Some(15.5));
    }
}
