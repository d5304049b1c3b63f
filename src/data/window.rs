use super::model::{Series, WavenumberRange};

// ---------------------------------------------------------------------------
// Range window: keep points inside a closed wavenumber interval
// ---------------------------------------------------------------------------

/// Return the points of `series` with `lo <= wavenumber <= hi`, where
/// `lo`/`hi` are `low`/`high` in whichever order the caller supplied them.
///
/// An empty result is a normal outcome, not an error.
pub fn window(series: &Series, low: f64, high: f64) -> Series {
    window_range(series, WavenumberRange::new(low, high))
}

/// Same as [`window`] with an already-normalised range.
pub fn window_range(series: &Series, range: WavenumberRange) -> Series {
    series
        .points()
        .filter(|&(x, _)| range.contains(x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Series {
        [
            (4000.0, 100.0),
            (3000.0, 80.0),
            (2000.0, 20.0),
            (1000.0, 90.0),
            (500.0, 95.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn selects_single_point_between_bounds() {
        let w = window(&sample(), 3500.0, 2500.0);
        assert_eq!(w.x(), &[3000.0]);
        assert_eq!(w.y(), &[80.0]);
    }

    #[test]
    fn bound_order_does_not_matter() {
        let s = sample();
        for (a, b) in [(3500.0, 2500.0), (4000.0, 500.0), (1000.0, 1000.0), (0.0, 10.0)] {
            assert_eq!(window(&s, a, b), window(&s, b, a));
        }
    }

    #[test]
    fn bounds_are_inclusive_and_order_is_kept() {
        let w = window(&sample(), 1000.0, 3000.0);
        assert_eq!(w.x(), &[3000.0, 2000.0, 1000.0]);
    }

    #[test]
    fn windowing_is_idempotent() {
        let once = window(&sample(), 3100.0, 900.0);
        let twice = window(&once, 3100.0, 900.0);
        assert_eq!(once, twice);
        assert!(once.x().iter().all(|&x| (900.0..=3100.0).contains(&x)));
    }

    #[test]
    fn range_outside_data_is_empty() {
        assert!(window(&sample(), 5000.0, 4500.0).is_empty());
        assert!(window(&Series::new(), 4000.0, 600.0).is_empty());
    }
}
