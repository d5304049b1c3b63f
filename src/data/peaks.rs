use serde::{Deserialize, Serialize};

use super::model::{Peak, Series};

// ---------------------------------------------------------------------------
// Extraction parameters
// ---------------------------------------------------------------------------

/// Caller-tunable knobs for negative-peak extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    /// Minimum topographic prominence, in %T.
    pub prominence: f64,
    /// Maximum number of peaks kept after ranking.
    pub top_n: usize,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            prominence: 0.1,
            top_n: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate minima
// ---------------------------------------------------------------------------

/// A local minimum of the transmission signal that passed the prominence
/// threshold. `index` points into the series the minimum was found in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub index: usize,
    pub prominence: f64,
}

/// Find all local minima of `y` whose prominence is at least `min_prominence`.
/// Results are in index order.
///
/// Works on the negated signal: a minimum of `y` is a maximum of `-y`.
/// Flat-bottomed minima report the middle sample (rounded down). The first
/// and last samples are never minima.
pub fn find_minima(y: &[f64], min_prominence: f64) -> Vec<Minimum> {
    let signal: Vec<f64> = y.iter().map(|v| -v).collect();

    local_maxima(&signal)
        .into_iter()
        .map(|index| Minimum {
            index,
            prominence: prominence(&signal, index),
        })
        .filter(|m| m.prominence >= min_prominence)
        .collect()
}

/// Indices of local maxima, including the midpoint of flat plateaus that
/// are strictly higher than both neighbours.
fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }
    let i_max = signal.len() - 1;
    let mut i = 1;
    while i < i_max {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < i_max && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let right_edge = ahead - 1;
                peaks.push((i + right_edge) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Height of `signal[peak]` above the higher of its two bases.
///
/// Each base is the lowest sample reached walking outwards from the peak
/// until a sample strictly higher than the peak (or the signal edge) is hit.
fn prominence(signal: &[f64], peak: usize) -> f64 {
    let height = signal[peak];

    let mut left_min = height;
    for &v in signal[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &signal[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

// ---------------------------------------------------------------------------
// Ranked negative peaks
// ---------------------------------------------------------------------------

/// The `top_n` most prominent absorption minima of `series`, most prominent
/// first. Equal prominences keep index order (stable sort).
///
/// Wavenumbers are truncated toward zero, transmissions rounded to two
/// decimals. Empty, single-point, flat and monotonic series give no peaks.
pub fn extract_negative_peaks(series: &Series, params: PeakParams) -> Vec<Peak> {
    let mut minima = find_minima(series.y(), params.prominence);
    minima.sort_by(|a, b| b.prominence.total_cmp(&a.prominence));
    minima.truncate(params.top_n);

    minima
        .into_iter()
        .map(|m| Peak {
            // TODO: switch to rounding once exported peak tables no longer
            // need to match earlier exports.
            wavenumber: series.x()[m.index] as i64,
            transmission: round2(series.y()[m.index]),
        })
        .collect()
}

/// Two-decimal rounding; exact halves go to the even digit (`20.125` → `20.12`).
fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> Series {
        points.iter().copied().collect()
    }

    fn params(prominence: f64, top_n: usize) -> PeakParams {
        PeakParams { prominence, top_n }
    }

    fn wavenumbers(peaks: &[Peak]) -> Vec<i64> {
        peaks.iter().map(|p| p.wavenumber).collect()
    }

    #[test]
    fn single_absorption_band() {
        let s = series(&[
            (4000.0, 100.0),
            (3000.0, 80.0),
            (2000.0, 20.0),
            (1000.0, 90.0),
            (500.0, 95.0),
        ]);
        let peaks = extract_negative_peaks(&s, params(0.1, 1));
        assert_eq!(
            peaks,
            vec![Peak {
                wavenumber: 2000,
                transmission: 20.0
            }]
        );
    }

    #[test]
    fn prominence_uses_higher_base() {
        let y = [10.0, 2.0, 6.0, 4.0, 8.0, 0.0, 10.0];
        let minima = find_minima(&y, 0.0);
        assert_eq!(
            minima,
            vec![
                Minimum { index: 1, prominence: 6.0 },
                Minimum { index: 3, prominence: 2.0 },
                Minimum { index: 5, prominence: 10.0 },
            ]
        );
    }

    #[test]
    fn ranks_by_prominence_and_truncates() {
        let x = [700.0, 600.0, 500.0, 400.0, 300.0, 200.0, 100.0];
        let y = [10.0, 2.0, 6.0, 4.0, 8.0, 0.0, 10.0];
        let s = series(&x.into_iter().zip(y).collect::<Vec<_>>());

        assert_eq!(wavenumbers(&extract_negative_peaks(&s, params(0.0, 10))), vec![200, 600, 400]);
        assert_eq!(wavenumbers(&extract_negative_peaks(&s, params(0.0, 2))), vec![200, 600]);
        assert!(extract_negative_peaks(&s, params(0.0, 0)).is_empty());
        // Threshold filters before ranking.
        assert_eq!(wavenumbers(&extract_negative_peaks(&s, params(2.5, 10))), vec![200, 600]);
    }

    #[test]
    fn equal_prominence_keeps_index_order() {
        let s = series(&[
            (5.0, 5.0),
            (4.0, 1.0),
            (3.0, 5.0),
            (2.0, 1.0),
            (1.0, 5.0),
        ]);
        let peaks = extract_negative_peaks(&s, PeakParams::default());
        assert_eq!(wavenumbers(&peaks), vec![4, 2]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let y = [1.0, 0.5, 1.0];
        assert_eq!(find_minima(&y, 0.5).len(), 1);
        assert!(find_minima(&y, 0.5000001).is_empty());
    }

    #[test]
    fn shallow_dips_below_default_prominence_are_ignored() {
        let s = series(&[(4.0, 50.0), (3.0, 49.95), (2.0, 50.0), (1.0, 50.0)]);
        assert!(extract_negative_peaks(&s, PeakParams::default()).is_empty());
    }

    #[test]
    fn flat_bottom_reports_middle_sample() {
        assert_eq!(find_minima(&[5.0, 1.0, 1.0, 1.0, 5.0], 0.0)[0].index, 2);
        assert_eq!(find_minima(&[5.0, 1.0, 1.0, 5.0], 0.0)[0].index, 1);
        // Plateau running into the edge is not a minimum.
        assert!(find_minima(&[5.0, 1.0, 1.0], 0.0).is_empty());
    }

    #[test]
    fn degenerate_series_have_no_peaks() {
        let p = PeakParams::default();
        assert!(extract_negative_peaks(&Series::new(), p).is_empty());
        assert!(extract_negative_peaks(&series(&[(1.0, 3.0)]), p).is_empty());
        assert!(extract_negative_peaks(&series(&[(2.0, 3.0), (1.0, 1.0)]), p).is_empty());
        let flat = series(&[(4.0, 7.0), (3.0, 7.0), (2.0, 7.0), (1.0, 7.0)]);
        assert!(extract_negative_peaks(&flat, p).is_empty());
    }

    #[test]
    fn monotonic_series_have_no_peaks() {
        let falling: Series = (0..50).map(|i| (4000.0 - i as f64, 100.0 - i as f64)).collect();
        let rising: Series = (0..50).map(|i| (4000.0 - i as f64, i as f64 * 0.5)).collect();
        assert!(extract_negative_peaks(&falling, params(0.0, 10)).is_empty());
        assert!(extract_negative_peaks(&rising, params(0.0, 10)).is_empty());
    }

    #[test]
    fn transmission_halves_round_to_even() {
        let minimum_at = |t: f64| {
            let s = series(&[(3.0, 90.0), (2.0, t), (1.0, 90.0)]);
            extract_negative_peaks(&s, PeakParams::default())[0].transmission
        };
        assert_eq!(minimum_at(20.125), 20.12);
        assert_eq!(minimum_at(45.625), 45.62);
        assert_eq!(minimum_at(45.375), 45.38);
        assert_eq!(minimum_at(12.875), 12.88);
        assert_eq!(minimum_at(20.456), 20.46);
    }

    #[test]
    fn wavenumber_truncates_and_transmission_rounds() {
        let s = series(&[(1235.9, 90.0), (1234.99, 20.456), (1233.1, 90.0)]);
        let peaks = extract_negative_peaks(&s, PeakParams::default());
        assert_eq!(peaks[0].wavenumber, 1234);
        assert_eq!(peaks[0].transmission, 20.46);
        assert_eq!(peaks[0].label(), "1234");

        let s = series(&[(-2.0, 9.0), (-3.7, 1.0), (-4.0, 9.0)]);
        assert_eq!(extract_negative_peaks(&s, PeakParams::default())[0].wavenumber, -3);
    }

    #[test]
    fn extraction_is_repeatable() {
        let s: Series = (0..400)
            .map(|i| {
                let x = 4000.0 - i as f64 * 5.0;
                (x, 90.0 - 40.0 * (-(x - 1700.0).powi(2) / 800.0).exp() + (i % 7) as f64 * 0.03)
            })
            .collect();
        let p = PeakParams::default();
        let first = extract_negative_peaks(&s, p);
        assert_eq!(first, extract_negative_peaks(&s, p));
        assert!(first.len() <= p.top_n);
        assert_eq!(first[0].wavenumber, 1700);
    }
}
