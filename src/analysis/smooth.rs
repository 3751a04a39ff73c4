use super::FluxCurve;

/// Centered moving average over `[i - window/2, i + window/2]`.
///
/// The window is clipped at the edges, so edge values average fewer
/// samples. A width of 0 or 1 returns the curve unchanged.
pub fn smooth(curve: &[f64], window: usize) -> FluxCurve {
    let half = window / 2;
    let last = match curve.len().checked_sub(1) {
        Some(last) => last,
        None => return FluxCurve::default(),
    };

    (0..curve.len())
        .map(|i| {
            let span = &curve[i.saturating_sub(half)..=i.saturating_add(half).min(last)];
            span.iter().sum::<f64>() / span.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_for_narrow_windows() {
        let curve = vec![0.0, 3.0, 1.5, 7.25, 0.5];
        assert_eq!(smooth(&curve, 0).as_slice(), curve.as_slice());
        assert_eq!(smooth(&curve, 1).as_slice(), curve.as_slice());
    }

    #[test]
    fn test_edges_average_fewer_samples() {
        let curve = vec![0.0, 3.0, 6.0, 9.0];
        let out = smooth(&curve, 2);
        assert_eq!(out.as_slice(), &[1.5, 3.0, 6.0, 7.5]);
    }

    #[test]
    fn test_even_and_odd_widths_share_radius() {
        let curve: Vec<f64> = (0..20).map(|i| ((i * 37) % 11) as f64).collect();
        assert_eq!(smooth(&curve, 10), smooth(&curve, 11));
    }

    #[test]
    fn test_wide_window_flattens_to_mean() {
        let curve = vec![2.0, 4.0, 6.0];
        let out = smooth(&curve, 50);
        assert!(out.iter().all(|&v| (v - 4.0).abs() < 1e-12));
        assert_eq!(out.len(), curve.len());
    }

    #[test]
    fn test_empty_curve() {
        assert!(smooth(&[], 50).is_empty());
    }
}
