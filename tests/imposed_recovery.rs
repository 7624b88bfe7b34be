//! Slope recovery for the imposed-exponent generator: the fitter must
//! reproduce the hard-coded −1/(2+α) across the supported α range.

use fluxfit::config::log_grid;
use fluxfit::sim::imposed::ImposedParams;
use fluxfit::sweep::{alpha_sweep, multi_seed_sweep, SweepConfig};

#[test]
fn recovers_imposed_slope_across_alpha_range() {
    let grid = log_grid(1e1, 1e4, 8);
    for &alpha in &[0.0, 0.3, 0.6, 1.0, 1.5] {
        let params = ImposedParams::new(alpha).n_mc(2_000);
        let expected = -params.imposed_power();

        let sweep = multi_seed_sweep(
            &params,
            &grid,
            &SweepConfig::quick().n_seeds(8).base_seed(51),
        )
        .unwrap();
        let mean = sweep.aggregate.mean.unwrap();

        assert!(
            (mean - expected).abs() < 0.02,
            "alpha={alpha}: fitted {mean:.4}, expected {expected:.4}"
        );
    }
}

#[test]
fn negative_alpha_is_accepted() {
    // Sub-ballistic exponents steepen the imposed slope past −1/2.
    let grid = log_grid(1e1, 1e4, 8);
    let params = ImposedParams::new(-0.5).n_mc(2_000);
    let expected = -params.imposed_power();
    assert!((expected + 2.0 / 3.0).abs() < 1e-12);

    let sweep = multi_seed_sweep(&params, &grid, &SweepConfig::quick().base_seed(3)).unwrap();
    let mean = sweep.aggregate.mean.unwrap();
    assert!(
        (mean - expected).abs() < 0.05,
        "fitted {mean:.4}, expected {expected:.4}"
    );
}

#[test]
fn alpha_sweep_rows_track_expected_slopes() {
    let grid = log_grid(1e1, 1e4, 6);
    let rows = alpha_sweep(&[0.0, 0.6, 1.5], &grid, 1_000, 6, 123_456, 500).unwrap();

    assert_eq!(rows.len(), 3);
    for row in &rows {
        let mean = row.aggregate.mean.unwrap();
        assert!(
            (mean - row.expected).abs() < 0.05,
            "alpha={}: fitted {mean:.4}, expected {:.4}",
            row.alpha,
            row.expected
        );
        assert!(row.aggregate.reliable);
    }
}
