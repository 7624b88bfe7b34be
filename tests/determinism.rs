//! Reproducibility guarantees: a fixed (base seed, stream index) pair must
//! give bit-identical results, and different base seeds must not.

use fluxfit::config::log_grid;
use fluxfit::sim::fixed_point::FixedPointParams;
use fluxfit::sim::imposed::ImposedParams;
use fluxfit::sweep::{multi_seed_sweep, SweepConfig};

#[test]
fn imposed_sweep_is_bit_identical_across_runs() {
    let params = ImposedParams::new(0.6).n_mc(200);
    let grid = log_grid(1e1, 1e4, 6);
    let config = SweepConfig::quick().n_seeds(4).base_seed(2024);

    let a = multi_seed_sweep(&params, &grid, &config).unwrap();
    let b = multi_seed_sweep(&params, &grid, &config).unwrap();

    for (ra, rb) in a.replicates.iter().zip(&b.replicates) {
        assert_eq!(ra.curve.delta(), rb.curve.delta());
    }
    assert_eq!(a.aggregate.ci95, b.aggregate.ci95);
}

#[test]
fn fixed_point_sweep_is_bit_identical_across_runs() {
    let params = FixedPointParams::new().n_mc(100).n_iter(8);
    let grid = log_grid(1e1, 1e3, 4);
    let config = SweepConfig::quick().n_seeds(3).base_seed(7);

    let a = multi_seed_sweep(&params, &grid, &config).unwrap();
    let b = multi_seed_sweep(&params, &grid, &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_base_seeds_give_different_estimates() {
    let params = ImposedParams::new(0.6).n_mc(200);
    let grid = log_grid(1e1, 1e4, 6);

    let a = multi_seed_sweep(&params, &grid, &SweepConfig::quick().base_seed(1)).unwrap();
    let b = multi_seed_sweep(&params, &grid, &SweepConfig::quick().base_seed(2)).unwrap();

    assert_ne!(
        a.replicates[0].curve.delta(),
        b.replicates[0].curve.delta()
    );
}

#[test]
fn replicate_streams_are_independent() {
    // Seed index k must produce the same curve whether or not other
    // replicates ran before it in the same sweep.
    let params = ImposedParams::new(0.6).n_mc(200);
    let grid = log_grid(1e1, 1e4, 6);

    let wide = multi_seed_sweep(&params, &grid, &SweepConfig::quick().n_seeds(5).base_seed(9))
        .unwrap();
    let narrow = multi_seed_sweep(&params, &grid, &SweepConfig::quick().n_seeds(2).base_seed(9))
        .unwrap();

    assert_eq!(
        wide.replicates[1].curve.delta(),
        narrow.replicates[1].curve.delta()
    );
}
