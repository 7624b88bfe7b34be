//! Persisted result records and legacy-shape normalization.
//!
//! The producer writes exactly one shape: a versioned, self-describing
//! [`ScalingRecord`]. The reader tolerates two additional historical shapes
//! behind one explicit adapter ([`normalize_record`]) with the supported
//! shapes exhaustively enumerated — anything else is a
//! [`SimError::SchemaMismatch`], never a guess.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SimError;
use crate::sim::imposed::IMPOSED_WARNING;
use crate::sim::EpistemicClass;
use crate::stats::median;
use crate::sweep::SweepResult;

/// Current record schema version.
pub const SCHEMA_VERSION: u32 = 2;

/// One seed's persisted estimates and fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedCurve {
    /// Index of the child stream that produced this curve.
    pub seed_index: u64,
    /// Resolution estimate per flux point; `null` marks a failed search,
    /// never coerced to zero.
    pub delta: Vec<Option<f64>>,
    /// Fitted log-log slope, when available.
    pub slope: Option<f64>,
    /// Fitted log-log intercept, when available.
    pub intercept: Option<f64>,
}

/// Self-describing persisted result of one scaling run.
///
/// Carries everything needed to reproduce and interpret the run: the
/// explicit epistemic class tag, full simulation parameters, the base
/// seed, the flux grid, per-seed estimates, per-seed fits, aggregate
/// statistics, and the theoretical slope for comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRecord {
    /// Record schema version; see [`SCHEMA_VERSION`].
    pub schema_version: u32,
    /// Epistemic class tag, set by the producer and propagated verbatim.
    pub class: EpistemicClass,
    /// Human-readable model description.
    pub model: String,
    /// Full simulation parameters, for reproducibility.
    pub params: Value,
    /// Base seed all child streams derived from.
    pub base_seed: u64,
    /// Flux grid.
    pub phi: Vec<f64>,
    /// Per-seed curves and fits, ordered by seed index.
    pub seed_curves: Vec<SeedCurve>,
    /// Mean of the valid per-seed slopes.
    pub slope_mean: Option<f64>,
    /// Sample standard deviation (n−1) of the valid per-seed slopes.
    pub slope_std: Option<f64>,
    /// Percentile bootstrap 95% CI of the mean slope, when reliable.
    pub slope_ci95_mean: Option<[f64; 2]>,
    /// Theoretically expected slope, when one exists.
    pub expected_slope: Option<f64>,
    /// Number of seeds with a valid fit.
    pub n_valid_seeds: usize,
    /// Whether enough valid seeds backed the aggregate for the CI to be
    /// trustworthy.
    pub reliable: bool,
    /// Interpretation notes (e.g. the imposed-class warning).
    pub notes: Vec<String>,
    /// Free-form diagnostics (e.g. last effective rates, search brackets).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub diagnostics: Value,
}

fn opt_finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

impl ScalingRecord {
    /// Build a record from one multi-seed sweep.
    ///
    /// Imposed-class sweeps automatically carry [`IMPOSED_WARNING`] in
    /// their notes.
    pub fn from_sweep(sweep: &SweepResult, params: Value, mut notes: Vec<String>) -> Self {
        if sweep.class == EpistemicClass::Imposed {
            notes.insert(0, IMPOSED_WARNING.to_string());
        }

        let n_missing: usize = sweep
            .replicates
            .iter()
            .map(|rep| rep.curve.len() - rep.curve.n_valid())
            .sum();
        if n_missing > 0 {
            notes.push(format!(
                "{n_missing} flux point(s) across all seeds have no finite positive \
                 estimate and were excluded from fits"
            ));
        }

        let seed_curves = sweep
            .replicates
            .iter()
            .map(|rep| SeedCurve {
                seed_index: rep.seed_index,
                delta: rep.curve.delta().iter().copied().map(opt_finite).collect(),
                slope: rep.fit.map(|f| f.slope),
                intercept: rep.fit.map(|f| f.intercept),
            })
            .collect();

        Self {
            schema_version: SCHEMA_VERSION,
            class: sweep.class,
            model: sweep.model.clone(),
            params,
            base_seed: sweep.base_seed,
            phi: sweep.grid.clone(),
            seed_curves,
            slope_mean: sweep.aggregate.mean,
            slope_std: sweep.aggregate.std,
            slope_ci95_mean: sweep.aggregate.ci95.map(|ci| [ci.lo, ci.hi]),
            expected_slope: sweep.expected_slope,
            n_valid_seeds: sweep.aggregate.n_valid,
            reliable: sweep.aggregate.reliable,
            notes,
            diagnostics: Value::Null,
        }
    }

    /// Median resolution across the seed axis, per flux point.
    ///
    /// Flux points where no seed produced a valid estimate are `None`.
    /// This is the reduction the figure layer applies to per-seed-matrix
    /// records.
    pub fn median_curve(&self) -> Vec<Option<f64>> {
        (0..self.phi.len())
            .map(|k| {
                let mut column: Vec<f64> = self
                    .seed_curves
                    .iter()
                    .filter_map(|sc| sc.delta.get(k).copied().flatten())
                    .collect();
                if column.is_empty() {
                    None
                } else {
                    Some(median(&mut column))
                }
            })
            .collect()
    }
}

// ============================================================================
// Legacy shape normalization
// ============================================================================

fn parse_class(tag: &str) -> Result<EpistemicClass, SimError> {
    match tag {
        "0A" | "fixed-point-construction" => Ok(EpistemicClass::FixedPoint),
        "0B" | "imposed" => Ok(EpistemicClass::Imposed),
        "1" | "inference" => Ok(EpistemicClass::Inference),
        other => Err(SimError::SchemaMismatch(format!(
            "unknown class tag {other:?}"
        ))),
    }
}

fn f64_array(value: &Value, key: &str) -> Result<Vec<f64>, SimError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| SimError::SchemaMismatch(format!("missing array field {key:?}")))?
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| SimError::SchemaMismatch(format!("non-numeric entry in {key:?}")))
        })
        .collect()
}

fn opt_f64_row(row: &Value, key: &str) -> Result<Vec<Option<f64>>, SimError> {
    row.as_array()
        .ok_or_else(|| SimError::SchemaMismatch(format!("non-array row in {key:?}")))?
        .iter()
        .map(|v| match v {
            Value::Null => Ok(None),
            other => other
                .as_f64()
                .map(|x| opt_finite(x))
                .ok_or_else(|| SimError::SchemaMismatch(format!("non-numeric entry in {key:?}"))),
        })
        .collect()
}

/// Normalize a persisted JSON document into the current record shape.
///
/// Exactly three shapes are supported:
///
/// 1. **Versioned** — current [`ScalingRecord`] documents, recognized by a
///    `schema_version` field.
/// 2. **Nested** — historical `meta`/`data`/`fit` documents carrying a
///    single median series (`data.delta_t_median`).
/// 3. **Flat per-seed** — historical flat documents carrying a per-seed
///    matrix (`delta_t_per_seed`) and per-seed fit slopes.
///
/// # Errors
///
/// Returns [`SimError::SchemaMismatch`] for any other shape; the reader
/// must fail loudly rather than guess.
pub fn normalize_record(value: &Value) -> Result<ScalingRecord, SimError> {
    if value.get("schema_version").is_some() {
        return Ok(serde_json::from_value(value.clone())?);
    }
    if value.get("meta").is_some() {
        return normalize_nested(value);
    }
    if value.get("delta_t_per_seed").is_some() {
        return normalize_flat_per_seed(value);
    }
    Err(SimError::SchemaMismatch(
        "document is neither versioned, nested meta/data, nor flat per-seed".to_string(),
    ))
}

/// Historical nested shape: `{"meta": {...}, "data": {"phi": [...],
/// "delta_t_median": [...]}, "fit": {"slope": ..., "intercept": ...}}`.
fn normalize_nested(value: &Value) -> Result<ScalingRecord, SimError> {
    let meta = value
        .get("meta")
        .ok_or_else(|| SimError::SchemaMismatch("missing meta".into()))?;
    let data = value
        .get("data")
        .ok_or_else(|| SimError::SchemaMismatch("missing data".into()))?;

    let class_tag = meta
        .get("class")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::SchemaMismatch("meta.class missing or non-string".into()))?;
    let class = parse_class(class_tag)?;

    let phi = f64_array(data, "phi")?;
    let delta = f64_array(data, "delta_t_median")?;
    if delta.len() != phi.len() {
        return Err(SimError::SchemaMismatch(
            "phi and delta_t_median length mismatch".into(),
        ));
    }

    let fit = value.get("fit");
    let slope = fit.and_then(|f| f.get("slope")).and_then(Value::as_f64);
    let intercept = fit.and_then(|f| f.get("intercept")).and_then(Value::as_f64);

    Ok(ScalingRecord {
        schema_version: SCHEMA_VERSION,
        class,
        model: meta
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        params: meta.get("params").cloned().unwrap_or(Value::Null),
        base_seed: meta.get("seed").and_then(Value::as_u64).unwrap_or(0),
        phi,
        seed_curves: vec![SeedCurve {
            seed_index: 0,
            delta: delta.into_iter().map(opt_finite).collect(),
            slope,
            intercept,
        }],
        slope_mean: slope,
        slope_std: None,
        slope_ci95_mean: None,
        expected_slope: meta.get("expected_slope").and_then(Value::as_f64),
        n_valid_seeds: usize::from(slope.is_some()),
        reliable: false,
        notes: meta
            .get("notes")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        diagnostics: value.get("diagnostics").cloned().unwrap_or(Value::Null),
    })
}

/// Historical flat shape with a per-seed matrix: `{"class": "0B", "phi":
/// [...], "delta_t_per_seed": [[...], ...], "fit_slope_per_seed": [...],
/// ...}`.
fn normalize_flat_per_seed(value: &Value) -> Result<ScalingRecord, SimError> {
    let class_tag = value
        .get("class")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::SchemaMismatch("class missing or non-string".into()))?;
    let class = parse_class(class_tag)?;

    let phi = f64_array(value, "phi")?;

    let matrix = value
        .get("delta_t_per_seed")
        .and_then(Value::as_array)
        .ok_or_else(|| SimError::SchemaMismatch("delta_t_per_seed is not an array".into()))?;

    let slopes: Vec<Option<f64>> = match value.get("fit_slope_per_seed") {
        Some(Value::Array(arr)) => arr.iter().map(|v| v.as_f64()).collect(),
        _ => vec![None; matrix.len()],
    };
    let intercepts: Vec<Option<f64>> = match value.get("fit_intercept_per_seed") {
        Some(Value::Array(arr)) => arr.iter().map(|v| v.as_f64()).collect(),
        _ => vec![None; matrix.len()],
    };

    let mut seed_curves = Vec::with_capacity(matrix.len());
    for (i, row) in matrix.iter().enumerate() {
        let delta = opt_f64_row(row, "delta_t_per_seed")?;
        if delta.len() != phi.len() {
            return Err(SimError::SchemaMismatch(format!(
                "delta_t_per_seed row {i} length mismatch with phi"
            )));
        }
        seed_curves.push(SeedCurve {
            seed_index: i as u64,
            delta,
            slope: slopes.get(i).copied().flatten(),
            intercept: intercepts.get(i).copied().flatten(),
        });
    }

    let n_valid = seed_curves.iter().filter(|sc| sc.slope.is_some()).count();

    Ok(ScalingRecord {
        schema_version: SCHEMA_VERSION,
        class,
        model: value
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        params: Value::Null,
        base_seed: value.get("rng_base_seed").and_then(Value::as_u64).unwrap_or(0),
        phi,
        seed_curves,
        slope_mean: value.get("fit_slope_mean").and_then(Value::as_f64),
        slope_std: value.get("fit_slope_std").and_then(Value::as_f64),
        slope_ci95_mean: None,
        expected_slope: value
            .get("expected_slope_imposed")
            .or_else(|| value.get("expected_slope"))
            .and_then(Value::as_f64),
        n_valid_seeds: n_valid,
        reliable: n_valid >= crate::config::MIN_RELIABLE_SEEDS,
        notes: value
            .get("warning")
            .and_then(Value::as_str)
            .map(|w| vec![w.to_string()])
            .unwrap_or_default(),
        diagnostics: Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn versioned_round_trip() {
        let record = ScalingRecord {
            schema_version: SCHEMA_VERSION,
            class: EpistemicClass::Inference,
            model: "test".into(),
            params: json!({"d_star": 1.0}),
            base_seed: 123,
            phi: vec![10.0, 100.0],
            seed_curves: vec![SeedCurve {
                seed_index: 0,
                delta: vec![Some(0.5), None],
                slope: None,
                intercept: None,
            }],
            slope_mean: None,
            slope_std: None,
            slope_ci95_mean: None,
            expected_slope: Some(-1.0),
            n_valid_seeds: 0,
            reliable: false,
            notes: vec![],
            diagnostics: Value::Null,
        };

        let value = serde_json::to_value(&record).unwrap();
        let back = normalize_record(&value).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn failed_point_serializes_as_null() {
        let record = ScalingRecord {
            schema_version: SCHEMA_VERSION,
            class: EpistemicClass::Inference,
            model: String::new(),
            params: Value::Null,
            base_seed: 0,
            phi: vec![10.0],
            seed_curves: vec![SeedCurve {
                seed_index: 0,
                delta: vec![None],
                slope: None,
                intercept: None,
            }],
            slope_mean: None,
            slope_std: None,
            slope_ci95_mean: None,
            expected_slope: None,
            n_valid_seeds: 0,
            reliable: false,
            notes: vec![],
            diagnostics: Value::Null,
        };
        let text = serde_json::to_string(&record).unwrap();
        assert!(text.contains("\"delta\":[null]"), "got: {text}");
    }

    #[test]
    fn nested_shape_normalizes() {
        let legacy = json!({
            "meta": {
                "class": "0A",
                "model": "fixed-point construction consistency check",
                "params": {"D": 1.0, "sigma_m": 1.0},
                "seed": 123456,
                "expected_slope": -1.0 / 3.0,
                "notes": ["Exponent is encoded by design via the fixed-point closure."],
            },
            "data": {
                "phi": [10.0, 100.0, 1000.0],
                "delta_t_median": [0.3, 0.14, 0.065],
            },
            "fit": {"slope": -0.33, "intercept": 0.1},
        });

        let record = normalize_record(&legacy).unwrap();
        assert_eq!(record.class, EpistemicClass::FixedPoint);
        assert_eq!(record.base_seed, 123_456);
        assert_eq!(record.seed_curves.len(), 1);
        assert_eq!(record.seed_curves[0].slope, Some(-0.33));
        assert_eq!(record.slope_mean, Some(-0.33));
        assert_eq!(record.phi.len(), 3);
        assert_eq!(record.notes.len(), 1);
    }

    #[test]
    fn flat_per_seed_shape_normalizes_and_reduces() {
        let legacy = json!({
            "class": "0B",
            "warning": "Imposed-exponent generator",
            "alpha": 0.6,
            "phi": [10.0, 100.0],
            "delta_t_per_seed": [[0.4, 0.2], [0.6, 0.3], [0.5, null]],
            "fit_slope_per_seed": [-0.38, -0.39, -0.37],
            "fit_slope_mean": -0.38,
            "fit_slope_std": 0.01,
            "expected_slope_imposed": -0.3846,
            "rng_base_seed": 42,
        });

        let record = normalize_record(&legacy).unwrap();
        assert_eq!(record.class, EpistemicClass::Imposed);
        assert_eq!(record.seed_curves.len(), 3);
        assert_eq!(record.n_valid_seeds, 3);
        assert_eq!(record.notes, vec!["Imposed-exponent generator".to_string()]);

        // Median across the seed axis; the null entry is ignored.
        let median = record.median_curve();
        assert_eq!(median[0], Some(0.5));
        assert_eq!(median[1], Some(0.25));
    }

    #[test]
    fn unknown_shape_is_explicit_failure() {
        let err = normalize_record(&json!({"something": "else"})).unwrap_err();
        assert!(matches!(err, SimError::SchemaMismatch(_)));

        let err = normalize_record(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, SimError::SchemaMismatch(_)));
    }

    #[test]
    fn unknown_class_tag_rejected() {
        let legacy = json!({
            "meta": {"class": "0C"},
            "data": {"phi": [1.0], "delta_t_median": [1.0]},
        });
        let err = normalize_record(&legacy).unwrap_err();
        assert!(err.to_string().contains("unknown class tag"));
    }

    #[test]
    fn median_curve_empty_column_is_none() {
        let record = ScalingRecord {
            schema_version: SCHEMA_VERSION,
            class: EpistemicClass::Inference,
            model: String::new(),
            params: Value::Null,
            base_seed: 0,
            phi: vec![10.0, 100.0],
            seed_curves: vec![SeedCurve {
                seed_index: 0,
                delta: vec![None, Some(1.0)],
                slope: None,
                intercept: None,
            }],
            slope_mean: None,
            slope_std: None,
            slope_ci95_mean: None,
            expected_slope: None,
            n_valid_seeds: 0,
            reliable: false,
            notes: vec![],
            diagnostics: Value::Null,
        };
        assert_eq!(record.median_curve(), vec![None, Some(1.0)]);
    }
}
