use crate::data::connectors::{RequiredColumn, SchemaValidator};
use crate::error::{BurstPermError, Result};
use crate::types::{column, Horizon};
use polars::prelude::*;

/// Normalized persistence of a burst's price move at a settle point.
///
/// `permanence = direction × (settle − start_price) / |peak_price − start_price|`
///
/// Positive means the move persisted in its original direction, negative
/// means it reverted; magnitude can exceed 1 if price overshoots the peak.
/// Returns `None` for zero-impact bursts (peak equals start), which carry no
/// defined permanence.
pub fn permanence(direction: f64, start_price: f64, peak_price: f64, settle: f64) -> Option<f64> {
    let peak_impact = (peak_price - start_price).abs();
    if peak_impact == 0.0 {
        return None;
    }
    Some(direction * (settle - start_price) / peak_impact)
}

/// Outcome of an augmentation pass. The idempotent skip is a distinct
/// variant so callers can observe it without parsing log output.
#[derive(Debug)]
pub enum AugmentOutcome {
    /// The batch already carries `Perm_tCLOSE`; nothing was recomputed.
    AlreadyLabeled,
    /// The filtered, labeled batch to persist in place of the input.
    Labeled(DataFrame),
}

pub struct LabelAugmenter;

impl LabelAugmenter {
    pub fn new() -> Self {
        Self
    }

    /// Produce all permanence labels for a batch in one pass.
    ///
    /// Zero-impact rows are dropped before any label column is attached, so
    /// the returned batch may be smaller than the input. Horizon labels are
    /// computed only for horizons whose mid-price column is present.
    pub fn augment(&self, df: &DataFrame) -> Result<AugmentOutcome> {
        // A missing CloseMid signals a stale upstream schema and must fail
        // even when a label column is already present, so this precondition
        // comes before the idempotence guard.
        if !SchemaValidator::has_column(df, column::CLOSE_MID) {
            return Err(BurstPermError::Schema {
                column: RequiredColumn::CloseMid.as_str().to_string(),
                remediation: RequiredColumn::CloseMid.remediation().to_string(),
            });
        }

        if SchemaValidator::has_column(df, column::PERM_CLOSE) {
            return Ok(AugmentOutcome::AlreadyLabeled);
        }

        SchemaValidator::validate_bursts(df)?;

        let mut out = Self::drop_zero_impact(df)?;

        let close_labels = Self::settle_labels(&out, column::CLOSE_MID)?;
        out.with_column(Series::new(column::PERM_CLOSE.into(), close_labels))?;

        for horizon in Horizon::all() {
            if SchemaValidator::has_column(&out, horizon.mid_column()) {
                let labels = Self::settle_labels(&out, horizon.mid_column())?;
                out.with_column(Series::new(horizon.label_column().into(), labels))?;
            }
        }

        Ok(AugmentOutcome::Labeled(out))
    }

    /// Remove bursts with |PeakPrice − StartPrice| = 0. Their permanence is
    /// undefined and they must not reach the labeled output.
    fn drop_zero_impact(df: &DataFrame) -> Result<DataFrame> {
        let start = df.column(column::START_PRICE)?.cast(&DataType::Float64)?;
        let peak = df.column(column::PEAK_PRICE)?.cast(&DataType::Float64)?;
        let start = start.f64()?;
        let peak = peak.f64()?;

        let mut keep = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let impact = match (start.get(i), peak.get(i)) {
                (Some(s), Some(p)) => (p - s).abs(),
                _ => 0.0,
            };
            keep.push(Some(impact > 0.0));
        }

        let mask: BooleanChunked = keep.into_iter().collect();
        Ok(df.filter(&mask)?)
    }

    /// Per-row permanence against the given settle-price column. Rows with a
    /// missing settle price stay null rather than failing the batch.
    fn settle_labels(df: &DataFrame, settle_column: &str) -> Result<Vec<Option<f64>>> {
        let direction = df.column(column::DIRECTION)?.cast(&DataType::Float64)?;
        let start = df.column(column::START_PRICE)?.cast(&DataType::Float64)?;
        let peak = df.column(column::PEAK_PRICE)?.cast(&DataType::Float64)?;
        let settle = df.column(settle_column)?.cast(&DataType::Float64)?;

        let direction = direction.f64()?;
        let start = start.f64()?;
        let peak = peak.f64()?;
        let settle = settle.f64()?;

        let mut labels = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let label = match (direction.get(i), start.get(i), peak.get(i), settle.get(i)) {
                (Some(d), Some(s), Some(p), Some(m)) => permanence(d, s, p, m),
                _ => None,
            };
            labels.push(label);
        }

        Ok(labels)
    }
}

impl Default for LabelAugmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BurstPermError;
    use polars::df;

    fn batch() -> DataFrame {
        df! {
            "Ticker" => &["AAPL", "AAPL"],
            "Date" => &["2024-03-01", "2024-03-01"],
            "BurstID" => &[1i64, 2],
            "Direction" => &[1i64, -1],
            "StartTime" => &[34200.0, 34300.0],
            "EndTime" => &[34210.0, 34305.0],
            "StartPrice" => &[10.0, 20.0],
            "PeakPrice" => &[12.0, 20.0],
            "EndPrice" => &[11.5, 20.0],
            "CloseMid" => &[11.0, 19.0],
            "Volume" => &[500i64, 300],
            "TradeCount" => &[5i64, 3],
        }
        .unwrap()
    }

    #[test]
    fn test_permanence_formula() {
        // direction × (settle − start) / |peak − start|
        assert_eq!(permanence(1.0, 10.0, 12.0, 11.0), Some(0.5));
        assert_eq!(permanence(-1.0, 20.0, 18.0, 21.0), Some(-0.5));
        // Overshoot past the peak exceeds 1
        assert_eq!(permanence(1.0, 10.0, 12.0, 13.0), Some(1.5));
    }

    #[test]
    fn test_permanence_zero_impact_is_undefined() {
        assert_eq!(permanence(1.0, 10.0, 10.0, 11.0), None);
    }

    #[test]
    fn test_augment_drops_zero_impact_rows() {
        let df = batch();
        let outcome = LabelAugmenter::new().augment(&df).unwrap();
        let labeled = match outcome {
            AugmentOutcome::Labeled(df) => df,
            other => panic!("expected labeled batch, got {:?}", other),
        };

        // Second burst has PeakPrice == StartPrice and must be gone.
        assert_eq!(labeled.height(), 1);
        let perm = labeled.column("Perm_tCLOSE").unwrap().f64().unwrap();
        assert!((perm.get(0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_augment_is_idempotent() {
        let df = batch();
        let first = match LabelAugmenter::new().augment(&df).unwrap() {
            AugmentOutcome::Labeled(df) => df,
            other => panic!("expected labeled batch, got {:?}", other),
        };

        let second = LabelAugmenter::new().augment(&first).unwrap();
        assert!(matches!(second, AugmentOutcome::AlreadyLabeled));
    }

    #[test]
    fn test_augment_requires_close_mid() {
        let df = batch().drop("CloseMid").unwrap();
        match LabelAugmenter::new().augment(&df) {
            Err(BurstPermError::Schema { column, .. }) => assert_eq!(column, "CloseMid"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_labeled_batch_without_close_mid_still_fails() {
        // The stale-schema check outranks the idempotent skip: a batch that
        // somehow carries a label but no CloseMid is a hard error, not a
        // silent no-op.
        let mut df = batch().drop("CloseMid").unwrap();
        df.with_column(Series::new("Perm_tCLOSE".into(), vec![0.5, -0.5]))
            .unwrap();

        match LabelAugmenter::new().augment(&df) {
            Err(BurstPermError::Schema { column, remediation }) => {
                assert_eq!(column, "CloseMid");
                assert!(remediation.contains("Re-run the burst detector"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_augment_computes_present_horizons_only() {
        let mut df = batch();
        df.with_column(Series::new("Mid_1m".into(), vec![10.5, 20.0]))
            .unwrap();

        let labeled = match LabelAugmenter::new().augment(&df).unwrap() {
            AugmentOutcome::Labeled(df) => df,
            other => panic!("expected labeled batch, got {:?}", other),
        };

        // Mid_1m present: Perm_t1m = 1 × (10.5 − 10) / 2 = 0.25
        let perm_1m = labeled.column("Perm_t1m").unwrap().f64().unwrap();
        assert!((perm_1m.get(0).unwrap() - 0.25).abs() < 1e-12);

        // Mid_3m absent: no Perm_t3m column, and no error.
        assert!(!SchemaValidator::has_column(&labeled, "Perm_t3m"));
    }
}
