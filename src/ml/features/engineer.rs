use crate::data::connectors::SchemaValidator;
use crate::error::Result;
use crate::types::{column, Horizon};
use polars::prelude::*;

/// Derives model-ready numeric columns from raw burst fields. Pure
/// transform with no learned state; re-running it on the same frame yields
/// the same columns.
pub struct FeatureEngineer;

impl FeatureEngineer {
    pub fn new() -> Self {
        Self
    }

    /// Append engineered feature columns to the frame.
    ///
    /// The output column set adapts to the input schema: forward-return
    /// columns are derived only for horizons whose mid-price column exists.
    pub fn engineer(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();

        let start_time = Self::f64_column(df, column::START_TIME)?;
        let end_time = Self::f64_column(df, column::END_TIME)?;
        let start_price = Self::f64_column(df, column::START_PRICE)?;
        let peak_price = Self::f64_column(df, column::PEAK_PRICE)?;
        let end_price = Self::f64_column(df, column::END_PRICE)?;
        let volume = Self::f64_column(df, column::VOLUME)?;
        let trade_count = Self::f64_column(df, column::TRADE_COUNT)?;

        let n = df.height();
        let mut duration = Vec::with_capacity(n);
        let mut peak_impact = Vec::with_capacity(n);
        let mut price_change = Vec::with_capacity(n);
        let mut avg_trade_size = Vec::with_capacity(n);

        for i in 0..n {
            // Negative durations flag upstream corruption; they are kept
            // as-is here and excluded by downstream filtering.
            duration.push(match (end_time.get(i), start_time.get(i)) {
                (Some(e), Some(s)) => Some(e - s),
                _ => None,
            });

            peak_impact.push(match (peak_price.get(i), start_price.get(i)) {
                (Some(p), Some(s)) => Some((p - s).abs()),
                _ => None,
            });

            price_change.push(match (end_price.get(i), start_price.get(i)) {
                (Some(e), Some(s)) => Some(e - s),
                _ => None,
            });

            // Floor the denominator at 1 so zero-trade bursts still yield a
            // value (the raw volume) instead of being dropped.
            avg_trade_size.push(match (volume.get(i), trade_count.get(i)) {
                (Some(v), Some(t)) => Some(v / t.max(1.0)),
                _ => None,
            });
        }

        out.with_column(Series::new(column::DURATION.into(), duration))?;
        out.with_column(Series::new(column::PEAK_IMPACT.into(), peak_impact))?;
        out.with_column(Series::new(column::PRICE_CHANGE.into(), price_change))?;
        out.with_column(Series::new(column::AVG_TRADE_SIZE.into(), avg_trade_size))?;

        for horizon in Horizon::all() {
            if !SchemaValidator::has_column(df, horizon.mid_column()) {
                continue;
            }

            let mid = Self::f64_column(df, horizon.mid_column())?;
            let mut fwd_ret = Vec::with_capacity(n);
            for i in 0..n {
                fwd_ret.push(match (mid.get(i), end_price.get(i)) {
                    (Some(m), Some(e)) => Some(m - e),
                    _ => None,
                });
            }
            out.with_column(Series::new(horizon.fwd_return_column().into(), fwd_ret))?;
        }

        Ok(out)
    }

    fn f64_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
        let cast = df.column(name)?.cast(&DataType::Float64)?;
        Ok(cast.f64()?.clone())
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new()
    }
}
