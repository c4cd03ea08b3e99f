use serde::{Deserialize, Serialize};

/// Column vocabulary for persisted burst batches.
pub mod column {
    pub const TICKER: &str = "Ticker";
    pub const DATE: &str = "Date";
    pub const BURST_ID: &str = "BurstID";
    pub const DIRECTION: &str = "Direction";
    pub const START_TIME: &str = "StartTime";
    pub const END_TIME: &str = "EndTime";
    pub const START_PRICE: &str = "StartPrice";
    pub const PEAK_PRICE: &str = "PeakPrice";
    pub const END_PRICE: &str = "EndPrice";
    pub const CLOSE_MID: &str = "CloseMid";
    pub const VOLUME: &str = "Volume";
    pub const TRADE_COUNT: &str = "TradeCount";

    pub const PERM_CLOSE: &str = "Perm_tCLOSE";
    pub const SOURCE: &str = "source";

    pub const DURATION: &str = "Duration";
    pub const PEAK_IMPACT: &str = "PeakImpact";
    pub const PRICE_CHANGE: &str = "PriceChange";
    pub const AVG_TRADE_SIZE: &str = "AvgTradeSize";
}

/// The fixed feature set the permanence model is trained on.
pub const FEATURE_COLUMNS: [&str; 7] = [
    column::DIRECTION,
    column::VOLUME,
    column::TRADE_COUNT,
    column::DURATION,
    column::PEAK_IMPACT,
    column::PRICE_CHANGE,
    column::AVG_TRADE_SIZE,
];

/// Key columns shown in the operator preview after augmentation.
pub const PREVIEW_COLUMNS: [&str; 7] = [
    column::TICKER,
    column::DATE,
    column::BURST_ID,
    column::DIRECTION,
    column::START_PRICE,
    column::PEAK_PRICE,
    column::PERM_CLOSE,
];

/// Fixed forward horizons at which mid prices may be sampled after burst end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    M1,
    M3,
    M5,
    M10,
}

impl Horizon {
    pub fn all() -> [Self; 4] {
        [Self::M1, Self::M3, Self::M5, Self::M10]
    }

    /// Input column holding the forward mid price for this horizon.
    pub fn mid_column(&self) -> &'static str {
        match self {
            Self::M1 => "Mid_1m",
            Self::M3 => "Mid_3m",
            Self::M5 => "Mid_5m",
            Self::M10 => "Mid_10m",
        }
    }

    /// Label column written by the augmenter for this horizon.
    pub fn label_column(&self) -> &'static str {
        match self {
            Self::M1 => "Perm_t1m",
            Self::M3 => "Perm_t3m",
            Self::M5 => "Perm_t5m",
            Self::M10 => "Perm_t10m",
        }
    }

    /// Engineered forward-return column for this horizon.
    pub fn fwd_return_column(&self) -> &'static str {
        match self {
            Self::M1 => "FwdRet_1m",
            Self::M3 => "FwdRet_3m",
            Self::M5 => "FwdRet_5m",
            Self::M10 => "FwdRet_10m",
        }
    }
}
