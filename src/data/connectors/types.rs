use std::fmt;

/// Numeric columns every burst batch must carry before labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredColumn {
    Direction,
    StartTime,
    EndTime,
    StartPrice,
    PeakPrice,
    EndPrice,
    CloseMid,
    Volume,
    TradeCount,
}

impl RequiredColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direction => "Direction",
            Self::StartTime => "StartTime",
            Self::EndTime => "EndTime",
            Self::StartPrice => "StartPrice",
            Self::PeakPrice => "PeakPrice",
            Self::EndPrice => "EndPrice",
            Self::CloseMid => "CloseMid",
            Self::Volume => "Volume",
            Self::TradeCount => "TradeCount",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Direction,
            Self::StartTime,
            Self::EndTime,
            Self::StartPrice,
            Self::PeakPrice,
            Self::EndPrice,
            Self::CloseMid,
            Self::Volume,
            Self::TradeCount,
        ]
    }

    /// Operator guidance when the column is absent.
    pub fn remediation(&self) -> &'static str {
        match self {
            // CloseMid was added in a later schema revision of the burst
            // detector output, so its absence means a stale upstream file.
            Self::CloseMid => {
                "Re-run the burst detector to regenerate the batch with end-of-day mid prices."
            }
            _ => "The batch is missing core burst fields; regenerate it from the burst detector.",
        }
    }
}

/// First rows of a batch, rendered for operator verification.
#[derive(Debug, Clone)]
pub struct BatchPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl fmt::Display for BatchPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                if value.len() > widths[i] {
                    widths[i] = value.len();
                }
            }
        }

        for (i, name) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{:>width$}", name, width = widths[i])?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{:>width$}", value, width = widths[i])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
