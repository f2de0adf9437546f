use std::fmt;

/// One tracked filesystem root. The key is the stable identifier that becomes
/// the CSV column name; the path may differ between environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub key: String,
    pub path: String,
}

impl Dimension {
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }

    /// CSV / report column name for this dimension.
    pub fn column(&self) -> String {
        format!("{}_gb", self.key)
    }
}

/// Outcome of one usage measurement. `Unavailable` is kept distinct from a
/// measured zero so failures stay visible in logs; the sample assembler folds
/// it to 0.0 when the row is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Gigabytes(f64),
    Unavailable,
}

impl Measurement {
    /// Collapse to the value recorded in the time series.
    pub fn or_zero(self) -> f64 {
        match self {
            Measurement::Gigabytes(gb) => gb,
            Measurement::Unavailable => 0.0,
        }
    }

    pub fn is_unavailable(self) -> bool {
        matches!(self, Measurement::Unavailable)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Gigabytes(gb) => write!(f, "{:.2} GB", gb),
            Measurement::Unavailable => write!(f, "unavailable"),
        }
    }
}
