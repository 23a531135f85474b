use serde::Deserialize;
use std::fs;

use crate::error::{PredictError, StartupError};
use crate::types::{Cell, FeatureRow};

/// How one training-time column turns into encoded features.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Encoding {
    /// One-hot over the levels seen at fit time, in training order.
    Categorical { levels: Vec<String> },
    /// Passed through unchanged.
    Numeric,
}

#[derive(Debug, Deserialize)]
struct Column {
    name: String,
    #[serde(flatten)]
    encoding: Encoding,
}

/// The fitted pipeline artifact. Opaque to callers: columns, encodings and
/// weights come from the training side; this end only replays them. The
/// target was log-transformed at fit time, so the raw output is in log
/// space and `predict_price` exponentiates it.
#[derive(Debug, Deserialize)]
pub struct PricePipeline {
    columns: Vec<Column>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl PricePipeline {
    pub fn load(path: &str) -> Result<Self, StartupError> {
        let text = fs::read_to_string(path).map_err(|source| StartupError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and probe. The probe runs a synthetic row through the encoder
    /// so a coefficient-width mismatch fails here, not on the first request.
    pub fn from_json(text: &str) -> Result<Self, StartupError> {
        let pipeline: Self =
            serde_json::from_str(text).map_err(|source| StartupError::BadPipeline { source })?;
        pipeline.probe().map_err(StartupError::Probe)?;
        Ok(pipeline)
    }

    fn probe(&self) -> Result<(), PredictError> {
        let cells: Vec<Cell> = self
            .columns
            .iter()
            .map(|c| match &c.encoding {
                Encoding::Categorical { levels } => {
                    Cell::Text(levels.first().map(String::as_str).unwrap_or(""))
                }
                Encoding::Numeric => Cell::Num(0.0),
            })
            .collect();
        self.predict_log(&cells).map(|_| ())
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Forward pass: encode the positional row and dot it with the weights.
    /// Output is in log-price space.
    pub fn predict_log(&self, cells: &[Cell]) -> Result<f64, PredictError> {
        if cells.len() != self.columns.len() {
            return Err(PredictError::ColumnMismatch {
                got: cells.len(),
                expected: self.columns.len(),
            });
        }

        let mut x = Vec::with_capacity(self.coefficients.len());
        for (column, cell) in self.columns.iter().zip(cells) {
            match (&column.encoding, cell) {
                (Encoding::Categorical { levels }, Cell::Text(value)) => {
                    let hit = levels.iter().position(|l| l == value).ok_or_else(|| {
                        PredictError::UnseenCategory {
                            column: column.name.clone(),
                            value: value.to_string(),
                        }
                    })?;
                    for i in 0..levels.len() {
                        x.push(if i == hit { 1.0 } else { 0.0 });
                    }
                }
                (Encoding::Numeric, Cell::Num(value)) => x.push(*value),
                _ => {
                    return Err(PredictError::CellKind {
                        column: column.name.clone(),
                    })
                }
            }
        }

        if x.len() != self.coefficients.len() {
            return Err(PredictError::WidthMismatch {
                got: x.len(),
                expected: self.coefficients.len(),
            });
        }

        let log_price: f64 = self
            .coefficients
            .iter()
            .zip(&x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept;
        Ok(log_price)
    }

    /// Price in currency units: exp of the log-space prediction.
    pub fn predict_price(&self, row: &FeatureRow) -> Result<f64, PredictError> {
        Ok(self.predict_log(&row.cells())?.exp())
    }
}

/// Two decimals, thousands separators, rupee prefix.
pub fn format_price(amount: f64) -> String {
    let cents_total = (amount * 100.0).round() as i64;
    let whole = cents_total / 100;
    let cents = cents_total % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₹{grouped}.{cents:02}")
}
