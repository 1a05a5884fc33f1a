//! Summary statistics over a transformed batch
//!
//! The report is computed from a [`Batch`] alone and rendered through
//! `Display`, so printing it is the caller's business.

use crate::types::{Batch, CellValue};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Descriptive statistics of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    /// Non-null values
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    /// Describe a set of values, ignoring nulls
    pub fn describe<'a>(column: &str, values: impl Iterator<Item = &'a CellValue>) -> Self {
        let mut data: Vec<f64> = values.filter_map(CellValue::as_f64).collect();
        data.sort_by(f64::total_cmp);

        let count = data.len();
        let mean = (count > 0).then(|| data.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let var = data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        });

        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: data.first().copied(),
            p25: quantile(&data, 0.25),
            p50: quantile(&data, 0.50),
            p75: quantile(&data, 0.75),
            max: data.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of sorted data
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Distribution of the discriminant and statistics of the numeric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub discriminant: String,
    pub records: usize,
    /// Value and count, most frequent first
    pub distribution: Vec<(String, usize)>,
    pub columns: Vec<ColumnStats>,
}

impl SummaryReport {
    /// Summarize a batch
    ///
    /// Summary columns missing from the batch are skipped.
    pub fn from_batch(batch: &Batch, discriminant: &str, summary_columns: &[String]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        if let Some(values) = batch.column_values(discriminant) {
            for key in values.filter_map(CellValue::as_display) {
                *counts.entry(key).or_default() += 1;
            }
        }
        let mut distribution: Vec<(String, usize)> = counts.into_iter().collect();
        distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let columns = summary_columns
            .iter()
            .filter_map(|name| {
                batch
                    .column_values(name)
                    .map(|values| ColumnStats::describe(name, values))
            })
            .collect();

        Self {
            discriminant: discriminant.to_string(),
            records: batch.len(),
            distribution,
            columns,
        }
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.6}"))
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary Statistics ({} records)", self.records)?;
        writeln!(f)?;
        writeln!(f, "Condition {} Distribution:", self.discriminant)?;
        for (value, count) in &self.distribution {
            writeln!(f, "  {value:<12} {count:>8}")?;
        }

        if self.columns.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "Numerical Columns Statistics:")?;
        write!(f, "{:<8}", "")?;
        for col in &self.columns {
            write!(f, " {:>20}", col.column)?;
        }
        writeln!(f)?;

        let rows: [(&str, fn(&ColumnStats) -> String); 8] = [
            ("count", |c| format!("{:.6}", c.count as f64)),
            ("mean", |c| cell(c.mean)),
            ("std", |c| cell(c.std)),
            ("min", |c| cell(c.min)),
            ("25%", |c| cell(c.p25)),
            ("50%", |c| cell(c.p50)),
            ("75%", |c| cell(c.p75)),
            ("max", |c| cell(c.max)),
        ];
        for (label, render) in rows {
            write!(f, "{label:<8}")?;
            for col in &self.columns {
                write!(f, " {:>20}", render(col))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
