//! Customer data sources.
//!
//! RULE: A source yields rows in a stable order and fails loudly.
//! Bad input data is not self-healing, so every problem here is a
//! hard stop before any evaluator runs.

use crate::{
    error::{PipelineError, PipelineResult},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One raw row per customer. Immutable input to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id:        CustomerId,
    pub monthly_usage_kwh:  f64,
    pub peak_usage_kwh:     f64,
    pub avg_outage_hours:   f64,
    pub last_bill_amount:   f64,
    pub payment_delay_days: f64,
    pub service_tickets:    f64,
}

/// Column names a tabular source must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "customer_id",
    "monthly_usage_kwh",
    "peak_usage_kwh",
    "avg_outage_hours",
    "last_bill_amount",
    "payment_delay_days",
    "service_tickets",
];

/// Produces the ordered customer population for one run.
pub trait CustomerSource: Send {
    /// Short label used in log lines.
    fn describe(&self) -> String;

    fn load(&self) -> PipelineResult<Vec<CustomerRecord>>;
}

// ── In-memory ────────────────────────────────────────────────────────────────

/// A fixed set of rows. Used by tests and when embedding the pipeline.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<CustomerRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }
}

impl CustomerSource for InMemorySource {
    fn describe(&self) -> String {
        format!("memory({} rows)", self.records.len())
    }

    fn load(&self) -> PipelineResult<Vec<CustomerRecord>> {
        Ok(self.records.clone())
    }
}

// ── Comma-separated file ─────────────────────────────────────────────────────

/// Header-driven comma-separated file. Column order is free and extra
/// columns are ignored; every entry of REQUIRED_COLUMNS must be present.
#[derive(Debug, Clone)]
pub struct CsvCustomerSource {
    path: PathBuf,
}

impl CsvCustomerSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl CustomerSource for CsvCustomerSource {
    fn describe(&self) -> String {
        format!("csv({})", self.path.display())
    }

    fn load(&self) -> PipelineResult<Vec<CustomerRecord>> {
        if !self.path.exists() {
            return Err(PipelineError::DataSourceNotFound {
                path: self.path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(&self.path)?;
        parse_customer_table(&content)
    }
}

/// Parse a header record plus data records. Blank lines are skipped and
/// a leading byte-order mark is ignored.
pub fn parse_customer_table(content: &str) -> PipelineResult<Vec<CustomerRecord>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records_in = split_records(content).into_iter();

    let header = match records_in.next() {
        Some((_, fields)) => fields,
        None => {
            return Err(PipelineError::MissingColumn {
                column: REQUIRED_COLUMNS[0].to_string(),
            })
        }
    };

    let mut index = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in index.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| PipelineError::MissingColumn { column: column.to_string() })?;
    }

    let mut records = Vec::new();
    for (row, fields) in records_in {
        let field = |pos: usize| -> PipelineResult<String> {
            fields.get(index[pos]).cloned().ok_or_else(|| PipelineError::InvalidValue {
                row,
                column: REQUIRED_COLUMNS[pos].to_string(),
                value: String::new(),
            })
        };
        let number = |pos: usize| -> PipelineResult<f64> {
            let raw = field(pos)?;
            raw.parse::<f64>().map_err(|_| PipelineError::InvalidValue {
                row,
                column: REQUIRED_COLUMNS[pos].to_string(),
                value: raw.to_string(),
            })
        };

        records.push(CustomerRecord {
            customer_id:        field(0)?,
            monthly_usage_kwh:  number(1)?,
            peak_usage_kwh:     number(2)?,
            avg_outage_hours:   number(3)?,
            last_bill_amount:   number(4)?,
            payment_delay_days: number(5)?,
            service_tickets:    number(6)?,
        });
    }

    Ok(records)
}

/// Split comma-separated text into records, each tagged with the
/// 1-based line it starts on. Quoted fields may contain commas, line
/// breaks and doubled quotes; unquoted fields are trimmed.
fn split_records(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    let mut line = 1;
    let mut start = 1;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if !was_quoted && field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                was_quoted = true;
            }
            '\n' if in_quotes => {
                line += 1;
                field.push(c);
            }
            _ if in_quotes => field.push(c),
            ',' => fields.push(finish_field(&mut field, &mut was_quoted)),
            '\n' => {
                fields.push(finish_field(&mut field, &mut was_quoted));
                push_record(&mut records, start, std::mem::take(&mut fields));
                line += 1;
                start = line;
            }
            // Padding after a closing quote and CR of CRLF endings.
            _ if was_quoted && c.is_whitespace() => {}
            '\r' => {}
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !fields.is_empty() || was_quoted {
        fields.push(finish_field(&mut field, &mut was_quoted));
        push_record(&mut records, start, fields);
    }
    records
}

fn finish_field(field: &mut String, was_quoted: &mut bool) -> String {
    let raw = std::mem::take(field);
    if std::mem::replace(was_quoted, false) {
        raw
    } else {
        raw.trim().to_string()
    }
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = fields.len() == 1 && fields[0].is_empty();
    if !blank {
        records.push((line, fields));
    }
}
