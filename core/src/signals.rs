//! Signal builders: raw customer rows to per-customer stress signals.
//!
//! Every builder is a pure function of one CustomerRecord.
//! Population-relative values (amplification) are filled in later by
//! the feature builder once the risk state exists.

use crate::{data_source::CustomerRecord, types::CustomerId};
use serde::{Deserialize, Serialize};

/// Guards the volatility ratio against a zero usage mean.
pub const VOLATILITY_EPSILON: f64 = 1e-6;

/// Payment delay is expressed in 30-day months when inflating the bill.
pub const DELAY_DAYS_PER_MONTH: f64 = 30.0;

/// Engineered signal columns summarized by the risk state.
/// Declaration order is the order columns appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalColumn {
    UsageMean,
    UsageStd,
    UsageVolatility,
    OpsStress,
    FinancialStress,
    CxStress,
}

impl SignalColumn {
    /// The columns the risk state is built over.
    pub const RISK_COLUMNS: [SignalColumn; 6] = [
        SignalColumn::UsageMean,
        SignalColumn::UsageStd,
        SignalColumn::UsageVolatility,
        SignalColumn::OpsStress,
        SignalColumn::FinancialStress,
        SignalColumn::CxStress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsageMean       => "usage_mean",
            Self::UsageStd        => "usage_std",
            Self::UsageVolatility => "usage_volatility",
            Self::OpsStress       => "ops_stress",
            Self::FinancialStress => "financial_stress",
            Self::CxStress        => "cx_stress",
        }
    }
}

impl std::fmt::Display for SignalColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredSignals {
    pub customer_id:         CustomerId,
    pub usage_mean:          f64,
    pub usage_std:           f64,
    pub usage_volatility:    f64,
    pub ops_stress:          f64,
    pub financial_stress:    f64,
    pub cx_stress:           f64,
    /// 0–3: stress dimensions above their population p75.
    pub amplification_score: u8,
    pub customer_risk_score: f64,
}

impl EngineeredSignals {
    /// Derive every record-local signal. `amplification_score` starts at 0.
    pub fn from_record(record: &CustomerRecord) -> Self {
        let usage = usage_signals(record);
        let ops_stress = operational_stress(record);
        let financial_stress = financial_stress(record);
        let cx_stress = cx_stress(record.service_tickets, usage.volatility);

        Self {
            customer_id: record.customer_id.clone(),
            usage_mean: usage.mean,
            usage_std: usage.std,
            usage_volatility: usage.volatility,
            ops_stress,
            financial_stress,
            cx_stress,
            amplification_score: 0,
            customer_risk_score: crate::scoring::customer_risk_score(
                usage.volatility,
                ops_stress,
                financial_stress,
                cx_stress,
            ),
        }
    }

    pub fn value(&self, column: SignalColumn) -> f64 {
        match column {
            SignalColumn::UsageMean       => self.usage_mean,
            SignalColumn::UsageStd        => self.usage_std,
            SignalColumn::UsageVolatility => self.usage_volatility,
            SignalColumn::OpsStress       => self.ops_stress,
            SignalColumn::FinancialStress => self.financial_stress,
            SignalColumn::CxStress        => self.cx_stress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSignals {
    pub mean:       f64,
    pub std:        f64,
    pub volatility: f64,
}

/// Usage mean is the monthly figure; deviation is the distance to the peak.
pub fn usage_signals(record: &CustomerRecord) -> UsageSignals {
    let mean = record.monthly_usage_kwh;
    let std = (record.peak_usage_kwh - record.monthly_usage_kwh).abs();
    UsageSignals {
        mean,
        std,
        volatility: std / (mean + VOLATILITY_EPSILON),
    }
}

pub fn operational_stress(record: &CustomerRecord) -> f64 {
    record.avg_outage_hours
}

/// Bill size inflated by how many months the payment is late.
pub fn financial_stress(record: &CustomerRecord) -> f64 {
    record.last_bill_amount * (1.0 + record.payment_delay_days / DELAY_DAYS_PER_MONTH)
}

pub fn cx_stress(service_tickets: f64, usage_volatility: f64) -> f64 {
    service_tickets * usage_volatility
}
