//! Synthetic customer populations: reproducible input for demos and tests.
//!
//! Shape, not realism: most customers are calm, a minority carry long
//! outages, late payments or ticket bursts, so every evaluator branch
//! is reachable from a plain seed.

use crate::{
    data_source::{CustomerRecord, CustomerSource},
    error::PipelineResult,
    rng::{ColumnStream, StreamSlot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticPopulation {
    pub seed: u64,
    pub size: usize,
}

impl SyntheticPopulation {
    pub fn new(seed: u64, size: usize) -> Self {
        Self { seed, size }
    }

    pub fn generate(&self) -> Vec<CustomerRecord> {
        let stream = |slot| ColumnStream::new(self.seed, slot);
        let mut usage = stream(StreamSlot::Usage);
        let mut outage = stream(StreamSlot::Outage);
        let mut billing = stream(StreamSlot::Billing);
        let mut delay = stream(StreamSlot::PaymentDelay);
        let mut tickets = stream(StreamSlot::Tickets);

        (0..self.size)
            .map(|i| {
                let monthly = usage.uniform(150.0, 1_200.0);
                // Peak sits above the monthly figure; one in ten spikes hard.
                let spike = if usage.chance(0.10) {
                    usage.uniform(0.6, 1.5)
                } else {
                    usage.uniform(0.0, 0.35)
                };

                let outage_hours = if outage.chance(0.20) {
                    outage.pareto(4.0, 1.6).min(96.0)
                } else {
                    outage.uniform(0.0, 3.0)
                };

                let bill = billing.pareto(60.0, 2.5).min(5_000.0);

                let delay_days = if delay.chance(0.25) {
                    delay.below(90) as f64
                } else {
                    0.0
                };

                let ticket_count = if tickets.chance(0.15) {
                    3 + tickets.below(8)
                } else {
                    tickets.below(3)
                };

                CustomerRecord {
                    customer_id:        format!("C-{i:06}"),
                    monthly_usage_kwh:  round_to(monthly, 1),
                    peak_usage_kwh:     round_to(monthly * (1.0 + spike), 1),
                    avg_outage_hours:   round_to(outage_hours, 2),
                    last_bill_amount:   round_to(bill, 2),
                    payment_delay_days: delay_days,
                    service_tickets:    ticket_count as f64,
                }
            })
            .collect()
    }
}

impl CustomerSource for SyntheticPopulation {
    fn describe(&self) -> String {
        format!("synthetic(seed={}, size={})", self.seed, self.size)
    }

    fn load(&self) -> PipelineResult<Vec<CustomerRecord>> {
        Ok(self.generate())
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
