use super::PipelineStore;
use crate::{
    data_source::{CustomerRecord, CustomerSource},
    error::PipelineResult,
};
use rusqlite::params;

impl PipelineStore {
    // ── Customer ──────────────────────────────────────────────────

    pub fn insert_customer(&self, c: &CustomerRecord) -> PipelineResult<()> {
        self.conn.execute(
            "INSERT INTO customer (
                customer_id, monthly_usage_kwh, peak_usage_kwh, avg_outage_hours,
                last_bill_amount, payment_delay_days, service_tickets
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &c.customer_id,
                c.monthly_usage_kwh,
                c.peak_usage_kwh,
                c.avg_outage_hours,
                c.last_bill_amount,
                c.payment_delay_days,
                c.service_tickets
            ],
        )?;
        Ok(())
    }

    /// Insert a whole table in one transaction.
    pub fn insert_customers(&mut self, records: &[CustomerRecord]) -> PipelineResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO customer (
                    customer_id, monthly_usage_kwh, peak_usage_kwh, avg_outage_hours,
                    last_bill_amount, payment_delay_days, service_tickets
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for c in records {
                stmt.execute(params![
                    &c.customer_id,
                    c.monthly_usage_kwh,
                    c.peak_usage_kwh,
                    c.avg_outage_hours,
                    c.last_bill_amount,
                    c.payment_delay_days,
                    c.service_tickets
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Fill an empty table; a populated one is left untouched.
    /// Returns how many rows were written.
    pub fn insert_customers_if_empty(&mut self, records: &[CustomerRecord]) -> PipelineResult<usize> {
        let existing = self.customer_count()?;
        if existing > 0 {
            log::warn!("store: customer table already holds {existing} rows, import skipped");
            return Ok(0);
        }
        self.insert_customers(records)?;
        Ok(records.len())
    }

    /// All customers in insertion order.
    pub fn load_customers(&self) -> PipelineResult<Vec<CustomerRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, monthly_usage_kwh, peak_usage_kwh, avg_outage_hours,
                    last_bill_amount, payment_delay_days, service_tickets
             FROM customer ORDER BY row_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CustomerRecord {
                customer_id:        row.get(0)?,
                monthly_usage_kwh:  row.get(1)?,
                peak_usage_kwh:     row.get(2)?,
                avg_outage_hours:   row.get(3)?,
                last_bill_amount:   row.get(4)?,
                payment_delay_days: row.get(5)?,
                service_tickets:    row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn customer_count(&self) -> PipelineResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM customer", [], |r| r.get(0))?)
    }
}

impl CustomerSource for PipelineStore {
    fn describe(&self) -> String {
        format!("sqlite({})", self.location())
    }

    fn load(&self) -> PipelineResult<Vec<CustomerRecord>> {
        self.load_customers()
    }
}
