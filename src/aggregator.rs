//! Groups parsed records into output rows.
//!
//! Rows appear in the order their `GroupKey` was first seen. Totals are
//! exact and checked; the representative month is the last one seen.

use crate::error::TransformError;
use crate::record::{AggregatedRecord, GroupKey, InputRecord};
use log::debug;
use std::collections::HashMap;

/// Aggregates records into one row per `GroupKey`.
pub fn transform(records: &[InputRecord]) -> Result<Vec<AggregatedRecord>, TransformError> {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.add(record)?;
    }
    Ok(aggregator.finish())
}

/// Incremental, insertion-order-stable grouping.
#[derive(Debug, Default)]
pub struct Aggregator {
    /// Position of each key in `rows`.
    index: HashMap<GroupKey, usize>,

    /// Output rows in first-seen order.
    rows: Vec<AggregatedRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one record into its group.
    pub fn add(&mut self, record: &InputRecord) -> Result<(), TransformError> {
        let key = record.group_key();

        let Some(&idx) = self.index.get(&key) else {
            debug!("New group {}", key);
            self.index.insert(key.clone(), self.rows.len());
            self.rows.push(AggregatedRecord {
                key,
                total_paid: record.amount_paid,
                total_refunded: record.amount_refunded,
                payment_month: record.period,
            });
            return Ok(());
        };

        let row = &mut self.rows[idx];
        let overflow = || TransformError::Overflow {
            key: key.to_string(),
        };
        let total_paid = row
            .total_paid
            .checked_add(record.amount_paid)
            .ok_or_else(overflow)?;
        let total_refunded = row
            .total_refunded
            .checked_add(record.amount_refunded)
            .ok_or_else(overflow)?;

        row.total_paid = total_paid;
        row.total_refunded = total_refunded;
        row.payment_month = record.period;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn finish(self) -> Vec<AggregatedRecord> {
        self.rows
    }
}
