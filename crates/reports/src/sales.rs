use chrono::{Datelike, FixedOffset};
use serde::Serialize;

use tillbook_core::{Amount, CustomerId, ReportMonth, Sale};

pub const WEEK_BUCKETS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WeekBucket {
    pub label: String,
    pub total: Amount,
    pub count: usize,
}

/// Bucket index of a day of month. Days 29..=31 fold into the last bucket.
pub fn week_index(day_of_month: u32) -> usize {
    ((day_of_month.saturating_sub(1) / 7) as usize).min(WEEK_BUCKETS - 1)
}

/// Sales of `month` (read at `offset`) split into four weekly buckets.
pub fn weekly_sales(sales: &[Sale], month: ReportMonth, offset: FixedOffset) -> [WeekBucket; WEEK_BUCKETS] {
    let mut buckets: [WeekBucket; WEEK_BUCKETS] = std::array::from_fn(|i| WeekBucket {
        label: format!("Week {}", i + 1),
        ..WeekBucket::default()
    });
    for sale in sales.iter().filter(|s| month.contains(s.date, offset)) {
        let bucket = &mut buckets[week_index(sale.date.at_offset(offset).day())];
        bucket.total = bucket.total.saturating_add(sale.amount);
        bucket.count += 1;
    }
    buckets
}

/// Sales of one customer, newest first.
pub fn customer_sales(sales: &[Sale], customer_id: CustomerId) -> Vec<&Sale> {
    let mut history: Vec<&Sale> = sales.iter().filter(|s| s.customer_id == customer_id).collect();
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history
}
