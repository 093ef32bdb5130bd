use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use chrono::NaiveDate;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Sized for roughly a year of daily check-ins across the company.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Advisory "already checked in today" filter, keyed `user:date`.
///
/// Fast-negative only: a miss means the user definitely has no attendance
/// row today and the existence SELECT can be skipped; a hit must still be
/// confirmed against the database. The UNIQUE key on attendance remains the
/// authority either way.
static MARKED_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn key(user_name: &str, date: NaiveDate) -> String {
    format!("{}:{}", user_name.to_lowercase(), date)
}

/// Check whether the user might already be marked for `date`
/// (false positives possible)
pub fn might_be_marked(user_name: &str, date: NaiveDate) -> bool {
    MARKED_FILTER
        .read()
        .expect("attendance filter poisoned")
        .contains(&key(user_name, date))
}

/// Record a successful check-in in the filter
pub fn mark(user_name: &str, date: NaiveDate) {
    MARKED_FILTER
        .write()
        .expect("attendance filter poisoned")
        .add(&key(user_name, date));
}

/// Warm up the filter from today's attendance rows using streaming + batching
pub async fn warmup_attendance_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, NaiveDate)>(
        "SELECT user_name, date FROM attendance WHERE date = CURDATE()",
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (user_name, date) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(key(&user_name, date));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Attendance filter warmup complete: {} check-ins today", total);
    Ok(())
}

fn insert_batch(keys: &[String]) {
    let mut filter = MARKED_FILTER.write().expect("attendance filter poisoned");

    for k in keys {
        filter.add(k);
    }
}
