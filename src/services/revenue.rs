use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Upserts the single revenue row for a booking: updates in place when one
/// exists, inserts otherwise. `amount = None` keeps the existing amount
/// (0.00 on first insert), which is what completion uses before the actual
/// figure is recorded.
pub fn record(
    conn: &Connection,
    booking_id: &str,
    revenue_date: NaiveDate,
    amount: Option<f64>,
) -> Result<(), AppError> {
    if let Some(amount) = amount {
        if amount < 0.0 || !amount.is_finite() {
            return Err(AppError::validation("total_revenue must be non-negative"));
        }
    }

    match queries::get_revenue_by_booking(conn, booking_id)? {
        Some(existing) => {
            let amount = round_cents(amount.unwrap_or(existing.total_revenue));
            queries::update_revenue(conn, &existing.id, revenue_date, amount)?;
        }
        None => {
            let amount = round_cents(amount.unwrap_or(0.0));
            queries::insert_revenue(
                conn,
                &uuid::Uuid::new_v4().to_string(),
                booking_id,
                revenue_date,
                amount,
            )?;
        }
    }
    Ok(())
}
