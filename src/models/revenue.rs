use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One revenue record per booking, enforced by a unique key on booking_id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revenue {
    pub id: String,
    pub booking_id: String,
    pub revenue_date: NaiveDate,
    pub total_revenue: f64,
    pub created_at: String,
}
