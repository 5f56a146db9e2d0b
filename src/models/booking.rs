use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub status: BookingStatus,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some() || self.status == BookingStatus::Cancelled
    }
}

/// One service line of a booking (e.g. "cleaning" on 2025-03-10). A booking
/// owns 1..N of these; the capacity ledger counts bookings, never these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingService {
    pub id: String,
    pub booking_id: String,
    pub service_type: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: Option<NaiveTime>,
}

/// AC-unit line item of a service: which unit type, how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcTypeLine {
    pub type_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Completed,
    Rescheduled,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Completed => "completed",
            BookingStatus::Rescheduled => "rescheduled",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "accepted" => Some(BookingStatus::Accepted),
            "completed" => Some(BookingStatus::Completed),
            "rescheduled" => Some(BookingStatus::Rescheduled),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Active bookings are the only ones that occupy date capacity.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            BookingStatus::Pending,
            BookingStatus::Accepted,
            BookingStatus::Completed,
            BookingStatus::Rescheduled,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(BookingStatus::from_str("confirmed"), None);
        assert_eq!(BookingStatus::from_str(""), None);
    }

    #[test]
    fn test_terminal_and_active() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());

        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Accepted.is_active());
        assert!(!BookingStatus::Rescheduled.is_active());
        assert!(!BookingStatus::Completed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
    }
}
