use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Counts **distinct** active bookings touching `date`. A booking with three
/// services on the same date occupies one slot, not three; counting service
/// rows instead would double-penalize multi-service customers.
///
/// Active means status is pending or accepted and the booking has not been
/// cancelled. `exclude_booking_id` removes one booking from the count, which
/// is how moves and accept-rechecks avoid counting the booking being changed
/// against itself.
pub fn count_active_bookings(
    conn: &Connection,
    date: NaiveDate,
    exclude_booking_id: Option<&str>,
) -> rusqlite::Result<i64> {
    let date_str = date.format("%Y-%m-%d").to_string();

    match exclude_booking_id {
        Some(exclude) => conn.query_row(
            "SELECT COUNT(DISTINCT b.id)
             FROM booking_services s
             JOIN bookings b ON s.booking_id = b.id
             JOIN booking_statuses st ON b.status_id = st.id
             WHERE s.appointment_date = ?1
               AND st.status_name IN ('pending', 'accepted')
               AND b.cancelled_at IS NULL
               AND b.id != ?2",
            params![date_str, exclude],
            |row| row.get(0),
        ),
        None => conn.query_row(
            "SELECT COUNT(DISTINCT b.id)
             FROM booking_services s
             JOIN bookings b ON s.booking_id = b.id
             JOIN booking_statuses st ON b.status_id = st.id
             WHERE s.appointment_date = ?1
               AND st.status_name IN ('pending', 'accepted')
               AND b.cancelled_at IS NULL",
            params![date_str],
            |row| row.get(0),
        ),
    }
}

pub fn has_capacity(
    conn: &Connection,
    date: NaiveDate,
    cap: u32,
    exclude_booking_id: Option<&str>,
) -> rusqlite::Result<bool> {
    let count = count_active_bookings(conn, date, exclude_booking_id)?;
    Ok(count < cap as i64)
}

pub fn remaining_slots(conn: &Connection, date: NaiveDate, cap: u32) -> rusqlite::Result<u32> {
    let count = count_active_bookings(conn, date, None)?;
    Ok((cap as i64 - count).max(0) as u32)
}

/// All dates in `[start, end]` with at least one free slot. One grouped query
/// over the range; dates absent from the result have zero active bookings.
pub fn available_dates(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
    cap: u32,
) -> rusqlite::Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT s.appointment_date, COUNT(DISTINCT b.id)
         FROM booking_services s
         JOIN bookings b ON s.booking_id = b.id
         JOIN booking_statuses st ON b.status_id = st.id
         WHERE s.appointment_date BETWEEN ?1 AND ?2
           AND st.status_name IN ('pending', 'accepted')
           AND b.cancelled_at IS NULL
         GROUP BY s.appointment_date",
    )?;
    let rows = stmt.query_map(
        params![
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        ],
        |row| {
            let date: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((date, count))
        },
    )?;

    let mut counts: HashMap<String, i64> = HashMap::new();
    for row in rows {
        let (date, count) = row?;
        counts.insert(date, count);
    }

    let mut available = vec![];
    let mut date = start;
    while date <= end {
        let count = counts
            .get(&date.format("%Y-%m-%d").to_string())
            .copied()
            .unwrap_or(0);
        if count < cap as i64 {
            available.push(date);
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    Ok(available)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db;
    use crate::db::queries;
    use crate::models::{BookingService, BookingStatus, Customer};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Inserts a booking with one service per date, returning the booking id.
    pub(crate) fn seed_booking(
        conn: &Connection,
        status: BookingStatus,
        dates: &[&str],
    ) -> String {
        let customer = Customer {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Test Customer".to_string(),
            phone: "0917-000-0000".to_string(),
            email: None,
            complete_address: "1 Test St".to_string(),
        };
        queries::insert_customer(conn, &customer).unwrap();

        let status_id = queries::status_id(conn, status).unwrap().unwrap();
        let booking_id = uuid::Uuid::new_v4().to_string();
        queries::insert_booking(conn, &booking_id, &customer.id, status_id).unwrap();

        for d in dates {
            let service = BookingService {
                id: uuid::Uuid::new_v4().to_string(),
                booking_id: booking_id.clone(),
                service_type: "cleaning".to_string(),
                appointment_date: date(d),
                appointment_time: None,
            };
            queries::insert_service(conn, &service).unwrap();
        }

        booking_id
    }

    #[test]
    fn test_empty_date_has_full_capacity() {
        let conn = setup_db();
        assert_eq!(count_active_bookings(&conn, date("2025-03-10"), None).unwrap(), 0);
        assert!(has_capacity(&conn, date("2025-03-10"), 2, None).unwrap());
        assert_eq!(remaining_slots(&conn, date("2025-03-10"), 2).unwrap(), 2);
    }

    #[test]
    fn test_multiple_services_count_as_one_booking() {
        let conn = setup_db();
        seed_booking(
            &conn,
            BookingStatus::Pending,
            &["2025-03-10", "2025-03-10", "2025-03-10"],
        );

        assert_eq!(count_active_bookings(&conn, date("2025-03-10"), None).unwrap(), 1);
        assert_eq!(remaining_slots(&conn, date("2025-03-10"), 2).unwrap(), 1);
    }

    #[test]
    fn test_two_bookings_fill_the_date() {
        let conn = setup_db();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-10"]);

        assert_eq!(count_active_bookings(&conn, date("2025-03-10"), None).unwrap(), 2);
        assert!(!has_capacity(&conn, date("2025-03-10"), 2, None).unwrap());
        assert_eq!(remaining_slots(&conn, date("2025-03-10"), 2).unwrap(), 0);
    }

    #[test]
    fn test_cancelled_and_completed_do_not_count() {
        let conn = setup_db();
        seed_booking(&conn, BookingStatus::Completed, &["2025-03-10"]);
        let cancelled = seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);

        let cancelled_status = queries::status_id(&conn, BookingStatus::Cancelled)
            .unwrap()
            .unwrap();
        queries::set_booking_cancelled(&conn, &cancelled, cancelled_status, "changed plans", None)
            .unwrap();

        assert_eq!(count_active_bookings(&conn, date("2025-03-10"), None).unwrap(), 0);
        assert_eq!(remaining_slots(&conn, date("2025-03-10"), 2).unwrap(), 2);
    }

    #[test]
    fn test_exclusion_removes_own_booking() {
        let conn = setup_db();
        let mine = seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);

        assert_eq!(count_active_bookings(&conn, date("2025-03-10"), None).unwrap(), 2);
        assert_eq!(
            count_active_bookings(&conn, date("2025-03-10"), Some(&mine)).unwrap(),
            1
        );
        assert!(has_capacity(&conn, date("2025-03-10"), 2, Some(&mine)).unwrap());
    }

    #[test]
    fn test_rescheduled_status_does_not_occupy_capacity() {
        let conn = setup_db();
        seed_booking(&conn, BookingStatus::Rescheduled, &["2025-03-10"]);
        assert_eq!(count_active_bookings(&conn, date("2025-03-10"), None).unwrap(), 0);
    }

    #[test]
    fn test_available_dates_filters_full_days() {
        let conn = setup_db();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-11"]);

        let available =
            available_dates(&conn, date("2025-03-09"), date("2025-03-12"), 2).unwrap();
        assert_eq!(
            available,
            vec![date("2025-03-09"), date("2025-03-11"), date("2025-03-12")]
        );
    }

    #[test]
    fn test_configurable_cap() {
        let conn = setup_db();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);

        assert!(!has_capacity(&conn, date("2025-03-10"), 2, None).unwrap());
        assert!(has_capacity(&conn, date("2025-03-10"), 3, None).unwrap());
        assert_eq!(remaining_slots(&conn, date("2025-03-10"), 3).unwrap(), 1);
    }
}
