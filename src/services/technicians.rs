use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;

/// Replaces a booking's technician set. Names are trimmed, blanks dropped,
/// and the survivors upserted by exact (case-sensitive) name. This is a
/// replace, not a merge: technicians absent from `names` are detached, and
/// an empty cleaned list clears the assignment entirely. Returns the
/// booking's technician names after the swap.
pub fn replace_assignments(
    conn: &Connection,
    booking_id: &str,
    names: &[String],
) -> Result<Vec<String>, AppError> {
    let cleaned: Vec<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();

    queries::detach_booking_technicians(conn, booking_id)?;

    for name in cleaned {
        let technician_id = queries::upsert_technician(conn, name)?;
        queries::attach_booking_technician(conn, booking_id, &technician_id)?;
    }

    Ok(queries::technician_names_for_booking(conn, booking_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::BookingStatus;
    use crate::services::capacity::tests::seed_booking;

    fn setup() -> (Connection, String) {
        let conn = db::init_db(":memory:").unwrap();
        let booking_id = seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);
        (conn, booking_id)
    }

    #[test]
    fn test_assignment_is_replace_not_merge() {
        let (conn, booking_id) = setup();

        let names = replace_assignments(
            &conn,
            &booking_id,
            &["Alice".to_string(), "Bob".to_string()],
        )
        .unwrap();
        assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string()]);

        let names = replace_assignments(&conn, &booking_id, &["Carol".to_string()]).unwrap();
        assert_eq!(names, vec!["Carol".to_string()]);
    }

    #[test]
    fn test_blank_names_dropped_and_trimmed() {
        let (conn, booking_id) = setup();

        let names = replace_assignments(
            &conn,
            &booking_id,
            &["  Alice  ".to_string(), "".to_string(), "   ".to_string()],
        )
        .unwrap();
        assert_eq!(names, vec!["Alice".to_string()]);
    }

    #[test]
    fn test_empty_list_clears_assignments() {
        let (conn, booking_id) = setup();

        replace_assignments(&conn, &booking_id, &["Alice".to_string()]).unwrap();
        let names = replace_assignments(&conn, &booking_id, &[]).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_upsert_reuses_existing_technician() {
        let (conn, booking_id) = setup();
        let other = seed_booking(&conn, BookingStatus::Pending, &["2025-03-11"]);

        replace_assignments(&conn, &booking_id, &["Alice".to_string()]).unwrap();
        replace_assignments(&conn, &other, &["Alice".to_string()]).unwrap();

        let technicians = queries::list_technicians(&conn).unwrap();
        assert_eq!(technicians.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let (conn, booking_id) = setup();

        replace_assignments(&conn, &booking_id, &["alice".to_string(), "Alice".to_string()])
            .unwrap();
        let technicians = queries::list_technicians(&conn).unwrap();
        assert_eq!(technicians.len(), 2);
    }
}
