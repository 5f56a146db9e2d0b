use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingService, BookingStatus, Customer};
use crate::services::{capacity, revenue, technicians};

/// A validated booking submission. Handlers translate the wire format into
/// this before any persistence happens.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub complete_address: String,
    pub services: Vec<NewService>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub service_type: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub ac_types: Vec<NewAcLine>,
}

#[derive(Debug, Clone)]
pub struct NewAcLine {
    pub type_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CreatedBooking {
    pub booking_id: String,
    pub customer_id: String,
}

/// How a reschedule names its target service. The legacy surface matched on
/// the free-form service type string, which silently moved every service of
/// that type; a type string that matches more than one service is rejected
/// here instead.
#[derive(Debug, Clone)]
pub enum ServiceTarget {
    Id(String),
    Type(String),
}

fn validate_new_booking(req: &NewBooking) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if req.phone.trim().is_empty() {
        return Err(AppError::validation("phone is required"));
    }
    if req.complete_address.trim().is_empty() {
        return Err(AppError::validation("completeAddress is required"));
    }
    if req.services.is_empty() {
        return Err(AppError::validation("at least one service is required"));
    }
    for service in &req.services {
        if service.service_type.trim().is_empty() {
            return Err(AppError::validation("service type is required"));
        }
        if service.ac_types.is_empty() {
            return Err(AppError::validation(
                "each service needs at least one AC type",
            ));
        }
        for line in &service.ac_types {
            if line.type_name.trim().is_empty() {
                return Err(AppError::validation("AC type name is required"));
            }
            if line.quantity < 1 {
                return Err(AppError::validation("AC type quantity must be at least 1"));
            }
        }
    }
    Ok(())
}

fn require_status_id(conn: &Connection, status: BookingStatus) -> Result<i64, AppError> {
    queries::status_id(conn, status)?
        .ok_or_else(|| AppError::Integrity(format!("booking status '{}' not seeded", status.as_str())))
}

/// Creates a booking atomically: every distinct requested date must have a
/// free slot, checked and written inside one transaction so concurrent
/// creates cannot both squeeze past the cap. On any failure nothing is
/// persisted.
pub fn create_booking(
    conn: &mut Connection,
    cap: u32,
    req: &NewBooking,
) -> Result<CreatedBooking, AppError> {
    validate_new_booking(req)?;

    let tx = conn.transaction()?;

    let requested_dates: BTreeSet<NaiveDate> = req.services.iter().map(|s| s.date).collect();
    for date in &requested_dates {
        if !capacity::has_capacity(&tx, *date, cap, None)? {
            return Err(AppError::DateUnavailable(*date));
        }
    }

    // Upsert by (name, phone); contact details refresh on repeat bookings.
    let customer_id = match queries::find_customer(&tx, req.name.trim(), req.phone.trim())? {
        Some(existing) => {
            queries::update_customer_contact(
                &tx,
                &existing.id,
                req.email.as_deref(),
                &req.complete_address,
            )?;
            existing.id
        }
        None => {
            let customer = Customer {
                id: uuid::Uuid::new_v4().to_string(),
                name: req.name.trim().to_string(),
                phone: req.phone.trim().to_string(),
                email: req.email.clone(),
                complete_address: req.complete_address.clone(),
            };
            queries::insert_customer(&tx, &customer)?;
            customer.id
        }
    };

    let pending_id = require_status_id(&tx, BookingStatus::Pending)?;
    let booking_id = uuid::Uuid::new_v4().to_string();
    queries::insert_booking(&tx, &booking_id, &customer_id, pending_id)?;

    for service in &req.services {
        let booking_service = BookingService {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking_id.clone(),
            service_type: service.service_type.trim().to_string(),
            appointment_date: service.date,
            appointment_time: service.time,
        };
        queries::insert_service(&tx, &booking_service)?;

        for line in &service.ac_types {
            let ac_type_id = queries::upsert_ac_type(&tx, line.type_name.trim())?;
            queries::insert_ac_line(&tx, &booking_service.id, &ac_type_id, line.quantity)?;
        }
    }

    tx.commit()?;
    tracing::info!(%booking_id, %customer_id, "booking created");

    Ok(CreatedBooking {
        booking_id,
        customer_id,
    })
}

/// Accepts a pending booking. Capacity is re-validated for every current
/// service date (excluding this booking) because other bookings may have
/// claimed the dates between submission and acceptance. Returns the
/// booking's technician names after any assignment.
pub fn accept_booking(
    conn: &mut Connection,
    cap: u32,
    booking_id: &str,
    technician_names: Option<&[String]>,
) -> Result<Vec<String>, AppError> {
    let tx = conn.transaction()?;

    let booking = queries::get_booking(&tx, booking_id)?
        .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
    if booking.status.is_terminal() || booking.is_cancelled() {
        return Err(AppError::validation(format!(
            "cannot accept a {} booking",
            booking.status.as_str()
        )));
    }

    let services = queries::services_for_booking(&tx, booking_id)?;
    let dates: BTreeSet<NaiveDate> = services.iter().map(|s| s.appointment_date).collect();
    for date in &dates {
        if !capacity::has_capacity(&tx, *date, cap, Some(booking_id))? {
            return Err(AppError::DateUnavailable(*date));
        }
    }

    let accepted_id = require_status_id(&tx, BookingStatus::Accepted)?;
    queries::set_booking_status(&tx, booking_id, accepted_id)?;

    let names = match technician_names {
        Some(names) => technicians::replace_assignments(&tx, booking_id, names)?,
        None => queries::technician_names_for_booking(&tx, booking_id)?,
    };

    tx.commit()?;
    tracing::info!(booking_id, "booking accepted");

    Ok(names)
}

/// Completes a booking and records its revenue row. No capacity check:
/// completing never changes demand for future slots. Re-completing is
/// idempotent; the revenue upsert never duplicates.
pub fn complete_booking(conn: &mut Connection, booking_id: &str) -> Result<(), AppError> {
    let tx = conn.transaction()?;

    let booking = queries::get_booking(&tx, booking_id)?
        .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
    if booking.is_cancelled() {
        return Err(AppError::validation("cannot complete a cancelled booking"));
    }

    let completed_id = require_status_id(&tx, BookingStatus::Completed)?;
    queries::set_booking_status(&tx, booking_id, completed_id)?;

    revenue::record(&tx, booking_id, Utc::now().date_naive(), None)?;

    tx.commit()?;
    tracing::info!(booking_id, "booking completed");

    Ok(())
}

/// Cancels a non-terminal booking and stamps the cancellation metadata.
/// Capacity frees implicitly: the ledger derives counts live from current
/// status and dates, so there is no release step.
pub fn cancel_booking(
    conn: &mut Connection,
    booking_id: &str,
    reason: &str,
    cancelled_by: Option<&str>,
) -> Result<(), AppError> {
    if reason.trim().is_empty() {
        return Err(AppError::validation("cancellation_reason is required"));
    }

    let tx = conn.transaction()?;

    let booking = queries::get_booking(&tx, booking_id)?
        .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
    if booking.status.is_terminal() || booking.is_cancelled() {
        return Err(AppError::validation(format!(
            "cannot cancel a {} booking",
            booking.status.as_str()
        )));
    }

    if let Some(actor) = cancelled_by {
        if queries::get_customer(&tx, actor)?.is_none() {
            return Err(AppError::validation(format!("unknown customer: {actor}")));
        }
    }

    let cancelled_id = require_status_id(&tx, BookingStatus::Cancelled)?;
    queries::set_booking_cancelled(&tx, booking_id, cancelled_id, reason.trim(), cancelled_by)?;

    tx.commit()?;
    tracing::info!(booking_id, "booking cancelled");

    Ok(())
}

/// Moves one service to a new date (and optionally a new time), appending an
/// immutable audit row. The target's old date frees implicitly once the date
/// field is overwritten.
#[allow(clippy::too_many_arguments)]
pub fn reschedule_service(
    conn: &mut Connection,
    cap: u32,
    booking_id: &str,
    target: &ServiceTarget,
    new_date: NaiveDate,
    new_time: Option<NaiveTime>,
    reason: Option<&str>,
    rescheduled_by: Option<&str>,
) -> Result<BookingService, AppError> {
    let tx = conn.transaction()?;

    let booking = queries::get_booking(&tx, booking_id)?
        .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
    if booking.status.is_terminal() || booking.is_cancelled() {
        return Err(AppError::validation(format!(
            "cannot reschedule a {} booking",
            booking.status.as_str()
        )));
    }

    let service = match target {
        ServiceTarget::Id(id) => {
            let service = queries::get_service(&tx, id)?
                .ok_or_else(|| AppError::not_found(format!("service {id}")))?;
            if service.booking_id != booking_id {
                return Err(AppError::not_found(format!(
                    "service {id} on booking {booking_id}"
                )));
            }
            service
        }
        ServiceTarget::Type(name) => {
            let matches: Vec<BookingService> = queries::services_for_booking(&tx, booking_id)?
                .into_iter()
                .filter(|s| s.service_type == *name)
                .collect();
            match matches.len() {
                0 => {
                    return Err(AppError::not_found(format!(
                        "service '{name}' on booking {booking_id}"
                    )))
                }
                1 => matches.into_iter().next().ok_or_else(|| {
                    AppError::Integrity("service match vanished".to_string())
                })?,
                _ => {
                    return Err(AppError::validation(format!(
                        "booking has multiple '{name}' services; pass service_id to disambiguate"
                    )))
                }
            }
        }
    };

    if !capacity::has_capacity(&tx, new_date, cap, Some(booking_id))? {
        return Err(AppError::DateUnavailable(new_date));
    }

    // A reschedule without an explicit time keeps the existing one.
    let effective_time = new_time.or(service.appointment_time);

    queries::update_service_date(&tx, &service.id, new_date, effective_time)?;
    queries::insert_reschedule(
        &tx,
        &service.id,
        service.appointment_date,
        service.appointment_time,
        new_date,
        effective_time,
        reason,
        rescheduled_by,
    )?;

    tx.commit()?;
    tracing::info!(booking_id, service_id = %service.id, %new_date, "service rescheduled");

    Ok(BookingService {
        appointment_date: new_date,
        appointment_time: effective_time,
        ..service
    })
}

/// Generic status transition for the PATCH surface. Terminal states admit no
/// transitions; moving to `accepted` re-runs the capacity recheck so the
/// invariant cannot be bypassed through this endpoint; moving to `cancelled`
/// must go through `cancel_booking` because it carries metadata.
pub fn update_status(
    conn: &mut Connection,
    cap: u32,
    booking_id: &str,
    new_status: BookingStatus,
) -> Result<(), AppError> {
    match new_status {
        BookingStatus::Cancelled => Err(AppError::validation(
            "use the cancel endpoint to cancel a booking",
        )),
        BookingStatus::Accepted => {
            accept_booking(conn, cap, booking_id, None)?;
            Ok(())
        }
        BookingStatus::Completed => complete_booking(conn, booking_id),
        BookingStatus::Pending | BookingStatus::Rescheduled => {
            let tx = conn.transaction()?;

            let booking = queries::get_booking(&tx, booking_id)?
                .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
            if booking.status.is_terminal() || booking.is_cancelled() {
                return Err(AppError::validation(format!(
                    "cannot change status of a {} booking",
                    booking.status.as_str()
                )));
            }

            let status_id = require_status_id(&tx, new_status)?;
            queries::set_booking_status(&tx, booking_id, status_id)?;
            tx.commit()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::BookingStatus;
    use crate::services::capacity::tests::seed_booking;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_booking(dates: &[&str]) -> NewBooking {
        NewBooking {
            name: "Maria Santos".to_string(),
            phone: "0917-111-2222".to_string(),
            email: Some("maria@example.com".to_string()),
            complete_address: "12 Mabini St, Quezon City".to_string(),
            services: dates
                .iter()
                .map(|d| NewService {
                    service_type: "cleaning".to_string(),
                    date: date(d),
                    time: None,
                    ac_types: vec![NewAcLine {
                        type_name: "split".to_string(),
                        quantity: 2,
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_create_booking_persists_everything() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();

        let booking = queries::get_booking(&conn, &created.booking_id).unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.customer_id, created.customer_id);

        let services = queries::services_for_booking(&conn, &created.booking_id).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].appointment_date, date("2025-03-10"));

        let lines = queries::ac_lines_for_service(&conn, &services[0].id).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].type_name, "split");
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_create_reuses_customer_by_name_and_phone() {
        let mut conn = setup_db();
        let first = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();

        let mut repeat = new_booking(&["2025-04-01"]);
        repeat.complete_address = "99 New Address Ave".to_string();
        let second = create_booking(&mut conn, 2, &repeat).unwrap();

        assert_eq!(first.customer_id, second.customer_id);
        let customer = queries::get_customer(&conn, &first.customer_id).unwrap().unwrap();
        assert_eq!(customer.complete_address, "99 New Address Ave");
    }

    #[test]
    fn test_create_rejected_when_date_full() {
        let mut conn = setup_db();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-10"]);

        let err = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap_err();
        assert!(matches!(err, AppError::DateUnavailable(d) if d == date("2025-03-10")));
    }

    #[test]
    fn test_create_atomic_on_second_date_full() {
        let mut conn = setup_db();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-11"]);
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-11"]);

        // First date free, second full: nothing may persist.
        let err =
            create_booking(&mut conn, 2, &new_booking(&["2025-03-10", "2025-03-11"])).unwrap_err();
        assert!(matches!(err, AppError::DateUnavailable(d) if d == date("2025-03-11")));

        assert_eq!(
            capacity::count_active_bookings(&conn, date("2025-03-10"), None).unwrap(),
            0
        );
        assert!(queries::find_customer(&conn, "Maria Santos", "0917-111-2222")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_same_date_services_count_once_at_create() {
        let mut conn = setup_db();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-10"]);

        // Three services on one date consume a single slot.
        let created =
            create_booking(&mut conn, 2, &new_booking(&["2025-03-10", "2025-03-10", "2025-03-10"]))
                .unwrap();
        assert_eq!(
            capacity::count_active_bookings(&conn, date("2025-03-10"), None).unwrap(),
            2
        );

        let services = queries::services_for_booking(&conn, &created.booking_id).unwrap();
        assert_eq!(services.len(), 3);
    }

    #[test]
    fn test_accept_sets_status_and_assigns() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();

        let names = accept_booking(
            &mut conn,
            2,
            &created.booking_id,
            Some(&["Alice".to_string(), "Bob".to_string()]),
        )
        .unwrap();
        assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string()]);

        let booking = queries::get_booking(&conn, &created.booking_id).unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Accepted);
    }

    #[test]
    fn test_accept_rejected_when_date_filled_in_interim() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();

        // Two other bookings land on the date before acceptance.
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-10"]);

        let err = accept_booking(&mut conn, 2, &created.booking_id, None).unwrap_err();
        assert!(matches!(err, AppError::DateUnavailable(d) if d == date("2025-03-10")));

        let booking = queries::get_booking(&conn, &created.booking_id).unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_accept_missing_booking_is_not_found() {
        let mut conn = setup_db();
        let err = accept_booking(&mut conn, 2, "no-such-id", None).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_cancel_frees_capacity_immediately() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        assert!(!capacity::has_capacity(&conn, date("2025-03-10"), 2, None).unwrap());

        cancel_booking(&mut conn, &created.booking_id, "changed plans", None).unwrap();

        assert!(capacity::has_capacity(&conn, date("2025-03-10"), 2, None).unwrap());
        let booking = queries::get_booking(&conn, &created.booking_id).unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(booking.cancelled_at.is_some());
        assert_eq!(booking.cancellation_reason.as_deref(), Some("changed plans"));
    }

    #[test]
    fn test_cancel_requires_reason() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        let err = cancel_booking(&mut conn, &created.booking_id, "  ", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_cancel_twice_rejected() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        cancel_booking(&mut conn, &created.booking_id, "changed plans", None).unwrap();
        let err = cancel_booking(&mut conn, &created.booking_id, "again", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_complete_records_revenue_once() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();

        complete_booking(&mut conn, &created.booking_id).unwrap();
        complete_booking(&mut conn, &created.booking_id).unwrap();

        assert_eq!(queries::revenue_record_count(&conn).unwrap(), 1);
        let booking = queries::get_booking(&conn, &created.booking_id).unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[test]
    fn test_completed_booking_frees_capacity() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        complete_booking(&mut conn, &created.booking_id).unwrap();
        assert_eq!(
            capacity::count_active_bookings(&conn, date("2025-03-10"), None).unwrap(),
            0
        );
    }

    #[test]
    fn test_reschedule_moves_service_and_audits() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        let service = &queries::services_for_booking(&conn, &created.booking_id).unwrap()[0];

        let moved = reschedule_service(
            &mut conn,
            2,
            &created.booking_id,
            &ServiceTarget::Id(service.id.clone()),
            date("2025-03-15"),
            None,
            Some("customer request"),
            None,
        )
        .unwrap();
        assert_eq!(moved.appointment_date, date("2025-03-15"));

        // Old date freed, new date occupied.
        assert_eq!(
            capacity::count_active_bookings(&conn, date("2025-03-10"), None).unwrap(),
            0
        );
        assert_eq!(
            capacity::count_active_bookings(&conn, date("2025-03-15"), None).unwrap(),
            1
        );
        assert_eq!(
            queries::reschedule_count_for_service(&conn, &service.id).unwrap(),
            1
        );
    }

    #[test]
    fn test_reschedule_to_full_date_leaves_service_untouched() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-20"]);
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-20"]);

        let service = &queries::services_for_booking(&conn, &created.booking_id).unwrap()[0];
        let err = reschedule_service(
            &mut conn,
            2,
            &created.booking_id,
            &ServiceTarget::Id(service.id.clone()),
            date("2025-03-20"),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::DateUnavailable(d) if d == date("2025-03-20")));

        let unchanged = queries::get_service(&conn, &service.id).unwrap().unwrap();
        assert_eq!(unchanged.appointment_date, date("2025-03-10"));
        assert_eq!(
            queries::reschedule_count_for_service(&conn, &service.id).unwrap(),
            0
        );
    }

    #[test]
    fn test_reschedule_within_own_booking_dates_allowed() {
        let mut conn = setup_db();
        // Booking holds both slots-worth of services across two dates; moving
        // one service onto the other's date must not count itself.
        let created =
            create_booking(&mut conn, 2, &new_booking(&["2025-03-10", "2025-03-11"])).unwrap();
        seed_booking(&conn, BookingStatus::Pending, &["2025-03-11"]);

        let services = queries::services_for_booking(&conn, &created.booking_id).unwrap();
        let first = services
            .iter()
            .find(|s| s.appointment_date == date("2025-03-10"))
            .unwrap();

        reschedule_service(
            &mut conn,
            2,
            &created.booking_id,
            &ServiceTarget::Id(first.id.clone()),
            date("2025-03-11"),
            None,
            None,
            None,
        )
        .unwrap();
    }

    #[test]
    fn test_reschedule_by_ambiguous_type_rejected() {
        let mut conn = setup_db();
        let mut req = new_booking(&["2025-03-10", "2025-03-11"]);
        req.services[0].service_type = "repair".to_string();
        req.services[1].service_type = "repair".to_string();
        let created = create_booking(&mut conn, 2, &req).unwrap();

        let err = reschedule_service(
            &mut conn,
            2,
            &created.booking_id,
            &ServiceTarget::Type("repair".to_string()),
            date("2025-03-15"),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Neither service moved.
        let services = queries::services_for_booking(&conn, &created.booking_id).unwrap();
        assert!(services.iter().all(|s| s.appointment_date != date("2025-03-15")));
    }

    #[test]
    fn test_reschedule_by_unique_type_works() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();

        let moved = reschedule_service(
            &mut conn,
            2,
            &created.booking_id,
            &ServiceTarget::Type("cleaning".to_string()),
            date("2025-03-15"),
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(moved.appointment_date, date("2025-03-15"));
    }

    #[test]
    fn test_update_status_rejects_cancelled_shortcut() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        let err =
            update_status(&mut conn, 2, &created.booking_id, BookingStatus::Cancelled).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_update_status_to_accepted_rechecks_capacity() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-10"]);
        seed_booking(&conn, BookingStatus::Accepted, &["2025-03-10"]);

        let err =
            update_status(&mut conn, 2, &created.booking_id, BookingStatus::Accepted).unwrap_err();
        assert!(matches!(err, AppError::DateUnavailable(_)));
    }

    #[test]
    fn test_no_transitions_out_of_terminal_states() {
        let mut conn = setup_db();
        let created = create_booking(&mut conn, 2, &new_booking(&["2025-03-10"])).unwrap();
        cancel_booking(&mut conn, &created.booking_id, "changed plans", None).unwrap();

        let err =
            update_status(&mut conn, 2, &created.booking_id, BookingStatus::Pending).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = accept_booking(&mut conn, 2, &created.booking_id, None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = complete_booking(&mut conn, &created.booking_id).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
