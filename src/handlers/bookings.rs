use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AcTypeLine, Booking, BookingStatus, Customer, Revenue};
use crate::services::{capacity, lifecycle};
use crate::state::AppState;

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date: {s} (expected YYYY-MM-DD)")))
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| AppError::validation(format!("invalid time: {s} (expected HH:MM)")))
}

// ── Shared booking view ──

#[derive(Serialize)]
pub struct ServiceView {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub ac_types: Vec<AcTypeLine>,
}

#[derive(Serialize)]
pub struct BookingView {
    pub id: String,
    pub status: String,
    pub customer: Customer,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub created_at: String,
    pub services: Vec<ServiceView>,
    pub technicians: Vec<String>,
    pub revenue: Option<Revenue>,
}

pub(crate) fn service_views(conn: &Connection, booking_id: &str) -> Result<Vec<ServiceView>, AppError> {
    let mut views = vec![];
    for service in queries::services_for_booking(conn, booking_id)? {
        let ac_types = queries::ac_lines_for_service(conn, &service.id)?;
        views.push(ServiceView {
            id: service.id,
            service_type: service.service_type,
            date: service.appointment_date,
            time: service.appointment_time.map(|t| t.format("%H:%M").to_string()),
            ac_types,
        });
    }
    Ok(views)
}

pub(crate) fn booking_view(conn: &Connection, booking: &Booking) -> Result<BookingView, AppError> {
    let customer = queries::get_customer(conn, &booking.customer_id)?.ok_or_else(|| {
        AppError::Integrity(format!("booking {} references a missing customer", booking.id))
    })?;

    Ok(BookingView {
        id: booking.id.clone(),
        status: booking.status.as_str().to_string(),
        customer,
        cancelled_at: booking.cancelled_at.clone(),
        cancellation_reason: booking.cancellation_reason.clone(),
        cancelled_by: booking.cancelled_by.clone(),
        created_at: booking.created_at.clone(),
        services: service_views(conn, &booking.id)?,
        technicians: queries::technician_names_for_booking(conn, &booking.id)?,
        revenue: queries::get_revenue_by_booking(conn, &booking.id)?,
    })
}

// GET /bookings/available-dates
#[derive(Deserialize)]
pub struct AvailableDatesQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub async fn available_dates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableDatesQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    if query.end < query.start {
        return Err(AppError::validation("end must not be before start"));
    }

    let dates = {
        let db = state.db.lock().unwrap();
        capacity::available_dates(&db, query.start, query.end, state.config.daily_booking_cap)?
    };

    Ok(Json(
        dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
    ))
}

// POST /bookings/check-date-availability
#[derive(Deserialize)]
pub struct CheckDatesRequest {
    pub dates: Vec<String>,
}

#[derive(Serialize)]
pub struct DateAvailability {
    pub available: bool,
    pub remaining_slots: u32,
}

pub async fn check_date_availability(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CheckDatesRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.dates.is_empty() {
        return Err(AppError::validation("no dates provided for checking"));
    }

    let cap = state.config.daily_booking_cap;
    let mut result: BTreeMap<String, DateAvailability> = BTreeMap::new();
    {
        let db = state.db.lock().unwrap();
        for raw in &body.dates {
            let date = parse_date(raw)?;
            let remaining = capacity::remaining_slots(&db, date, cap)?;
            result.insert(
                raw.clone(),
                DateAvailability {
                    available: remaining > 0,
                    remaining_slots: remaining,
                },
            );
        }
    }

    Ok(Json(serde_json::json!({ "dates": result })))
}

// GET /bookings/by-date
#[derive(Deserialize)]
pub struct ByDateQuery {
    pub date: NaiveDate,
}

#[derive(Serialize)]
struct ByDateRow {
    booking_id: String,
    name: String,
    phone: String,
    service_type: String,
    appointment_date: String,
    appointment_time: Option<String>,
    status_name: String,
    ac_type: Option<String>,
    quantity: Option<i64>,
}

pub async fn bookings_by_date(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cap = state.config.daily_booking_cap;

    let (total_bookings, total_services, available_slots, rows) = {
        let db = state.db.lock().unwrap();
        let total_bookings = capacity::count_active_bookings(&db, query.date, None)?;
        let total_services = queries::active_service_count(&db, query.date)?;
        let available_slots = capacity::remaining_slots(&db, query.date, cap)?;
        let rows: Vec<ByDateRow> = queries::service_rows_for_date(&db, query.date)?
            .into_iter()
            .map(|r| ByDateRow {
                booking_id: r.booking_id,
                name: r.customer_name,
                phone: r.customer_phone,
                service_type: r.service_type,
                appointment_date: r.appointment_date,
                appointment_time: r.appointment_time,
                status_name: r.status_name,
                ac_type: r.ac_type,
                quantity: r.quantity,
            })
            .collect();
        (total_bookings, total_services, available_slots, rows)
    };

    Ok(Json(serde_json::json!({
        "date": query.date.format("%Y-%m-%d").to_string(),
        "total_bookings": total_bookings,
        "total_services": total_services,
        "available_slots": available_slots,
        "bookings": rows,
    })))
}

// POST /bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "completeAddress")]
    pub complete_address: String,
    #[serde(default)]
    pub services: Vec<ServiceRequest>,
}

#[derive(Deserialize)]
pub struct ServiceRequest {
    #[serde(rename = "type")]
    pub service_type: String,
    pub date: String,
    pub time: Option<String>,
    #[serde(rename = "acTypes", default)]
    pub ac_types: Vec<AcTypeRequest>,
}

#[derive(Deserialize)]
pub struct AcTypeRequest {
    #[serde(rename = "type")]
    pub type_name: String,
    pub quantity: u32,
}

impl CreateBookingRequest {
    fn into_new_booking(self) -> Result<lifecycle::NewBooking, AppError> {
        let mut services = vec![];
        for service in self.services {
            services.push(lifecycle::NewService {
                service_type: service.service_type,
                date: parse_date(&service.date)?,
                time: service.time.as_deref().map(parse_time).transpose()?,
                ac_types: service
                    .ac_types
                    .into_iter()
                    .map(|l| lifecycle::NewAcLine {
                        type_name: l.type_name,
                        quantity: l.quantity,
                    })
                    .collect(),
            });
        }
        Ok(lifecycle::NewBooking {
            name: self.name,
            phone: self.phone,
            email: self.email,
            complete_address: self.complete_address,
            services,
        })
    }
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = body.into_new_booking()?;

    let created = {
        let mut db = state.db.lock().unwrap();
        lifecycle::create_booking(&mut db, state.config.daily_booking_cap, &req)?
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "bookingId": created.booking_id,
        "customerId": created.customer_id,
        "message": "Booking created successfully",
    })))
}

// GET /bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub include_cancelled: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub customer_id: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filter = queries::BookingFilter {
        status: query.status.as_deref(),
        include_cancelled: query.include_cancelled.unwrap_or(true),
        start_date: query.start_date,
        end_date: query.end_date,
        customer_id: query.customer_id.as_deref(),
        limit: query.limit.unwrap_or(50),
    };

    let views = {
        let db = state.db.lock().unwrap();
        let bookings = queries::list_bookings(&db, &filter)?;
        let mut views = vec![];
        for booking in &bookings {
            views.push(booking_view(&db, booking)?);
        }
        views
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "bookings": views,
    })))
}

// GET /bookings/:id
pub async fn show_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = {
        let db = state.db.lock().unwrap();
        let booking = queries::get_booking(&db, &id)?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        booking_view(&db, &booking)?
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "booking": view,
    })))
}

// PATCH /bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = BookingStatus::from_str(&body.status)
        .ok_or_else(|| AppError::validation(format!("invalid status: {}", body.status)))?;

    {
        let mut db = state.db.lock().unwrap();
        lifecycle::update_status(&mut db, state.config.daily_booking_cap, &id, status)?;
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Booking status updated successfully",
    })))
}

// PATCH /bookings/:id/cancel
#[derive(Deserialize)]
pub struct CancelRequest {
    pub cancellation_reason: String,
    pub cancelled_by: Option<String>,
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    {
        let mut db = state.db.lock().unwrap();
        lifecycle::cancel_booking(
            &mut db,
            &id,
            &body.cancellation_reason,
            body.cancelled_by.as_deref(),
        )?;
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Booking cancelled successfully",
    })))
}
