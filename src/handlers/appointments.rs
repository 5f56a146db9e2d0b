use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Customer, Technician};
use crate::services::{lifecycle, technicians};
use crate::state::AppState;

use super::bookings::{booking_view, parse_date, parse_time, service_views, ServiceView};

pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /appointments
#[derive(Serialize)]
pub struct AppointmentView {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub complete_address: String,
    pub status: String,
    pub technicians: Vec<String>,
    pub services: Vec<ServiceView>,
    pub created_at: String,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AppointmentView>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let views = {
        let db = state.db.lock().unwrap();
        let filter = queries::BookingFilter {
            status: None,
            include_cancelled: true,
            start_date: None,
            end_date: None,
            customer_id: None,
            limit: 500,
        };
        let bookings = queries::list_bookings(&db, &filter)?;

        let mut views = vec![];
        for booking in &bookings {
            let customer = queries::get_customer(&db, &booking.customer_id)?.ok_or_else(|| {
                AppError::Integrity(format!(
                    "booking {} references a missing customer",
                    booking.id
                ))
            })?;
            views.push(AppointmentView {
                id: booking.id.clone(),
                name: customer.name,
                phone: customer.phone,
                email: customer.email,
                complete_address: customer.complete_address,
                status: booking.status.as_str().to_string(),
                technicians: queries::technician_names_for_booking(&db, &booking.id)?,
                services: service_views(&db, &booking.id)?,
                created_at: booking.created_at.clone(),
            });
        }
        views
    };

    Ok(Json(views))
}

// GET /appointments/technicians
pub async fn list_technicians(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Technician>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let technicians = {
        let db = state.db.lock().unwrap();
        queries::list_technicians(&db)?
    };
    Ok(Json(technicians))
}

fn booking_customer(
    db: &rusqlite::Connection,
    booking_id: &str,
) -> Result<Customer, AppError> {
    let booking = queries::get_booking(db, booking_id)?
        .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
    queries::get_customer(db, &booking.customer_id)?.ok_or_else(|| {
        AppError::Integrity(format!(
            "booking {booking_id} references a missing customer"
        ))
    })
}

async fn notify(state: &AppState, customer: &Customer, subject: &str, body: String) {
    if let Some(email) = &customer.email {
        if let Err(e) = state.mail.send(email, subject, &body).await {
            tracing::warn!("failed to send '{subject}' email to {email}: {e:#}");
        }
    }
}

// POST /appointments/:id/accept
#[derive(Deserialize)]
pub struct AcceptRequest {
    pub technician_names: Option<Vec<String>>,
}

pub async fn accept_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<AcceptRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let (names, customer) = {
        let mut db = state.db.lock().unwrap();
        let names = lifecycle::accept_booking(
            &mut db,
            state.config.daily_booking_cap,
            &id,
            body.technician_names.as_deref(),
        )?;
        let customer = booking_customer(&db, &id)?;
        (names, customer)
    };

    notify(
        &state,
        &customer,
        "Your appointment is confirmed",
        format!(
            "Hi {}, your AC service appointment has been accepted. \
             Our team will see you as scheduled.",
            customer.name
        ),
    )
    .await;

    Ok(Json(serde_json::json!({
        "id": id,
        "status": "accepted",
        "name": customer.name,
        "email": customer.email,
        "technicians": names,
        "message": "Appointment accepted successfully",
    })))
}

// DELETE /appointments/:id
pub async fn reject_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let customer = {
        let mut db = state.db.lock().unwrap();
        let customer = booking_customer(&db, &id)?;
        lifecycle::cancel_booking(&mut db, &id, "Rejected by admin", None)?;
        customer
    };

    notify(
        &state,
        &customer,
        "Your appointment request was declined",
        format!(
            "Hi {}, unfortunately we are unable to take your AC service \
             appointment. Please book another date.",
            customer.name
        ),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Appointment cancelled successfully",
    })))
}

// POST /appointments/:id/complete
pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let view = {
        let mut db = state.db.lock().unwrap();
        lifecycle::complete_booking(&mut db, &id)?;
        let booking = queries::get_booking(&db, &id)?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        booking_view(&db, &booking)?
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "booking": view,
    })))
}

// POST /appointments/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub service_id: Option<String>,
    pub service_name: Option<String>,
    pub new_date: String,
    pub new_time: Option<String>,
    pub reason: Option<String>,
    pub rescheduled_by: Option<String>,
}

pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let target = match (&body.service_id, &body.service_name) {
        (Some(service_id), _) => lifecycle::ServiceTarget::Id(service_id.clone()),
        (None, Some(name)) => lifecycle::ServiceTarget::Type(name.clone()),
        (None, None) => {
            return Err(AppError::validation(
                "service_id or service_name is required",
            ))
        }
    };
    let new_date = parse_date(&body.new_date)?;
    let new_time = body.new_time.as_deref().map(parse_time).transpose()?;

    let view = {
        let mut db = state.db.lock().unwrap();
        lifecycle::reschedule_service(
            &mut db,
            state.config.daily_booking_cap,
            &id,
            &target,
            new_date,
            new_time,
            body.reason.as_deref(),
            body.rescheduled_by.as_deref(),
        )?;
        let booking = queries::get_booking(&db, &id)?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        booking_view(&db, &booking)?
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "booking": view,
    })))
}

// POST /appointments/:id/assign-technicians
#[derive(Deserialize)]
pub struct AssignTechniciansRequest {
    #[serde(default)]
    pub technician_names: Vec<String>,
}

pub async fn assign_technicians(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<AssignTechniciansRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let names = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;
        queries::get_booking(&tx, &id)?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        let names = technicians::replace_assignments(&tx, &id, &body.technician_names)?;
        tx.commit()?;
        names
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Technicians assigned successfully",
        "technicians": names,
    })))
}
