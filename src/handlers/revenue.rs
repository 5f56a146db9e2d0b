use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::revenue;
use crate::state::AppState;

use super::appointments::check_auth;
use super::bookings::{parse_date, service_views};

// GET /revenues
#[derive(Serialize)]
struct HistoryRow {
    revenue_id: String,
    booking_id: String,
    revenue_date: String,
    total_revenue: f64,
    created_at: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    status_name: String,
    service_types: String,
    appointment_dates: String,
}

pub async fn revenue_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let (history, total) = {
        let db = state.db.lock().unwrap();
        let history: Vec<HistoryRow> = queries::revenue_history(&db)?
            .into_iter()
            .map(|r| HistoryRow {
                revenue_id: r.revenue_id,
                booking_id: r.booking_id,
                revenue_date: r.revenue_date,
                total_revenue: r.total_revenue,
                created_at: r.created_at,
                customer_name: r.customer_name,
                customer_phone: r.customer_phone,
                customer_email: r.customer_email,
                status_name: r.status_name,
                service_types: r.service_types,
                appointment_dates: r.appointment_dates,
            })
            .collect();
        (history, queries::total_revenue(&db)?)
    };

    Ok(Json(serde_json::json!({
        "history": history,
        "totalAmount": total,
    })))
}

// POST /revenues
#[derive(Deserialize)]
pub struct AppointmentDetail {
    pub id: String,
    pub net_revenue: Option<f64>,
}

#[derive(Deserialize)]
pub struct StoreRevenueRequest {
    pub revenue_date: String,
    pub total_revenue: f64,
    #[serde(default)]
    pub appointments: Vec<String>,
    pub appointment_details: Option<Vec<AppointmentDetail>>,
}

pub async fn store_revenue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<StoreRevenueRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.appointments.is_empty() {
        return Err(AppError::validation("appointments must not be empty"));
    }
    if body.total_revenue < 0.0 || !body.total_revenue.is_finite() {
        return Err(AppError::validation("total_revenue must be non-negative"));
    }
    let revenue_date = parse_date(&body.revenue_date)?;

    let records = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let even_split = body.total_revenue / body.appointments.len() as f64;
        let mut records = 0;
        for booking_id in &body.appointments {
            queries::get_booking(&tx, booking_id)?
                .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;

            // Per-appointment figures win over the even split of the total.
            let amount = match &body.appointment_details {
                Some(details) => details
                    .iter()
                    .find(|d| d.id == *booking_id)
                    .and_then(|d| d.net_revenue)
                    .unwrap_or(0.0),
                None => even_split,
            };

            revenue::record(&tx, booking_id, revenue_date, Some(amount))?;
            records += 1;
        }

        tx.commit()?;
        records
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Revenue records saved successfully",
        "total_revenue": body.total_revenue,
        "records_created": records,
    })))
}

// GET /revenues/service-summary
pub async fn service_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let summary = {
        let db = state.db.lock().unwrap();
        queries::service_revenue_summary(&db)?
            .into_iter()
            .map(|s| {
                serde_json::json!({
                    "service_type": s.service_type,
                    "total_revenue": s.total_revenue,
                    "total_bookings": s.total_bookings,
                    "average_revenue": revenue::round_cents(s.average_revenue),
                })
            })
            .collect::<Vec<_>>()
    };

    Ok(Json(serde_json::json!({ "summary": summary })))
}

// GET /revenues/summary
#[derive(Deserialize)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn summary_by_date_range(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if query.end_date < query.start_date {
        return Err(AppError::validation("end_date must not be before start_date"));
    }

    let (summary, total) = {
        let db = state.db.lock().unwrap();
        queries::revenue_by_date_range(&db, query.start_date, query.end_date)?
    };

    let summary: Vec<_> = summary
        .into_iter()
        .map(|s| {
            serde_json::json!({
                "date": s.date,
                "total_revenue": s.total_revenue,
                "total_bookings": s.total_bookings,
                "average_revenue": revenue::round_cents(s.average_revenue),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "summary": summary,
        "total_revenue": total,
        "date_range": {
            "start_date": query.start_date,
            "end_date": query.end_date,
        },
    })))
}

// GET /revenues/statistics
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let (total, count, monthly, top) = {
        let db = state.db.lock().unwrap();
        (
            queries::total_revenue(&db)?,
            queries::revenue_record_count(&db)?,
            queries::monthly_revenue_for_year(&db, Utc::now().year())?,
            queries::top_services_by_revenue(&db, 5)?,
        )
    };

    let average = if count > 0 {
        revenue::round_cents(total / count as f64)
    } else {
        0.0
    };

    let monthly: Vec<_> = monthly
        .into_iter()
        .map(|m| {
            serde_json::json!({
                "month": m.month,
                "total": m.total,
                "bookings": m.bookings,
            })
        })
        .collect();
    let top: Vec<_> = top
        .into_iter()
        .map(|t| {
            serde_json::json!({
                "service_type": t.service_type,
                "total_revenue": t.total_revenue,
                "bookings": t.bookings,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "statistics": {
            "total_revenue": total,
            "total_bookings": count,
            "average_revenue": average,
            "monthly_revenue": monthly,
            "top_services": top,
        },
    })))
}

// GET /revenues/:booking_id
pub async fn show_revenue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let response = {
        let db = state.db.lock().unwrap();
        let revenue = queries::get_revenue_by_booking(&db, &booking_id)?
            .ok_or_else(|| AppError::not_found(format!("revenue for booking {booking_id}")))?;
        let booking = queries::get_booking(&db, &booking_id)?
            .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
        let customer = queries::get_customer(&db, &booking.customer_id)?.ok_or_else(|| {
            AppError::Integrity(format!(
                "booking {booking_id} references a missing customer"
            ))
        })?;

        serde_json::json!({
            "revenue": {
                "id": revenue.id,
                "booking_id": revenue.booking_id,
                "revenue_date": revenue.revenue_date,
                "total_revenue": revenue.total_revenue,
                "created_at": revenue.created_at,
            },
            "booking": {
                "id": booking.id,
                "status": booking.status.as_str(),
                "created_at": booking.created_at,
            },
            "customer": {
                "name": customer.name,
                "phone": customer.phone,
                "email": customer.email,
                "address": customer.complete_address,
            },
            "services": service_views(&db, &booking.id)?,
            "technicians": queries::technician_names_for_booking(&db, &booking.id)?,
        })
    };

    Ok(Json(response))
}

// PUT /revenues/:id
#[derive(Deserialize)]
pub struct UpdateRevenueRequest {
    pub revenue_date: String,
    pub total_revenue: f64,
}

pub async fn update_revenue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateRevenueRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.total_revenue < 0.0 || !body.total_revenue.is_finite() {
        return Err(AppError::validation("total_revenue must be non-negative"));
    }
    let revenue_date = parse_date(&body.revenue_date)?;

    let updated = {
        let db = state.db.lock().unwrap();
        let updated = queries::update_revenue(
            &db,
            &id,
            revenue_date,
            revenue::round_cents(body.total_revenue),
        )?;
        if !updated {
            return Err(AppError::not_found(format!("revenue record {id}")));
        }
        queries::get_revenue(&db, &id)?
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Revenue record updated successfully",
        "revenue": updated,
    })))
}

// DELETE /revenues/:id
pub async fn delete_revenue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking_id = {
        let db = state.db.lock().unwrap();
        queries::delete_revenue(&db, &id)?
            .ok_or_else(|| AppError::not_found(format!("revenue record {id}")))?
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Revenue record deleted successfully",
        "booking_id": booking_id,
    })))
}
