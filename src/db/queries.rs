use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    AcTypeLine, Booking, BookingService, BookingStatus, Customer, Revenue, Technician,
};

// ── Customers ──

pub fn find_customer(
    conn: &Connection,
    name: &str,
    phone: &str,
) -> rusqlite::Result<Option<Customer>> {
    let result = conn.query_row(
        "SELECT id, name, phone, email, complete_address FROM customers
         WHERE name = ?1 AND phone = ?2",
        params![name, phone],
        parse_customer_row,
    );

    match result {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn get_customer(conn: &Connection, id: &str) -> rusqlite::Result<Option<Customer>> {
    let result = conn.query_row(
        "SELECT id, name, phone, email, complete_address FROM customers WHERE id = ?1",
        params![id],
        parse_customer_row,
    );

    match result {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn insert_customer(conn: &Connection, customer: &Customer) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO customers (id, name, phone, email, complete_address)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            customer.id,
            customer.name,
            customer.phone,
            customer.email,
            customer.complete_address,
        ],
    )?;
    Ok(())
}

pub fn update_customer_contact(
    conn: &Connection,
    id: &str,
    email: Option<&str>,
    complete_address: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE customers SET email = ?1, complete_address = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![email, complete_address, id],
    )?;
    Ok(())
}

fn parse_customer_row(row: &rusqlite::Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        complete_address: row.get(4)?,
    })
}

// ── Statuses ──

pub fn status_id(conn: &Connection, status: BookingStatus) -> rusqlite::Result<Option<i64>> {
    let result = conn.query_row(
        "SELECT id FROM booking_statuses WHERE status_name = ?1",
        params![status.as_str()],
        |row| row.get(0),
    );

    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

// ── Bookings ──

pub fn insert_booking(
    conn: &Connection,
    id: &str,
    customer_id: &str,
    status_id: i64,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, customer_id, status_id) VALUES (?1, ?2, ?3)",
        params![id, customer_id, status_id],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> rusqlite::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT b.id, b.customer_id, s.status_name, b.cancelled_at, b.cancellation_reason,
                b.cancelled_by, b.created_at, b.updated_at
         FROM bookings b
         JOIN booking_statuses s ON b.status_id = s.id
         WHERE b.id = ?1",
        params![id],
        parse_booking_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn set_booking_status(conn: &Connection, id: &str, status_id: i64) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status_id = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![status_id, id],
    )?;
    Ok(count > 0)
}

pub fn set_booking_cancelled(
    conn: &Connection,
    id: &str,
    status_id: i64,
    reason: &str,
    cancelled_by: Option<&str>,
) -> rusqlite::Result<bool> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE bookings
         SET status_id = ?1, cancelled_at = ?2, cancellation_reason = ?3, cancelled_by = ?4,
             updated_at = datetime('now')
         WHERE id = ?5",
        params![status_id, now, reason, cancelled_by, id],
    )?;
    Ok(count > 0)
}

pub struct BookingFilter<'a> {
    pub status: Option<&'a str>,
    pub include_cancelled: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub customer_id: Option<&'a str>,
    pub limit: i64,
}

pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> rusqlite::Result<Vec<Booking>> {
    let mut sql = String::from(
        "SELECT b.id, b.customer_id, s.status_name, b.cancelled_at, b.cancellation_reason,
                b.cancelled_by, b.created_at, b.updated_at
         FROM bookings b
         JOIN booking_statuses s ON b.status_id = s.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = filter.status {
        params_vec.push(Box::new(status.to_string()));
        sql.push_str(&format!(" AND s.status_name = ?{}", params_vec.len()));
    }
    if !filter.include_cancelled {
        sql.push_str(" AND b.cancelled_at IS NULL AND s.status_name != 'cancelled'");
    }
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        params_vec.push(Box::new(start.format("%Y-%m-%d").to_string()));
        let start_idx = params_vec.len();
        params_vec.push(Box::new(end.format("%Y-%m-%d").to_string()));
        let end_idx = params_vec.len();
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM booking_services bs WHERE bs.booking_id = b.id
                          AND bs.appointment_date BETWEEN ?{start_idx} AND ?{end_idx})"
        ));
    }
    if let Some(customer_id) = filter.customer_id {
        params_vec.push(Box::new(customer_id.to_string()));
        sql.push_str(&format!(" AND b.customer_id = ?{}", params_vec.len()));
    }

    params_vec.push(Box::new(filter.limit));
    sql.push_str(&format!(" ORDER BY b.created_at DESC LIMIT ?{}", params_vec.len()));

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let status_name: String = row.get(2)?;
    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        status: BookingStatus::from_str(&status_name).unwrap_or(BookingStatus::Pending),
        cancelled_at: row.get(3)?,
        cancellation_reason: row.get(4)?,
        cancelled_by: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

// ── Booking services ──

pub fn insert_service(conn: &Connection, service: &BookingService) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO booking_services (id, booking_id, service_type, appointment_date, appointment_time)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            service.id,
            service.booking_id,
            service.service_type,
            service.appointment_date.format("%Y-%m-%d").to_string(),
            service.appointment_time.map(|t| t.format("%H:%M").to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &str) -> rusqlite::Result<Option<BookingService>> {
    let result = conn.query_row(
        "SELECT id, booking_id, service_type, appointment_date, appointment_time
         FROM booking_services WHERE id = ?1",
        params![id],
        parse_service_row,
    );

    match result {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn services_for_booking(
    conn: &Connection,
    booking_id: &str,
) -> rusqlite::Result<Vec<BookingService>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, service_type, appointment_date, appointment_time
         FROM booking_services WHERE booking_id = ?1 ORDER BY appointment_date ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![booking_id], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn update_service_date(
    conn: &Connection,
    service_id: &str,
    new_date: NaiveDate,
    new_time: Option<NaiveTime>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE booking_services
         SET appointment_date = ?1, appointment_time = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![
            new_date.format("%Y-%m-%d").to_string(),
            new_time.map(|t| t.format("%H:%M").to_string()),
            service_id,
        ],
    )?;
    Ok(())
}

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<BookingService> {
    let date_str: String = row.get(3)?;
    let time_str: Option<String> = row.get(4)?;
    Ok(BookingService {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        service_type: row.get(2)?,
        appointment_date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| Utc::now().date_naive()),
        appointment_time: time_str.and_then(|t| NaiveTime::parse_from_str(&t, "%H:%M").ok()),
    })
}

// ── AC types ──

pub fn upsert_ac_type(conn: &Connection, type_name: &str) -> rusqlite::Result<String> {
    conn.execute(
        "INSERT INTO ac_types (id, type_name) VALUES (?1, ?2)
         ON CONFLICT(type_name) DO NOTHING",
        params![uuid::Uuid::new_v4().to_string(), type_name],
    )?;

    conn.query_row(
        "SELECT id FROM ac_types WHERE type_name = ?1",
        params![type_name],
        |row| row.get(0),
    )
}

pub fn insert_ac_line(
    conn: &Connection,
    booking_service_id: &str,
    ac_type_id: &str,
    quantity: u32,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO booking_actypes (booking_service_id, ac_type_id, quantity)
         VALUES (?1, ?2, ?3)",
        params![booking_service_id, ac_type_id, quantity],
    )?;
    Ok(())
}

pub fn ac_lines_for_service(
    conn: &Connection,
    booking_service_id: &str,
) -> rusqlite::Result<Vec<AcTypeLine>> {
    let mut stmt = conn.prepare(
        "SELECT t.type_name, a.quantity
         FROM booking_actypes a
         JOIN ac_types t ON a.ac_type_id = t.id
         WHERE a.booking_service_id = ?1
         ORDER BY t.type_name ASC",
    )?;
    let rows = stmt.query_map(params![booking_service_id], |row| {
        Ok(AcTypeLine {
            type_name: row.get(0)?,
            quantity: row.get(1)?,
        })
    })?;

    let mut lines = vec![];
    for row in rows {
        lines.push(row?);
    }
    Ok(lines)
}

// ── Technicians ──

pub fn upsert_technician(conn: &Connection, name: &str) -> rusqlite::Result<String> {
    conn.execute(
        "INSERT INTO technicians (id, name) VALUES (?1, ?2)
         ON CONFLICT(name) DO NOTHING",
        params![uuid::Uuid::new_v4().to_string(), name],
    )?;

    conn.query_row(
        "SELECT id FROM technicians WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
}

pub fn list_technicians(conn: &Connection) -> rusqlite::Result<Vec<Technician>> {
    let mut stmt = conn.prepare("SELECT id, name FROM technicians ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Technician {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut technicians = vec![];
    for row in rows {
        technicians.push(row?);
    }
    Ok(technicians)
}

pub fn detach_booking_technicians(conn: &Connection, booking_id: &str) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM booking_technicians WHERE booking_id = ?1",
        params![booking_id],
    )?;
    Ok(())
}

pub fn attach_booking_technician(
    conn: &Connection,
    booking_id: &str,
    technician_id: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO booking_technicians (booking_id, technician_id) VALUES (?1, ?2)
         ON CONFLICT(booking_id, technician_id) DO NOTHING",
        params![booking_id, technician_id],
    )?;
    Ok(())
}

pub fn technician_names_for_booking(
    conn: &Connection,
    booking_id: &str,
) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM booking_technicians bt
         JOIN technicians t ON bt.technician_id = t.id
         WHERE bt.booking_id = ?1
         ORDER BY t.name ASC",
    )?;
    let rows = stmt.query_map(params![booking_id], |row| row.get(0))?;

    let mut names = vec![];
    for row in rows {
        names.push(row?);
    }
    Ok(names)
}

// ── Reschedules ──

#[allow(clippy::too_many_arguments)]
pub fn insert_reschedule(
    conn: &Connection,
    booking_service_id: &str,
    old_date: NaiveDate,
    old_time: Option<NaiveTime>,
    new_date: NaiveDate,
    new_time: Option<NaiveTime>,
    reason: Option<&str>,
    rescheduled_by: Option<&str>,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO booking_reschedules
         (booking_service_id, old_appointment_date, old_appointment_time,
          new_appointment_date, new_appointment_time, reschedule_reason, rescheduled_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            booking_service_id,
            old_date.format("%Y-%m-%d").to_string(),
            old_time.map(|t| t.format("%H:%M").to_string()),
            new_date.format("%Y-%m-%d").to_string(),
            new_time.map(|t| t.format("%H:%M").to_string()),
            reason,
            rescheduled_by,
        ],
    )?;
    Ok(())
}

pub fn reschedule_count_for_service(
    conn: &Connection,
    booking_service_id: &str,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM booking_reschedules WHERE booking_service_id = ?1",
        params![booking_service_id],
        |row| row.get(0),
    )
}

// ── Revenue ──

pub fn get_revenue_by_booking(
    conn: &Connection,
    booking_id: &str,
) -> rusqlite::Result<Option<Revenue>> {
    let result = conn.query_row(
        "SELECT id, booking_id, revenue_date, total_revenue, created_at
         FROM revenue WHERE booking_id = ?1",
        params![booking_id],
        parse_revenue_row,
    );

    match result {
        Ok(revenue) => Ok(Some(revenue)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn get_revenue(conn: &Connection, id: &str) -> rusqlite::Result<Option<Revenue>> {
    let result = conn.query_row(
        "SELECT id, booking_id, revenue_date, total_revenue, created_at
         FROM revenue WHERE id = ?1",
        params![id],
        parse_revenue_row,
    );

    match result {
        Ok(revenue) => Ok(Some(revenue)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn insert_revenue(
    conn: &Connection,
    id: &str,
    booking_id: &str,
    revenue_date: NaiveDate,
    total_revenue: f64,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO revenue (id, booking_id, revenue_date, total_revenue)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            id,
            booking_id,
            revenue_date.format("%Y-%m-%d").to_string(),
            total_revenue,
        ],
    )?;
    Ok(())
}

pub fn update_revenue(
    conn: &Connection,
    id: &str,
    revenue_date: NaiveDate,
    total_revenue: f64,
) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "UPDATE revenue SET revenue_date = ?1, total_revenue = ?2 WHERE id = ?3",
        params![
            revenue_date.format("%Y-%m-%d").to_string(),
            total_revenue,
            id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_revenue(conn: &Connection, id: &str) -> rusqlite::Result<Option<String>> {
    let booking_id: Option<String> = match conn.query_row(
        "SELECT booking_id FROM revenue WHERE id = ?1",
        params![id],
        |row| row.get(0),
    ) {
        Ok(b) => Some(b),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e),
    };

    if booking_id.is_some() {
        conn.execute("DELETE FROM revenue WHERE id = ?1", params![id])?;
    }
    Ok(booking_id)
}

fn parse_revenue_row(row: &rusqlite::Row) -> rusqlite::Result<Revenue> {
    let date_str: String = row.get(2)?;
    Ok(Revenue {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        revenue_date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| Utc::now().date_naive()),
        total_revenue: row.get(3)?,
        created_at: row.get(4)?,
    })
}

// ── Revenue reporting ──

pub struct RevenueHistoryRow {
    pub revenue_id: String,
    pub booking_id: String,
    pub revenue_date: String,
    pub total_revenue: f64,
    pub created_at: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub status_name: String,
    pub service_types: String,
    pub appointment_dates: String,
}

pub fn revenue_history(conn: &Connection) -> rusqlite::Result<Vec<RevenueHistoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.booking_id, r.revenue_date, r.total_revenue, r.created_at,
                c.name, c.phone, c.email, st.status_name,
                GROUP_CONCAT(DISTINCT bs.service_type),
                GROUP_CONCAT(DISTINCT bs.appointment_date)
         FROM revenue r
         JOIN bookings b ON r.booking_id = b.id
         JOIN customers c ON b.customer_id = c.id
         JOIN booking_services bs ON bs.booking_id = b.id
         JOIN booking_statuses st ON b.status_id = st.id
         GROUP BY r.id
         ORDER BY r.revenue_date DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(RevenueHistoryRow {
            revenue_id: row.get(0)?,
            booking_id: row.get(1)?,
            revenue_date: row.get(2)?,
            total_revenue: row.get(3)?,
            created_at: row.get(4)?,
            customer_name: row.get(5)?,
            customer_phone: row.get(6)?,
            customer_email: row.get(7)?,
            status_name: row.get(8)?,
            service_types: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            appointment_dates: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        })
    })?;

    let mut history = vec![];
    for row in rows {
        history.push(row?);
    }
    Ok(history)
}

pub fn total_revenue(conn: &Connection) -> rusqlite::Result<f64> {
    conn.query_row(
        "SELECT COALESCE(SUM(total_revenue), 0) FROM revenue",
        [],
        |row| row.get(0),
    )
}

pub struct ServiceRevenueSummary {
    pub service_type: String,
    pub total_revenue: f64,
    pub total_bookings: i64,
    pub average_revenue: f64,
}

pub fn service_revenue_summary(conn: &Connection) -> rusqlite::Result<Vec<ServiceRevenueSummary>> {
    let mut stmt = conn.prepare(
        "SELECT bs.service_type,
                SUM(r.total_revenue) AS total_revenue,
                COUNT(DISTINCT r.booking_id) AS total_bookings,
                AVG(r.total_revenue) AS average_revenue
         FROM revenue r
         JOIN bookings b ON r.booking_id = b.id
         JOIN booking_services bs ON bs.booking_id = b.id
         GROUP BY bs.service_type
         ORDER BY total_revenue DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ServiceRevenueSummary {
            service_type: row.get(0)?,
            total_revenue: row.get(1)?,
            total_bookings: row.get(2)?,
            average_revenue: row.get(3)?,
        })
    })?;

    let mut summary = vec![];
    for row in rows {
        summary.push(row?);
    }
    Ok(summary)
}

pub struct DateRevenueSummary {
    pub date: String,
    pub total_revenue: f64,
    pub total_bookings: i64,
    pub average_revenue: f64,
}

pub fn revenue_by_date_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<(Vec<DateRevenueSummary>, f64)> {
    let start_str = start.format("%Y-%m-%d").to_string();
    let end_str = end.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT revenue_date,
                SUM(total_revenue) AS total_revenue,
                COUNT(*) AS total_bookings,
                AVG(total_revenue) AS average_revenue
         FROM revenue
         WHERE revenue_date BETWEEN ?1 AND ?2
         GROUP BY revenue_date
         ORDER BY revenue_date DESC",
    )?;
    let rows = stmt.query_map(params![start_str, end_str], |row| {
        Ok(DateRevenueSummary {
            date: row.get(0)?,
            total_revenue: row.get(1)?,
            total_bookings: row.get(2)?,
            average_revenue: row.get(3)?,
        })
    })?;

    let mut summary = vec![];
    for row in rows {
        summary.push(row?);
    }

    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(total_revenue), 0) FROM revenue WHERE revenue_date BETWEEN ?1 AND ?2",
        params![start_str, end_str],
        |row| row.get(0),
    )?;

    Ok((summary, total))
}

pub struct MonthlyRevenue {
    pub month: String,
    pub total: f64,
    pub bookings: i64,
}

pub fn monthly_revenue_for_year(conn: &Connection, year: i32) -> rusqlite::Result<Vec<MonthlyRevenue>> {
    let mut stmt = conn.prepare(
        "SELECT strftime('%m', revenue_date) AS month,
                SUM(total_revenue) AS total,
                COUNT(*) AS bookings
         FROM revenue
         WHERE strftime('%Y', revenue_date) = ?1
         GROUP BY month
         ORDER BY month ASC",
    )?;
    let rows = stmt.query_map(params![format!("{year}")], |row| {
        Ok(MonthlyRevenue {
            month: row.get(0)?,
            total: row.get(1)?,
            bookings: row.get(2)?,
        })
    })?;

    let mut monthly = vec![];
    for row in rows {
        monthly.push(row?);
    }
    Ok(monthly)
}

pub struct TopService {
    pub service_type: String,
    pub total_revenue: f64,
    pub bookings: i64,
}

pub fn top_services_by_revenue(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<TopService>> {
    let mut stmt = conn.prepare(
        "SELECT bs.service_type,
                SUM(r.total_revenue) AS total_revenue,
                COUNT(DISTINCT r.booking_id) AS bookings
         FROM revenue r
         JOIN bookings b ON r.booking_id = b.id
         JOIN booking_services bs ON bs.booking_id = b.id
         GROUP BY bs.service_type
         ORDER BY total_revenue DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(TopService {
            service_type: row.get(0)?,
            total_revenue: row.get(1)?,
            bookings: row.get(2)?,
        })
    })?;

    let mut top = vec![];
    for row in rows {
        top.push(row?);
    }
    Ok(top)
}

pub fn revenue_record_count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM revenue", [], |row| row.get(0))
}

// ── Per-date debug view ──

pub struct DateServiceRow {
    pub booking_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: String,
    pub appointment_date: String,
    pub appointment_time: Option<String>,
    pub status_name: String,
    pub ac_type: Option<String>,
    pub quantity: Option<i64>,
}

pub fn service_rows_for_date(
    conn: &Connection,
    date: NaiveDate,
) -> rusqlite::Result<Vec<DateServiceRow>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, c.name, c.phone, bs.service_type, bs.appointment_date,
                bs.appointment_time, st.status_name, t.type_name, a.quantity
         FROM booking_services bs
         JOIN bookings b ON bs.booking_id = b.id
         JOIN customers c ON b.customer_id = c.id
         JOIN booking_statuses st ON b.status_id = st.id
         LEFT JOIN booking_actypes a ON a.booking_service_id = bs.id
         LEFT JOIN ac_types t ON a.ac_type_id = t.id
         WHERE bs.appointment_date = ?1
           AND st.status_name IN ('pending', 'accepted')
           AND b.cancelled_at IS NULL
         ORDER BY b.id, bs.id",
    )?;
    let rows = stmt.query_map(params![date.format("%Y-%m-%d").to_string()], |row| {
        Ok(DateServiceRow {
            booking_id: row.get(0)?,
            customer_name: row.get(1)?,
            customer_phone: row.get(2)?,
            service_type: row.get(3)?,
            appointment_date: row.get(4)?,
            appointment_time: row.get(5)?,
            status_name: row.get(6)?,
            ac_type: row.get(7)?,
            quantity: row.get(8)?,
        })
    })?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn active_service_count(conn: &Connection, date: NaiveDate) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*)
         FROM booking_services bs
         JOIN bookings b ON bs.booking_id = b.id
         JOIN booking_statuses st ON b.status_id = st.id
         WHERE bs.appointment_date = ?1
           AND st.status_name IN ('pending', 'accepted')
           AND b.cancelled_at IS NULL",
        params![date.format("%Y-%m-%d").to_string()],
        |row| row.get(0),
    )
}
