use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{BookingStatus, HotelBooking, NewHotelBooking};

pub async fn insert_booking(
    booking: NewHotelBooking,
    bonus_id: i64,
    conn: &mut SqliteConnection,
) -> Result<HotelBooking, sqlx::Error> {
    let booking: HotelBooking = sqlx::query_as(
        r#"
        INSERT INTO hotel_bookings (user_id, bonus_id, check_in, check_out, guests, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING *
        "#,
    )
    .bind(booking.user_id)
    .bind(bonus_id)
    .bind(booking.check_in)
    .bind(booking.check_out)
    .bind(booking.guests)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Hotel booking #{} requested by user #{}", booking.id, booking.user_id);
    Ok(booking)
}

pub async fn fetch_booking(booking_id: i64, conn: &mut SqliteConnection) -> Result<Option<HotelBooking>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM hotel_bookings WHERE id = $1").bind(booking_id).fetch_optional(conn).await
}

pub async fn fetch_bookings(user_id: Option<i64>, conn: &mut SqliteConnection) -> Result<Vec<HotelBooking>, sqlx::Error> {
    match user_id {
        Some(id) => {
            sqlx::query_as("SELECT * FROM hotel_bookings WHERE user_id = $1 ORDER BY check_in DESC, id DESC")
                .bind(id)
                .fetch_all(conn)
                .await
        },
        None => sqlx::query_as("SELECT * FROM hotel_bookings ORDER BY check_in DESC, id DESC").fetch_all(conn).await,
    }
}

/// Whether the award already has a booking that is pending or confirmed
pub async fn has_open_booking(bonus_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM hotel_bookings WHERE bonus_id = $1 AND status IN ('PENDENTE', 'CONFIRMADA'))",
    )
    .bind(bonus_id)
    .fetch_one(conn)
    .await
}

pub async fn set_status(
    booking_id: i64,
    status: BookingStatus,
    note: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<HotelBooking, sqlx::Error> {
    sqlx::query_as(
        r#"UPDATE hotel_bookings SET status = $1, admin_note = COALESCE($2, admin_note), updated_at = $3
           WHERE id = $4 RETURNING *"#,
    )
    .bind(status)
    .bind(note)
    .bind(Utc::now())
    .bind(booking_id)
    .fetch_one(conn)
    .await
}
