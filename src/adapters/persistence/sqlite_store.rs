//! SQLite-backed BookingStore via libsql.
//!
//! One database file: data/tutorbook.db. The partial unique index on
//! confirmed (tutor_id, start_time) is the serialization point for
//! cross-client races; a violated insert maps to DomainError::Conflict.
//! Created bookings are published to the realtime hub after commit.

use crate::domain::{
    AvailabilityRule, Booking, BookingStatus, DomainError, NewBooking, Tutor,
};
use crate::ports::BookingStore;
use chrono::{NaiveDateTime, NaiveTime};
use libsql::{params, Connection, Database};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::info;

const TUTORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tutors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    subject TEXT
)"#;

const AVAILABILITY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS availability (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tutor_id INTEGER NOT NULL,
    day_of_week INTEGER NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL
)"#;

const BOOKINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bookings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tutor_id INTEGER NOT NULL,
    student_name TEXT NOT NULL,
    student_email TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'confirmed'
)"#;

/// Uniqueness invariant: no two confirmed bookings for the same tutor may
/// share a start time. Cancelled rows stay behind without blocking the slot.
const BOOKINGS_UNIQUE_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_confirmed_slot
ON bookings (tutor_id, start_time) WHERE status = 'confirmed'"#;

/// Instants stored as ISO-8601 local time; lexicographic order matches
/// chronological order, so range filters work on TEXT.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIME_FORMAT: &str = "%H:%M";

/// SQLite store. One database file (tutorbook.db) in the given base directory.
pub struct SqliteStore {
    db: Database,
    events: Option<broadcast::Sender<Booking>>,
}

impl SqliteStore {
    /// Connect to (or create) the database and ensure the schema exists.
    /// Call once at startup; the returned store is safe to share via Arc.
    ///
    /// WAL mode allows concurrent readers while one client writes.
    pub async fn connect(
        base_dir: impl AsRef<Path>,
        events: Option<broadcast::Sender<Booking>>,
    ) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Store(e.to_string()))?;
        let db_path: PathBuf = base.join("tutorbook.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Store(e.to_string()))?;

        // PRAGMA returns a row (new value); consume it (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Store(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
            .is_some()
        {}

        for stmt in [
            TUTORS_TABLE,
            AVAILABILITY_TABLE,
            BOOKINGS_TABLE,
            BOOKINGS_UNIQUE_INDEX,
        ] {
            conn.execute(stmt, ())
                .await
                .map_err(|e| DomainError::Store(e.to_string()))?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");
        Ok(Self { db, events })
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(|e| DomainError::Store(e.to_string()))
    }

    pub async fn add_tutor(&self, name: &str, subject: Option<&str>) -> Result<i64, DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tutors (name, subject) VALUES (?1, ?2)",
            params![name, subject],
        )
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    pub async fn add_rule(
        &self,
        tutor_id: i64,
        day_of_week: u8,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO availability (tutor_id, day_of_week, start_time, end_time)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                tutor_id,
                day_of_week as i64,
                start.format(TIME_FORMAT).to_string(),
                end.format(TIME_FORMAT).to_string()
            ],
        )
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    /// Seed demo tutors and weekly rules on an empty database so the UI is
    /// usable on first run. No-op when tutors already exist.
    pub async fn seed_demo(&self) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM tutors", ())
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let count: i64 = match rows.next().await.map_err(|e| DomainError::Store(e.to_string()))? {
            Some(row) => row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
            None => 0,
        };
        if count > 0 {
            return Ok(());
        }

        let parse = |s| NaiveTime::parse_from_str(s, TIME_FORMAT).expect("HH:MM rule time");
        let naledi = self.add_tutor("Naledi Dlamini", Some("Mathematics")).await?;
        let bongani = self.add_tutor("Bongani Khumalo", Some("Physics")).await?;
        self.add_rule(naledi, 1, parse("09:00"), parse("12:00")).await?;
        self.add_rule(naledi, 3, parse("09:00"), parse("12:00")).await?;
        self.add_rule(bongani, 2, parse("14:00"), parse("18:00")).await?;
        self.add_rule(bongani, 4, parse("14:00"), parse("17:00")).await?;

        info!("seeded demo tutors and availability");
        Ok(())
    }

    fn parse_datetime(s: &str) -> Result<NaiveDateTime, DomainError> {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
            .map_err(|e| DomainError::Store(format!("bad timestamp '{}': {}", s, e)))
    }

    fn parse_time(s: &str) -> Result<NaiveTime, DomainError> {
        NaiveTime::parse_from_str(s, TIME_FORMAT)
            .map_err(|e| DomainError::Store(format!("bad time '{}': {}", s, e)))
    }

    fn format_datetime(t: NaiveDateTime) -> String {
        t.format(DATETIME_FORMAT).to_string()
    }
}

#[async_trait::async_trait]
impl BookingStore for SqliteStore {
    async fn list_tutors(&self) -> Result<Vec<Tutor>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT id, name, subject FROM tutors ORDER BY name", ())
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut tutors = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            tutors.push(Tutor {
                id: row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
                name: row.get(1).map_err(|e| DomainError::Store(e.to_string()))?,
                subject: row.get(2).ok(),
            });
        }
        Ok(tutors)
    }

    async fn availability_rules(
        &self,
        tutor_id: i64,
    ) -> Result<Vec<AvailabilityRule>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                r#"
                SELECT tutor_id, day_of_week, start_time, end_time
                FROM availability
                WHERE tutor_id = ?1
                ORDER BY id
                "#,
                params![tutor_id],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut rules = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            let day_of_week: i64 = row.get(1).map_err(|e| DomainError::Store(e.to_string()))?;
            let start: String = row.get(2).map_err(|e| DomainError::Store(e.to_string()))?;
            let end: String = row.get(3).map_err(|e| DomainError::Store(e.to_string()))?;
            rules.push(AvailabilityRule {
                tutor_id: row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
                day_of_week: day_of_week as u8,
                start: Self::parse_time(&start)?,
                end: Self::parse_time(&end)?,
            });
        }
        Ok(rules)
    }

    async fn confirmed_bookings(
        &self,
        tutor_id: i64,
        window: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<Vec<Booking>, DomainError> {
        let conn = self.conn()?;
        let base = r#"
            SELECT id, tutor_id, student_name, student_email, start_time, end_time, status
            FROM bookings
            WHERE tutor_id = ?1 AND status = 'confirmed'
        "#;
        let mut rows = match window {
            Some((from, to)) => conn
                .query(
                    &format!("{base} AND start_time >= ?2 AND start_time < ?3 ORDER BY start_time"),
                    params![
                        tutor_id,
                        Self::format_datetime(from),
                        Self::format_datetime(to)
                    ],
                )
                .await,
            None => {
                conn.query(&format!("{base} ORDER BY start_time"), params![tutor_id])
                    .await
            }
        }
        .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut bookings = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            let start: String = row.get(4).map_err(|e| DomainError::Store(e.to_string()))?;
            let end: String = row.get(5).map_err(|e| DomainError::Store(e.to_string()))?;
            let status: String = row.get(6).map_err(|e| DomainError::Store(e.to_string()))?;
            bookings.push(Booking {
                id: row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
                tutor_id: row.get(1).map_err(|e| DomainError::Store(e.to_string()))?,
                student_name: row.get(2).map_err(|e| DomainError::Store(e.to_string()))?,
                student_email: row.get(3).map_err(|e| DomainError::Store(e.to_string()))?,
                start: Self::parse_datetime(&start)?,
                end: Self::parse_datetime(&end)?,
                status: BookingStatus::parse(&status),
            });
        }
        Ok(bookings)
    }

    async fn insert_booking(&self, booking: &NewBooking) -> Result<i64, DomainError> {
        let conn = self.conn()?;
        let result = conn
            .execute(
                r#"
                INSERT INTO bookings (tutor_id, student_name, student_email, start_time, end_time, status)
                VALUES (?1, ?2, ?3, ?4, ?5, 'confirmed')
                "#,
                params![
                    booking.tutor_id,
                    booking.student_name.as_str(),
                    booking.student_email.as_str(),
                    Self::format_datetime(booking.start),
                    Self::format_datetime(booking.end)
                ],
            )
            .await;

        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                if let Some(tx) = &self.events {
                    let _ = tx.send(Booking {
                        id,
                        tutor_id: booking.tutor_id,
                        student_name: booking.student_name.clone(),
                        student_email: booking.student_email.clone(),
                        start: booking.start,
                        end: booking.end,
                        status: BookingStatus::Confirmed,
                    });
                }
                Ok(id)
            }
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                Err(DomainError::Conflict(format!(
                    "slot {} is already booked",
                    booking.start
                )))
            }
            Err(e) => Err(DomainError::Store(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn monday(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_booking(tutor_id: i64, hour: u32) -> NewBooking {
        NewBooking {
            tutor_id,
            student_name: "Thandi".into(),
            student_email: "thandi@example.com".into(),
            start: monday(hour),
            end: monday(hour + 1),
        }
    }

    #[tokio::test]
    async fn unique_index_maps_to_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(dir.path(), None).await.unwrap();
        let tutor = store.add_tutor("Naledi", Some("Mathematics")).await.unwrap();

        store.insert_booking(&new_booking(tutor, 9)).await.unwrap();
        let err = store.insert_booking(&new_booking(tutor, 9)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let booked = store.confirmed_bookings(tutor, None).await.unwrap();
        assert_eq!(booked.len(), 1);
    }

    #[tokio::test]
    async fn rules_round_trip_and_windowed_bookings_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(dir.path(), None).await.unwrap();
        let tutor = store.add_tutor("Naledi", None).await.unwrap();
        let parse = |s| NaiveTime::parse_from_str(s, TIME_FORMAT).unwrap();
        store.add_rule(tutor, 1, parse("09:00"), parse("12:00")).await.unwrap();

        let rules = store.availability_rules(tutor).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].day_of_week, 1);
        assert_eq!(rules[0].start, parse("09:00"));

        store.insert_booking(&new_booking(tutor, 9)).await.unwrap();
        store.insert_booking(&new_booking(tutor, 14)).await.unwrap();
        let windowed = store
            .confirmed_bookings(tutor, Some((monday(8), monday(12))))
            .await
            .unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].start, monday(9));
    }

    #[tokio::test]
    async fn seed_demo_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(dir.path(), None).await.unwrap();

        store.seed_demo().await.unwrap();
        store.seed_demo().await.unwrap();

        let tutors = store.list_tutors().await.unwrap();
        assert_eq!(tutors.len(), 2);
    }
}
