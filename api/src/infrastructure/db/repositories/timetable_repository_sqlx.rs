use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::timetable_repository::TimetableRepository;
use crate::domain::timetables::timetable::{TimetableDraft, TimetableEntry, sort_schedule};
use crate::infrastructure::db::PgPool;

const TIMETABLE_COLUMNS: &str =
    "id, class, day, period, subject, teacher, room, start_time, end_time, created_at, updated_at";

pub struct SqlxTimetableRepository {
    pub pool: PgPool,
}

impl SqlxTimetableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_entry(r: &PgRow) -> anyhow::Result<TimetableEntry> {
    let day: String = r.get("day");
    Ok(TimetableEntry {
        id: r.get("id"),
        class: r.get("class"),
        day: day.parse()?,
        period: r.get("period"),
        subject: r.get("subject"),
        teacher: r.get("teacher"),
        room: r.get("room"),
        start_time: r.get("start_time"),
        end_time: r.get("end_time"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

fn map_schedule(rows: &[PgRow]) -> anyhow::Result<Vec<TimetableEntry>> {
    let mut entries = rows.iter().map(map_entry).collect::<anyhow::Result<Vec<_>>>()?;
    // Week order is not alphabetical, so sorting happens here rather than in SQL.
    sort_schedule(&mut entries);
    Ok(entries)
}

#[async_trait]
impl TimetableRepository for SqlxTimetableRepository {
    async fn list_for_class(&self, class: &str) -> anyhow::Result<Vec<TimetableEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {TIMETABLE_COLUMNS} FROM timetables WHERE class = $1"
        ))
        .bind(class)
        .fetch_all(&self.pool)
        .await?;
        map_schedule(&rows)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<TimetableEntry>> {
        let rows = sqlx::query(&format!("SELECT {TIMETABLE_COLUMNS} FROM timetables"))
            .fetch_all(&self.pool)
            .await?;
        map_schedule(&rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<TimetableEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {TIMETABLE_COLUMNS} FROM timetables WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_entry).transpose()
    }

    async fn create(&self, d: &TimetableDraft) -> anyhow::Result<TimetableEntry> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO timetables (class, day, period, subject, teacher, room, start_time, end_time)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {TIMETABLE_COLUMNS}"#
        ))
        .bind(&d.class)
        .bind(d.day.as_str())
        .bind(d.period)
        .bind(&d.subject)
        .bind(&d.teacher)
        .bind(&d.room)
        .bind(&d.start_time)
        .bind(&d.end_time)
        .fetch_one(&self.pool)
        .await?;
        map_entry(&row)
    }

    async fn update(&self, t: &TimetableEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE timetables
               SET class = $2, day = $3, period = $4, subject = $5, teacher = $6, room = $7,
                   start_time = $8, end_time = $9, updated_at = $10
               WHERE id = $1"#,
        )
        .bind(t.id)
        .bind(&t.class)
        .bind(t.day.as_str())
        .bind(t.period)
        .bind(&t.subject)
        .bind(&t.teacher)
        .bind(&t.room)
        .bind(&t.start_time)
        .bind(&t.end_time)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM timetables WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
