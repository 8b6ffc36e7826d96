use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::event_repository::{EventRepository, RegistrationOutcome};
use crate::domain::events::event::{Event, EventScope, EventSpec, EventType};
use crate::infrastructure::db::PgPool;

const EVENT_SELECT: &str = r#"SELECT e.id, e.title, e.description, e.start_date, e.end_date,
        e.all_day, e.location, e.event_type, e.created_by, u.name AS created_by_name, e.scope,
        e.target_classes, e.target_teachers, e.recurrence, e.attachments,
        e.registration_required, e.registration_deadline, e.max_participants,
        (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) AS participant_count,
        e.is_active, e.is_deleted, e.last_updated_by, e.created_at, e.updated_at
   FROM events e
   LEFT JOIN users u ON u.id = e.created_by"#;

pub struct SqlxEventRepository {
    pub pool: PgPool,
}

impl SqlxEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_event(r: &PgRow) -> anyhow::Result<Event> {
    let event_type: String = r.get("event_type");
    let scope: String = r.get("scope");
    let recurrence: Option<JsonValue> = r.try_get("recurrence").ok();
    Ok(Event {
        id: r.get("id"),
        title: r.get("title"),
        description: r.get("description"),
        start_date: r.get("start_date"),
        end_date: r.get("end_date"),
        all_day: r.get("all_day"),
        location: r.try_get("location").ok(),
        event_type: EventType::parse(&event_type).unwrap_or_default(),
        created_by: r.get("created_by"),
        created_by_name: r.try_get("created_by_name").ok(),
        scope: EventScope::parse(&scope)
            .ok_or_else(|| anyhow::anyhow!("unknown event scope {scope}"))?,
        target_classes: r.get("target_classes"),
        target_teachers: r.get("target_teachers"),
        recurrence: recurrence.map(serde_json::from_value).transpose()?,
        attachments: serde_json::from_value(r.get::<JsonValue, _>("attachments"))?,
        registration_required: r.get("registration_required"),
        registration_deadline: r.try_get("registration_deadline").ok(),
        max_participants: r.try_get("max_participants").ok(),
        participant_count: r.get("participant_count"),
        is_active: r.get("is_active"),
        is_deleted: r.get("is_deleted"),
        last_updated_by: r.try_get("last_updated_by").ok(),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl EventRepository for SqlxEventRepository {
    async fn create(&self, spec: &EventSpec, created_by: Uuid) -> anyhow::Result<Event> {
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO events (title, description, start_date, end_date, all_day, location,
                                   event_type, created_by, scope, target_classes, target_teachers,
                                   recurrence, attachments, registration_required,
                                   registration_deadline, max_participants, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
               RETURNING id"#,
        )
        .bind(&spec.title)
        .bind(&spec.description)
        .bind(spec.start_date)
        .bind(spec.end_date)
        .bind(spec.all_day)
        .bind(&spec.location)
        .bind(spec.event_type.as_str())
        .bind(created_by)
        .bind(spec.scope.as_str())
        .bind(&spec.target_classes)
        .bind(&spec.target_teachers)
        .bind(spec.recurrence.as_ref().map(serde_json::to_value).transpose()?)
        .bind(serde_json::to_value(&spec.attachments)?)
        .bind(spec.registration_required)
        .bind(spec.registration_deadline)
        .bind(spec.max_participants)
        .bind(spec.is_active)
        .fetch_one(&self.pool)
        .await?;
        self.find(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("event {id} missing after insert"))
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "{EVENT_SELECT} WHERE e.is_active AND NOT e.is_deleted ORDER BY e.start_date"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_event).collect()
    }

    async fn list_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "{EVENT_SELECT}
             WHERE e.is_active AND NOT e.is_deleted AND e.start_date < $2 AND e.end_date > $1
             ORDER BY e.start_date"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_event).collect()
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Event>> {
        let row = sqlx::query(&format!("{EVENT_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_event).transpose()
    }

    async fn update(&self, e: &Event) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE events
               SET title = $2, description = $3, start_date = $4, end_date = $5, all_day = $6,
                   location = $7, event_type = $8, scope = $9, target_classes = $10,
                   target_teachers = $11, recurrence = $12, attachments = $13,
                   registration_required = $14, registration_deadline = $15,
                   max_participants = $16, is_active = $17, is_deleted = $18,
                   last_updated_by = $19, updated_at = $20
               WHERE id = $1"#,
        )
        .bind(e.id)
        .bind(&e.title)
        .bind(&e.description)
        .bind(e.start_date)
        .bind(e.end_date)
        .bind(e.all_day)
        .bind(&e.location)
        .bind(e.event_type.as_str())
        .bind(e.scope.as_str())
        .bind(&e.target_classes)
        .bind(&e.target_teachers)
        .bind(e.recurrence.as_ref().map(serde_json::to_value).transpose()?)
        .bind(serde_json::to_value(&e.attachments)?)
        .bind(e.registration_required)
        .bind(e.registration_deadline)
        .bind(e.max_participants)
        .bind(e.is_active)
        .bind(e.is_deleted)
        .bind(e.last_updated_by)
        .bind(e.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<RegistrationOutcome> {
        let mut tx = self.pool.begin().await?;
        let max_participants: Option<Option<i32>> =
            sqlx::query_scalar("SELECT max_participants FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(max_participants) = max_participants else {
            anyhow::bail!("event {event_id} missing");
        };
        if let Some(max) = max_participants {
            let taken: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
                    .bind(event_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if taken >= max as i64 {
                tx.rollback().await?;
                return Ok(RegistrationOutcome::Full);
            }
        }
        let inserted = sqlx::query(
            r#"INSERT INTO event_registrations (event_id, user_id, registered_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (event_id, user_id) DO NOTHING"#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(at)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if inserted == 0 {
            tx.rollback().await?;
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }
        // Touch the event so the change feed reports the new participant count.
        sqlx::query("UPDATE events SET updated_at = $2 WHERE id = $1")
            .bind(event_id)
            .bind(at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(RegistrationOutcome::Registered)
    }
}
