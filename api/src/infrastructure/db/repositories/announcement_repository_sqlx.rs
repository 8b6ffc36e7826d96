use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::announcement_repository::AnnouncementRepository;
use crate::domain::announcements::announcement::{
    Announcement, AnnouncementKind, AnnouncementPriority, Audience, ValidAnnouncement,
};
use crate::infrastructure::db::PgPool;

const ANNOUNCEMENT_SELECT: &str = r#"SELECT a.id, a.title, a.message, a.kind, a.priority,
        a.target_audience, a.specific_classes, a.scheduled_at, a.expires_at, a.is_active,
        a.created_by, u.name AS created_by_name, a.created_at
   FROM announcements a
   LEFT JOIN users u ON u.id = a.created_by"#;

pub struct SqlxAnnouncementRepository {
    pub pool: PgPool,
}

impl SqlxAnnouncementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_announcement(r: &PgRow) -> Announcement {
    let kind: String = r.get("kind");
    let priority: String = r.get("priority");
    let audience: String = r.get("target_audience");
    Announcement {
        id: r.get("id"),
        title: r.get("title"),
        message: r.get("message"),
        kind: AnnouncementKind::parse(&kind).unwrap_or_default(),
        priority: AnnouncementPriority::parse(&priority).unwrap_or_default(),
        target_audience: Audience::parse(&audience).unwrap_or_default(),
        specific_classes: r.get("specific_classes"),
        scheduled_at: r.get("scheduled_at"),
        expires_at: r.try_get("expires_at").ok(),
        is_active: r.get("is_active"),
        created_by: r.get("created_by"),
        created_by_name: r.try_get("created_by_name").ok(),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl AnnouncementRepository for SqlxAnnouncementRepository {
    async fn create(&self, a: &ValidAnnouncement, created_by: Uuid) -> anyhow::Result<Announcement> {
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO announcements (title, message, kind, priority, target_audience,
                                          specific_classes, scheduled_at, expires_at, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING id"#,
        )
        .bind(&a.title)
        .bind(&a.message)
        .bind(a.kind.as_str())
        .bind(a.priority.as_str())
        .bind(a.target_audience.as_str())
        .bind(&a.specific_classes)
        .bind(a.scheduled_at)
        .bind(a.expires_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        self.find(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("announcement {id} missing after insert"))
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Announcement>> {
        let rows = sqlx::query(&format!(
            "{ANNOUNCEMENT_SELECT} WHERE a.is_active ORDER BY a.scheduled_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_announcement).collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Announcement>> {
        let row = sqlx::query(&format!("{ANNOUNCEMENT_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_announcement))
    }
}
