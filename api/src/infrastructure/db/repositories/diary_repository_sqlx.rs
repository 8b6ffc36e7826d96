use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::diary_repository::DiaryRepository;
use crate::domain::diary::diary::{DiaryComment, DiaryEntry, ValidDiaryEntry};
use crate::infrastructure::db::PgPool;

const ENTRY_SELECT: &str = r#"SELECT d.id, d.student_id, u.name AS student_name, d.date, d.entry,
        d.mood, d.tags, d.is_private, d.created_at, d.updated_at
   FROM diary_entries d
   LEFT JOIN users u ON u.id = d.student_id"#;

pub struct SqlxDiaryRepository {
    pub pool: PgPool,
}

impl SqlxDiaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the comments of `entries` in one query and attaches them.
    async fn with_comments(&self, mut entries: Vec<DiaryEntry>) -> anyhow::Result<Vec<DiaryEntry>> {
        if entries.is_empty() {
            return Ok(entries);
        }
        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let rows = sqlx::query(
            r#"SELECT c.id, c.diary_id, c.teacher_id, u.name AS teacher_name, c.comment, c.commented_at
               FROM diary_comments c
               LEFT JOIN users u ON u.id = c.teacher_id
               WHERE c.diary_id = ANY($1)
               ORDER BY c.commented_at"#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        let mut by_entry: HashMap<Uuid, Vec<DiaryComment>> = HashMap::new();
        for r in rows {
            by_entry
                .entry(r.get("diary_id"))
                .or_default()
                .push(DiaryComment {
                    id: r.get("id"),
                    teacher_id: r.get("teacher_id"),
                    teacher_name: r.try_get("teacher_name").ok(),
                    comment: r.get("comment"),
                    commented_at: r.get("commented_at"),
                });
        }
        for e in entries.iter_mut() {
            e.teacher_comments = by_entry.remove(&e.id).unwrap_or_default();
        }
        Ok(entries)
    }
}

fn map_entry(r: &PgRow) -> DiaryEntry {
    DiaryEntry {
        id: r.get("id"),
        student_id: r.get("student_id"),
        student_name: r.try_get("student_name").ok(),
        date: r.get("date"),
        entry: r.get("entry"),
        mood: r.get("mood"),
        tags: r.get("tags"),
        is_private: r.get("is_private"),
        teacher_comments: Vec::new(),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl DiaryRepository for SqlxDiaryRepository {
    async fn create(&self, student_id: Uuid, e: &ValidDiaryEntry) -> anyhow::Result<DiaryEntry> {
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO diary_entries (student_id, date, entry, mood, tags, is_private)
               VALUES ($1, COALESCE($2, now()), $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(student_id)
        .bind(e.date)
        .bind(&e.entry)
        .bind(&e.mood)
        .bind(&e.tags)
        .bind(e.is_private)
        .fetch_one(&self.pool)
        .await?;
        self.find(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("diary entry {id} missing after insert"))
    }

    async fn list_for_students(&self, student_ids: &[Uuid]) -> anyhow::Result<Vec<DiaryEntry>> {
        let rows = sqlx::query(&format!(
            "{ENTRY_SELECT} WHERE d.student_id = ANY($1) ORDER BY d.date DESC"
        ))
        .bind(student_ids)
        .fetch_all(&self.pool)
        .await?;
        self.with_comments(rows.iter().map(map_entry).collect()).await
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<DiaryEntry>> {
        let row = sqlx::query(&format!("{ENTRY_SELECT} WHERE d.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.with_comments(vec![map_entry(&row)]).await?.pop())
    }

    async fn add_comment(&self, entry_id: Uuid, c: &DiaryComment) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO diary_comments (id, diary_id, teacher_id, comment, commented_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(c.id)
        .bind(entry_id)
        .bind(c.teacher_id)
        .bind(&c.comment)
        .bind(c.commented_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
