use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::contact_repository::{ContactFilter, ContactRepository};
use crate::domain::contact::contact::{
    ContactCategory, ContactMessage, ContactPriority, ContactReply, ContactStatus, NewContact,
};
use crate::infrastructure::db::PgPool;

const CONTACT_COLUMNS: &str = "id, name, email, phone, subject, message, status, priority, \
     category, assigned_to, resolved_at, created_at, updated_at";

pub struct SqlxContactRepository {
    pub pool: PgPool,
}

impl SqlxContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_replies(&self, mut messages: Vec<ContactMessage>) -> anyhow::Result<Vec<ContactMessage>> {
        if messages.is_empty() {
            return Ok(messages);
        }
        let ids: Vec<Uuid> = messages.iter().map(|m| m.id).collect();
        let rows = sqlx::query(
            r#"SELECT id, contact_id, replied_by, reply_message, replied_at
               FROM contact_replies WHERE contact_id = ANY($1)
               ORDER BY replied_at"#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        let mut by_message: HashMap<Uuid, Vec<ContactReply>> = HashMap::new();
        for r in rows {
            by_message
                .entry(r.get("contact_id"))
                .or_default()
                .push(ContactReply {
                    id: r.get("id"),
                    replied_by: r.get("replied_by"),
                    reply_message: r.get("reply_message"),
                    replied_at: r.get("replied_at"),
                });
        }
        for m in messages.iter_mut() {
            m.replies = by_message.remove(&m.id).unwrap_or_default();
        }
        Ok(messages)
    }
}

fn map_contact(r: &PgRow) -> anyhow::Result<ContactMessage> {
    let status: String = r.get("status");
    let priority: String = r.get("priority");
    let category: String = r.get("category");
    Ok(ContactMessage {
        id: r.get("id"),
        name: r.get("name"),
        email: r.get("email"),
        phone: r.try_get("phone").ok(),
        subject: r.get("subject"),
        message: r.get("message"),
        status: ContactStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("unknown contact status {status}"))?,
        priority: ContactPriority::parse(&priority).unwrap_or_default(),
        category: ContactCategory::parse(&category).unwrap_or_default(),
        assigned_to: r.try_get("assigned_to").ok(),
        replies: Vec::new(),
        resolved_at: r.try_get("resolved_at").ok(),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, c: &NewContact) -> anyhow::Result<ContactMessage> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO contact_messages (name, email, phone, subject, message, priority, category)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {CONTACT_COLUMNS}"#
        ))
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.subject)
        .bind(&c.message)
        .bind(c.priority.unwrap_or_default().as_str())
        .bind(c.category.unwrap_or_default().as_str())
        .fetch_one(&self.pool)
        .await?;
        map_contact(&row)
    }

    async fn list(&self, filter: ContactFilter) -> anyhow::Result<Vec<ContactMessage>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {CONTACT_COLUMNS} FROM contact_messages
               WHERE ($1::text IS NULL OR status = $1)
                 AND ($2::text IS NULL OR category = $2)
               ORDER BY created_at DESC"#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;
        let messages = rows.iter().map(map_contact).collect::<anyhow::Result<Vec<_>>>()?;
        self.with_replies(messages).await
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<ContactMessage>> {
        let row = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.with_replies(vec![map_contact(&row)?]).await?.pop())
    }

    async fn update_status(&self, c: &ContactMessage) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE contact_messages
               SET status = $2, assigned_to = $3, resolved_at = $4, updated_at = $5
               WHERE id = $1"#,
        )
        .bind(c.id)
        .bind(c.status.as_str())
        .bind(c.assigned_to)
        .bind(c.resolved_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_reply(&self, c: &ContactMessage, reply: &ContactReply) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO contact_replies (id, contact_id, replied_by, reply_message, replied_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(reply.id)
        .bind(c.id)
        .bind(reply.replied_by)
        .bind(&reply.reply_message)
        .bind(reply.replied_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE contact_messages SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(c.id)
            .bind(c.status.as_str())
            .bind(c.updated_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
