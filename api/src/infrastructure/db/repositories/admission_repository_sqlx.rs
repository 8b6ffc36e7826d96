use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::admission_repository::AdmissionRepository;
use crate::domain::admissions::admission::{Admission, AdmissionStatus, NewAdmission};
use crate::infrastructure::db::PgPool;

const ADMISSION_COLUMNS: &str = "id, name, parent_number, email, class, address, status, \
     approved_by, approved_at, declined_by, declined_at, notes, created_at, updated_at";

pub struct SqlxAdmissionRepository {
    pub pool: PgPool,
}

impl SqlxAdmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_admission(r: &PgRow) -> anyhow::Result<Admission> {
    let status: String = r.get("status");
    Ok(Admission {
        id: r.get("id"),
        name: r.get("name"),
        parent_number: r.get("parent_number"),
        email: r.get("email"),
        class: r.get("class"),
        address: r.get("address"),
        status: AdmissionStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("unknown admission status {status}"))?,
        approved_by: r.try_get("approved_by").ok(),
        approved_at: r.try_get("approved_at").ok(),
        declined_by: r.try_get("declined_by").ok(),
        declined_at: r.try_get("declined_at").ok(),
        notes: r.try_get("notes").ok(),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl AdmissionRepository for SqlxAdmissionRepository {
    async fn create(&self, a: &NewAdmission) -> anyhow::Result<Admission> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO admissions (name, parent_number, email, class, address)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {ADMISSION_COLUMNS}"#
        ))
        .bind(&a.name)
        .bind(&a.parent_number)
        .bind(&a.email)
        .bind(&a.class)
        .bind(&a.address)
        .fetch_one(&self.pool)
        .await?;
        map_admission(&row)
    }

    async fn list(&self) -> anyhow::Result<Vec<Admission>> {
        let rows = sqlx::query(&format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_admission).collect()
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Admission>> {
        let row = sqlx::query(&format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_admission).transpose()
    }

    async fn save_decision(&self, a: &Admission) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE admissions
               SET status = $2, approved_by = $3, approved_at = $4, declined_by = $5,
                   declined_at = $6, notes = $7, updated_at = $8
               WHERE id = $1 AND status = 'pending'"#,
        )
        .bind(a.id)
        .bind(a.status.as_str())
        .bind(a.approved_by)
        .bind(a.approved_at)
        .bind(a.declined_by)
        .bind(a.declined_at)
        .bind(&a.notes)
        .bind(a.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
