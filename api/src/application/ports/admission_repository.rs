use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::admissions::admission::{Admission, NewAdmission};

#[async_trait]
pub trait AdmissionRepository: Send + Sync {
    async fn create(&self, admission: &NewAdmission) -> anyhow::Result<Admission>;
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Admission>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Admission>>;
    /// Persists a decision, guarded on the row still being pending. Returns
    /// false when another admin decided first.
    async fn save_decision(&self, admission: &Admission) -> anyhow::Result<bool>;
}
