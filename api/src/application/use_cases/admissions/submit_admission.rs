use crate::application::error::ServiceResult;
use crate::application::ports::admission_repository::AdmissionRepository;
use crate::domain::admissions::admission::{Admission, NewAdmission};

pub struct SubmitAdmission<'a, R: AdmissionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AdmissionRepository + ?Sized> SubmitAdmission<'a, R> {
    pub async fn execute(&self, form: NewAdmission) -> ServiceResult<Admission> {
        let form = form.validate()?;
        let created = self.repo.create(&form).await?;
        tracing::info!(admission_id = %created.id, class = %created.class, "admission_submitted");
        Ok(created)
    }
}

pub struct ListAdmissions<'a, R: AdmissionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AdmissionRepository + ?Sized> ListAdmissions<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Admission>> {
        self.repo.list().await
    }
}
