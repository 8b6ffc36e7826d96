use chrono::Utc;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::ports::admission_repository::AdmissionRepository;
use crate::application::ports::sms_notifier::{SmsNotifier, SmsReceipt};
use crate::domain::admissions::admission::{
    Admission, AdmissionDecision, AlreadyDecided, approval_message, rejection_message,
};

#[derive(thiserror::Error, Debug)]
pub enum DecideAdmissionError {
    #[error("Admission not found")]
    NotFound,
    #[error(transparent)]
    AlreadyDecided(#[from] AlreadyDecided),
    #[error("failed to persist admission decision")]
    Persist(#[source] anyhow::Error),
}

impl From<DecideAdmissionError> for ServiceError {
    fn from(err: DecideAdmissionError) -> Self {
        match err {
            DecideAdmissionError::NotFound => ServiceError::NotFound("Admission"),
            DecideAdmissionError::AlreadyDecided(e) => ServiceError::Conflict(e.to_string()),
            DecideAdmissionError::Persist(e) => ServiceError::Internal(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub admission: Admission,
    pub sms: SmsReceipt,
}

pub struct DecideAdmission<'a, R, S>
where
    R: AdmissionRepository + ?Sized,
    S: SmsNotifier + ?Sized,
{
    pub repo: &'a R,
    pub sms: &'a S,
    pub school_name: &'a str,
}

impl<'a, R, S> DecideAdmission<'a, R, S>
where
    R: AdmissionRepository + ?Sized,
    S: SmsNotifier + ?Sized,
{
    pub async fn execute(
        &self,
        id: Uuid,
        decision: AdmissionDecision,
        actor: Uuid,
        notes: Option<String>,
    ) -> Result<DecisionOutcome, DecideAdmissionError> {
        let mut admission = self
            .repo
            .find(id)
            .await
            .map_err(DecideAdmissionError::Persist)?
            .ok_or(DecideAdmissionError::NotFound)?;
        let previous = admission.status;
        admission.decide(decision, actor, Utc::now(), notes)?;
        let saved = self
            .repo
            .save_decision(&admission)
            .await
            .map_err(DecideAdmissionError::Persist)?;
        if !saved {
            // Lost a race with another decision.
            return Err(AlreadyDecided(previous).into());
        }
        tracing::info!(
            admission_id = %admission.id,
            status = admission.status.as_str(),
            actor = %actor,
            "admission_decided"
        );

        let body = match decision {
            AdmissionDecision::Approve => approval_message(&admission.name, self.school_name),
            AdmissionDecision::Decline => rejection_message(&admission.name, self.school_name),
        };
        let sms = match self.sms.send(&admission.parent_number, &body).await {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(admission_id = %admission.id, error = ?err, "admission_sms_failed");
                SmsReceipt {
                    sent: false,
                    message: err.to_string(),
                }
            }
        };
        Ok(DecisionOutcome { admission, sms })
    }
}
