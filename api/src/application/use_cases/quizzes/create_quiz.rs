use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::application::access::AuthUser;
use crate::application::error::ServiceResult;
use crate::application::ports::quiz_repository::{QuizAuthor, QuizRepository};
use crate::domain::quizzes::quiz::{
    CorrectAnswer, Question, QuestionOption, QuestionType, Quiz, QuizSpec, ShowResults,
};

pub const DEFAULT_DURATION: i32 = 30;
pub const DEFAULT_PASSING_SCORE: i32 = 50;
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Question as authored in the quiz form: plain option labels plus the
/// index (or indices) of the right ones.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuestionInput {
    #[serde(alias = "question")]
    pub question_text: String,
    #[serde(default)]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<CorrectAnswer>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionInput {
    fn into_question(self, order: u32) -> Question {
        let correct = self.correct_answer.as_ref().map(|c| match c {
            CorrectAnswer::Single(i) => vec![*i],
            CorrectAnswer::Multiple(v) => v.clone(),
        });
        let options = self
            .options
            .into_iter()
            .enumerate()
            .map(|(i, text)| QuestionOption {
                text: text.trim().to_string(),
                is_correct: correct
                    .as_ref()
                    .is_some_and(|c| c.contains(&(i as u32))),
            })
            .collect();
        Question {
            question: self.question_text,
            question_type: self.question_type.unwrap_or_default(),
            options,
            correct_answer: self.correct_answer,
            points: self.points.unwrap_or(1),
            explanation: self.explanation,
            order,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateQuizRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub subject: String,
    pub class: String,
    #[serde(default)]
    pub section: Option<String>,
    pub questions: Vec<QuestionInput>,
    pub duration: Option<i32>,
    pub passing_score: Option<i32>,
    pub max_attempts: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    pub show_results: Option<ShowResults>,
    pub time_limit: Option<i32>,
}

impl CreateQuizRequest {
    pub fn into_spec(self, now: DateTime<Utc>) -> QuizSpec {
        let duration = self.duration.unwrap_or(DEFAULT_DURATION);
        let start_date = self.start_date.unwrap_or(now);
        QuizSpec {
            title: self.title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            subject: self.subject,
            class: self.class,
            section: self.section.filter(|s| !s.trim().is_empty()),
            questions: self
                .questions
                .into_iter()
                .enumerate()
                .map(|(i, q)| q.into_question(i as u32))
                .collect(),
            duration,
            passing_score: self.passing_score.unwrap_or(DEFAULT_PASSING_SCORE),
            max_attempts: self.max_attempts.unwrap_or(1),
            is_active: true,
            is_published: self.is_published.unwrap_or(true),
            show_results: self.show_results.unwrap_or_default(),
            start_date,
            end_date: self
                .end_date
                .unwrap_or(start_date + Duration::days(DEFAULT_WINDOW_DAYS)),
            time_limit: self.time_limit.unwrap_or(duration),
        }
    }
}

pub struct CreateQuiz<'a, R: QuizRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: QuizRepository + ?Sized> CreateQuiz<'a, R> {
    pub async fn execute(&self, author: &AuthUser, req: CreateQuizRequest) -> ServiceResult<Quiz> {
        let spec = req.into_spec(Utc::now()).validate()?;
        let quiz = self
            .repo
            .create(
                &spec,
                QuizAuthor {
                    id: author.id,
                    name: &author.name,
                },
            )
            .await?;
        tracing::info!(quiz_id = %quiz.id, class = %quiz.class, teacher_id = %author.id, "quiz_created");
        Ok(quiz)
    }
}
