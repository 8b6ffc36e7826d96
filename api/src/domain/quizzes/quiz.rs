use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{self, ValidationError};

pub const MAX_TITLE: usize = 200;
pub const MAX_DESCRIPTION: usize = 1000;
pub const MAX_QUESTION: usize = 1000;
pub const MIN_QUESTION: usize = 5;
pub const MAX_POINTS: u32 = 1000;
/// Upper bound on a quiz's summed points; scores are stored as `INTEGER`.
pub const MAX_TOTAL_POINTS: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::TrueFalse)
    }
}

/// Index of the correct option, or the exact set of indices for
/// multi-select questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Single(u32),
    Multiple(Vec<u32>),
}

impl CorrectAnswer {
    fn indices(&self) -> Vec<u32> {
        match self {
            CorrectAnswer::Single(i) => vec![*i],
            CorrectAnswer::Multiple(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Answer {
    Single(u32),
    Multiple(Vec<u32>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionOption {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub question: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<CorrectAnswer>,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub order: u32,
}

fn default_points() -> u32 {
    1
}

impl Question {
    /// Builds a single-answer multiple choice question, marking the option at
    /// `correct` as the right one.
    pub fn multiple_choice(text: &str, options: Vec<String>, correct: u32, order: u32) -> Self {
        let options = options
            .into_iter()
            .enumerate()
            .map(|(i, text)| QuestionOption {
                text,
                is_correct: i as u32 == correct,
            })
            .collect();
        Question {
            question: text.trim().to_string(),
            question_type: QuestionType::MultipleChoice,
            options,
            correct_answer: Some(CorrectAnswer::Single(correct)),
            points: 1,
            explanation: None,
            order,
        }
    }

    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let n = index + 1;
        let len = self.question.trim().chars().count();
        if len < MIN_QUESTION {
            return Err(ValidationError::TooShort {
                field: "question",
                min: MIN_QUESTION,
            });
        }
        if len > MAX_QUESTION {
            return Err(ValidationError::TooLong {
                field: "question",
                max: MAX_QUESTION,
            });
        }
        if let Some(expl) = &self.explanation {
            validation::max_len("explanation", expl, MAX_QUESTION)?;
        }
        validation::in_range("points", self.points as i64, 0, MAX_POINTS as i64)?;
        if !self.question_type.is_choice() {
            return Ok(());
        }
        if self.options.len() < 2 {
            return Err(ValidationError::Rule(format!(
                "Question {n} must have at least two options"
            )));
        }
        if self.options.iter().any(|o| o.text.trim().is_empty()) {
            return Err(ValidationError::Rule(format!(
                "Question {n} has an empty option"
            )));
        }
        let correct = self
            .correct_answer
            .as_ref()
            .ok_or_else(|| {
                ValidationError::Rule(format!("Question {n} must have at least one correct answer"))
            })?
            .indices();
        if correct.is_empty() || correct.iter().any(|i| *i as usize >= self.options.len()) {
            return Err(ValidationError::Rule(format!(
                "Question {n} has a correct answer outside its options"
            )));
        }
        Ok(())
    }

    fn grade(&self, answer: Option<&Answer>) -> Option<bool> {
        if !self.question_type.is_choice() {
            return None;
        }
        let correct = self.correct_answer.as_ref()?;
        let ok = match (correct, answer) {
            (CorrectAnswer::Single(c), Some(Answer::Single(a))) => a == c,
            (CorrectAnswer::Single(c), Some(Answer::Multiple(a))) => a.as_slice() == [*c],
            (CorrectAnswer::Multiple(c), Some(Answer::Multiple(a))) => same_set(c, a),
            (CorrectAnswer::Multiple(c), Some(Answer::Single(a))) => c.as_slice() == [*a],
            _ => false,
        };
        Some(ok)
    }

    /// Copy without answer keys, for students.
    fn redacted(&self) -> Question {
        Question {
            options: self
                .options
                .iter()
                .map(|o| QuestionOption {
                    text: o.text.clone(),
                    is_correct: false,
                })
                .collect(),
            correct_answer: None,
            explanation: None,
            ..self.clone()
        }
    }
}

fn same_set(a: &[u32], b: &[u32]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    a.dedup();
    b.sort_unstable();
    b.dedup();
    a == b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShowResults {
    #[default]
    AfterSubmission,
    AfterDeadline,
    Never,
}

impl ShowResults {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowResults::AfterSubmission => "after_submission",
            ShowResults::AfterDeadline => "after_deadline",
            ShowResults::Never => "never",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "after_submission" => Some(ShowResults::AfterSubmission),
            "after_deadline" => Some(ShowResults::AfterDeadline),
            "never" => Some(ShowResults::Never),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub class: String,
    pub section: Option<String>,
    pub teacher_id: Uuid,
    pub teacher_name: Option<String>,
    pub questions: Vec<Question>,
    pub duration: i32,
    pub passing_score: i32,
    pub max_attempts: i32,
    pub is_active: bool,
    pub is_published: bool,
    pub show_results: ShowResults,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub time_limit: i32,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub is_deleted: bool,
    pub total_submissions: i64,
    pub average_score: f64,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("Quiz is not available")]
    NotAvailable,
    #[error("Quiz has not started yet")]
    NotStarted,
    #[error("Quiz has ended")]
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GradedAnswer {
    pub question_index: usize,
    pub is_correct: Option<bool>,
    pub points_earned: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuizScore {
    pub score: u32,
    pub total_possible: u32,
    pub percentage: u32,
    pub passed: bool,
    pub passing_score: i32,
    pub answers: Vec<GradedAnswer>,
}

impl Quiz {
    pub fn total_points(&self) -> u32 {
        self.questions
            .iter()
            .fold(0u32, |acc, q| acc.saturating_add(q.points))
    }

    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.is_published && now >= self.start_date && now <= self.end_date
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.is_published && now < self.start_date
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    pub fn availability(&self, now: DateTime<Utc>) -> Result<(), Unavailable> {
        if self.is_deleted || !self.is_active || !self.is_published {
            return Err(Unavailable::NotAvailable);
        }
        if now < self.start_date {
            return Err(Unavailable::NotStarted);
        }
        if now > self.end_date {
            return Err(Unavailable::Ended);
        }
        Ok(())
    }

    /// Grades `answers` positionally against the questions. Open questions
    /// count toward the possible total but are never auto-graded.
    pub fn score(&self, answers: &[Option<Answer>]) -> QuizScore {
        let mut score: u32 = 0;
        let mut total_possible: u32 = 0;
        let mut graded = Vec::with_capacity(self.questions.len());
        for (i, q) in self.questions.iter().enumerate() {
            total_possible = total_possible.saturating_add(q.points);
            let answer = answers.get(i).and_then(|a| a.as_ref());
            let is_correct = q.grade(answer);
            let earned = if is_correct == Some(true) { q.points } else { 0 };
            score = score.saturating_add(earned);
            graded.push(GradedAnswer {
                question_index: i,
                is_correct,
                points_earned: earned,
            });
        }
        let percentage = if total_possible > 0 {
            ((score as f64 / total_possible as f64) * 100.0).round() as u32
        } else {
            0
        };
        QuizScore {
            score,
            total_possible,
            percentage,
            passed: percentage as i32 >= self.passing_score,
            passing_score: self.passing_score,
            answers: graded,
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> QuizView {
        QuizView {
            total_points: self.total_points(),
            is_ongoing: self.is_ongoing(now),
            is_upcoming: self.is_upcoming(now),
            has_ended: self.has_ended(now),
            quiz: self.clone(),
        }
    }

    pub fn student_view(&self, now: DateTime<Utc>) -> QuizView {
        let mut view = self.view(now);
        view.quiz.questions = self.questions.iter().map(Question::redacted).collect();
        view
    }

    /// Applies a partial update, revalidating the result. On error the quiz
    /// is left untouched.
    pub fn apply(
        &mut self,
        patch: QuizPatch,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let mut spec = self.spec();
        if let Some(v) = patch.title {
            spec.title = v;
        }
        if let Some(v) = patch.description {
            spec.description = validation::optional(Some(v.as_str()));
        }
        if let Some(v) = patch.subject {
            spec.subject = v;
        }
        if let Some(v) = patch.class {
            spec.class = v;
        }
        if let Some(v) = patch.section {
            spec.section = validation::optional(Some(v.as_str()));
        }
        if let Some(v) = patch.questions {
            spec.questions = v;
        }
        if let Some(v) = patch.duration {
            spec.duration = v;
        }
        if let Some(v) = patch.passing_score {
            spec.passing_score = v;
        }
        if let Some(v) = patch.max_attempts {
            spec.max_attempts = v;
        }
        if let Some(v) = patch.is_active {
            spec.is_active = v;
        }
        if let Some(v) = patch.is_published {
            spec.is_published = v;
        }
        if let Some(v) = patch.show_results {
            spec.show_results = v;
        }
        if let Some(v) = patch.start_date {
            spec.start_date = v;
        }
        if let Some(v) = patch.end_date {
            spec.end_date = v;
        }
        if let Some(v) = patch.time_limit {
            spec.time_limit = v;
        }
        let spec = spec.validate()?;

        self.title = spec.title;
        self.description = spec.description;
        self.subject = spec.subject;
        self.class = spec.class;
        self.section = spec.section;
        self.questions = spec.questions;
        self.duration = spec.duration;
        self.passing_score = spec.passing_score;
        self.max_attempts = spec.max_attempts;
        self.is_active = spec.is_active;
        self.is_published = spec.is_published;
        self.show_results = spec.show_results;
        self.start_date = spec.start_date;
        self.end_date = spec.end_date;
        self.time_limit = spec.time_limit;
        self.updated_by = Some(actor);
        self.updated_at = at;
        self.version += 1;
        Ok(())
    }

    fn spec(&self) -> QuizSpec {
        QuizSpec {
            title: self.title.clone(),
            description: self.description.clone(),
            subject: self.subject.clone(),
            class: self.class.clone(),
            section: self.section.clone(),
            questions: self.questions.clone(),
            duration: self.duration,
            passing_score: self.passing_score,
            max_attempts: self.max_attempts,
            is_active: self.is_active,
            is_published: self.is_published,
            show_results: self.show_results,
            start_date: self.start_date,
            end_date: self.end_date,
            time_limit: self.time_limit,
        }
    }
}

/// Quiz with the computed fields clients expect alongside the stored ones.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizView {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub total_points: u32,
    pub is_ongoing: bool,
    pub is_upcoming: bool,
    pub has_ended: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QuizPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub questions: Option<Vec<Question>>,
    pub duration: Option<i32>,
    pub passing_score: Option<i32>,
    pub max_attempts: Option<i32>,
    pub is_active: Option<bool>,
    pub is_published: Option<bool>,
    pub show_results: Option<ShowResults>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub time_limit: Option<i32>,
}

/// Everything a teacher supplies when authoring a quiz.
#[derive(Debug, Clone)]
pub struct QuizSpec {
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub class: String,
    pub section: Option<String>,
    pub questions: Vec<Question>,
    pub duration: i32,
    pub passing_score: i32,
    pub max_attempts: i32,
    pub is_active: bool,
    pub is_published: bool,
    pub show_results: ShowResults,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub time_limit: i32,
}

impl QuizSpec {
    pub fn validate(mut self) -> Result<QuizSpec, ValidationError> {
        self.title = validation::required_max("title", &self.title, MAX_TITLE)?;
        if let Some(d) = &self.description {
            validation::max_len("description", d, MAX_DESCRIPTION)?;
        }
        self.subject = validation::required("subject", &self.subject)?;
        self.class = validation::required("class", &self.class)?;
        if self.questions.is_empty() {
            return Err(ValidationError::Rule(
                "At least one question is required".into(),
            ));
        }
        for (i, q) in self.questions.iter().enumerate() {
            q.validate(i)?;
        }
        let total: u64 = self.questions.iter().map(|q| q.points as u64).sum();
        validation::in_range("total points", total as i64, 0, MAX_TOTAL_POINTS as i64)?;
        for (i, q) in self.questions.iter_mut().enumerate() {
            q.question = q.question.trim().to_string();
            q.order = i as u32;
        }
        validation::in_range("duration", self.duration as i64, 1, 1440)?;
        validation::in_range("passing_score", self.passing_score as i64, 0, 100)?;
        validation::in_range("max_attempts", self.max_attempts as i64, 0, i32::MAX as i64)?;
        validation::in_range("time_limit", self.time_limit as i64, 0, i32::MAX as i64)?;
        if self.end_date <= self.start_date {
            return Err(ValidationError::Rule(
                "End date must be after start date".into(),
            ));
        }
        Ok(self)
    }
}

/// Whether another attempt is allowed after `attempts` prior ones.
/// `max_attempts == 0` means unlimited.
pub fn attempt_allowed(max_attempts: i32, attempts: i64) -> bool {
    max_attempts <= 0 || attempts < max_attempts as i64
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizSubmission {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub answers: Vec<Option<Answer>>,
    pub score: i32,
    pub total_points: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub time_taken: Option<i32>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<Option<Answer>>,
    pub score: QuizScore,
    pub total_questions: i32,
    pub time_taken: Option<i32>,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn sample_quiz(now: DateTime<Utc>) -> Quiz {
        let teacher = Uuid::new_v4();
        Quiz {
            id: Uuid::new_v4(),
            title: "Fractions".into(),
            description: None,
            subject: "Maths".into(),
            class: "6A".into(),
            section: None,
            teacher_id: teacher,
            teacher_name: Some("Mrs. Rao".into()),
            questions: vec![
                Question::multiple_choice("What is 1/2 + 1/4?", vec!["3/4".into(), "2/6".into()], 0, 0),
                Question {
                    points: 2,
                    ..Question::multiple_choice(
                        "Which equals one half?",
                        vec!["2/4".into(), "3/4".into(), "4/8".into()],
                        0,
                        1,
                    )
                },
            ],
            duration: 30,
            passing_score: 50,
            max_attempts: 1,
            is_active: true,
            is_published: true,
            show_results: ShowResults::AfterSubmission,
            start_date: now - Duration::hours(1),
            end_date: now + Duration::days(1),
            time_limit: 0,
            created_by: teacher,
            updated_by: None,
            is_deleted: false,
            total_submissions: 0,
            average_score: 0.0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn spec(now: DateTime<Utc>) -> QuizSpec {
        let q = sample_quiz(now);
        QuizSpec {
            title: q.title,
            description: None,
            subject: q.subject,
            class: q.class,
            section: None,
            questions: q.questions,
            duration: 30,
            passing_score: 50,
            max_attempts: 1,
            is_active: true,
            is_published: true,
            show_results: ShowResults::AfterSubmission,
            start_date: q.start_date,
            end_date: q.end_date,
            time_limit: 0,
        }
    }

    #[test]
    fn score_weights_points_and_rounds_percentage() {
        let quiz = sample_quiz(Utc::now());
        let s = quiz.score(&[Some(Answer::Single(0)), Some(Answer::Single(1))]);
        assert_eq!(s.score, 1);
        assert_eq!(s.total_possible, 3);
        assert_eq!(s.percentage, 33);
        assert!(!s.passed);

        let s = quiz.score(&[Some(Answer::Single(1)), Some(Answer::Single(0))]);
        assert_eq!(s.score, 2);
        assert_eq!(s.percentage, 67);
        assert!(s.passed);
    }

    #[test]
    fn oversized_points_are_rejected() {
        let now = Utc::now();
        let mut s = spec(now);
        s.questions[0].points = u32::MAX;
        assert!(matches!(
            s.validate(),
            Err(ValidationError::OutOfRange { field: "points", .. })
        ));

        let mut s = spec(now);
        let template = s.questions[0].clone();
        s.questions = (0..101)
            .map(|i| Question {
                points: MAX_POINTS,
                order: i,
                ..template.clone()
            })
            .collect();
        assert!(matches!(
            s.validate(),
            Err(ValidationError::OutOfRange { field: "total points", .. })
        ));
    }

    #[test]
    fn score_saturates_instead_of_wrapping() {
        let mut quiz = sample_quiz(Utc::now());
        quiz.questions[0].points = u32::MAX;
        let s = quiz.score(&[Some(Answer::Single(0)), Some(Answer::Single(0))]);
        assert_eq!(s.total_possible, u32::MAX);
        assert_eq!(s.score, u32::MAX);
        assert_eq!(quiz.total_points(), u32::MAX);
    }

    #[test]
    fn missing_answers_score_zero() {
        let quiz = sample_quiz(Utc::now());
        let s = quiz.score(&[]);
        assert_eq!(s.score, 0);
        assert_eq!(s.answers.len(), 2);
        assert_eq!(s.answers[0].is_correct, Some(false));
    }

    #[test]
    fn multi_select_must_match_exactly() {
        let mut quiz = sample_quiz(Utc::now());
        quiz.questions[1].correct_answer = Some(CorrectAnswer::Multiple(vec![0, 2]));
        let s = quiz.score(&[None, Some(Answer::Multiple(vec![2, 0]))]);
        assert_eq!(s.score, 2);
        let s = quiz.score(&[None, Some(Answer::Multiple(vec![0]))]);
        assert_eq!(s.score, 0);
        let s = quiz.score(&[None, Some(Answer::Multiple(vec![0, 1, 2]))]);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn essay_counts_toward_total_but_is_not_graded() {
        let mut quiz = sample_quiz(Utc::now());
        quiz.questions.push(Question {
            question: "Explain equivalent fractions.".into(),
            question_type: QuestionType::Essay,
            options: vec![],
            correct_answer: None,
            points: 5,
            explanation: None,
            order: 2,
        });
        let s = quiz.score(&[
            Some(Answer::Single(0)),
            Some(Answer::Single(0)),
            Some(Answer::Text("Same value".into())),
        ]);
        assert_eq!(s.score, 3);
        assert_eq!(s.total_possible, 8);
        assert_eq!(s.answers[2].is_correct, None);
    }

    #[test]
    fn availability_window() {
        let now = Utc::now();
        let mut quiz = sample_quiz(now);
        assert_eq!(quiz.availability(now), Ok(()));
        assert_eq!(
            quiz.availability(now - Duration::hours(2)),
            Err(Unavailable::NotStarted)
        );
        assert_eq!(quiz.availability(now + Duration::days(2)), Err(Unavailable::Ended));
        quiz.is_published = false;
        assert_eq!(quiz.availability(now), Err(Unavailable::NotAvailable));
    }

    #[test]
    fn attempts_limit() {
        let quiz = sample_quiz(Utc::now());
        assert!(attempt_allowed(quiz.max_attempts, 0));
        assert!(!attempt_allowed(quiz.max_attempts, 1));
        assert!(attempt_allowed(0, 10));
    }

    #[test]
    fn spec_requires_questions_and_ordered_dates() {
        let now = Utc::now();
        let mut s = spec(now);
        s.questions.clear();
        assert!(s.validate().is_err());

        let mut s = spec(now);
        s.end_date = s.start_date;
        assert_eq!(
            s.validate().unwrap_err(),
            ValidationError::Rule("End date must be after start date".into())
        );

        let mut s = spec(now);
        s.duration = 0;
        assert!(matches!(
            s.validate().unwrap_err(),
            ValidationError::OutOfRange { field: "duration", .. }
        ));
    }

    #[test]
    fn spec_rejects_correct_answer_outside_options() {
        let now = Utc::now();
        let mut s = spec(now);
        s.questions[0].correct_answer = Some(CorrectAnswer::Single(5));
        assert!(matches!(s.validate().unwrap_err(), ValidationError::Rule(_)));
    }

    #[test]
    fn student_view_hides_answer_key() {
        let now = Utc::now();
        let view = sample_quiz(now).student_view(now);
        assert!(view.is_ongoing);
        assert_eq!(view.total_points, 3);
        assert!(view.quiz.questions.iter().all(|q| q.correct_answer.is_none()));
        assert!(view
            .quiz
            .questions
            .iter()
            .flat_map(|q| q.options.iter())
            .all(|o| !o.is_correct));
    }

    #[test]
    fn patch_bumps_version_and_revalidates() {
        let now = Utc::now();
        let mut quiz = sample_quiz(now);
        let actor = Uuid::new_v4();
        quiz.apply(
            QuizPatch {
                title: Some("  Fractions II ".into()),
                ..Default::default()
            },
            actor,
            now,
        )
        .unwrap();
        assert_eq!(quiz.title, "Fractions II");
        assert_eq!(quiz.version, 2);
        assert_eq!(quiz.updated_by, Some(actor));

        let err = quiz.apply(
            QuizPatch {
                passing_score: Some(150),
                ..Default::default()
            },
            actor,
            now,
        );
        assert!(err.is_err());
        assert_eq!(quiz.passing_score, 50);
        assert_eq!(quiz.version, 2);
    }
}
