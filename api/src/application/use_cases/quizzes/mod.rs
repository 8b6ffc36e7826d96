pub mod create_quiz;
pub mod list_quizzes;
pub mod list_submissions;
pub mod submit_quiz;
pub mod update_quiz;
