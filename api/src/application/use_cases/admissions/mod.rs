pub mod decide_admission;
pub mod submit_admission;
