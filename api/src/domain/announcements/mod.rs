pub mod announcement;
