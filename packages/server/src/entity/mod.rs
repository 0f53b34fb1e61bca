pub mod course;
pub mod instructor;
pub mod location;
pub mod settings;
pub mod student;
pub mod student_course;
pub mod term;
pub mod term_instructor;
pub mod term_selection;
pub mod unavailable_selection;
pub mod unavailable_term;
