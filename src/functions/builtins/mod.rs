pub mod course_greeting;
pub use course_greeting::*;

pub mod hello;
pub use hello::*;

pub mod student_score;
pub use student_score::*;
