pub mod attendance;
pub mod courses;
pub mod directors;
pub mod grades;
pub mod health;
pub mod students;
pub mod teachers;
pub mod users;
