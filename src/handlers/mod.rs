pub mod auth;
pub mod enrollments;
pub mod payments;
