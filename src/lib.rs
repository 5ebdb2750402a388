pub mod auth;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;

pub use auth::{login_user, LoginError};
