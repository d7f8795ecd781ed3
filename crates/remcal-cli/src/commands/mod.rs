pub mod auth;
pub mod config;
pub mod lists;
pub mod status;
pub mod sync;
