pub mod auth;
pub mod documents;
