//! SRN community registry backend.
//!
//! Users sign in with an external identity provider and call this service
//! with its bearer tokens. The service keeps their role, their personal
//! details and the announcements published by admins.

pub mod announcement;
pub mod api;
pub mod auth;
pub mod db;
pub mod profile;
pub mod store;
pub mod user;
