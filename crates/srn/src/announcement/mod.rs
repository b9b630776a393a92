//! Announcements published by admins.

mod models;
mod repository;

pub use models::{Announcement, AnnouncementRequest};
