//! API request handlers, organized by resource:
//! - `misc`: banner, health and role check
//! - `users`: registration and the caller's user record
//! - `profiles`: personal details
//! - `admin`: admin-only user management
//! - `announcements`: public listing and admin publishing

mod admin;
mod announcements;
mod misc;
mod profiles;
mod users;

use serde::Serialize;

pub use admin::{
    AdminPersonalDetailsResponse, UserListResponse, edit_user, list_personal_details,
    list_users, update_user_role,
};
pub use announcements::{
    DeleteResponse, create_announcement, delete_announcement, list_announcements,
    update_announcement,
};
pub use misc::{HealthResponse, RoleResponse, check_role, health, root};
pub use profiles::{all_personal_details, my_personal_details, save_personal_details};
pub use users::{me, register};

/// `{message, data}` body used by write endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> MessageResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

/// `{data}` body used by listings.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}
