//! Personal details of registered users.

mod models;
mod repository;

pub use models::{
    DEFAULT_PAGE_SIZE, EditUserRequest, MAX_PAGE_SIZE, PersonalDetails, PersonalDetailsInput,
    PersonalDetailsQuery, PersonalDetailsSummary, date_of_birth_for_display,
    date_of_birth_for_storage,
};
