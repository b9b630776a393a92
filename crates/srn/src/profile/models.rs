//! Personal details data models.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Client-facing date format: `dd/mm/yyyy`.
static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("Invalid regex pattern for date of birth")
});

/// Editable detail columns, in storage order.
pub(crate) const DETAIL_COLUMNS: [&str; 16] = [
    "name",
    "father_name",
    "nationality",
    "phone_number",
    "date_of_birth",
    "caste",
    "gender",
    "gotra",
    "education",
    "occupation",
    "postal_address",
    "mother_tongue",
    "marital_status",
    "state",
    "district",
    "adhaar",
];

/// Convert `dd/mm/yyyy` to ISO `yyyy-mm-dd`. Other values pass through.
pub fn date_of_birth_for_storage(value: &str) -> String {
    match DAY_MONTH_YEAR.captures(value) {
        Some(caps) => format!("{}-{}-{}", &caps[3], &caps[2], &caps[1]),
        None => value.to_string(),
    }
}

/// Convert a stored ISO date (optionally with a time part) to `dd/mm/yyyy`.
/// Values that are not `y-m-d` pass through.
pub fn date_of_birth_for_display(value: &str) -> String {
    let base = value.split('T').next().unwrap_or_default();
    let parts: Vec<&str> = base.split('-').collect();

    match parts.as_slice() {
        [y, m, d] if !y.is_empty() && !m.is_empty() && !d.is_empty() => {
            format!("{d:0>2}/{m:0>2}/{y}")
        }
        _ => value.to_string(),
    }
}

/// A user's personal details row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PersonalDetails {
    pub id: String,
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub nationality: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub caste: Option<String>,
    pub gender: Option<String>,
    pub gotra: Option<String>,
    pub education: Option<String>,
    pub occupation: Option<String>,
    pub postal_address: Option<String>,
    pub mother_tongue: Option<String>,
    pub marital_status: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub adhaar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PersonalDetails {
    /// Row as returned to clients, with the date of birth as `dd/mm/yyyy`.
    pub fn for_display(mut self) -> Self {
        self.date_of_birth = self
            .date_of_birth
            .as_deref()
            .map(date_of_birth_for_display);
        self
    }
}

/// Columns returned by the admin user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PersonalDetailsSummary {
    pub id: String,
    pub user_id: String,
    pub email: Option<String>,
    pub adhaar: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub district: Option<String>,
    pub nationality: Option<String>,
    pub state: Option<String>,
    pub caste: Option<String>,
    pub gender: Option<String>,
    pub gotra: Option<String>,
    pub marital_status: Option<String>,
    pub created_at: String,
}

/// Body of `POST /api/personal-details`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalDetailsInput {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub nationality: Option<String>,
    pub phone_number: Option<String>,
    /// `dd/mm/yyyy` or ISO `yyyy-mm-dd`.
    pub date_of_birth: Option<String>,
    pub caste: Option<String>,
    pub gender: Option<String>,
    pub gotra: Option<String>,
    pub education: Option<String>,
    pub occupation: Option<String>,
    pub postal_address: Option<String>,
    pub mother_tongue: Option<String>,
    pub marital_status: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub adhaar: Option<String>,
}

impl PersonalDetailsInput {
    /// Column values in [`DETAIL_COLUMNS`] order, ready for storage.
    pub(crate) fn values(&self) -> [Option<String>; 16] {
        [
            self.name.clone(),
            self.father_name.clone(),
            self.nationality.clone(),
            self.phone_number.clone(),
            self.date_of_birth.as_deref().map(date_of_birth_for_storage),
            self.caste.clone(),
            self.gender.clone(),
            self.gotra.clone(),
            self.education.clone(),
            self.occupation.clone(),
            self.postal_address.clone(),
            self.mother_tongue.clone(),
            self.marital_status.clone(),
            self.state.clone(),
            self.district.clone(),
            self.adhaar.clone(),
        ]
    }

    /// Only the columns present in the input.
    pub(crate) fn assignments(&self) -> Vec<(&'static str, String)> {
        DETAIL_COLUMNS
            .into_iter()
            .zip(self.values())
            .filter_map(|(column, value)| value.map(|v| (column, v)))
            .collect()
    }
}

/// Body of `POST /api/admin/edit-user`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditUserRequest {
    /// Personal details row id.
    pub id: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub details: PersonalDetailsInput,
}

impl EditUserRequest {
    pub(crate) fn assignments(&self) -> Vec<(&'static str, String)> {
        let mut assignments = Vec::new();
        if let Some(email) = &self.email {
            assignments.push(("email", email.clone()));
        }
        assignments.extend(self.details.assignments());
        assignments
    }
}

/// Default page size of the admin user listing.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filters and paging for `GET /api/admin/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalDetailsQuery {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    pub district: Option<String>,
    pub nationality: Option<String>,
    pub state: Option<String>,
    pub caste: Option<String>,
    pub gender: Option<String>,
    pub gotra: Option<String>,
    pub marital_status: Option<String>,
    pub adhaar: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PersonalDetailsQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Exact-match filters that were supplied with a non-empty value.
    pub(crate) fn equality_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("district", &self.district),
            ("nationality", &self.nationality),
            ("state", &self.state),
            ("caste", &self.caste),
            ("gender", &self.gender),
            ("gotra", &self.gotra),
            ("marital_status", &self.marital_status),
            ("adhaar", &self.adhaar),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (column, v))
        })
        .collect()
    }

    pub(crate) fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_of_birth_for_storage() {
        assert_eq!(date_of_birth_for_storage("15/08/1990"), "1990-08-15");
        assert_eq!(date_of_birth_for_storage("1990-08-15"), "1990-08-15");
        // Single-digit parts are not in the client format.
        assert_eq!(date_of_birth_for_storage("5/8/1990"), "5/8/1990");
        assert_eq!(date_of_birth_for_storage(""), "");
    }

    #[test]
    fn test_date_of_birth_for_display() {
        assert_eq!(date_of_birth_for_display("1990-08-15"), "15/08/1990");
        assert_eq!(
            date_of_birth_for_display("1990-08-15T00:00:00Z"),
            "15/08/1990"
        );
        assert_eq!(date_of_birth_for_display("1990-8-5"), "05/08/1990");
        assert_eq!(date_of_birth_for_display("15/08/1990"), "15/08/1990");
        assert_eq!(date_of_birth_for_display("unknown"), "unknown");
    }

    #[test]
    fn test_storage_then_display_restores_client_format() {
        let stored = date_of_birth_for_storage("01/02/2003");
        assert_eq!(stored, "2003-02-01");
        assert_eq!(date_of_birth_for_display(&stored), "01/02/2003");
    }

    #[test]
    fn test_input_values_follow_column_order() {
        let input = PersonalDetailsInput {
            name: Some("Asha".to_string()),
            date_of_birth: Some("15/08/1990".to_string()),
            adhaar: Some("1234".to_string()),
            ..Default::default()
        };

        assert_eq!(
            input.assignments(),
            vec![
                ("name", "Asha".to_string()),
                ("date_of_birth", "1990-08-15".to_string()),
                ("adhaar", "1234".to_string()),
            ]
        );
    }

    #[test]
    fn test_edit_request_flattens_fields() {
        let request: EditUserRequest = serde_json::from_value(serde_json::json!({
            "id": "row-1",
            "email": "new@example.com",
            "gender": "female",
            "unknown_field": "ignored",
        }))
        .unwrap();

        assert_eq!(request.id.as_deref(), Some("row-1"));
        assert_eq!(
            request.assignments(),
            vec![
                ("email", "new@example.com".to_string()),
                ("gender", "female".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_paging_defaults_and_bounds() {
        let query = PersonalDetailsQuery::default();
        assert_eq!((query.page(), query.limit(), query.offset()), (1, 10, 0));

        let query = PersonalDetailsQuery {
            page: Some(3),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!((query.page(), query.limit(), query.offset()), (3, 100, 200));

        let query = PersonalDetailsQuery {
            page: Some(0),
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!((query.page(), query.limit()), (1, 1));
    }

    #[test]
    fn test_empty_filters_are_ignored() {
        let query = PersonalDetailsQuery {
            search: Some(String::new()),
            district: Some("Pune".to_string()),
            gender: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);
        assert_eq!(query.equality_filters(), vec![("district", "Pune")]);
    }
}
