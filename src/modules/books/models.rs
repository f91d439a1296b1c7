use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Earliest publication year accepted for a book.
pub const MIN_PUBLISHED_YEAR: i32 = 1000;

/// How far past the current year a publication year may lie (announced titles).
pub const MAX_YEARS_AHEAD: i32 = 5;

/// A catalog entry as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    /// Reader ratings in the order they were given. Values are not range-checked.
    #[serde(default)]
    pub ratings: Vec<f64>,
    /// Set once by the server on creation
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn default_available() -> bool {
    true
}

/// Request model for creating a new book.
///
/// `title` and `author` are optional on the wire so that a missing field is reported as a
/// validation failure rather than a malformed body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<f64>>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            ..Self::default()
        }
    }

    /// Check required fields and the publication year against `current_year`.
    pub fn validate(&self, current_year: i32) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_required("title", self.title.as_deref(), &mut errors);
        check_required("author", self.author.as_deref(), &mut errors);
        check_published_year(self.published_year, current_year, &mut errors);
        into_result(errors)
    }

    /// Fill defaults and stamp the creation time. Call after [`NewBook::validate`].
    pub fn into_draft(self, created_at: OffsetDateTime) -> BookDraft {
        BookDraft {
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            genre: self.genre.filter(|genre| !genre.trim().is_empty()),
            published_year: self.published_year,
            is_available: self.is_available.unwrap_or(true),
            ratings: self.ratings.unwrap_or_default(),
            created_at,
        }
    }
}

/// A validated book that has not been stored yet, so it has no id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    pub is_available: bool,
    pub ratings: Vec<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Partial update. Absent (or null) fields keep their stored value; `id` and `createdAt`
/// cannot be patched and are ignored if sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// An empty string clears the genre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<f64>>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate only the fields the patch carries.
    pub fn validate(&self, current_year: i32) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(title) = self.title.as_deref() {
            check_required("title", Some(title), &mut errors);
        }
        if let Some(author) = self.author.as_deref() {
            check_required("author", Some(author), &mut errors);
        }
        check_published_year(self.published_year, current_year, &mut errors);
        into_result(errors)
    }

    /// Field changes to merge into the stored document.
    pub fn into_changes(self) -> serde_json::Map<String, serde_json::Value> {
        let clear_genre = self
            .genre
            .as_deref()
            .is_some_and(|genre| genre.trim().is_empty());

        let mut changes = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(changes)) => changes,
            _ => serde_json::Map::new(),
        };
        if clear_genre {
            changes.insert("genre".to_string(), serde_json::Value::Null);
        }
        changes
    }
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_required(field: &'static str, value: Option<&str>, errors: &mut Vec<FieldError>) {
    if value.map_or(true, |value| value.trim().is_empty()) {
        errors.push(FieldError {
            field,
            message: format!("{field} is required"),
        });
    }
}

fn check_published_year(year: Option<i32>, current_year: i32, errors: &mut Vec<FieldError>) {
    let Some(year) = year else {
        return;
    };
    let latest = current_year + MAX_YEARS_AHEAD;
    if !(MIN_PUBLISHED_YEAR..=latest).contains(&year) {
        errors.push(FieldError {
            field: "publishedYear",
            message: format!("year must be between {MIN_PUBLISHED_YEAR} and {latest}"),
        });
    }
}

fn into_result(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
