//! Book form input: parsing `key=value` fields and client-side validation.

use bookclub_app::books::models::{BookPatch, FieldError, NewBook};
use bookclub_app::utils;
use clap::Args;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("expected key=value, got '{0}'")]
    Malformed(String),
    #[error("unknown field '{0}' (expected title, author, genre, year, available, ratings)")]
    UnknownField(String),
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("{}", join(.0))]
    Invalid(Vec<FieldError>),
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Form fields as typed by the user. Everything is optional until validated.
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct BookFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    /// Publication year
    #[arg(long)]
    pub year: Option<i32>,
    /// Whether the book can be borrowed
    #[arg(long)]
    pub available: Option<bool>,
    /// Reader rating; repeat for several
    #[arg(long = "rating")]
    pub ratings: Option<Vec<f64>>,
}

impl BookFields {
    /// Parse `title=Dune; author=Frank Herbert; year=1965` style input.
    pub fn parse(input: &str) -> Result<Self, FormError> {
        let mut fields = Self::default();
        for pair in input.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| FormError::Malformed(pair.to_string()))?;
            let value = value.trim();
            match key.trim() {
                "title" => fields.title = Some(value.to_string()),
                "author" => fields.author = Some(value.to_string()),
                "genre" => fields.genre = Some(value.to_string()),
                "year" => {
                    fields.year = Some(value.parse().map_err(|_| FormError::InvalidValue {
                        field: "year",
                        value: value.to_string(),
                    })?)
                }
                "available" => fields.available = Some(parse_flag(value)?),
                "ratings" => fields.ratings = Some(parse_ratings(value)?),
                other => return Err(FormError::UnknownField(other.to_string())),
            }
        }
        Ok(fields)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a validated create request.
    pub fn into_new_book(self) -> Result<NewBook, FormError> {
        let book = NewBook {
            title: self.title,
            author: self.author,
            genre: self.genre,
            published_year: self.year,
            is_available: self.available,
            ratings: self.ratings,
        };
        book.validate(utils::current_year())
            .map_err(FormError::Invalid)?;
        Ok(book)
    }

    /// Build a validated partial update.
    pub fn into_patch(self) -> Result<BookPatch, FormError> {
        let patch = BookPatch {
            title: self.title,
            author: self.author,
            genre: self.genre,
            published_year: self.year,
            is_available: self.available,
            ratings: self.ratings,
        };
        patch
            .validate(utils::current_year())
            .map_err(FormError::Invalid)?;
        Ok(patch)
    }
}

fn parse_flag(value: &str) -> Result<bool, FormError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(FormError::InvalidValue {
            field: "available",
            value: value.to_string(),
        }),
    }
}

fn parse_ratings(value: &str) -> Result<Vec<f64>, FormError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            r.parse::<f64>()
                .ok()
                .filter(|r| r.is_finite())
                .ok_or_else(|| FormError::InvalidValue {
                    field: "ratings",
                    value: r.to_string(),
                })
        })
        .collect()
}
