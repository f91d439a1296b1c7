//! Plain-text views of the catalog.

use std::fmt::Write;

use bookclub_app::books::models::Book;

use crate::state::CatalogState;

/// The list pane: filtered books, or a hint when the catalog is empty.
pub fn list(state: &CatalogState) -> String {
    if state.books.is_empty() {
        return "No books found. Add your first book!\n".to_string();
    }

    let books = state.filtered();
    if books.is_empty() {
        return format!("No books match \"{}\".\n", state.search_query);
    }

    let mut out = String::new();
    for book in books {
        let marker = if state.current.as_ref().is_some_and(|c| c.id == book.id) {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(out, "{marker} {}  {} by {}", book.id, book.title, book.author);
    }
    out
}

/// The details pane for one book.
pub fn details(book: Option<&Book>) -> String {
    let Some(book) = book else {
        return "Select a book to view its details.\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "  id:        {}", book.id);
    let _ = writeln!(out, "  author:    {}", book.author);
    let _ = writeln!(out, "  genre:     {}", book.genre.as_deref().unwrap_or("-"));
    let _ = writeln!(
        out,
        "  published: {}",
        book.published_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(
        out,
        "  status:    {}",
        if book.is_available {
            "available"
        } else {
            "checked out"
        }
    );
    let _ = writeln!(out, "  rating:    {}", average_rating(&book.ratings));
    let _ = writeln!(out, "  added:     {}", book.created_at.date());
    out
}

/// Error banner, if one is raised.
pub fn banner(state: &CatalogState) -> Option<String> {
    state
        .error
        .as_ref()
        .map(|error| format!("! {error} (type 'dismiss' to clear)"))
}

fn average_rating(ratings: &[f64]) -> String {
    if ratings.is_empty() {
        return "no ratings".to_string();
    }
    let average = ratings.iter().sum::<f64>() / ratings.len() as f64;
    format!("{average:.1} ({} ratings)", ratings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn gatsby() -> Book {
        Book {
            id: "b1".to_string(),
            title: "The Great Gatsby".to_string(),
            author: "F. Scott Fitzgerald".to_string(),
            genre: Some("Fiction".to_string()),
            published_year: Some(1925),
            is_available: false,
            ratings: vec![4.0, 5.0],
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_catalog_hint() {
        assert_eq!(
            list(&CatalogState::default()),
            "No books found. Add your first book!\n"
        );
    }

    #[test]
    fn list_marks_selected_book() {
        let state = CatalogState {
            books: vec![gatsby()],
            current: Some(gatsby()),
            ..CatalogState::default()
        };
        assert_eq!(list(&state), "> b1  The Great Gatsby by F. Scott Fitzgerald\n");
    }

    #[test]
    fn details_summarize_book() {
        let text = details(Some(&gatsby()));
        assert!(text.contains("published: 1925"));
        assert!(text.contains("checked out"));
        assert!(text.contains("4.5 (2 ratings)"));
        assert_eq!(details(None), "Select a book to view its details.\n");
    }
}
