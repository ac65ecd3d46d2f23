use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils;

/// Numeric book identifier.
pub type BookId = i64;

/// One field of a book record as it arrived in JSON.
///
/// `Absent` fields are left out of the output; an explicit `null` is kept and
/// written back as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }
}

impl<T: std::ops::Deref> Field<T> {
    pub fn as_deref(&self) -> Option<&T::Target> {
        self.value().map(|value| &**value)
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(value) => value.serialize(serializer),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

// Only reached when the key is present; a missing key takes `Default`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Value(value),
            None => Field::Null,
        })
    }
}

/// A stored book record.
///
/// Records are kept exactly as callers sent them: absent fields are left out
/// of the JSON, fields sent as `null` stay `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<BookId>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub author: Field<String>,
    /// `YYYY-MM-DD`, never parsed.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub publication_date: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub genre: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub available: Field<bool>,
}

impl Book {
    fn seed(
        id: BookId,
        title: &str,
        author: &str,
        publication_date: &str,
        genre: &str,
        available: bool,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.to_string().into(),
            author: author.to_string().into(),
            publication_date: publication_date.to_string().into(),
            genre: genre.to_string().into(),
            available: available.into(),
        }
    }
}

/// The three records present at startup.
pub fn seed_books() -> Vec<Book> {
    vec![
        Book::seed(1, "Book Title 1", "Author 1", "2022-01-15", "Fiction", true),
        Book::seed(2, "Book Title 2", "Author 2", "2021-06-30", "Mystery", false),
        Book::seed(
            3,
            "Book Title 3",
            "Author 3",
            "2020-11-05",
            "Science Fiction",
            true,
        ),
    ]
}

/// Body of `POST /books`. Any subset of fields, `id` included.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[serde(default)]
    pub id: Field<BookId>,
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub author: Field<String>,
    #[serde(default)]
    pub publication_date: Field<String>,
    #[serde(default)]
    pub genre: Field<String>,
    #[serde(default)]
    pub available: Field<bool>,
}

impl From<NewBook> for Book {
    fn from(new_book: NewBook) -> Self {
        Self {
            id: new_book.id,
            title: new_book.title,
            author: new_book.author,
            publication_date: new_book.publication_date,
            genre: new_book.genre,
            available: new_book.available,
        }
    }
}

/// Body of `PUT /books/{id}`. An `id` in the body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub author: Field<String>,
    #[serde(default)]
    pub publication_date: Field<String>,
    #[serde(default)]
    pub genre: Field<String>,
    #[serde(default)]
    pub available: Field<bool>,
}

impl From<BookUpdate> for Book {
    /// The replacement record carries no id.
    fn from(update: BookUpdate) -> Self {
        Self {
            id: Field::Absent,
            title: update.title,
            author: update.author,
            publication_date: update.publication_date,
            genre: update.genre,
            available: update.available,
        }
    }
}

/// Identifier taken from a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathId {
    Number(BookId),
    /// The segment was not a whole number; matches no record.
    NotANumber,
}

impl PathId {
    pub fn parse(raw: &str) -> Self {
        match utils::parse_numeric_id(raw) {
            Some(id) => PathId::Number(id),
            None => PathId::NotANumber,
        }
    }

    /// Whether `book` is addressed by this identifier.
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            PathId::Number(id) => book.id.value() == Some(id),
            PathId::NotANumber => false,
        }
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathId::Number(id) => write!(f, "{}", id),
            PathId::NotANumber => f.write_str("NaN"),
        }
    }
}
