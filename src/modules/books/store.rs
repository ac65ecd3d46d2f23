//! In-memory book collection.
//!
//! Records live in insertion order behind a readers-writer lock. Lookups
//! return the first match, ids are not required to be unique, and nothing
//! is validated on the way in.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use library_kernel::settings::{BooksSettings, IdAssignment, UpdateMode};
use thiserror::Error;

use super::models::{seed_books, Book, BookId, BookUpdate, Field, NewBook, PathId};

/// Outcome of a store operation that did not produce a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no book with id {0}")]
    NotFound(PathId),

    #[error("book store fault: {0}")]
    Internal(String),
}

/// Behavior switches for the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub update_mode: UpdateMode,
    pub id_assignment: IdAssignment,
}

impl From<&BooksSettings> for StoreOptions {
    fn from(settings: &BooksSettings) -> Self {
        Self {
            update_mode: settings.update_mode,
            id_assignment: settings.id_assignment,
        }
    }
}

#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<Vec<Book>>,
    options: StoreOptions,
}

impl BookStore {
    /// An empty store.
    pub fn new(options: StoreOptions) -> Self {
        Self::with_books(Vec::new(), options)
    }

    /// A store holding the three startup records.
    pub fn seeded(options: StoreOptions) -> Self {
        Self::with_books(seed_books(), options)
    }

    pub fn with_books(books: Vec<Book>, options: StoreOptions) -> Self {
        Self {
            books: RwLock::new(books),
            options,
        }
    }

    /// Build the store described by the `[books]` settings section.
    pub fn from_settings(settings: &BooksSettings) -> Self {
        let options = StoreOptions::from(settings);
        if settings.seed {
            Self::seeded(options)
        } else {
            Self::new(options)
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// Every record, in insertion order.
    pub fn list_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.read()?.clone())
    }

    /// The first record whose id equals `id`.
    pub fn get_by_id(&self, id: PathId) -> Result<Book, StoreError> {
        self.read()?
            .iter()
            .find(|book| id.matches(book))
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Append a record built from exactly the supplied fields.
    ///
    /// With [`IdAssignment::Sequential`] a missing or `null` id is filled with
    /// one more than the largest stored id.
    pub fn create(&self, new_book: NewBook) -> Result<Book, StoreError> {
        let mut books = self.write()?;
        let mut book = Book::from(new_book);

        if self.options.id_assignment == IdAssignment::Sequential && book.id.value().is_none() {
            book.id = Field::Value(next_id(&books)?);
        }

        books.push(book.clone());
        tracing::debug!(id = ?book.id, total = books.len(), "book appended");
        Ok(book)
    }

    /// Replace the record matching `id` with one built from `update`.
    ///
    /// In [`UpdateMode::Detached`] the replacement (without an id) is only
    /// returned; the stored record stays as it was. In
    /// [`UpdateMode::WriteBack`] the replacement keeps the stored id, is
    /// written in place, and the stored record is returned.
    pub fn update_by_id(&self, id: PathId, update: BookUpdate) -> Result<Book, StoreError> {
        match self.options.update_mode {
            UpdateMode::Detached => {
                let books = self.read()?;
                if !books.iter().any(|book| id.matches(book)) {
                    return Err(StoreError::NotFound(id));
                }
                tracing::debug!(%id, "book update built, not stored");
                Ok(Book::from(update))
            }
            UpdateMode::WriteBack => {
                let mut books = self.write()?;
                let book = books
                    .iter_mut()
                    .find(|book| id.matches(book))
                    .ok_or(StoreError::NotFound(id))?;

                *book = Book {
                    id: book.id,
                    ..Book::from(update)
                };
                tracing::debug!(%id, "book updated in place");
                Ok(book.clone())
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn books_for_test(&self) -> &RwLock<Vec<Book>> {
        &self.books
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Book>>, StoreError> {
        self.books
            .read()
            .map_err(|_| StoreError::Internal("book collection lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Book>>, StoreError> {
        self.books
            .write()
            .map_err(|_| StoreError::Internal("book collection lock poisoned".to_string()))
    }
}

fn next_id(books: &[Book]) -> Result<BookId, StoreError> {
    match books.iter().filter_map(|book| book.id.value().copied()).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| StoreError::Internal("book id space exhausted".to_string())),
    }
}
