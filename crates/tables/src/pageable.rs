//! Query results.
//!
//! The production client returns a paged async stream. The fake materializes
//! every match when the query is made and hands back a [`Pageable`]: an
//! immutable snapshot that can be iterated any number of times and always
//! consists of a single page with no continuation token. Later writes to the
//! table do not affect a `Pageable` that was already returned.

use std::{slice, sync::Arc};

/// A finite, restartable sequence of query results.
///
/// Cloning is cheap; clones share the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Pageable<T> {
    items: Arc<[T]>,
}

impl<T> Pageable<T> {
    /// Wraps already-collected results.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self { items: items.into() }
    }

    /// Number of results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the query matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the results in table order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The first result, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// The results as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterates page by page. There is always exactly one page.
    pub fn as_pages(&self) -> impl Iterator<Item = Page<'_, T>> {
        std::iter::once(Page { values: &self.items })
    }
}

impl<T: Clone> Pageable<T> {
    /// Copies the results into a `Vec`.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items.to_vec()
    }
}

impl<T> Default for Pageable<T> {
    fn default() -> Self {
        Self { items: Arc::from(Vec::new()) }
    }
}

impl<T> From<Vec<T>> for Pageable<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<'a, T> IntoIterator for &'a Pageable<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for Pageable<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

/// One page of a [`Pageable`].
#[derive(Debug, Clone, Copy)]
pub struct Page<'a, T> {
    values: &'a [T],
}

impl<'a, T> Page<'a, T> {
    /// Rows on this page.
    #[must_use]
    pub fn values(&self) -> &'a [T] {
        self.values
    }

    /// Token for the next page. Always `None`: the fake never splits results.
    #[must_use]
    pub fn continuation_token(&self) -> Option<&'a str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_is_restartable() {
        let results = Pageable::new(vec![1, 2, 3]);
        let first: Vec<_> = results.iter().copied().collect();
        let second: Vec<_> = (&results).into_iter().copied().collect();
        assert_eq!(first, second);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_single_page_without_continuation() {
        let results = Pageable::new(vec!["a", "b"]);
        let pages: Vec<_> = results.as_pages().collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].values(), &["a", "b"]);
        assert_eq!(pages[0].continuation_token(), None);
    }

    #[test]
    fn test_empty_results_still_have_one_page() {
        let results: Pageable<u8> = Pageable::default();
        assert!(results.is_empty());
        assert_eq!(results.first(), None);
        assert_eq!(results.as_pages().count(), 1);
    }

    #[test]
    fn test_clones_share_snapshot() {
        let results = Pageable::new(vec![String::from("x")]);
        let copy = results.clone();
        assert_eq!(copy.into_vec(), vec![String::from("x")]);
        assert_eq!(results.first().map(String::as_str), Some("x"));
    }
}
