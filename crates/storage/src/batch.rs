// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazy page-by-page iteration over a filtered query

use crate::error::StorageError;
use paynode_core::{ArgumentError, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    MorePagesPossible,
    Exhausted,
}

/// Pages of at most `batch_size` rows, fetched one at a time
///
/// Each call to `next` runs one query at the current offset. The sequence
/// ends at the first empty page (which is not yielded) or after the first
/// error. A finished sequence stays finished; start a new one to re-read.
pub struct Pages<F> {
    fetch: F,
    batch_size: u64,
    offset: u64,
    state: PageState,
}

impl<F> Pages<F> {
    pub(crate) fn new(batch_size: u64, fetch: F) -> Result<Self, ArgumentError> {
        if batch_size == 0 {
            return Err(ArgumentError::ZeroBatchSize);
        }
        Ok(Self {
            fetch,
            batch_size,
            offset: 0,
            state: PageState::MorePagesPossible,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == PageState::Exhausted
    }
}

impl<T, F> Iterator for Pages<F>
where
    F: FnMut(Pagination) -> Result<Vec<T>, StorageError>,
{
    type Item = Result<Vec<T>, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == PageState::Exhausted {
            return None;
        }

        match (self.fetch)(Pagination::page(self.batch_size, self.offset)) {
            Ok(page) if page.is_empty() => {
                self.state = PageState::Exhausted;
                None
            }
            Ok(page) => {
                self.offset += page.len() as u64;
                Some(Ok(page))
            }
            Err(e) => {
                self.state = PageState::Exhausted;
                Some(Err(e))
            }
        }
    }
}

impl<T, F> std::iter::FusedIterator for Pages<F> where
    F: FnMut(Pagination) -> Result<Vec<T>, StorageError>
{
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
