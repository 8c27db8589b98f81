//! One paging contract for every listing endpoint.
//!
//! Callers send a 1-based `page`, a `size` and an `orderBy` key; results are
//! always sorted descending by that key.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Sortable fields of an entity: `(api name, storage column)`.
pub type SortKeys = &'static [(&'static str, &'static str)];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Page number is invalid")]
    PageNumberInvalid,
    #[error("Size number is invalid")]
    SizeNumberInvalid,
    #[error("Sort name is invalid")]
    SortNameInvalid,
}

impl From<PaginationError> for AppError {
    fn from(err: PaginationError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

/// Raw paging input, from a query string or a JSON body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub order_by: Option<String>,
}

impl Paging {
    pub fn new(page: i64, size: i64, order_by: &str) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            order_by: Some(order_by.to_string()),
        }
    }

    pub fn validate(&self, sortable: SortKeys) -> Result<PageRequest, PaginationError> {
        let page = self
            .page
            .filter(|p| *p > 0)
            .ok_or(PaginationError::PageNumberInvalid)?;
        let size = self
            .size
            .filter(|s| *s > 0)
            .ok_or(PaginationError::SizeNumberInvalid)?;
        let key = self
            .order_by
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(PaginationError::SortNameInvalid)?;

        let sort_column = sortable
            .iter()
            .find(|(api, column)| *api == key || *column == key)
            .map(|(_, column)| *column)
            .ok_or(PaginationError::SortNameInvalid)?;

        Ok(PageRequest {
            page: page as u64,
            size: size as u64,
            sort_column,
        })
    }
}

/// Validated paging: 1-based page, positive size, whitelisted sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort_column: &'static str,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    /// Applies this page to an already sorted in-memory sequence.
    pub fn slice<T: Clone>(&self, sorted: &[T]) -> Vec<T> {
        sorted
            .iter()
            .skip(self.offset() as usize)
            .take(self.size as usize)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(request.size),
            number: request.page,
            size: request.size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}
