// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AppError, Cursor, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    Listing,
    Search { term: String },
}

impl QueryKind {
    pub fn term(&self) -> Option<&str> {
        match self {
            Self::Listing => None,
            Self::Search { term } => Some(term),
        }
    }
}

/// A single page fetch planned by a list controller.
///
/// `generation` ties the eventual response back to the controller state
/// that issued it; responses for an older generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub kind: QueryKind,
    pub page_size: usize,
    pub cursor: Option<Cursor>,
    pub reset: bool,
}

pub trait PaginatedRepository<T> {
    fn list_page(&self, page_size: usize, cursor: Option<&Cursor>) -> Result<Page<T>, AppError>;

    fn search_page(
        &self,
        term: &str,
        page_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<T>, AppError>;

    fn fetch(&self, request: &PageRequest) -> Result<Page<T>, AppError> {
        match &request.kind {
            QueryKind::Listing => self.list_page(request.page_size, request.cursor.as_ref()),
            QueryKind::Search { term } => {
                self.search_page(term, request.page_size, request.cursor.as_ref())
            }
        }
    }
}
