// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Opaque continuation token returned by a paginated query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub end_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            has_next_page: false,
            end_cursor: None,
        }
    }

    pub fn more(items: Vec<T>, end_cursor: Cursor) -> Self {
        Self {
            items,
            has_next_page: true,
            end_cursor: Some(end_cursor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState<T> {
    pub items: Vec<T>,
    pub is_initial_loading: bool,
    pub is_loading_next_page: bool,
    pub is_searching: bool,
    pub has_next_page: bool,
    pub has_reached_end: bool,
    pub error: Option<String>,
    pub show_retry_button: bool,
    pub end_cursor: Option<Cursor>,
    pub current_search_term: String,
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_initial_loading: false,
            is_loading_next_page: false,
            is_searching: false,
            has_next_page: false,
            has_reached_end: false,
            error: None,
            show_retry_button: false,
            end_cursor: None,
            current_search_term: String::new(),
        }
    }
}

impl<T> PaginationState<T> {
    pub fn is_busy(&self) -> bool {
        self.is_initial_loading || self.is_loading_next_page || self.is_searching
    }

    pub fn is_filtered(&self) -> bool {
        !self.current_search_term.trim().is_empty()
    }

    pub fn can_load_more(&self) -> bool {
        self.has_next_page && !self.is_loading_next_page
    }

    pub fn shows_end_of_list(&self) -> bool {
        self.has_reached_end && !self.has_next_page && !self.items.is_empty()
    }
}

/// Page size for a viewport of `width` density-independent units.
pub fn page_size_for_width(width: f32) -> usize {
    if width < 600.0 {
        15
    } else if width < 840.0 {
        25
    } else {
        35
    }
}
