use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

use crate::models::Category;

/// Column the document table is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// Filename, compared case-insensitively
    #[default]
    Name,
    /// Byte size, compared numerically
    Size,
    /// Category wire name, compared case-insensitively
    Category,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Size => "size",
            SortField::Category => "category",
        }
    }
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" | "filename" => Ok(SortField::Name),
            "size" => Ok(SortField::Size),
            "category" => Ok(SortField::Category),
            other => Err(anyhow!("Unknown sort field '{}' (expected name, size or category)", other)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Arrow shown next to the active column header
    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Column-header semantics: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.reversed();
        } else {
            self.field = field;
            self.order = SortOrder::Asc;
        }
    }
}

/// Everything the derived document view depends on besides the documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCriteria {
    /// Case-insensitive substring matched against filename or content
    pub search_term: String,
    /// `None` shows every category
    pub category: Option<Category>,
    pub sort: SortState,
}

impl ViewCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    /// True when neither search nor category narrows the list
    pub fn is_unfiltered(&self) -> bool {
        self.search_term.is_empty() && self.category.is_none()
    }

    /// Reset search and category, keeping the sort
    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.category = None;
    }

    /// Step the category filter: all → general → … → scraped → all
    pub fn cycle_category(&mut self) {
        self.category = match &self.category {
            None => Some(Category::ALL[0].clone()),
            Some(current) => {
                let next = current.next();
                if next == Category::ALL[0] { None } else { Some(next) }
            }
        };
    }
}
