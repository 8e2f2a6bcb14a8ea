//! Page planning: direction, size, cursor bounds and trimming.

use crate::config::PaginationConfig;
use crate::cursor;
use crate::error::{RelayError, RelayResult};
use crate::filter::Filter;
use crate::sort::Sorting;
use serde::Deserialize;

/// Relay connection arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageArgs {
    pub after: Option<String>,
    pub before: Option<String>,
    pub first: Option<i64>,
    pub last: Option<i64>,
}

impl PageArgs {
    pub fn first(n: i64) -> Self {
        Self {
            first: Some(n),
            ..Self::default()
        }
    }

    pub fn last(n: i64) -> Self {
        Self {
            last: Some(n),
            ..Self::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Validated page arguments with cursors decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub direction: Direction,
    /// Rows the page may hold.
    pub limit: i64,
    /// Decoded `after` cursor.
    pub after: Option<i64>,
    /// Decoded `before` cursor.
    pub before: Option<i64>,
}

impl PagePlan {
    /// Validate `args`.
    ///
    /// `last` selects a backward page, anything else reads forward. Cursors are
    /// decoded here so a bad one fails before any query runs.
    pub fn new(args: &PageArgs, config: &PaginationConfig) -> RelayResult<Self> {
        let after = args.after.as_deref().map(cursor::decode).transpose()?;
        let before = args.before.as_deref().map(cursor::decode).transpose()?;

        for (field, size) in [("first", args.first), ("last", args.last)] {
            if let Some(size) = size.filter(|n| *n < 0) {
                return Err(RelayError::invalid_value(
                    field,
                    format!("must be non-negative, got {size}"),
                ));
            }
        }

        let (direction, requested) = match args.last {
            Some(last) => (Direction::Backward, last),
            None => (
                Direction::Forward,
                args.first.unwrap_or(config.default_page_size),
            ),
        };

        Ok(Self {
            direction,
            limit: config.clamp(requested),
            after,
            before,
        })
    }

    /// Rows to fetch: one extra reveals whether more exist.
    pub fn fetch_limit(&self) -> i64 {
        self.limit.saturating_add(1)
    }

    pub fn is_backward(&self) -> bool {
        self.direction == Direction::Backward
    }

    /// Drop the extra row and restore display order.
    ///
    /// Returns the page rows and whether the extra row was present.
    pub fn trim<T>(&self, mut rows: Vec<T>) -> (Vec<T>, bool) {
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        if self.is_backward() {
            rows.reverse();
        }
        (rows, has_more)
    }
}

/// One bounded, ordered read handed to a row source.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub filter: Filter,
    /// Fetch order (already reversed for backward pages).
    pub sorting: Sorting,
    pub limit: i64,
}
