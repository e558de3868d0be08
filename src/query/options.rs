use crate::{Error, Result};

pub const DEFAULT_LIMIT: usize = 500;
pub const DEFAULT_SORT_FIELD: &str = "@timestamp";

/// A single change to [`QueryOptions`]. Mutators are applied in order, so a
/// later one overrides an earlier one touching the same field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOpt {
    Offset(usize),
    Limit(usize),
    SortField(String),
    ReverseSort,
}

/// Pagination and sorting for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub offset: usize,
    pub limit: usize,
    pub sort_field: String,
    pub sort_reverse: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::with_default_sort(DEFAULT_SORT_FIELD)
    }
}

impl QueryOptions {
    /// Defaults, sorting on the given timestamp field.
    pub fn with_default_sort(sort_field: impl Into<String>) -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            sort_field: sort_field.into(),
            sort_reverse: false,
        }
    }

    pub fn apply(mut self, opts: impl IntoIterator<Item = QueryOpt>) -> Self {
        for opt in opts {
            match opt {
                QueryOpt::Offset(offset) => self.offset = offset,
                QueryOpt::Limit(limit) => self.limit = limit,
                QueryOpt::SortField(field) => self.sort_field = field,
                QueryOpt::ReverseSort => self.sort_reverse = true,
            }
        }
        self
    }

    pub fn with_offset(self, offset: usize) -> Self {
        self.apply([QueryOpt::Offset(offset)])
    }

    pub fn with_limit(self, limit: usize) -> Self {
        self.apply([QueryOpt::Limit(limit)])
    }

    pub fn with_sort_field(self, field: impl Into<String>) -> Self {
        self.apply([QueryOpt::SortField(field.into())])
    }

    pub fn with_reverse_sort(self) -> Self {
        self.apply([QueryOpt::ReverseSort])
    }

    pub fn sort_order(&self) -> &'static str {
        if self.sort_reverse { "desc" } else { "asc" }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::Validation("limit must be positive".to_string()));
        }
        if self.sort_field.is_empty() {
            return Err(Error::Validation("sort field must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Mutators for command-line style flags, where zero/empty means "not set".
pub fn query_opts_from_flags(
    offset: usize,
    limit: usize,
    sort_field: Option<&str>,
    sort_reverse: bool,
) -> Vec<QueryOpt> {
    let mut opts = Vec::new();

    if offset != 0 {
        opts.push(QueryOpt::Offset(offset));
    }
    if limit != 0 {
        opts.push(QueryOpt::Limit(limit));
    }
    if let Some(field) = sort_field.filter(|f| !f.is_empty()) {
        opts.push(QueryOpt::SortField(field.to_string()));
    }
    if sort_reverse {
        opts.push(QueryOpt::ReverseSort);
    }

    opts
}
