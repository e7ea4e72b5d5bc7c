//! Request DTOs
//!
//! Query-string parameters accepted by the content endpoints.

use serde::Deserialize;

use crate::content::model::MAX_PAGE_SIZE;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RELATED_LIMIT: usize = 3;
pub const MAX_RELATED_LIMIT: usize = 20;

/// `?page=&page_size=` for paginated listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// `?q=` for search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchQuery {
    /// The trimmed search term, or an error message when it is blank.
    pub fn term(&self) -> Result<&str, String> {
        match self.q.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => Ok(term),
            _ => Err("Search term 'q' cannot be empty".to_string()),
        }
    }
}

/// `?limit=` for related articles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RelatedQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_RELATED_LIMIT)
            .min(MAX_RELATED_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_query_clamps() {
        let query = PageQuery {
            page: Some(0),
            page_size: Some(5000),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_search_term_validation() {
        let blank = SearchQuery {
            q: Some("   ".to_string()),
        };
        assert!(blank.term().is_err());
        assert!(SearchQuery::default().term().is_err());

        let query = SearchQuery {
            q: Some(" tokio ".to_string()),
        };
        assert_eq!(query.term(), Ok("tokio"));
    }

    #[test]
    fn test_related_limit() {
        assert_eq!(RelatedQuery::default().limit(), DEFAULT_RELATED_LIMIT);
        let query = RelatedQuery { limit: Some(500) };
        assert_eq!(query.limit(), MAX_RELATED_LIMIT);
    }
}
