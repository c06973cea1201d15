//! Parameter collections shared across resources.

use serde::Deserialize;
use serde_json::{Map, Value};

use firefly_api::Query;

/// Pagination settings accepted by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Pagination {
    pub(crate) limit: Option<u64>,
    pub(crate) page: Option<u64>,
}

impl Pagination {
    pub(crate) fn apply(&self, query: &mut Query) {
        if let Some(limit) = self.limit {
            query.push("limit", limit.to_string());
        }
        if let Some(page) = self.page {
            query.push("page", page.to_string());
        }
    }
}

/// Start/end date filters. Dates travel as YYYY-MM-DD strings and are
/// only sent when supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DateRange {
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
}

impl DateRange {
    pub(crate) fn apply(&self, query: &mut Query) {
        query.push_opt("start", self.start.clone());
        query.push_opt("end", self.end.clone());
    }

    /// Same filters, placed in a request body instead of the query.
    pub(crate) fn insert_into(&self, body: &mut Map<String, Value>) {
        if let Some(start) = self.start.clone().filter(|v| !v.is_empty()) {
            body.insert("start".to_string(), Value::String(start));
        }
        if let Some(end) = self.end.clone().filter(|v| !v.is_empty()) {
            body.insert("end".to_string(), Value::String(end));
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.is_empty());
        present(&self.start) && present(&self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_only_sends_supplied_values() {
        let mut query = Query::new();
        Pagination {
            limit: Some(50),
            page: None,
        }
        .apply(&mut query);

        let entries: Vec<_> = query.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "limit");
    }

    #[test]
    fn date_range_completeness() {
        let tests = vec![
            (None, None, false),
            (Some("2025-01-01".to_string()), None, false),
            (Some("2025-01-01".to_string()), Some(String::new()), false),
            (
                Some("2025-01-01".to_string()),
                Some("2025-01-31".to_string()),
                true,
            ),
        ];

        for (start, end, expected) in tests {
            assert_eq!(DateRange { start, end }.is_complete(), expected);
        }
    }
}
