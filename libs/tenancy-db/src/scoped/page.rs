use sea_orm::{EntityTrait, QuerySelect, Select};
use serde::{Deserialize, Serialize};

/// Limit/offset window over an ordered result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Page {
    #[must_use]
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    #[must_use]
    pub fn first(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub(crate) fn apply<E: EntityTrait>(self, mut select: Select<E>) -> Select<E> {
        if let Some(limit) = self.limit {
            select = QuerySelect::limit(select, limit);
        }
        if let Some(offset) = self.offset {
            select = QuerySelect::offset(select, offset);
        }
        select
    }
}

/// One page of rows plus the size of the whole unpaged, filtered set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counted<R> {
    pub data: Vec<R>,
    pub count: u64,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn page_deserializes_from_query_model() {
        let page: Page = serde_json::from_str(r#"{"limit":20,"offset":40}"#).unwrap();
        assert_eq!(page, Page::new(20, 40));

        let unbounded: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(unbounded, Page::default());
    }

    #[test]
    fn counted_serializes_data_and_total() {
        let counted = Counted {
            data: vec!["a", "b"],
            count: 7,
        };
        assert_eq!(
            serde_json::to_value(&counted).unwrap(),
            serde_json::json!({ "data": ["a", "b"], "count": 7 })
        );
    }
}
