use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Body of every `POST .../list` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListRequest {
    pub page: u64,
    pub page_size: i64,
    pub status: Option<String>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub filter_criterias: Vec<FilterCriteria>,
}

impl Default for ListRequest {
    fn default() -> Self {
        ListRequest {
            page: 1,
            page_size: 10,
            status: None,
            order_by: None,
            order_dir: None,
            filter_criterias: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterCriteria {
    pub field: String,
    #[serde(default)]
    pub operator: FilterOperator,
    pub value: String,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    #[default]
    Eq,
    Ne,
    Contains,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: i64,
}

impl ListRequest {
    pub fn filter_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(status) = &self.status {
            filter.insert("status", status.as_str());
        }
        for criteria in &self.filter_criterias {
            match criteria.operator {
                FilterOperator::Eq => {
                    filter.insert(criteria.field.as_str(), criteria.value.as_str());
                }
                FilterOperator::Ne => {
                    filter.insert(
                        criteria.field.as_str(),
                        doc! { "$ne": criteria.value.as_str() },
                    );
                }
                FilterOperator::Contains => {
                    filter.insert(
                        criteria.field.as_str(),
                        doc! { "$regex": escape_regex(&criteria.value), "$options": "i" },
                    );
                }
            }
        }
        filter
    }

    pub fn find_options(&self) -> FindOptions {
        let page = self.page.max(1);
        let page_size = self.page_size.clamp(1, 100);
        // The page number is client-supplied, so the skip must not overflow.
        let skip = (page - 1).saturating_mul(page_size as u64);

        let sort = self.order_by.as_ref().map(|field| {
            let dir: i32 = match self.order_dir.as_deref() {
                Some("desc") => -1,
                _ => 1,
            };
            let mut sort = Document::new();
            sort.insert(field.as_str(), dir);
            sort
        });

        FindOptions::builder()
            .skip(skip)
            .limit(page_size)
            .sort(sort)
            .build()
    }
}

/// Runs the shared list contract against a collection: one count for the
/// total, one page-sized find for the data.
pub async fn find_page<T>(
    collection: &Collection<T>,
    request: &ListRequest,
) -> Result<ListResponse<T>, ApiError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let filter = request.filter_document();
    let total = collection.count_documents(filter.clone(), None).await?;

    let mut cursor = collection.find(filter, request.find_options()).await?;
    let mut data = Vec::new();
    while let Some(item) = cursor.try_next().await? {
        data.push(item);
    }

    Ok(ListResponse {
        data,
        total,
        page: request.page.max(1),
        page_size: request.page_size.clamp(1, 100),
    })
}

fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_body_is_empty() {
        let request: ListRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 10);
        assert!(request.status.is_none());
        assert!(request.filter_criterias.is_empty());
    }

    #[test]
    fn status_and_criterias_build_the_filter() {
        let request: ListRequest = serde_json::from_value(serde_json::json!({
            "page": 2,
            "pageSize": 5,
            "status": "active",
            "filterCriterias": [
                { "field": "title", "operator": "contains", "value": "alien" },
                { "field": "genre", "value": "horror" }
            ]
        }))
        .unwrap();

        let filter = request.filter_document();
        assert_eq!(filter.get_str("status").unwrap(), "active");
        assert_eq!(filter.get_str("genre").unwrap(), "horror");
        let title = filter.get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), "alien");
        assert_eq!(title.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn contains_filter_escapes_regex_metacharacters() {
        assert_eq!(escape_regex("2001: a space odyssey"), "2001: a space odyssey");
        assert_eq!(escape_regex("what?"), "what\\?");
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
    }

    #[test]
    fn find_options_paginate_and_sort() {
        let request: ListRequest = serde_json::from_value(serde_json::json!({
            "page": 3,
            "pageSize": 20,
            "orderBy": "created_at",
            "orderDir": "desc"
        }))
        .unwrap();

        let options = request.find_options();
        assert_eq!(options.skip, Some(40));
        assert_eq!(options.limit, Some(20));
        assert_eq!(options.sort.unwrap().get_i32("created_at").unwrap(), -1);
    }

    #[test]
    fn skip_saturates_for_out_of_range_pages() {
        let request: ListRequest = serde_json::from_value(serde_json::json!({
            "page": u64::MAX,
            "pageSize": 10
        }))
        .unwrap();

        let options = request.find_options();
        assert_eq!(options.skip, Some(u64::MAX));
        assert_eq!(options.limit, Some(10));
    }

    #[test]
    fn page_size_is_clamped() {
        let request: ListRequest = serde_json::from_value(serde_json::json!({
            "page": 0,
            "pageSize": 100000
        }))
        .unwrap();
        let options = request.find_options();
        assert_eq!(options.skip, Some(0));
        assert_eq!(options.limit, Some(100));
    }
}
