//! List queries: filtering, stable sorting and pagination over one tenant's
//! records.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use carehub_core::{DomainError, DomainResult, Resource};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Parsed list parameters.
///
/// Without `sort_by`, records keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: Option<String>,
    pub order: SortOrder,
    /// Case-insensitive substring over the resource's searchable fields.
    pub search: Option<String>,
    /// Top-level field equality filters (`status=ACTIVE`).
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: None,
            order: SortOrder::Asc,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: u32,
}

fn parse_bounded(name: &str, raw: &str, min: u32, max: u32) -> DomainResult<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| DomainError::validation(format!("{name} must be an integer between {min} and {max}")))
}

impl ListQuery {
    /// Build a query from raw query-string pairs.
    ///
    /// Reserved keys are `page`, `limit`, `sortBy`, `order` and `search`;
    /// every other non-empty key becomes an equality filter.
    pub fn from_params<I>(params: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in params {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str() {
                "page" => query.page = parse_bounded("page", &value, 1, u32::MAX)?,
                "limit" => query.limit = parse_bounded("limit", &value, 1, MAX_LIMIT)?,
                "sortBy" => query.sort_by = Some(value),
                "order" => {
                    query.order = match value.to_ascii_lowercase().as_str() {
                        "asc" => SortOrder::Asc,
                        "desc" => SortOrder::Desc,
                        _ => return Err(DomainError::validation("order must be 'asc' or 'desc'")),
                    }
                }
                "search" => query.search = Some(value.trim().to_lowercase()),
                _ => {
                    query.filters.insert(key, value);
                }
            }
        }
        Ok(query)
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// Filter, sort and paginate `records` (already scoped to one tenant).
    pub fn apply<R: Resource>(&self, records: Vec<R>) -> Page<R> {
        let mut rows: Vec<(JsonValue, R)> = records
            .into_iter()
            .filter(|r| self.matches_search(r))
            .map(|r| (serde_json::to_value(&r).unwrap_or(JsonValue::Null), r))
            .filter(|(json, _)| self.matches_filters(json))
            .collect();

        if let Some(field) = &self.sort_by {
            // `sort_by` is stable: ties keep insertion order.
            rows.sort_by(|(a, _), (b, _)| {
                let ord = compare_json(a.get(field), b.get(field));
                match self.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total = rows.len();
        let total_pages = total.div_ceil(self.limit as usize) as u32;
        let items = rows
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .map(|(_, r)| r)
            .collect();

        Page {
            items,
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
        }
    }

    fn matches_search<R: Resource>(&self, record: &R) -> bool {
        match &self.search {
            None => true,
            Some(needle) => record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
        }
    }

    fn matches_filters(&self, json: &JsonValue) -> bool {
        self.filters.iter().all(|(key, expected)| match json.get(key) {
            Some(JsonValue::String(s)) => s.eq_ignore_ascii_case(expected),
            Some(v @ (JsonValue::Number(_) | JsonValue::Bool(_))) => v.to_string() == *expected,
            _ => false,
        })
    }
}

fn rank(value: Option<&JsonValue>) -> u8 {
    match value {
        None | Some(JsonValue::Null) => 0,
        Some(JsonValue::Bool(_)) => 1,
        Some(JsonValue::Number(_)) => 2,
        Some(JsonValue::String(_)) => 3,
        Some(_) => 4,
    }
}

/// Total order over JSON scalars; missing and null values sort first.
fn compare_json(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.to_lowercase().cmp(&y.to_lowercase()),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carehub_core::{RecordId, TenantId, Validated};
    use carehub_patients::{NewPatient, Patient};
    use chrono::Utc;
    use proptest::prelude::*;
    use serde_json::json;

    fn patients(names: &[(&str, &str)]) -> Vec<Patient> {
        let tenant = TenantId::new();
        names
            .iter()
            .map(|(first, last)| {
                let draft = NewPatient::from_json(json!({ "firstName": first, "lastName": last })).unwrap();
                Patient::from_draft(RecordId::new(), tenant, draft, Utc::now())
            })
            .collect()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn first_names(page: &Page<Patient>) -> Vec<&str> {
        page.items.iter().map(|p| p.first_name.as_str()).collect()
    }

    #[test]
    fn defaults_are_page_one_limit_ten() {
        let q = ListQuery::from_params(Vec::new()).unwrap();
        assert_eq!((q.page, q.limit), (1, 10));
        assert_eq!(q.order, SortOrder::Asc);
    }

    #[test]
    fn rejects_out_of_range_paging() {
        assert!(ListQuery::from_params(params(&[("page", "0")])).is_err());
        assert!(ListQuery::from_params(params(&[("limit", "101")])).is_err());
        assert!(ListQuery::from_params(params(&[("limit", "ten")])).is_err());
        assert!(ListQuery::from_params(params(&[("order", "sideways")])).is_err());
    }

    #[test]
    fn keeps_insertion_order_without_sort() {
        let rows = patients(&[("Cy", "A"), ("Al", "B"), ("Bo", "C")]);
        let page = ListQuery::default().apply(rows);
        assert_eq!(first_names(&page), vec!["Cy", "Al", "Bo"]);
    }

    #[test]
    fn sorts_by_field_stably_in_both_directions() {
        let rows = patients(&[("Cy", "Same"), ("Al", "Zed"), ("Bo", "Same")]);

        let asc = ListQuery::from_params(params(&[("sortBy", "lastName")])).unwrap();
        assert_eq!(first_names(&asc.apply(rows.clone())), vec!["Cy", "Bo", "Al"]);

        let desc = ListQuery::from_params(params(&[("sortBy", "lastName"), ("order", "desc")])).unwrap();
        assert_eq!(first_names(&desc.apply(rows)), vec!["Al", "Cy", "Bo"]);
    }

    #[test]
    fn filters_by_field_and_search() {
        let mut rows = patients(&[("Ann", "Lee"), ("Bob", "Leeds"), ("Cat", "Moss")]);
        rows[2].status = carehub_patients::PatientStatus::Inactive;

        let q = ListQuery::from_params(params(&[("status", "active")])).unwrap();
        assert_eq!(first_names(&q.apply(rows.clone())), vec!["Ann", "Bob"]);

        let q = ListQuery::from_params(params(&[("search", "LEE")])).unwrap();
        assert_eq!(first_names(&q.apply(rows.clone())), vec!["Ann", "Bob"]);

        let q = ListQuery::from_params(params(&[("lastName", "Lee")])).unwrap();
        assert_eq!(first_names(&q.apply(rows.clone())), vec!["Ann"]);

        let q = ListQuery::from_params(params(&[("noSuchField", "x")])).unwrap();
        assert_eq!(q.apply(rows).total, 0);
    }

    #[test]
    fn reports_totals_and_pages() {
        let rows = patients(&[("A", "x"), ("B", "x"), ("C", "x"), ("D", "x"), ("E", "x")]);
        let q = ListQuery::from_params(params(&[("page", "3"), ("limit", "2")])).unwrap();
        let page = q.apply(rows);

        assert_eq!(first_names(&page), vec!["E"]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
    }

    proptest! {
        #[test]
        fn pages_partition_the_result_set(n in 0usize..40, limit in 1u32..=12) {
            let names: Vec<String> = (0..n).map(|i| format!("p{i:02}")).collect();
            let pairs: Vec<(&str, &str)> = names.iter().map(|s| (s.as_str(), "x")).collect();
            let rows = patients(&pairs);

            let mut seen = Vec::new();
            let mut page_no = 1;
            loop {
                let q = ListQuery { page: page_no, limit, ..ListQuery::default() };
                let page = q.apply(rows.clone());
                prop_assert_eq!(page.total, n);
                prop_assert!(page.items.len() <= limit as usize);
                if page.items.is_empty() {
                    break;
                }
                seen.extend(page.items.into_iter().map(|p| p.first_name));
                page_no += 1;
            }

            prop_assert_eq!(seen, names);
            prop_assert_eq!(page_no - 1, (n as u32).div_ceil(limit));
        }
    }
}
