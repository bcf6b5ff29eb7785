//! Collection filters: the `filters` argument and its translation to SQL
//!
//! Clients send a flat list of `{key, value, operation}` pairs. Each collection
//! declares which keys it understands and how each one is interpreted:
//!
//! - text keys (`name`, `sku`) become a `LIKE %value%` predicate
//! - exact keys (`status`) become an equality predicate
//! - range keys (`price`, `qty`) take `min-max`, `min-`, `-max` or `min`
//! - attribute codes (category products only) take comma-separated option ids
//! - `sortBy` / `sortOrder` select the ordering
//! - `page` / `limit` select the page and are always echoed back
//!
//! Keys are evaluated in the collection's declared order, not input order, and
//! the first filter with a given key wins. Every filter ends up with a
//! [`FilterOutcome`]: malformed values are rejected and unknown keys ignored,
//! never turned into errors. Applied filters are echoed back as
//! [`CurrentFilter`]s so clients can render active filters and paging links.

use async_graphql::{InputObject, SimpleObject};
use tracing::debug;

use super::types::FilterableAttribute;
use crate::db::categories::CATEGORY_PRIMARY_KEY;
use crate::db::products::PRODUCT_PRIMARY_KEY;
use crate::db::query::{Op, OrderDirection, SelectQuery, col, contains_pattern};

const SORT_BY: &str = "sortBy";
const SORT_ORDER: &str = "sortOrder";
const PAGE: &str = "page";
const LIMIT: &str = "limit";

/// Table holding one row per (product, attribute, option)
const ATTRIBUTE_INDEX_TABLE: &str = "product_attribute_value_index";

/// A single collection filter sent by the client
#[derive(InputObject, Clone, Debug, Default)]
pub struct FilterInput {
    pub key: String,
    pub value: String,
    pub operation: Option<String>,
}

impl FilterInput {
    #[cfg(test)]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            operation: None,
        }
    }
}

/// A filter the server actually applied, echoed back to the client
#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
pub struct CurrentFilter {
    pub key: String,
    pub operation: Option<String>,
    pub value: String,
}

impl CurrentFilter {
    fn equals(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            operation: Some("=".to_string()),
            value: value.into(),
        }
    }
}

/// The collection a filter list is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    /// Top-level `categories`
    Categories,
    /// Top-level `products`
    Products,
    /// `Category.products`
    CategoryProducts,
}

/// Ordering used when no recognized `sortBy` is given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultOrder {
    /// Newest first, whatever `sortOrder` says
    PrimaryKeyDesc,
    /// Primary key in the requested (or default ASC) direction
    PrimaryKeyFollowsSortOrder,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Contains {
        key: &'static str,
        column: &'static str,
    },
    Exact {
        key: &'static str,
        column: &'static str,
    },
    Range {
        key: &'static str,
        column: &'static str,
    },
    Attributes,
    Sort {
        /// `sortBy` value -> column
        fields: &'static [(&'static str, &'static str)],
        default_order: DefaultOrder,
    },
}

const CATEGORY_RULES: &[Rule] = &[
    Rule::Contains {
        key: "name",
        column: "des.name",
    },
    Rule::Exact {
        key: "status",
        column: "category.status",
    },
    Rule::Sort {
        fields: &[("name", "des.name")],
        default_order: DefaultOrder::PrimaryKeyDesc,
    },
];

const PRODUCT_RULES: &[Rule] = &[
    Rule::Range {
        key: "price",
        column: "product.price",
    },
    Rule::Range {
        key: "qty",
        column: "product.qty",
    },
    Rule::Contains {
        key: "name",
        column: "des.name",
    },
    Rule::Contains {
        key: "sku",
        column: "product.sku",
    },
    Rule::Exact {
        key: "status",
        column: "product.status",
    },
    Rule::Sort {
        fields: &[("price", "product.price"), ("name", "des.name")],
        default_order: DefaultOrder::PrimaryKeyDesc,
    },
];

// TODO: decide whether category products should default to newest first like
// the top-level `products` field; clients currently rely on ascending ids here.
const CATEGORY_PRODUCT_RULES: &[Rule] = &[
    // Echoed with operation "=" like every other range, not a bare key/value
    Rule::Range {
        key: "price",
        column: "product.price",
    },
    Rule::Attributes,
    Rule::Sort {
        fields: &[("price", "product.price"), ("name", "des.name")],
        default_order: DefaultOrder::PrimaryKeyFollowsSortOrder,
    },
];

impl FilterTarget {
    fn rules(&self) -> &'static [Rule] {
        match self {
            FilterTarget::Categories => CATEGORY_RULES,
            FilterTarget::Products => PRODUCT_RULES,
            FilterTarget::CategoryProducts => CATEGORY_PRODUCT_RULES,
        }
    }

    /// Column counted by the total query
    pub fn primary_key(&self) -> &'static str {
        match self {
            FilterTarget::Categories => CATEGORY_PRIMARY_KEY,
            FilterTarget::Products | FilterTarget::CategoryProducts => PRODUCT_PRIMARY_KEY,
        }
    }

    /// Keys with a built-in meaning; attribute codes never shadow these
    fn is_reserved(&self, key: &str) -> bool {
        matches!(key, SORT_BY | SORT_ORDER | PAGE | LIMIT)
            || self.rules().iter().any(|rule| match rule {
                Rule::Contains { key: k, .. }
                | Rule::Exact { key: k, .. }
                | Rule::Range { key: k, .. } => *k == key,
                Rule::Attributes | Rule::Sort { .. } => false,
            })
    }
}

/// Why a recognized filter was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Neither side of a range parsed as a number
    InvalidRange,
    /// No option id in an attribute filter parsed as an integer
    NoValidOptionIds,
    /// `sortOrder` other than `ASC` / `DESC`
    InvalidSortOrder,
    /// `sortBy` naming a field the collection cannot sort by
    UnknownSortField,
    /// `page` that is not a positive integer
    InvalidPage,
    /// `limit` that is not a positive integer
    InvalidLimit,
}

/// Classification of one filter evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Applied(CurrentFilter),
    Rejected { key: String, reason: RejectReason },
    Ignored { key: String },
}

/// Result of applying a filter list to a query
#[derive(Debug, Clone)]
pub struct AppliedFilters {
    pub outcomes: Vec<FilterOutcome>,
    /// Count query branched after every predicate but before paging
    pub total_query: SelectQuery,
}

impl AppliedFilters {
    /// Applied filters in evaluation order
    pub fn current_filters(&self) -> Vec<CurrentFilter> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                FilterOutcome::Applied(filter) => Some(filter.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Bookkeeping for one pass over the caller's filters
struct Evaluation<'f> {
    filters: &'f [FilterInput],
    consumed: Vec<bool>,
    outcomes: Vec<FilterOutcome>,
}

impl<'f> Evaluation<'f> {
    fn new(filters: &'f [FilterInput]) -> Self {
        Self {
            filters,
            consumed: vec![false; filters.len()],
            outcomes: Vec::new(),
        }
    }

    /// Claim the first unclaimed filter with `key` whose value satisfies `accept`
    fn take_matching(&mut self, key: &str, accept: impl Fn(&str) -> bool) -> Option<&'f FilterInput> {
        let filters = self.filters;
        let index = filters
            .iter()
            .enumerate()
            .position(|(i, f)| !self.consumed[i] && f.key == key && accept(&f.value))?;
        self.consumed[index] = true;
        Some(&filters[index])
    }

    /// Claim the first filter with `key`, unless one was already claimed
    fn take(&mut self, key: &str) -> Option<&'f FilterInput> {
        if self.is_taken(key) {
            return None;
        }
        self.take_matching(key, |_| true)
    }

    fn is_taken(&self, key: &str) -> bool {
        self.filters
            .iter()
            .zip(&self.consumed)
            .any(|(f, consumed)| *consumed && f.key == key)
    }

    fn applied(&mut self, filter: CurrentFilter) {
        self.outcomes.push(FilterOutcome::Applied(filter));
    }

    fn rejected(&mut self, key: &str, reason: RejectReason) {
        self.outcomes.push(FilterOutcome::Rejected {
            key: key.to_string(),
            reason,
        });
    }
}

/// Applies a collection's filter rules to a query
pub struct FilterNormalizer<'a> {
    target: FilterTarget,
    default_limit: u32,
    attributes: &'a [FilterableAttribute],
}

impl<'a> FilterNormalizer<'a> {
    pub fn new(target: FilterTarget, default_limit: u32) -> Self {
        Self {
            target,
            default_limit,
            attributes: &[],
        }
    }

    /// Attributes whose codes are accepted as filter keys (category products only)
    pub fn with_attributes(mut self, attributes: &'a [FilterableAttribute]) -> Self {
        self.attributes = attributes;
        self
    }

    /// Add every recognized filter to `query`, branch the total query, then page `query`.
    pub fn apply(&self, query: &mut SelectQuery, filters: &[FilterInput]) -> AppliedFilters {
        let mut eval = Evaluation::new(filters);

        for rule in self.target.rules() {
            match *rule {
                Rule::Contains { key, column } => {
                    if let Some(filter) = eval.take(key) {
                        query.and_where(column, Op::Like, contains_pattern(&filter.value));
                        eval.applied(CurrentFilter::equals(key, filter.value.clone()));
                    }
                }
                Rule::Exact { key, column } => {
                    if let Some(filter) = eval.take(key) {
                        query.and_where(column, Op::Eq, filter.value.clone());
                        eval.applied(CurrentFilter::equals(key, filter.value.clone()));
                    }
                }
                Rule::Range { key, column } => apply_range(query, &mut eval, key, column),
                Rule::Attributes => self.apply_attributes(query, &mut eval),
                Rule::Sort {
                    fields,
                    default_order,
                } => self.apply_sort(query, &mut eval, fields, default_order),
            }
        }

        let total_query = query.count_query(self.target.primary_key());
        self.apply_paging(query, &mut eval);

        for (filter, consumed) in filters.iter().zip(&eval.consumed) {
            if !consumed {
                eval.outcomes.push(FilterOutcome::Ignored {
                    key: filter.key.clone(),
                });
            }
        }

        for outcome in &eval.outcomes {
            match outcome {
                FilterOutcome::Applied(_) => {}
                FilterOutcome::Rejected { key, reason } => {
                    debug!(collection = ?self.target, key = %key, reason = ?reason, "Rejected filter");
                }
                FilterOutcome::Ignored { key } => {
                    debug!(collection = ?self.target, key = %key, "Ignored unknown filter");
                }
            }
        }
        debug!(
            collection = ?self.target,
            applied = eval.outcomes.iter().filter(|o| matches!(o, FilterOutcome::Applied(_))).count(),
            "Normalized collection filters"
        );

        AppliedFilters {
            outcomes: eval.outcomes,
            total_query,
        }
    }

    fn apply_attributes(&self, query: &mut SelectQuery, eval: &mut Evaluation<'_>) {
        let filters = eval.filters;
        let mut alias_index = 0usize;

        for (index, filter) in filters.iter().enumerate() {
            if eval.consumed[index] || self.target.is_reserved(&filter.key) {
                continue;
            }
            let Some(attribute) = self
                .attributes
                .iter()
                .find(|a| a.attribute_code == filter.key)
            else {
                continue;
            };
            if eval.is_taken(&filter.key) {
                continue;
            }
            eval.consumed[index] = true;

            let option_ids: Vec<i64> = filter
                .value
                .split(',')
                .filter_map(|v| v.trim().parse::<i64>().ok())
                .collect();
            if option_ids.is_empty() {
                eval.rejected(&filter.key, RejectReason::NoValidOptionIds);
                continue;
            }

            let echoed = option_ids
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");

            let alias = format!("attr_{}", alias_index);
            alias_index += 1;
            query
                .inner_join(ATTRIBUTE_INDEX_TABLE, alias.as_str())
                .on(format!("{}.product_id", alias), Op::Eq, col(PRODUCT_PRIMARY_KEY))
                .and(format!("{}.attribute_id", alias), Op::Eq, attribute.attribute_id)
                .and(format!("{}.option_id", alias), Op::In, option_ids);
            // A product indexed under several of the requested options would repeat
            query.distinct();

            eval.applied(CurrentFilter {
                key: filter.key.clone(),
                operation: filter.operation.clone(),
                value: echoed,
            });
        }
    }

    fn apply_sort(
        &self,
        query: &mut SelectQuery,
        eval: &mut Evaluation<'_>,
        fields: &[(&'static str, &'static str)],
        default_order: DefaultOrder,
    ) {
        let order_filter = eval.take_matching(SORT_ORDER, |v| OrderDirection::parse(v).is_some());
        let invalid_order = match order_filter {
            Some(_) => None,
            None => eval.take(SORT_ORDER),
        };
        let direction = order_filter
            .and_then(|f| OrderDirection::parse(&f.value))
            .unwrap_or_default();

        let sort_by = eval.take(SORT_BY);
        let field = sort_by.and_then(|f| fields.iter().find(|(name, _)| *name == f.value));

        match field {
            Some((name, column)) => {
                query.order_by(*column, direction);
                eval.applied(CurrentFilter::equals(SORT_BY, *name));
            }
            None => {
                if sort_by.is_some() {
                    eval.rejected(SORT_BY, RejectReason::UnknownSortField);
                }
                let fallback = match default_order {
                    DefaultOrder::PrimaryKeyDesc => OrderDirection::Desc,
                    DefaultOrder::PrimaryKeyFollowsSortOrder => direction,
                };
                query.order_by(self.target.primary_key(), fallback);
            }
        }

        if let Some(filter) = order_filter {
            eval.applied(CurrentFilter::equals(SORT_ORDER, filter.value.clone()));
        }
        if invalid_order.is_some() {
            eval.rejected(SORT_ORDER, RejectReason::InvalidSortOrder);
        }
    }

    fn apply_paging(&self, query: &mut SelectQuery, eval: &mut Evaluation<'_>) {
        let page = positive_or_default(eval, PAGE, 1, RejectReason::InvalidPage);
        let limit = positive_or_default(eval, LIMIT, self.default_limit, RejectReason::InvalidLimit);

        eval.applied(CurrentFilter::equals(PAGE, page.to_string()));
        eval.applied(CurrentFilter::equals(LIMIT, limit.to_string()));

        let offset = (i64::from(page) - 1).saturating_mul(i64::from(limit));
        query.limit(offset, i64::from(limit));
    }
}

fn apply_range(query: &mut SelectQuery, eval: &mut Evaluation<'_>, key: &str, column: &str) {
    let Some(filter) = eval.take(key) else {
        return;
    };

    let (min, max) = parse_range(&filter.value);
    if let Some(min) = min {
        query.and_where(column, Op::Gte, min);
    }
    if let Some(max) = max {
        query.and_where(column, Op::Lte, max);
    }

    let echoed = match (min, max) {
        (Some(min), Some(max)) => format!("{}-{}", min, max),
        (Some(min), None) => min.to_string(),
        (None, Some(max)) => max.to_string(),
        (None, None) => {
            eval.rejected(key, RejectReason::InvalidRange);
            return;
        }
    };
    eval.applied(CurrentFilter::equals(key, echoed));
}

/// Split `min-max` on `-`; a side that is not a finite number is `None`
fn parse_range(value: &str) -> (Option<f64>, Option<f64>) {
    let mut sides = value.split('-');
    let min = sides.next().and_then(parse_number);
    let max = sides.next().and_then(parse_number);
    (min, max)
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn positive_or_default(eval: &mut Evaluation<'_>, key: &str, default: u32, reason: RejectReason) -> u32 {
    match eval.take(key) {
        None => default,
        Some(filter) => match filter.value.trim().parse::<u32>() {
            Ok(value) if value > 0 => value,
            _ => {
                eval.rejected(key, reason);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::query::SqlValue;
    use crate::db::{CategoryRepository, ProductRepository};
    use crate::graphql::types::FilterableAttribute;

    fn filters(pairs: &[(&str, &str)]) -> Vec<FilterInput> {
        pairs.iter().map(|(k, v)| FilterInput::new(*k, *v)).collect()
    }

    fn echo(pairs: &[(&str, &str)]) -> Vec<CurrentFilter> {
        pairs
            .iter()
            .map(|(k, v)| CurrentFilter::equals(k, *v))
            .collect()
    }

    fn attributes() -> Vec<FilterableAttribute> {
        vec![
            FilterableAttribute {
                attribute_id: 1,
                attribute_code: "color".to_string(),
                attribute_name: "Color".to_string(),
                options: Vec::new(),
            },
            FilterableAttribute {
                attribute_id: 2,
                attribute_code: "size".to_string(),
                attribute_name: "Size".to_string(),
                options: Vec::new(),
            },
        ]
    }

    fn base_query(target: FilterTarget) -> SelectQuery {
        match target {
            FilterTarget::Categories => CategoryRepository::list_query(),
            FilterTarget::Products => ProductRepository::list_query(),
            FilterTarget::CategoryProducts => ProductRepository::category_query(1),
        }
    }

    fn run(target: FilterTarget, input: &[FilterInput]) -> (SelectQuery, AppliedFilters) {
        let attributes = attributes();
        let mut query = base_query(target);
        let applied = FilterNormalizer::new(target, 20)
            .with_attributes(&attributes)
            .apply(&mut query, input);
        (query, applied)
    }

    #[test]
    fn test_page_and_limit_always_echoed() {
        for target in [
            FilterTarget::Categories,
            FilterTarget::Products,
            FilterTarget::CategoryProducts,
        ] {
            let (query, applied) = run(target, &[]);
            assert_eq!(
                applied.current_filters(),
                echo(&[("page", "1"), ("limit", "20")])
            );
            assert!(query.to_sql().0.ends_with("LIMIT 20 OFFSET 0"));
        }
    }

    #[test]
    fn test_page_offset() {
        let (query, applied) = run(
            FilterTarget::Products,
            &filters(&[("limit", "10"), ("page", "3")]),
        );
        assert!(query.to_sql().0.ends_with("LIMIT 10 OFFSET 20"));
        assert_eq!(
            applied.current_filters(),
            echo(&[("page", "3"), ("limit", "10")])
        );
    }

    #[test]
    fn test_invalid_paging_falls_back_to_defaults() {
        let (query, applied) = run(
            FilterTarget::Products,
            &filters(&[("page", "0"), ("limit", "lots")]),
        );
        assert!(query.to_sql().0.ends_with("LIMIT 20 OFFSET 0"));
        assert_eq!(
            applied.current_filters(),
            echo(&[("page", "1"), ("limit", "20")])
        );
        assert!(applied.outcomes.contains(&FilterOutcome::Rejected {
            key: "page".into(),
            reason: RejectReason::InvalidPage
        }));
        assert!(applied.outcomes.contains(&FilterOutcome::Rejected {
            key: "limit".into(),
            reason: RejectReason::InvalidLimit
        }));
    }

    #[test]
    fn test_price_range_both_sides() {
        let (query, applied) = run(FilterTarget::Products, &filters(&[("price", "10-50")]));
        let (sql, values) = query.to_sql();

        assert!(sql.contains("WHERE product.price >= ? AND product.price <= ?"));
        assert_eq!(values, vec![SqlValue::Float(10.0), SqlValue::Float(50.0)]);
        assert_eq!(applied.current_filters()[0], CurrentFilter::equals("price", "10-50"));
    }

    #[test]
    fn test_price_range_unparseable_min() {
        let (query, applied) = run(FilterTarget::Products, &filters(&[("price", "abc-50")]));
        let (sql, values) = query.to_sql();

        assert!(sql.contains("WHERE product.price <= ?"));
        assert!(!sql.contains(">="));
        assert_eq!(values, vec![SqlValue::Float(50.0)]);
        assert_eq!(applied.current_filters()[0], CurrentFilter::equals("price", "50"));
    }

    #[test]
    fn test_open_ended_and_fractional_ranges() {
        let (query, applied) = run(FilterTarget::Products, &filters(&[("qty", "10-")]));
        assert!(query.to_sql().0.contains("WHERE product.qty >= ?"));
        assert_eq!(applied.current_filters()[0], CurrentFilter::equals("qty", "10"));

        let (_, applied) = run(FilterTarget::Products, &filters(&[("price", "9.5-19.99")]));
        assert_eq!(
            applied.current_filters()[0],
            CurrentFilter::equals("price", "9.5-19.99")
        );
    }

    #[test]
    fn test_unparseable_range_is_rejected() {
        let (query, applied) = run(FilterTarget::Products, &filters(&[("price", "cheap")]));
        assert!(!query.to_sql().0.contains("WHERE"));
        assert_eq!(
            applied.current_filters(),
            echo(&[("page", "1"), ("limit", "20")])
        );
        assert_eq!(
            applied.outcomes[0],
            FilterOutcome::Rejected {
                key: "price".into(),
                reason: RejectReason::InvalidRange
            }
        );
    }

    #[test]
    fn test_text_and_exact_filters() {
        let (query, applied) = run(
            FilterTarget::Products,
            &filters(&[("status", "1"), ("sku", "TSHIRT"), ("name", "shirt")]),
        );
        let (sql, values) = query.to_sql();

        assert!(sql.contains(
            "WHERE des.name LIKE ? ESCAPE '\\' AND product.sku LIKE ? ESCAPE '\\' AND product.status = ?"
        ));
        assert_eq!(
            values,
            vec![
                SqlValue::String("%shirt%".into()),
                SqlValue::String("%TSHIRT%".into()),
                SqlValue::String("1".into()),
            ]
        );
        // Evaluation order, not input order
        assert_eq!(
            applied.current_filters(),
            echo(&[
                ("name", "shirt"),
                ("sku", "TSHIRT"),
                ("status", "1"),
                ("page", "1"),
                ("limit", "20")
            ])
        );
    }

    #[test]
    fn test_first_filter_per_key_wins() {
        let (query, applied) = run(
            FilterTarget::Categories,
            &filters(&[("name", "men"), ("name", "women")]),
        );
        let (_, values) = query.to_sql();
        assert_eq!(values, vec![SqlValue::String("%men%".into())]);
        assert_eq!(applied.current_filters()[0], CurrentFilter::equals("name", "men"));
        assert!(applied.outcomes.contains(&FilterOutcome::Ignored { key: "name".into() }));
    }

    #[test]
    fn test_unrecognized_keys_change_nothing() {
        let (plain_query, plain) = run(FilterTarget::Products, &[]);
        let (query, applied) = run(
            FilterTarget::Products,
            &filters(&[("colour", "red"), ("color", "1"), ("", "")]),
        );

        assert_eq!(query.to_sql(), plain_query.to_sql());
        assert_eq!(applied.current_filters(), plain.current_filters());
        assert_eq!(
            applied
                .outcomes
                .iter()
                .filter(|o| matches!(o, FilterOutcome::Ignored { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_categories_ignore_product_keys() {
        let (query, applied) = run(
            FilterTarget::Categories,
            &filters(&[("price", "10-50"), ("sku", "X")]),
        );
        assert!(!query.to_sql().0.contains("WHERE"));
        assert_eq!(
            applied.current_filters(),
            echo(&[("page", "1"), ("limit", "20")])
        );
    }

    #[test]
    fn test_sort_by_known_field() {
        let (query, applied) = run(
            FilterTarget::Products,
            &filters(&[("sortOrder", "DESC"), ("sortBy", "price")]),
        );
        assert!(query.to_sql().0.contains("ORDER BY product.price DESC LIMIT"));
        assert_eq!(
            applied.current_filters(),
            echo(&[
                ("sortBy", "price"),
                ("sortOrder", "DESC"),
                ("page", "1"),
                ("limit", "20")
            ])
        );
    }

    #[test]
    fn test_invalid_sort_order_falls_back_to_asc() {
        let (query, applied) = run(
            FilterTarget::Products,
            &filters(&[("sortBy", "name"), ("sortOrder", "sideways")]),
        );
        assert!(query.to_sql().0.contains("ORDER BY des.name ASC"));
        assert!(!applied.current_filters().iter().any(|f| f.key == "sortOrder"));
        assert!(applied.outcomes.contains(&FilterOutcome::Rejected {
            key: "sortOrder".into(),
            reason: RejectReason::InvalidSortOrder
        }));
    }

    #[test]
    fn test_valid_sort_order_after_invalid_one() {
        let (query, _) = run(
            FilterTarget::Products,
            &filters(&[("sortOrder", "up"), ("sortOrder", "DESC"), ("sortBy", "price")]),
        );
        assert!(query.to_sql().0.contains("ORDER BY product.price DESC"));
    }

    #[test]
    fn test_default_order_for_top_level_collections() {
        let (query, _) = run(FilterTarget::Categories, &filters(&[("sortOrder", "ASC")]));
        assert!(query.to_sql().0.contains("ORDER BY category.category_id DESC"));

        let (query, applied) = run(FilterTarget::Products, &filters(&[("sortBy", "rating")]));
        assert!(query.to_sql().0.contains("ORDER BY product.product_id DESC"));
        assert!(applied.outcomes.contains(&FilterOutcome::Rejected {
            key: "sortBy".into(),
            reason: RejectReason::UnknownSortField
        }));
    }

    #[test]
    fn test_default_order_for_category_products_follows_sort_order() {
        let (query, _) = run(FilterTarget::CategoryProducts, &[]);
        assert!(query.to_sql().0.contains("ORDER BY product.product_id ASC"));

        let (query, _) = run(FilterTarget::CategoryProducts, &filters(&[("sortOrder", "DESC")]));
        assert!(query.to_sql().0.contains("ORDER BY product.product_id DESC"));
    }

    #[test]
    fn test_categories_cannot_sort_by_price() {
        let (query, _) = run(FilterTarget::Categories, &filters(&[("sortBy", "price")]));
        assert!(query.to_sql().0.contains("ORDER BY category.category_id DESC"));
    }

    #[test]
    fn test_attribute_filters_get_distinct_aliases() {
        let (query, applied) = run(
            FilterTarget::CategoryProducts,
            &filters(&[("size", "5,x,6"), ("color", "2")]),
        );
        let (sql, values) = query.to_sql();

        assert_eq!(query.join_aliases(), vec!["des", "pc", "attr_0", "attr_1"]);
        assert!(sql.starts_with("SELECT DISTINCT "));
        assert!(sql.contains(
            "INNER JOIN product_attribute_value_index attr_0 ON attr_0.product_id = product.product_id \
             AND attr_0.attribute_id = ? AND attr_0.option_id IN (?, ?)"
        ));
        assert!(sql.contains(
            "INNER JOIN product_attribute_value_index attr_1 ON attr_1.product_id = product.product_id \
             AND attr_1.attribute_id = ? AND attr_1.option_id IN (?)"
        ));
        // pc.category_id, size attribute + options, color attribute + option, then WHERE
        assert_eq!(
            values,
            vec![
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(5),
                SqlValue::Int(6),
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(1),
                SqlValue::Int(1),
            ]
        );
        assert_eq!(
            applied.current_filters()[..2].to_vec(),
            vec![
                CurrentFilter {
                    key: "size".into(),
                    operation: None,
                    value: "5,6".into()
                },
                CurrentFilter {
                    key: "color".into(),
                    operation: None,
                    value: "2".into()
                },
            ]
        );

        let (total_sql, _) = applied.total_query.to_sql();
        assert!(total_sql.starts_with("SELECT COUNT(DISTINCT product.product_id) AS total FROM product"));
    }

    #[test]
    fn test_attribute_filter_echoes_caller_operation() {
        let mut input = filters(&[("color", "1")]);
        input[0].operation = Some("in".to_string());
        let (_, applied) = run(FilterTarget::CategoryProducts, &input);
        assert_eq!(applied.current_filters()[0].operation.as_deref(), Some("in"));
    }

    #[test]
    fn test_attribute_filter_without_valid_ids() {
        let (query, applied) = run(FilterTarget::CategoryProducts, &filters(&[("color", "red,blue")]));
        assert_eq!(query.join_aliases(), vec!["des", "pc"]);
        assert!(!query.is_distinct());
        assert_eq!(
            applied.outcomes[0],
            FilterOutcome::Rejected {
                key: "color".into(),
                reason: RejectReason::NoValidOptionIds
            }
        );
        assert_eq!(
            applied.current_filters(),
            echo(&[("page", "1"), ("limit", "20")])
        );
    }

    #[test]
    fn test_attributes_only_apply_to_category_products() {
        let (query, _) = run(FilterTarget::Products, &filters(&[("color", "1")]));
        assert_eq!(query.join_aliases(), vec!["des"]);
    }

    #[test]
    fn test_total_query_ignores_paging_and_order() {
        let (query, applied) = run(
            FilterTarget::Products,
            &filters(&[("price", "10-"), ("page", "4"), ("limit", "2"), ("sortBy", "name")]),
        );
        let (total_sql, total_values) = applied.total_query.to_sql();
        assert_eq!(
            total_sql,
            "SELECT COUNT(product.product_id) AS total FROM product \
             LEFT JOIN product_description des ON des.product_description_product_id = product.product_id \
             WHERE product.price >= ?"
        );
        assert_eq!(total_values, query.to_sql().1);
    }
}
