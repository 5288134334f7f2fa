//! Translation of catalog query parameters into a product `Select`.
//!
//! All parameters are parsed and validated by [`ProductFilter::from_query`];
//! the resulting filter is the only place product predicates and ordering
//! are built.

use sea_orm::{
    sea_query::{Expr, LikeExpr, Query, SimpleExpr},
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select,
};
use serde::Deserialize;

use crate::entities::{category, product, style};
use crate::error::ApiError;

/// Raw query string for the product list endpoints.
#[derive(Deserialize, Debug, Default)]
pub struct ProductQuery {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub category: Option<String>,
    pub style: Option<String>,
    #[serde(rename = "category__slug")]
    pub category_slug: Option<String>,
    #[serde(rename = "style__slug")]
    pub style_slug: Option<String>,
    pub is_featured: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Price,
    Rating,
    Downloads,
    CreatedAt,
}

impl OrderField {
    fn column(self) -> product::Column {
        match self {
            OrderField::Price => product::Column::Price,
            OrderField::Rating => product::Column::Rating,
            OrderField::Downloads => product::Column::Downloads,
            OrderField::CreatedAt => product::Column::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub category_name: Option<String>,
    pub style_name: Option<String>,
    pub category_slug: Option<String>,
    pub style_slug: Option<String>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    pub ordering: Vec<(OrderField, Direction)>,
    /// Set by the `featured` endpoint; AND-ed with any `is_featured` parameter.
    pub featured_only: bool,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            min_price: None,
            max_price: None,
            category_name: None,
            style_name: None,
            category_slug: None,
            style_slug: None,
            is_featured: None,
            search: None,
            ordering: vec![(OrderField::CreatedAt, Direction::Desc)],
            featured_only: false,
        }
    }
}

impl ProductFilter {
    pub fn from_query(query: &ProductQuery) -> Result<Self, ApiError> {
        let ordering = match present(&query.ordering) {
            Some(raw) => parse_ordering(&raw)?,
            None => ProductFilter::default().ordering,
        };

        Ok(ProductFilter {
            min_price: parse_price("min_price", &query.min_price)?,
            max_price: parse_price("max_price", &query.max_price)?,
            category_name: present(&query.category),
            style_name: present(&query.style),
            category_slug: present(&query.category_slug),
            style_slug: present(&query.style_slug),
            is_featured: parse_bool("is_featured", &query.is_featured)?,
            search: present(&query.search),
            ordering,
            featured_only: false,
        })
    }

    /// Every constraint, AND-ed. An empty filter matches all products.
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(min) = self.min_price {
            condition = condition.add(product::Column::Price.gte(min));
        }
        if let Some(max) = self.max_price {
            condition = condition.add(product::Column::Price.lte(max));
        }
        if let Some(name) = &self.category_name {
            condition = condition.add(in_category(category::Column::Name, name));
        }
        if let Some(slug) = &self.category_slug {
            condition = condition.add(in_category(category::Column::Slug, slug));
        }
        if let Some(name) = &self.style_name {
            condition = condition.add(in_style(style::Column::Name, name));
        }
        if let Some(slug) = &self.style_slug {
            condition = condition.add(in_style(style::Column::Slug, slug));
        }
        if let Some(featured) = self.is_featured {
            condition = condition.add(product::Column::IsFeatured.eq(featured));
        }
        if self.featured_only {
            condition = condition.add(product::Column::IsFeatured.eq(true));
        }
        if let Some(term) = &self.search {
            let pattern = like_pattern(term);
            condition = condition.add(
                Condition::any()
                    .add(product::Column::Name.like(escaped(&pattern)))
                    .add(product::Column::Description.like(escaped(&pattern)))
                    .add(product::Column::Author.like(escaped(&pattern)))
                    .add(tag_matches(&pattern)),
            );
        }

        condition
    }

    pub fn filtered(&self) -> Select<product::Entity> {
        product::Entity::find().filter(self.condition())
    }

    /// Filtered and sorted by the requested ordering, newest id breaking ties.
    pub fn select(&self) -> Select<product::Entity> {
        let mut select = self.filtered();
        for (field, direction) in &self.ordering {
            select = match direction {
                Direction::Asc => select.order_by_asc(field.column()),
                Direction::Desc => select.order_by_desc(field.column()),
            };
        }
        select.order_by_desc(product::Column::Id)
    }
}

fn in_category(column: category::Column, value: &str) -> SimpleExpr {
    product::Column::CategoryId.in_subquery(
        Query::select()
            .column(category::Column::Id)
            .from(category::Entity)
            .and_where(column.eq(value))
            .to_owned(),
    )
}

fn in_style(column: style::Column, value: &str) -> SimpleExpr {
    product::Column::StyleId.in_subquery(
        Query::select()
            .column(style::Column::Id)
            .from(style::Entity)
            .and_where(column.eq(value))
            .to_owned(),
    )
}

/// `%term%` with the LIKE wildcards of `term` escaped by a backslash.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn escaped(pattern: &str) -> LikeExpr {
    LikeExpr::new(pattern).escape('\\')
}

/// Matches any single tag of the JSON array, not the serialized array text.
fn tag_matches(pattern: &str) -> SimpleExpr {
    Expr::cust_with_values(
        r#"EXISTS (SELECT 1 FROM json_each("products"."tags") WHERE json_each.value LIKE ? ESCAPE ?)"#,
        [pattern.to_owned(), "\\".to_owned()],
    )
}

fn present(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn parse_price(name: &str, raw: &Option<String>) -> Result<Option<f64>, ApiError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(Some(price)),
        _ => Err(ApiError::Validation(format!(
            "{name} must be a number, got '{value}'"
        ))),
    }
}

fn parse_bool(name: &str, raw: &Option<String>) -> Result<Option<bool>, ApiError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        _ => Err(ApiError::Validation(format!(
            "{name} must be true or false, got '{value}'"
        ))),
    }
}

fn parse_ordering(raw: &str) -> Result<Vec<(OrderField, Direction)>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (direction, name) = match part.strip_prefix('-') {
                Some(name) => (Direction::Desc, name),
                None => (Direction::Asc, part),
            };
            let field = match name {
                "price" => OrderField::Price,
                "rating" => OrderField::Rating,
                "downloads" => OrderField::Downloads,
                "created_at" => OrderField::CreatedAt,
                _ => {
                    return Err(ApiError::Validation(format!(
                        "Cannot order by '{name}'; allowed: price, rating, downloads, created_at"
                    )))
                }
            };
            Ok((field, direction))
        })
        .collect()
}
