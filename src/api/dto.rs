use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{cart, category, favorite, order, order_item, product, style};
use crate::services::round_money;

#[derive(Serialize, Debug)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub products_count: i64,
}

impl CategoryResponse {
    pub fn new(value: category::Model, products_count: i64) -> Self {
        CategoryResponse {
            id: value.id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            products_count,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct StyleResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub products_count: i64,
}

impl StyleResponse {
    pub fn new(value: style::Model, products_count: i64) -> Self {
        StyleResponse {
            id: value.id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            products_count,
        }
    }
}

/// Product as it appears in lists and nested in cart, favorite and order entries.
#[derive(Serialize, Debug, Clone)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: i32,
    pub category_name: String,
    pub style: Option<i32>,
    pub style_name: Option<String>,
    pub price: f64,
    pub image: String,
    pub author: String,
    pub rating: f64,
    pub reviews_count: i32,
    pub downloads: i32,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductSummary {
    pub fn new(value: product::Model, category_name: String, style_name: Option<String>) -> Self {
        ProductSummary {
            id: value.id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            category: value.category_id,
            category_name,
            style: value.style_id,
            style_name,
            price: value.price,
            image: value.image,
            author: value.author,
            rating: value.rating,
            reviews_count: value.reviews_count,
            downloads: value.downloads,
            tags: value.tags.0,
            is_featured: value.is_featured,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: CategoryResponse,
    pub style: Option<StyleResponse>,
    pub price: f64,
    pub image: String,
    pub author: String,
    pub rating: f64,
    pub reviews_count: i32,
    pub downloads: i32,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductDetail {
    pub fn new(
        value: product::Model,
        category: CategoryResponse,
        style: Option<StyleResponse>,
    ) -> Self {
        ProductDetail {
            id: value.id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            category,
            style,
            price: value.price,
            image: value.image,
            author: value.author,
            rating: value.rating,
            reviews_count: value.reviews_count,
            downloads: value.downloads,
            tags: value.tags.0,
            is_featured: value.is_featured,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct FavoriteResponse {
    pub id: i32,
    pub product: ProductSummary,
    pub created_at: DateTime<Utc>,
}

impl FavoriteResponse {
    pub fn new(value: favorite::Model, product: ProductSummary) -> Self {
        FavoriteResponse {
            id: value.id,
            product,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CartItemResponse {
    pub id: i32,
    pub product: ProductSummary,
    pub quantity: i32,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

impl CartItemResponse {
    pub fn new(value: cart::Model, product: ProductSummary) -> Self {
        CartItemResponse {
            id: value.id,
            total_price: round_money(product.price * f64::from(value.quantity)),
            product,
            quantity: value.quantity,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product: ProductSummary,
    pub quantity: i32,
    pub price: f64,
    pub total_price: f64,
}

impl OrderItemResponse {
    pub fn new(value: order_item::Model, product: ProductSummary) -> Self {
        OrderItemResponse {
            id: value.id,
            product,
            quantity: value.quantity,
            price: value.price,
            total_price: round_money(value.total_price()),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct OrderResponse {
    pub id: i32,
    pub user: i32,
    pub user_email: String,
    pub status: order::Status,
    pub total_price: f64,
    pub email: String,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn new(value: order::Model, user_email: String, items: Vec<OrderItemResponse>) -> Self {
        OrderResponse {
            id: value.id,
            user: value.user_id,
            user_email,
            status: value.status,
            total_price: value.total_price,
            email: value.email,
            items,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Number of products per category or style id.
pub async fn products_count_by<C: ConnectionTrait>(
    db: &C,
    column: product::Column,
) -> Result<HashMap<i32, i64>, DbErr> {
    let rows: Vec<(Option<i32>, i64)> = product::Entity::find()
        .select_only()
        .column(column)
        .column_as(Expr::col(product::Column::Id).count(), "products_count")
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count)))
        .collect())
}

/// Builds list entries for `products`, keeping their order.
pub async fn summarize_products<C: ConnectionTrait>(
    db: &C,
    products: Vec<product::Model>,
) -> Result<Vec<ProductSummary>, DbErr> {
    let category_ids: Vec<i32> = products.iter().map(|p| p.category_id).collect();
    let style_ids: Vec<i32> = products.iter().filter_map(|p| p.style_id).collect();

    let categories: HashMap<i32, String> = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let styles: HashMap<i32, String> = style::Entity::find()
        .filter(style::Column::Id.is_in(style_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    Ok(products
        .into_iter()
        .map(|p| {
            let category_name = categories.get(&p.category_id).cloned().unwrap_or_default();
            let style_name = p.style_id.and_then(|id| styles.get(&id).cloned());
            ProductSummary::new(p, category_name, style_name)
        })
        .collect())
}

/// Summaries for the given product ids, keyed by id.
pub async fn product_summaries_by_id<C: ConnectionTrait>(
    db: &C,
    ids: Vec<i32>,
) -> Result<HashMap<i32, ProductSummary>, DbErr> {
    let products = product::Entity::find()
        .filter(product::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(summarize_products(db, products)
        .await?
        .into_iter()
        .map(|summary| (summary.id, summary))
        .collect())
}

/// Full order bodies with their lines, in the order of `orders`.
pub async fn order_responses<C: ConnectionTrait>(
    db: &C,
    orders: Vec<order::Model>,
    user_email: &str,
) -> Result<Vec<OrderResponse>, DbErr> {
    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let lines = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    let products =
        product_summaries_by_id(db, lines.iter().map(|line| line.product_id).collect()).await?;
    let mut grouped: HashMap<i32, Vec<OrderItemResponse>> = HashMap::new();
    for line in lines {
        let Some(product) = products.get(&line.product_id).cloned() else {
            continue;
        };
        grouped
            .entry(line.order_id)
            .or_default()
            .push(OrderItemResponse::new(line, product));
    }

    Ok(orders
        .into_iter()
        .map(|o| {
            let items = grouped.remove(&o.id).unwrap_or_default();
            OrderResponse::new(o, user_email.to_owned(), items)
        })
        .collect())
}
