use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;

use super::round_money;
use crate::entities::{cart, product};
use crate::error::ApiError;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: i32 = 10_000;

#[derive(Serialize, Debug, PartialEq)]
pub struct CartTotal {
    pub total: f64,
    pub items_count: u64,
}

/// Adds `quantity` of a product to the user's cart, returning the line and whether it was created.
///
/// An existing line for the same product has its quantity increased, never overwritten.
pub async fn add_to_cart<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<(cart::Model, bool), ApiError> {
    check_quantity(quantity)?;
    if product::Entity::find_by_id(product_id).one(db).await?.is_none() {
        return Err(ApiError::Validation(format!(
            "No product with id {product_id} was found"
        )));
    }

    let existing = find_line(db, user_id, product_id).await?;
    if let Some(line) = &existing {
        match line.quantity.checked_add(quantity) {
            Some(total) if total <= MAX_QUANTITY => {}
            _ => return Err(too_many(line.quantity)),
        }
    }

    let new_entry = cart::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let affected = cart::Entity::insert(new_entry)
        .on_conflict(
            OnConflict::columns([cart::Column::UserId, cart::Column::ProductId])
                .value(
                    cart::Column::Quantity,
                    Expr::col((cart::Entity, cart::Column::Quantity)).add(quantity),
                )
                .action_and_where(
                    Expr::col((cart::Entity, cart::Column::Quantity))
                        .lte(MAX_QUANTITY - quantity),
                )
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let line = find_line(db, user_id, product_id)
        .await?
        .ok_or_else(|| ApiError::Db("cart line vanished after upsert".to_owned()))?;

    // The guarded update skips the row when a concurrent add already filled it.
    if affected == 0 {
        return Err(too_many(line.quantity));
    }

    Ok((line, existing.is_none()))
}

fn check_quantity(quantity: i32) -> Result<(), ApiError> {
    if (1..=MAX_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Quantity should be between 1 and {MAX_QUANTITY}"
        )))
    }
}

fn too_many(current: i32) -> ApiError {
    ApiError::Validation(format!(
        "Cart already holds {current} of this product; a line may hold at most {MAX_QUANTITY}"
    ))
}

async fn find_line<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
) -> Result<Option<cart::Model>, ApiError> {
    Ok(cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .filter(cart::Column::ProductId.eq(product_id))
        .one(db)
        .await?)
}

pub async fn find_cart_item<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<cart::Model, ApiError> {
    cart::Entity::find_by_id(id)
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("cart item", format!("id {id}")))
}

/// Replaces the quantity of one of the user's cart lines.
pub async fn set_quantity<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
    quantity: i32,
) -> Result<cart::Model, ApiError> {
    check_quantity(quantity)?;

    let mut entry: cart::ActiveModel = find_cart_item(db, user_id, id).await?.into();
    entry.quantity = Set(quantity);
    Ok(entry.update(db).await?)
}

pub async fn remove_cart_item<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<(), ApiError> {
    let entry = find_cart_item(db, user_id, id).await?;
    cart::Entity::delete_by_id(entry.id).exec(db).await?;
    Ok(())
}

/// Empties the user's cart, returning how many lines were removed.
pub async fn clear_cart<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, ApiError> {
    let result = cart::Entity::delete_many()
        .filter(cart::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Cart lines of the user joined with their products' current state.
pub async fn cart_lines<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<(cart::Model, product::Model)>, ApiError> {
    let rows = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .find_also_related(product::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(line, product)| product.map(|product| (line, product)))
        .collect())
}

/// Sum of live `price * quantity` over the cart, with the number of distinct lines.
pub async fn cart_total<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<CartTotal, ApiError> {
    let lines = cart_lines(db, user_id).await?;
    let total: f64 = lines
        .iter()
        .map(|(line, product)| product.price * f64::from(line.quantity))
        .sum();

    Ok(CartTotal {
        total: round_money(total),
        items_count: lines.len() as u64,
    })
}
