use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::{cart::cart_lines, round_money};
use crate::entities::{cart, order, order_item};
use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;

/// Turns the user's cart into a pending order.
///
/// The order, its lines and the emptied cart are written in one transaction;
/// any failure leaves the cart untouched and no order behind. Each line keeps
/// the product price of this moment.
pub async fn checkout(
    db: &DatabaseConnection,
    user: &CurrentUser,
    email: Option<String>,
) -> Result<(order::Model, Vec<order_item::Model>), ApiError> {
    let txn = db.begin().await?;

    let lines = cart_lines(&txn, user.id).await?;
    if lines.is_empty() {
        return Err(ApiError::Validation("Cart is empty".to_owned()));
    }

    let total_price = round_money(
        lines
            .iter()
            .map(|(line, product)| product.price * f64::from(line.quantity))
            .sum(),
    );

    let now = Utc::now();
    let order = order::ActiveModel {
        user_id: Set(user.id),
        status: Set(order::Status::Pending),
        total_price: Set(total_price),
        email: Set(email.unwrap_or_else(|| user.email.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let items: Vec<order_item::ActiveModel> = lines
        .iter()
        .map(|(line, product)| order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(line.quantity),
            price: Set(product.price),
            ..Default::default()
        })
        .collect();
    order_item::Entity::insert_many(items)
        .exec_without_returning(&txn)
        .await?;

    cart::Entity::delete_many()
        .filter(cart::Column::UserId.eq(user.id))
        .exec(&txn)
        .await?;

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .order_by_asc(order_item::Column::Id)
        .all(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = order.id,
        user_id = user.id,
        lines = items.len(),
        total_price,
        "Checked out cart"
    );
    Ok((order, items))
}
