use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::entities::{favorite, product};
use crate::error::ApiError;

/// Favorites `product_id` for `user_id`, returning the row and whether it was created.
///
/// A second call for the same pair is a no-op that returns the existing row;
/// concurrent inserts settle on the unique `(user_id, product_id)` index.
pub async fn add_favorite<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
) -> Result<(favorite::Model, bool), ApiError> {
    if product::Entity::find_by_id(product_id).one(db).await?.is_none() {
        return Err(ApiError::Validation(format!(
            "No product with id {product_id} was found"
        )));
    }

    let new_entry = favorite::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = favorite::Entity::insert(new_entry)
        .on_conflict(
            OnConflict::columns([favorite::Column::UserId, favorite::Column::ProductId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let entry = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::ProductId.eq(product_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Db("favorite vanished after upsert".to_owned()))?;

    Ok((entry, inserted > 0))
}

pub async fn find_favorite<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<favorite::Model, ApiError> {
    favorite::Entity::find_by_id(id)
        .filter(favorite::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("favorite", format!("id {id}")))
}

pub async fn remove_favorite<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<(), ApiError> {
    let entry = find_favorite(db, user_id, id).await?;
    favorite::Entity::delete_by_id(entry.id).exec(db).await?;
    Ok(())
}
