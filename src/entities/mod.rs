pub mod cart;
pub mod category;
pub mod favorite;
pub mod order;
pub mod order_item;
pub mod product;
pub mod style;
pub mod user;

use chrono::Utc;
use sea_orm::{
    sea_query::Index, ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema, Set,
};

use crate::config::Config;

pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.database_max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Creates every table and index that does not exist yet.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = vec![
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(style::Entity),
        schema.create_table_from_entity(product::Entity),
        schema.create_table_from_entity(favorite::Entity),
        schema.create_table_from_entity(cart::Entity),
        schema.create_table_from_entity(order::Entity),
        schema.create_table_from_entity(order_item::Entity),
    ];
    for table in tables.iter_mut() {
        table.if_not_exists();
        db.execute(backend.build(&*table)).await?;
    }

    let mut indexes = Vec::new();
    indexes.extend(schema.create_index_from_entity(product::Entity));
    indexes.extend(schema.create_index_from_entity(favorite::Entity));
    indexes.extend(schema.create_index_from_entity(cart::Entity));
    indexes.extend(schema.create_index_from_entity(order::Entity));
    indexes.extend(schema.create_index_from_entity(order_item::Entity));
    indexes.push(
        Index::create()
            .name("idx_favorites_user_product")
            .table(favorite::Entity)
            .col(favorite::Column::UserId)
            .col(favorite::Column::ProductId)
            .unique()
            .to_owned(),
    );
    indexes.push(
        Index::create()
            .name("idx_cart_items_user_product")
            .table(cart::Entity)
            .col(cart::Column::UserId)
            .col(cart::Column::ProductId)
            .unique()
            .to_owned(),
    );
    for index in indexes.iter_mut() {
        index.if_not_exists();
        db.execute(backend.build(&*index)).await?;
    }

    Ok(())
}

/// Creates the configured administrator unless the username is already taken.
pub async fn ensure_admin(db: &DatabaseConnection, config: &Config) -> Result<(), DbErr> {
    let Some(admin) = &config.admin else {
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(admin.username.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password = user::hash_password(&admin.password).map_err(DbErr::Custom)?;
    user::ActiveModel {
        username: Set(admin.username.clone()),
        email: Set(admin.email.clone()),
        password: Set(password),
        role: Set(user::Role::Admin),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(username = %admin.username, "Created administrator account");
    Ok(())
}
