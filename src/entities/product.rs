use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(indexed)]
    pub category_id: i32,
    #[sea_orm(indexed)]
    pub style_id: Option<i32>,
    pub price: f64,
    pub image: String,
    pub author: String,
    pub rating: f64,
    pub reviews_count: i32,
    pub downloads: i32,
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    pub is_featured: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Ordered tag list, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Tags(pub Vec<String>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::style::Entity",
        from = "Column::StyleId",
        to = "super::style::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Style,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::style::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Style.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
