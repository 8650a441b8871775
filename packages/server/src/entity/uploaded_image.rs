use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uploaded_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub image_url: String,
    /// CDN identifier, needed for the signed destroy call.
    #[sea_orm(unique)]
    pub public_id: String,
    pub original_name: String,
    pub original_size: Option<i64>,
    pub optimized_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,

    #[sea_orm(indexed)]
    pub user_id: Option<String>,

    #[sea_orm(indexed)]
    pub uploaded_at: DateTimeUtc,

    #[sea_orm(default_value = false, indexed)]
    pub is_deleted: bool,
}

impl ActiveModelBehavior for ActiveModel {}
