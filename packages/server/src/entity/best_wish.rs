use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A guestbook entry. Rows are never removed; `is_deleted` hides them.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "best_wishes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub author: String,

    /// Identity-provider subject, NULL for anonymous wishes.
    #[sea_orm(indexed)]
    pub user_id: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub image_url: Option<String>,
    pub image_filename: Option<String>,
    pub image_size: Option<i64>,

    #[sea_orm(default_value = true, indexed)]
    pub is_approved: bool,
    #[sea_orm(default_value = false, indexed)]
    pub is_deleted: bool,

    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
