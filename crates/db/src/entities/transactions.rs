//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub upload_history_id: Option<Uuid>,
    pub transaction_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::upload_history::Entity",
        from = "Column::UploadHistoryId",
        to = "super::upload_history::Column::Id",
        on_delete = "SetNull"
    )]
    UploadHistory,
}

impl Related<super::upload_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UploadHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
