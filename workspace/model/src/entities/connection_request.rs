use super::user;
use sea_orm::entity::prelude::*;

/// Lifecycle of a connection request. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum ConnectionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// A request from one developer to connect with another.
/// The row belongs to the target account (`user_id`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "connection_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Target of the request; the account that may accept or reject it.
    pub user_id: i32,
    /// Requesting account. Not an owning reference.
    pub from_user_id: i32,
    pub status: ConnectionStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id"
    )]
    Target,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::FromUserId",
        to = "user::Column::Id"
    )]
    Requester,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Target.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
