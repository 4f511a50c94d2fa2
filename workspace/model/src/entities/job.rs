use super::{company, user::SkillList};
use sea_orm::entity::prelude::*;

/// A job posting published by a company.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Publishing company. Not an owning reference.
    pub company_id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub remote: bool,
    #[sea_orm(column_type = "Json")]
    pub skills: SkillList,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "company::Entity",
        from = "Column::CompanyId",
        to = "company::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::application::Entity")]
    Application,
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
