use sea_orm::entity::prelude::*;

/// Headcount bucket of a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum CompanySize {
    #[default]
    #[sea_orm(string_value = "1-10")]
    UpToTen,
    #[sea_orm(string_value = "11-50")]
    UpToFifty,
    #[sea_orm(string_value = "51-200")]
    UpToTwoHundred,
    #[sea_orm(string_value = "201-500")]
    UpToFiveHundred,
    #[sea_orm(string_value = "501-1000")]
    UpToThousand,
    #[sea_orm(string_value = "1000+")]
    OverThousand,
}

/// A company account. Owns its credential like a developer account does,
/// but has an independent set of profile fields.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id PHC string. Never plaintext.
    pub password: String,
    pub logo: String,
    pub description: String,
    pub industry: String,
    pub location: String,
    pub website: String,
    pub size: CompanySize,
    /// Year the company was founded
    pub founded: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Job postings referencing this company.
    #[sea_orm(has_many = "super::job::Entity")]
    Job,
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
