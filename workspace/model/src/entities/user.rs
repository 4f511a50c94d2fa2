use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The role tag carried by a developer-style account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum AccountRole {
    #[default]
    #[sea_orm(string_value = "developer")]
    Developer,
    #[sea_orm(string_value = "company")]
    Company,
}

/// What a developer is currently looking for on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LookingFor {
    Job,
    Hackathon,
    Collaboration,
}

impl LookingFor {
    pub const ALL: [LookingFor; 3] = [
        LookingFor::Job,
        LookingFor::Hackathon,
        LookingFor::Collaboration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookingFor::Job => "job",
            LookingFor::Hackathon => "hackathon",
            LookingFor::Collaboration => "collaboration",
        }
    }
}

/// A single entry of a developer's work history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    /// Years spent in the position
    pub years: Option<i32>,
    #[serde(default)]
    pub description: String,
}

/// A single entry of a developer's education history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    /// Graduation year
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SkillList(pub Vec<String>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ExperienceList(pub Vec<ExperienceEntry>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct EducationList(pub Vec<EducationEntry>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct LookingForList(pub Vec<LookingFor>);

/// A developer account.
///
/// The embedded lists (skills, experience, education, preferences) live in
/// JSON columns. Connections and connection requests are stored in their own
/// tables, see [`super::user_connection`] and [`super::connection_request`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id PHC string. Never plaintext.
    pub password: String,
    pub role: AccountRole,
    pub profile_picture: String,
    pub bio: String,
    #[sea_orm(column_type = "Json")]
    pub skills: SkillList,
    #[sea_orm(column_type = "Json")]
    pub experience: ExperienceList,
    #[sea_orm(column_type = "Json")]
    pub education: EducationList,
    pub resume_url: String,
    #[sea_orm(column_type = "Json")]
    pub looking_for: LookingForList,
    pub location: String,
    pub remote: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Incoming connection requests addressed to this user.
    #[sea_orm(has_many = "super::connection_request::Entity")]
    ConnectionRequest,
    /// Outgoing connection edges owned by this user.
    #[sea_orm(has_many = "super::user_connection::Entity")]
    UserConnection,
    #[sea_orm(has_many = "super::application::Entity")]
    Application,
}

impl Related<super::connection_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConnectionRequest.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
