//! Company account records.

use chrono::Utc;
use model::entities::company::{self, CompanySize};
use model::entities::job;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use tracing::{debug, info, instrument, trace};

use crate::credentials::CredentialStore;
use crate::error::{AccountError, Result};

/// Fields of a company registration. `password` is plaintext here.
#[derive(Clone, Default)]
pub struct NewCompany {
    pub name: String,
    pub email: String,
    pub password: String,
    pub logo: String,
    pub description: String,
    pub industry: String,
    pub location: String,
    pub website: String,
    pub size: CompanySize,
    pub founded: Option<i32>,
}

/// Partial update of a company profile. `None` leaves a field untouched.
#[derive(Clone, Default)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub size: Option<CompanySize>,
    pub founded: Option<i32>,
}

/// Register a company. The password is hashed exactly once, before insert.
#[instrument(skip(db, credentials, new), fields(email = %new.email))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    credentials: &CredentialStore,
    new: NewCompany,
) -> Result<company::Model> {
    trace!("Hashing password for new company");
    let password = credentials.hash(&new.password).await?;
    let now = Utc::now();

    let record = company::ActiveModel {
        name: Set(new.name),
        email: Set(new.email.clone()),
        password: Set(password),
        logo: Set(new.logo),
        description: Set(new.description),
        industry: Set(new.industry),
        location: Set(new.location),
        website: Set(new.website),
        size: Set(new.size),
        founded: Set(new.founded),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = record
        .insert(db)
        .await
        .map_err(|e| AccountError::from_write(e, &new.email))?;
    info!("Company created with ID: {}", created.id);
    Ok(created)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<company::Model> {
    company::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AccountError::NotFound {
            entity: "Company",
            id,
        })
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<company::Model>> {
    Ok(company::Entity::find()
        .order_by_asc(company::Column::Id)
        .all(db)
        .await?)
}

/// Apply a partial update; see [`crate::developer::update`] for the
/// password rules, which are the same here.
#[instrument(skip(db, credentials, changes))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    credentials: &CredentialStore,
    id: i32,
    changes: CompanyChanges,
) -> Result<company::Model> {
    let existing = find_by_id(db, id).await?;
    let email = changes
        .email
        .clone()
        .unwrap_or_else(|| existing.email.clone());
    let stored_password = existing.password.clone();

    let mut active: company::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(name) = changes.name {
        active.name = Set(name);
        updated_fields.push("name");
    }
    if let Some(email) = changes.email {
        active.email = Set(email);
        updated_fields.push("email");
    }
    if let Some(candidate) = changes.password {
        if let Some(hash) = credentials.prepare(&candidate, Some(&stored_password)).await? {
            active.password = Set(hash);
            updated_fields.push("password");
        }
    }
    if let Some(logo) = changes.logo {
        active.logo = Set(logo);
        updated_fields.push("logo");
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
        updated_fields.push("description");
    }
    if let Some(industry) = changes.industry {
        active.industry = Set(industry);
        updated_fields.push("industry");
    }
    if let Some(location) = changes.location {
        active.location = Set(location);
        updated_fields.push("location");
    }
    if let Some(website) = changes.website {
        active.website = Set(website);
        updated_fields.push("website");
    }
    if let Some(size) = changes.size {
        active.size = Set(size);
        updated_fields.push("size");
    }
    if let Some(founded) = changes.founded {
        active.founded = Set(Some(founded));
        updated_fields.push("founded");
    }

    debug!("Updating company fields: {}", updated_fields.join(", "));
    active.updated_at = Set(Utc::now());

    let updated = active
        .update(db)
        .await
        .map_err(|e| AccountError::from_write(e, &email))?;
    info!("Company with ID {} updated", id);
    Ok(updated)
}

/// Job postings referencing a company.
pub async fn jobs_of<C: ConnectionTrait>(db: &C, company_id: i32) -> Result<Vec<job::Model>> {
    let company = find_by_id(db, company_id).await?;
    Ok(company.find_related(job::Entity).all(db).await?)
}
