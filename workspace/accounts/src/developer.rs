//! Developer account records.

use chrono::Utc;
use model::entities::user::{
    self, AccountRole, EducationEntry, EducationList, ExperienceEntry, ExperienceList, LookingFor,
    LookingForList, SkillList,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use tracing::{debug, info, instrument, trace};

use crate::credentials::CredentialStore;
use crate::error::{AccountError, Result};

/// Fields of a developer registration. `password` is plaintext here and is
/// hashed before the record is written.
#[derive(Clone, Default)]
pub struct NewDeveloper {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: AccountRole,
    pub profile_picture: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub resume_url: String,
    pub looking_for: Vec<LookingFor>,
    pub location: String,
    pub remote: bool,
}

/// Partial update of a developer profile. `None` leaves a field untouched.
#[derive(Clone, Default)]
pub struct DeveloperChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<AccountRole>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub education: Option<Vec<EducationEntry>>,
    pub resume_url: Option<String>,
    pub looking_for: Option<Vec<LookingFor>>,
    pub location: Option<String>,
    pub remote: Option<bool>,
}

/// Register a developer. The password is hashed exactly once, before insert.
#[instrument(skip(db, credentials, new), fields(email = %new.email))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    credentials: &CredentialStore,
    new: NewDeveloper,
) -> Result<user::Model> {
    trace!("Hashing password for new developer");
    let password = credentials.hash(&new.password).await?;
    let now = Utc::now();

    let record = user::ActiveModel {
        name: Set(new.name),
        email: Set(new.email.clone()),
        password: Set(password),
        role: Set(new.role),
        profile_picture: Set(new.profile_picture),
        bio: Set(new.bio),
        skills: Set(SkillList(new.skills)),
        experience: Set(ExperienceList(new.experience)),
        education: Set(EducationList(new.education)),
        resume_url: Set(new.resume_url),
        looking_for: Set(LookingForList(new.looking_for)),
        location: Set(new.location),
        remote: Set(new.remote),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = record
        .insert(db)
        .await
        .map_err(|e| AccountError::from_write(e, &new.email))?;
    info!("Developer created with ID: {}", created.id);
    Ok(created)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AccountError::NotFound {
            entity: "Developer",
            id,
        })
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<user::Model>> {
    Ok(user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}

/// Apply a partial update. The stored hash is only replaced when the
/// submitted password differs from it.
#[instrument(skip(db, credentials, changes))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    credentials: &CredentialStore,
    id: i32,
    changes: DeveloperChanges,
) -> Result<user::Model> {
    let existing = find_by_id(db, id).await?;
    let email = changes
        .email
        .clone()
        .unwrap_or_else(|| existing.email.clone());
    let stored_password = existing.password.clone();

    let mut active: user::ActiveModel = existing.into();
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
        match credentials.prepare(&candidate, Some(&stored_password)).await? {
            Some(hash) => {
                active.password = Set(hash);
                updated_fields.push("password");
            }
            None => debug!("Submitted password equals stored hash, skipping"),
        }
    }
    if let Some(role) = changes.role {
        active.role = Set(role);
        updated_fields.push("role");
    }
    if let Some(profile_picture) = changes.profile_picture {
        active.profile_picture = Set(profile_picture);
        updated_fields.push("profile_picture");
    }
    if let Some(bio) = changes.bio {
        active.bio = Set(bio);
        updated_fields.push("bio");
    }
    if let Some(skills) = changes.skills {
        active.skills = Set(SkillList(skills));
        updated_fields.push("skills");
    }
    if let Some(experience) = changes.experience {
        active.experience = Set(ExperienceList(experience));
        updated_fields.push("experience");
    }
    if let Some(education) = changes.education {
        active.education = Set(EducationList(education));
        updated_fields.push("education");
    }
    if let Some(resume_url) = changes.resume_url {
        active.resume_url = Set(resume_url);
        updated_fields.push("resume_url");
    }
    if let Some(looking_for) = changes.looking_for {
        active.looking_for = Set(LookingForList(looking_for));
        updated_fields.push("looking_for");
    }
    if let Some(location) = changes.location {
        active.location = Set(location);
        updated_fields.push("location");
    }
    if let Some(remote) = changes.remote {
        active.remote = Set(remote);
        updated_fields.push("remote");
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for developer ID: {}", id);
    } else {
        debug!("Updating fields: {}", updated_fields.join(", "));
    }
    active.updated_at = Set(Utc::now());

    let updated = active
        .update(db)
        .await
        .map_err(|e| AccountError::from_write(e, &email))?;
    info!("Developer with ID {} updated", id);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::authenticate;
    use crate::testing::{fast_credentials, setup_db};

    fn alice() -> NewDeveloper {
        NewDeveloper {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            skills: vec!["rust".to_string()],
            looking_for: vec![LookingFor::Job],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();

        let created = create(&db, &credentials, alice()).await.unwrap();

        assert_ne!(created.password, "secret1");
        assert!(credentials.verify_secret("secret1", &created.password));
        assert_eq!(created.role, AccountRole::Developer);
        assert_eq!(created.skills.0, vec!["rust".to_string()]);
        assert_eq!(created.looking_for.0, vec![LookingFor::Job]);
    }

    #[tokio::test]
    async fn test_duplicate_email_fails_and_keeps_first() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();

        let first = create(&db, &credentials, alice()).await.unwrap();
        let second = NewDeveloper {
            name: "Impostor".to_string(),
            password: "other".to_string(),
            ..alice()
        };
        let err = create(&db, &credentials, second).await.unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail(ref email) if email == "alice@example.com"));

        let all = list(&db).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[0].name, "Alice");
        assert_eq!(all[0].password, first.password);
    }

    #[tokio::test]
    async fn test_update_without_password_keeps_hash() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let created = create(&db, &credentials, alice()).await.unwrap();

        let changes = DeveloperChanges {
            bio: Some("Rustacean".to_string()),
            remote: Some(true),
            ..Default::default()
        };
        let updated = update(&db, &credentials, created.id, changes).await.unwrap();

        assert_eq!(updated.bio, "Rustacean");
        assert!(updated.remote);
        assert_eq!(updated.password, created.password);
        let reloaded = find_by_id(&db, created.id).await.unwrap();
        assert_eq!(reloaded.password.as_bytes(), created.password.as_bytes());
    }

    #[tokio::test]
    async fn test_update_with_stored_hash_does_not_double_hash() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let created = create(&db, &credentials, alice()).await.unwrap();

        let changes = DeveloperChanges {
            password: Some(created.password.clone()),
            ..Default::default()
        };
        let updated = update(&db, &credentials, created.id, changes).await.unwrap();

        assert_eq!(updated.password, created.password);
        assert!(credentials.verify_secret("secret1", &updated.password));
    }

    #[tokio::test]
    async fn test_update_password_rehashes_once() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let created = create(&db, &credentials, alice()).await.unwrap();

        let changes = DeveloperChanges {
            password: Some("secret2".to_string()),
            ..Default::default()
        };
        let updated = update(&db, &credentials, created.id, changes).await.unwrap();

        assert_ne!(updated.password, created.password);
        assert!(credentials.verify_secret("secret2", &updated.password));
        assert!(!credentials.verify_secret("secret1", &updated.password));

        let account = authenticate::<user::Entity, _>(&db, &credentials, "alice@example.com", "secret2")
            .await
            .unwrap();
        assert_eq!(account.id, created.id);
    }

    #[tokio::test]
    async fn test_update_email_collision_is_duplicate() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        create(&db, &credentials, alice()).await.unwrap();
        let bob = create(
            &db,
            &credentials,
            NewDeveloper {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "hunter2".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let changes = DeveloperChanges {
            email: Some("alice@example.com".to_string()),
            ..Default::default()
        };
        let err = update(&db, &credentials, bob.id, changes).await.unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();

        let err = update(&db, &credentials, 4242, DeveloperChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotFound { id: 4242, .. }));
    }

    #[tokio::test]
    async fn test_authentication_failures_are_indistinguishable() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        create(&db, &credentials, alice()).await.unwrap();

        let ok = authenticate::<user::Entity, _>(&db, &credentials, "alice@example.com", "secret1").await;
        assert!(ok.is_ok());

        let wrong_password =
            authenticate::<user::Entity, _>(&db, &credentials, "alice@example.com", "wrong")
                .await
                .unwrap_err();
        let unknown_email =
            authenticate::<user::Entity, _>(&db, &credentials, "nobody@example.com", "x")
                .await
                .unwrap_err();

        assert!(matches!(wrong_password, AccountError::InvalidCredentials));
        assert!(matches!(unknown_email, AccountError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }
}
