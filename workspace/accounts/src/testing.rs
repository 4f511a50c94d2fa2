use migration::{Migrator, MigratorTrait};
use model::entities::user;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

use crate::credentials::{CredentialStore, HashingCost};
use crate::developer::{self, NewDeveloper};
use crate::error::Result;

pub async fn setup_db() -> std::result::Result<DatabaseConnection, DbErr> {
    // Connect to the SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Cheapest parameters Argon2 accepts, so tests stay fast.
pub fn fast_credentials() -> CredentialStore {
    CredentialStore::new(HashingCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid test hashing cost")
}

/// Register a developer named `handle` with email `<handle>@example.com`.
pub async fn new_developer(
    db: &DatabaseConnection,
    credentials: &CredentialStore,
    handle: &str,
) -> Result<user::Model> {
    developer::create(
        db,
        credentials,
        NewDeveloper {
            name: handle.to_string(),
            email: format!("{}@example.com", handle),
            password: format!("{}-password", handle),
            ..Default::default()
        },
    )
    .await
}
