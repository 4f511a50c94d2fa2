//! Lookups and authentication shared by both account kinds.

use model::entities::{company, user};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, instrument, trace};

use crate::credentials::CredentialStore;
use crate::error::{AccountError, Result};

/// An entity that stores an account: unique email plus a hashed password.
pub trait AccountEntity: EntityTrait {
    /// Human readable kind, used in logs and errors
    const LABEL: &'static str;

    fn email_column() -> Self::Column;

    fn stored_password(model: &Self::Model) -> &str;
}

impl AccountEntity for user::Entity {
    const LABEL: &'static str = "Developer";

    fn email_column() -> Self::Column {
        user::Column::Email
    }

    fn stored_password(model: &user::Model) -> &str {
        &model.password
    }
}

impl AccountEntity for company::Entity {
    const LABEL: &'static str = "Company";

    fn email_column() -> Self::Column {
        company::Column::Email
    }

    fn stored_password(model: &company::Model) -> &str {
        &model.password
    }
}

/// Find an account by its email address.
#[instrument(skip(db))]
pub async fn find_by_email<E, C>(db: &C, email: &str) -> Result<Option<E::Model>>
where
    E: AccountEntity,
    C: ConnectionTrait,
{
    trace!("Looking up {} account by email", E::LABEL);
    let found = E::find()
        .filter(E::email_column().eq(email))
        .one(db)
        .await?;
    Ok(found)
}

/// Resolve an email/password pair to an account.
///
/// Both an unknown email and a wrong password end in
/// [`AccountError::InvalidCredentials`]; callers cannot tell them apart.
#[instrument(skip(db, credentials, plaintext))]
pub async fn authenticate<E, C>(
    db: &C,
    credentials: &CredentialStore,
    email: &str,
    plaintext: &str,
) -> Result<E::Model>
where
    E: AccountEntity,
    C: ConnectionTrait,
{
    match find_by_email::<E, C>(db, email).await? {
        Some(account) => {
            if credentials
                .verify(plaintext, E::stored_password(&account))
                .await
            {
                debug!("{} account authenticated", E::LABEL);
                Ok(account)
            } else {
                debug!("{} authentication failed: password mismatch", E::LABEL);
                Err(AccountError::InvalidCredentials)
            }
        }
        None => {
            credentials.burn_decoy(plaintext).await;
            debug!("{} authentication failed: unknown email", E::LABEL);
            Err(AccountError::InvalidCredentials)
        }
    }
}
