//! Connection requests between developer accounts.
//!
//! A request is stored on the target's side and starts `pending`. Only the
//! target may resolve it, and it resolves exactly once: `accepted` and
//! `rejected` are terminal. Accepting writes the edge into both accounts'
//! connection lists inside the same transaction as the status change.

use chrono::Utc;
use model::entities::connection_request::{self, ConnectionStatus};
use model::entities::{user, user_connection};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::developer;
use crate::error::{AccountError, Result};

/// Action taken by the target of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    /// The state a pending request moves to under this decision.
    pub fn outcome(self) -> ConnectionStatus {
        match self {
            Decision::Accept => ConnectionStatus::Accepted,
            Decision::Reject => ConnectionStatus::Rejected,
        }
    }
}

/// Apply `decision` to request `id` currently in `current`.
pub fn transition(id: i32, current: ConnectionStatus, decision: Decision) -> Result<ConnectionStatus> {
    match current {
        ConnectionStatus::Pending => Ok(decision.outcome()),
        ConnectionStatus::Accepted | ConnectionStatus::Rejected => {
            Err(AccountError::RequestAlreadyResolved { id, status: current })
        }
    }
}

async fn are_connected<C: ConnectionTrait>(db: &C, a: i32, b: i32) -> Result<bool> {
    let edge = user_connection::Entity::find_by_id((a, b)).one(db).await?;
    if edge.is_some() {
        return Ok(true);
    }
    let reverse = user_connection::Entity::find_by_id((b, a)).one(db).await?;
    Ok(reverse.is_some())
}

/// Send a connection request from `from_user_id` to `to_user_id`.
///
/// A second request while one from the same requester is still pending is
/// refused. After a rejection the requester may ask again.
#[instrument(skip(db))]
pub async fn send_request<C: ConnectionTrait>(
    db: &C,
    from_user_id: i32,
    to_user_id: i32,
) -> Result<connection_request::Model> {
    if from_user_id == to_user_id {
        warn!("User {} tried to connect with itself", from_user_id);
        return Err(AccountError::SelfConnection);
    }

    trace!("Validating both developer accounts exist");
    developer::find_by_id(db, from_user_id).await?;
    developer::find_by_id(db, to_user_id).await?;

    if are_connected(db, from_user_id, to_user_id).await? {
        return Err(AccountError::AlreadyConnected(from_user_id, to_user_id));
    }

    let pending = connection_request::Entity::find()
        .filter(connection_request::Column::UserId.eq(to_user_id))
        .filter(connection_request::Column::FromUserId.eq(from_user_id))
        .filter(connection_request::Column::Status.eq(ConnectionStatus::Pending))
        .one(db)
        .await?;
    if pending.is_some() {
        return Err(AccountError::DuplicateRequest {
            from: from_user_id,
            to: to_user_id,
        });
    }

    let request = connection_request::ActiveModel {
        user_id: Set(to_user_id),
        from_user_id: Set(from_user_id),
        status: Set(ConnectionStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AccountError::DuplicateRequest {
            from: from_user_id,
            to: to_user_id,
        },
        _ => AccountError::Database(e),
    })?;

    info!(
        "Connection request {} created from user {} to user {}",
        request.id, from_user_id, to_user_id
    );
    Ok(request)
}

/// Move request `id` out of `pending` into `next`. The pending check is part
/// of the UPDATE, so a stale reader cannot overwrite a resolved request.
async fn claim_pending<C: ConnectionTrait>(db: &C, id: i32, next: ConnectionStatus) -> Result<()> {
    let claimed = connection_request::Entity::update_many()
        .col_expr(connection_request::Column::Status, Expr::value(next.to_value()))
        .filter(connection_request::Column::Id.eq(id))
        .filter(connection_request::Column::Status.eq(ConnectionStatus::Pending))
        .exec(db)
        .await?;
    if claimed.rows_affected > 0 {
        return Ok(());
    }

    let current = connection_request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AccountError::NotFound {
            entity: "Connection request",
            id,
        })?
        .status;
    warn!("Connection request {} is already {:?}", id, current);
    Err(AccountError::RequestAlreadyResolved { id, status: current })
}

/// Resolve a pending request on behalf of its target.
#[instrument(skip(db))]
pub async fn respond<C>(
    db: &C,
    request_id: i32,
    responder_id: i32,
    decision: Decision,
) -> Result<connection_request::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let request = connection_request::Entity::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or(AccountError::NotFound {
            entity: "Connection request",
            id: request_id,
        })?;

    if request.user_id != responder_id {
        warn!(
            "User {} attempted to resolve request {} addressed to user {}",
            responder_id, request_id, request.user_id
        );
        return Err(AccountError::NotRequestTarget {
            id: request_id,
            responder: responder_id,
        });
    }

    let next = transition(request.id, request.status, decision)?;
    let target = request.user_id;
    let requester = request.from_user_id;

    claim_pending(&txn, request_id, next).await?;
    let resolved = connection_request::Model {
        status: next,
        ..request
    };

    if next == ConnectionStatus::Accepted {
        for (owner, other) in [(target, requester), (requester, target)] {
            let exists = user_connection::Entity::find_by_id((owner, other))
                .one(&txn)
                .await?
                .is_some();
            if exists {
                debug!("Edge {} -> {} already present", owner, other);
                continue;
            }
            user_connection::ActiveModel {
                user_id: Set(owner),
                connected_user_id: Set(other),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    info!("Connection request {} resolved as {:?}", request_id, next);
    Ok(resolved)
}

/// Requests addressed to `user_id`, oldest first, optionally filtered by status.
pub async fn requests_for<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    status: Option<ConnectionStatus>,
) -> Result<Vec<connection_request::Model>> {
    developer::find_by_id(db, user_id).await?;

    let mut query = connection_request::Entity::find()
        .filter(connection_request::Column::UserId.eq(user_id));
    if let Some(status) = status {
        query = query.filter(connection_request::Column::Status.eq(status));
    }

    Ok(query
        .order_by_asc(connection_request::Column::CreatedAt)
        .order_by_asc(connection_request::Column::Id)
        .all(db)
        .await?)
}

/// Developers in `user_id`'s connection list.
pub async fn connections_of<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<user::Model>> {
    developer::find_by_id(db, user_id).await?;

    let connected_ids: Vec<i32> = user_connection::Entity::find()
        .filter(user_connection::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|edge| edge.connected_user_id)
        .collect();

    if connected_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(connected_ids))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fast_credentials, new_developer, setup_db};

    #[test]
    fn test_pending_resolves_to_either_terminal_state() {
        assert_eq!(
            transition(1, ConnectionStatus::Pending, Decision::Accept).unwrap(),
            ConnectionStatus::Accepted
        );
        assert_eq!(
            transition(1, ConnectionStatus::Pending, Decision::Reject).unwrap(),
            ConnectionStatus::Rejected
        );
    }

    #[test]
    fn test_terminal_states_do_not_transition() {
        for current in [ConnectionStatus::Accepted, ConnectionStatus::Rejected] {
            for decision in [Decision::Accept, Decision::Reject] {
                let err = transition(7, current, decision).unwrap_err();
                assert!(matches!(
                    err,
                    AccountError::RequestAlreadyResolved { id: 7, status } if status == current
                ));
            }
        }
    }

    #[tokio::test]
    async fn test_request_starts_pending() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();
        let bob = new_developer(&db, &credentials, "bob").await.unwrap();

        let request = send_request(&db, bob.id, alice.id).await.unwrap();

        assert_eq!(request.status, ConnectionStatus::Pending);
        assert_eq!(request.user_id, alice.id);
        assert_eq!(request.from_user_id, bob.id);

        let incoming = requests_for(&db, alice.id, Some(ConnectionStatus::Pending))
            .await
            .unwrap();
        assert_eq!(incoming.len(), 1);
        assert!(requests_for(&db, bob.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accept_connects_both_sides() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();
        let bob = new_developer(&db, &credentials, "bob").await.unwrap();

        let request = send_request(&db, bob.id, alice.id).await.unwrap();
        let resolved = respond(&db, request.id, alice.id, Decision::Accept)
            .await
            .unwrap();
        assert_eq!(resolved.status, ConnectionStatus::Accepted);

        let of_alice = connections_of(&db, alice.id).await.unwrap();
        let of_bob = connections_of(&db, bob.id).await.unwrap();
        assert_eq!(of_alice.iter().map(|u| u.id).collect::<Vec<_>>(), vec![bob.id]);
        assert_eq!(of_bob.iter().map(|u| u.id).collect::<Vec<_>>(), vec![alice.id]);

        // Terminal: a second response is refused and nothing changes
        let err = respond(&db, request.id, alice.id, Decision::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::RequestAlreadyResolved { .. }));
        assert_eq!(connections_of(&db, alice.id).await.unwrap().len(), 1);

        // Already connected in either direction
        assert!(matches!(
            send_request(&db, alice.id, bob.id).await,
            Err(AccountError::AlreadyConnected(_, _))
        ));
    }

    #[tokio::test]
    async fn test_reject_is_terminal_and_allows_new_request() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();
        let bob = new_developer(&db, &credentials, "bob").await.unwrap();

        let request = send_request(&db, bob.id, alice.id).await.unwrap();
        let resolved = respond(&db, request.id, alice.id, Decision::Reject)
            .await
            .unwrap();
        assert_eq!(resolved.status, ConnectionStatus::Rejected);
        assert!(connections_of(&db, alice.id).await.unwrap().is_empty());

        assert!(matches!(
            respond(&db, request.id, alice.id, Decision::Accept).await,
            Err(AccountError::RequestAlreadyResolved { .. })
        ));

        let again = send_request(&db, bob.id, alice.id).await.unwrap();
        assert_ne!(again.id, request.id);
        assert_eq!(again.status, ConnectionStatus::Pending);
        assert_eq!(requests_for(&db, alice.id, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_response_cannot_overwrite_resolution() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();
        let bob = new_developer(&db, &credentials, "bob").await.unwrap();

        let request = send_request(&db, bob.id, alice.id).await.unwrap();
        respond(&db, request.id, alice.id, Decision::Accept)
            .await
            .unwrap();

        // A responder that still holds the old pending row writes afterwards
        let err = claim_pending(&db, request.id, ConnectionStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::RequestAlreadyResolved { status: ConnectionStatus::Accepted, .. }
        ));

        let stored = connection_request::Entity::find_by_id(request.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ConnectionStatus::Accepted);
        assert_eq!(connections_of(&db, alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_pending_request_is_refused() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();
        let bob = new_developer(&db, &credentials, "bob").await.unwrap();

        send_request(&db, bob.id, alice.id).await.unwrap();
        let err = send_request(&db, bob.id, alice.id).await.unwrap_err();
        assert!(matches!(err, AccountError::DuplicateRequest { .. }));
    }

    #[tokio::test]
    async fn test_only_target_may_respond() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();
        let bob = new_developer(&db, &credentials, "bob").await.unwrap();

        let request = send_request(&db, bob.id, alice.id).await.unwrap();
        let err = respond(&db, request.id, bob.id, Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotRequestTarget { .. }));

        let still_pending = requests_for(&db, alice.id, Some(ConnectionStatus::Pending))
            .await
            .unwrap();
        assert_eq!(still_pending.len(), 1);
    }

    #[tokio::test]
    async fn test_crossed_requests_accept_without_duplicate_edges() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();
        let bob = new_developer(&db, &credentials, "bob").await.unwrap();

        let to_alice = send_request(&db, bob.id, alice.id).await.unwrap();
        let to_bob = send_request(&db, alice.id, bob.id).await.unwrap();

        respond(&db, to_alice.id, alice.id, Decision::Accept).await.unwrap();
        respond(&db, to_bob.id, bob.id, Decision::Accept).await.unwrap();

        assert_eq!(connections_of(&db, alice.id).await.unwrap().len(), 1);
        assert_eq!(connections_of(&db, bob.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_participants() {
        let db = setup_db().await.unwrap();
        let credentials = fast_credentials();
        let alice = new_developer(&db, &credentials, "alice").await.unwrap();

        assert!(matches!(
            send_request(&db, alice.id, alice.id).await,
            Err(AccountError::SelfConnection)
        ));
        assert!(matches!(
            send_request(&db, alice.id, 999).await,
            Err(AccountError::NotFound { id: 999, .. })
        ));
        assert!(matches!(
            respond(&db, 12345, alice.id, Decision::Accept).await,
            Err(AccountError::NotFound { id: 12345, .. })
        ));
        assert!(matches!(
            connections_of(&db, 999).await,
            Err(AccountError::NotFound { .. })
        ));
    }
}
