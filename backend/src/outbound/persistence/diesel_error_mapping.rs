//! Mapping from pool and Diesel failures to `UserStoreError`.

use tracing::debug;

use crate::domain::ports::UserStoreError;

use super::models::RowDecodeError;
use super::pool::PoolError;

pub(super) fn map_pool_error(error: PoolError) -> UserStoreError {
    UserStoreError::unavailable(error.message())
}

/// Connection-level failures become `Unavailable`; everything else is a
/// query failure. Driver messages are logged at debug level only.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::unavailable("database connection closed")
        }
        DieselError::BrokenTransactionManager => {
            UserStoreError::unavailable("database transaction manager broken")
        }
        DieselError::QueryBuilderError(_) => UserStoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserStoreError::query("duplicate user id")
        }
        _ => UserStoreError::query("database error"),
    }
}

pub(super) fn map_decode_error(error: RowDecodeError) -> UserStoreError {
    UserStoreError::query(format!("stored user row is invalid: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn closed_connections_are_unavailable() {
        let err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));
        assert!(matches!(err, UserStoreError::Unavailable { .. }));
    }

    #[rstest]
    fn statement_failures_are_query_errors() {
        let err = map_diesel_error(DieselError::NotFound);
        assert_eq!(err, UserStoreError::query("database error"));
    }

    #[rstest]
    fn pool_checkout_is_unavailable() {
        let err = map_pool_error(PoolError::checkout("timed out waiting for connection"));
        assert_eq!(
            err,
            UserStoreError::unavailable("timed out waiting for connection")
        );
    }
}
