//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.
//!
//! Insertion order is `(created_at, id)`. Each port operation is one
//! statement, except `update_one`, which reads the first match and writes it
//! inside a single transaction.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    DeleteOutcome, UpdateOptions, UpdateOutcome, UserFilter, UserPatch, UserStore, UserStoreError,
};
use crate::domain::{NewUserRecord, StoredUser, UserId};

use super::diesel_error_mapping::{map_decode_error, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered<'a>(filter: &'a UserFilter) -> users::BoxedQuery<'a, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(id) = &filter.id {
        query = query.filter(users::id.eq(*id.as_uuid()));
    }
    if let Some(email) = &filter.email {
        query = query.filter(users::email.eq(email.as_ref()));
    }
    if let Some(display_name) = &filter.display_name {
        query = query.filter(users::display_name.eq(display_name.as_ref()));
    }
    query.order((users::created_at.asc(), users::id.asc()))
}

async fn first_match(
    conn: &mut AsyncPgConnection,
    filter: &UserFilter,
) -> QueryResult<Option<UserRow>> {
    filtered(filter)
        .select(UserRow::as_select())
        .first(conn)
        .await
        .optional()
}

fn decode(row: UserRow) -> Result<StoredUser, UserStoreError> {
    StoredUser::try_from(row).map_err(map_decode_error)
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn find_all(&self) -> Result<Vec<StoredUser>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<StoredUser>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = first_match(&mut conn, filter)
            .await
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn insert(&self, record: NewUserRecord) -> Result<StoredUser, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            display_name: record.display_name.as_ref(),
            email: record.email.as_ref().map(AsRef::as_ref),
            password_hash: record.password_hash.as_ref().map(|hash| hash.as_str()),
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode(row)
    }

    async fn update_one(
        &self,
        filter: &UserFilter,
        patch: &UserPatch,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, UserStoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let filter = filter.clone();
        let display_name = patch.display_name.as_ref().to_owned();

        let outcome = conn
            .transaction(|conn| {
                async move {
                    if let Some(row) = first_match(conn, &filter).await? {
                        let id = UserId::from_uuid(row.id);
                        if row.display_name == display_name {
                            return Ok(UpdateOutcome::Unchanged { id });
                        }
                        let written = diesel::update(users::table.filter(users::id.eq(row.id)))
                            .set((
                                users::display_name.eq(&display_name),
                                users::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                        // Zero rows means a concurrent delete won the race.
                        return Ok(if written == 0 {
                            UpdateOutcome::NotMatched
                        } else {
                            UpdateOutcome::Modified { id }
                        });
                    }

                    if !options.upsert {
                        return Ok(UpdateOutcome::NotMatched);
                    }

                    let id = filter.id.clone().unwrap_or_else(UserId::random);
                    let new_row = NewUserRow {
                        id: *id.as_uuid(),
                        display_name: &display_name,
                        email: filter.email.as_ref().map(AsRef::as_ref),
                        password_hash: None,
                    };
                    diesel::insert_into(users::table)
                        .values(&new_row)
                        .on_conflict(users::id)
                        .do_update()
                        .set((
                            users::display_name.eq(excluded(users::display_name)),
                            users::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(UpdateOutcome::Upserted { id })
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(?outcome, "user update applied");
        Ok(outcome)
    }

    async fn delete_one(&self, filter: &UserFilter) -> Result<DeleteOutcome, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // DELETE has no LIMIT in Postgres; target the first match by key.
        let target = filtered(filter).select(users::id).limit(1);
        let deleted = diesel::delete(users::table.filter(users::id.eq_any(target)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(DeleteOutcome {
            deleted_count: u64::try_from(deleted).unwrap_or(u64::MAX),
        })
    }
}
