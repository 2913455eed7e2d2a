//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered users.
    ///
    /// `email` and `password_hash` are null on records created by a rename
    /// with upsert.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        email -> Nullable<Varchar>,
        /// Argon2id PHC string.
        password_hash -> Nullable<Text>,
        /// Insertion order key together with `id`.
        created_at -> Timestamptz,
        /// Set explicitly by every update; there is no trigger.
        updated_at -> Timestamptz,
    }
}
