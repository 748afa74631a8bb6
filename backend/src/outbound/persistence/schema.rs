//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered users, keyed by email, created on first login.
    users (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        /// Display name from the provider profile.
        #[max_length = 250]
        name -> Varchar,
        /// Unique email address the user is resolved by.
        #[max_length = 250]
        email -> Varchar,
        /// Optional profile picture URL.
        #[max_length = 250]
        picture -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Flower arrangements owned by users.
    arrangements (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        #[max_length = 250]
        name -> Varchar,
        #[max_length = 250]
        description -> Varchar,
        /// Free-form price string, preserved verbatim for display.
        #[max_length = 8]
        base_price -> Varchar,
        /// Owner with exclusive mutation rights.
        user_id -> Int4,
        #[max_length = 250]
        picture -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Flowers belonging to exactly one arrangement.
    flowers (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        #[max_length = 80]
        name -> Varchar,
        #[max_length = 250]
        description -> Varchar,
        /// Free-form price string, preserved verbatim for display.
        #[max_length = 8]
        price -> Varchar,
        /// Parent arrangement; rows cascade on its deletion.
        arrangement_id -> Int4,
        /// Owner copied from the parent arrangement at creation time.
        user_id -> Int4,
        #[max_length = 250]
        picture -> Nullable<Varchar>,
    }
}

diesel::joinable!(arrangements -> users (user_id));
diesel::joinable!(flowers -> arrangements (arrangement_id));

diesel::allow_tables_to_appear_in_same_query!(users, arrangements, flowers);
