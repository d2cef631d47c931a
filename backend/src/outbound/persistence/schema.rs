//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique login identifier.
        email -> Varchar,
        /// Argon2 hash, never the plaintext.
        password_hash -> Varchar,
        full_name -> Varchar,
        phone -> Nullable<Varchar>,
        role -> Varchar,
        verified -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Registered shipments.
    parcels (id) {
        id -> Uuid,
        /// Unique human-facing identifier.
        tracking_code -> Varchar,
        sender_name -> Varchar,
        sender_email -> Varchar,
        sender_phone -> Varchar,
        recipient_name -> Varchar,
        recipient_email -> Varchar,
        recipient_phone -> Varchar,
        recipient_address -> Varchar,
        destination_country -> Varchar,
        weight_kg -> Double,
        dim_length -> Double,
        dim_width -> Double,
        dim_height -> Double,
        dim_unit -> Varchar,
        shipping_cost -> Double,
        border_fee -> Double,
        status -> Varchar,
        current_location -> Varchar,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        border_fee_paid -> Bool,
        estimated_delivery -> Nullable<Timestamptz>,
        actual_delivery -> Nullable<Timestamptz>,
        user_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only tracking ledger. Rows are never updated or deleted.
    tracking_events (id) {
        id -> Uuid,
        parcel_id -> Uuid,
        status -> Varchar,
        location -> Varchar,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        description -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Fee-collection attempts against the external processor.
    payments (id) {
        id -> Uuid,
        parcel_id -> Uuid,
        /// Processor-assigned reference, unique.
        processor_ref -> Varchar,
        kind -> Varchar,
        amount -> Double,
        currency -> Varchar,
        status -> Varchar,
        details -> Jsonb,
        completed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(parcels -> users (user_id));
diesel::joinable!(tracking_events -> parcels (parcel_id));
diesel::joinable!(payments -> parcels (parcel_id));

diesel::allow_tables_to_appear_in_same_query!(users, parcels, tracking_events, payments);
