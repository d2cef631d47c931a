//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.

mod diesel_error;
mod diesel_parcel_repository;
mod diesel_payment_repository;
mod diesel_user_repository;
mod models;
mod pool;
pub mod schema;

pub use diesel_parcel_repository::DieselParcelRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
