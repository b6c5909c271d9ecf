// Service exports
pub mod notifications;
pub mod postgres;
pub mod realtime;

pub use notifications::Notifier;
pub use postgres::PostgresClient;
pub use realtime::{RealtimeClient, RealtimeError};
