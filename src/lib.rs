// Main library file for the health-card booking client core

pub mod api;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod model;
pub mod rest;

// Re-export key types for convenience
pub use api::{BookingApi, ClientConfig, StaticToken, TokenProvider};
pub use coordinator::{
    BookingCoordinator, Navigator, Notifier, Route, TracingNotifier, DEFAULT_CANCEL_REASON,
};
pub use error::{ApiError, ErrorEnvelope, RemoteCallResult};
pub use executor::{ApiExecutor, ExecutorState, DEFAULT_MAX_RETRIES};
pub use model::{
    Booking, BookingStatus, CreateBookingRequest, PaymentStatus, PaymentUpdate, ServiceSummary,
    StatusUpdate,
};
pub use rest::RestBookingApi;
