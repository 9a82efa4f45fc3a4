// Booking API trait and client configuration

use async_trait::async_trait;

use crate::error::ErrorEnvelope;
use crate::model::{Booking, CreateBookingRequest, PaymentUpdate, StatusUpdate};

// Client configuration for the REST transport. The timeout is the overall
// per-request bound; nothing inside the crate waits longer than this.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 10_000,
            max_retries: 3,
        }
    }
}

// Supplies the bearer token attached to authenticated requests. Token storage
// lives outside this crate; injecting the provider keeps the core testable.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

// A static token, or no token at all. Enough for tests and simple callers.
pub struct StaticToken(pub Option<String>);

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

// The booking API contract. All failures arrive as ErrorEnvelope; no method
// panics or leaks transport-specific error types.
#[async_trait]
pub trait BookingApi: Send + Sync {
    // GET /api/bookings - the authenticated user's bookings.
    async fn list_bookings(&self) -> Result<Vec<Booking>, ErrorEnvelope>;

    // GET /api/bookings/provider - bookings for services the caller provides.
    async fn provider_bookings(&self) -> Result<Vec<Booking>, ErrorEnvelope>;

    // GET /api/bookings/:id
    async fn booking(&self, id: &str) -> Result<Booking, ErrorEnvelope>;

    // POST /api/bookings
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<Booking, ErrorEnvelope>;

    // PUT /api/bookings/:id
    async fn update_status(
        &self,
        id: &str,
        update: StatusUpdate,
    ) -> Result<Booking, ErrorEnvelope>;

    // PUT /api/bookings/:id/payment
    async fn update_payment(
        &self,
        id: &str,
        update: PaymentUpdate,
    ) -> Result<Booking, ErrorEnvelope>;
}
