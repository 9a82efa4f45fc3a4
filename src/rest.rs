// reqwest-backed implementation of the booking API contract

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::api::{BookingApi, ClientConfig, TokenProvider};
use crate::error::{ApiError, ErrorEnvelope};
use crate::model::{Booking, CreateBookingRequest, PaymentUpdate, StatusUpdate};

// Shape of every backend failure body.
#[derive(Deserialize)]
struct ServerMessage {
    message: String,
}

pub struct RestBookingApi {
    client: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl RestBookingApi {
    pub fn new(
        config: ClientConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ApiError::Internal(err.to_string()))?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/bookings{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // Requests without a token go out unauthenticated; the server
        // answers 401 and that flows back through the normal error path.
        match self.tokens.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ErrorEnvelope> {
        let response = self.authorize(request).send().await.map_err(|err| {
            let err = if err.is_timeout() {
                ApiError::Timeout(self.config.timeout_ms)
            } else {
                ApiError::Transport(err.to_string())
            };
            ErrorEnvelope::from(err)
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), "booking api response");

        if status.is_success() {
            response.json::<T>().await.map_err(|err| {
                ErrorEnvelope::from(ApiError::Internal(format!(
                    "Invalid response body: {}",
                    err
                )))
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(error_from_response(status, &body))
        }
    }
}

// Maps a non-2xx response to the envelope: the server's {message} verbatim
// when the body parses, the canonical status reason otherwise.
fn error_from_response(status: StatusCode, body: &str) -> ErrorEnvelope {
    let message = serde_json::from_str::<ServerMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    ErrorEnvelope::from(ApiError::Response {
        status_code: status.as_u16(),
        message,
    })
}

#[async_trait]
impl BookingApi for RestBookingApi {
    async fn list_bookings(&self) -> Result<Vec<Booking>, ErrorEnvelope> {
        self.send(self.client.get(self.url(""))).await
    }

    async fn provider_bookings(&self) -> Result<Vec<Booking>, ErrorEnvelope> {
        self.send(self.client.get(self.url("/provider"))).await
    }

    async fn booking(&self, id: &str) -> Result<Booking, ErrorEnvelope> {
        self.send(self.client.get(self.url(&format!("/{}", id))))
            .await
    }

    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<Booking, ErrorEnvelope> {
        self.send(self.client.post(self.url("")).json(&request))
            .await
    }

    async fn update_status(
        &self,
        id: &str,
        update: StatusUpdate,
    ) -> Result<Booking, ErrorEnvelope> {
        self.send(
            self.client
                .put(self.url(&format!("/{}", id)))
                .json(&update),
        )
        .await
    }

    async fn update_payment(
        &self,
        id: &str,
        update: PaymentUpdate,
    ) -> Result<Booking, ErrorEnvelope> {
        self.send(
            self.client
                .put(self.url(&format!("/{}/payment", id)))
                .json(&update),
        )
        .await
    }
}
