// Booking state coordinator: single source of truth for the signed-in
// user's bookings within a UI session. All mutations go through ApiExecutor
// instances and resynchronize the local list from the server on success.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::api::BookingApi;
use crate::error::RemoteCallResult;
use crate::executor::ApiExecutor;
use crate::model::{Booking, CreateBookingRequest, StatusUpdate};

pub const DEFAULT_CANCEL_REASON: &str = "Cancelled by user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Bookings,
}

// User-facing notification sink. Every mutation outcome, success or failure,
// produces exactly one notification so the UI never shows an ambiguous
// "nothing happened" state.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

// Navigation sink; a real UI maps routes onto its router.
pub trait Navigator: Send + Sync {
    fn go_to(&self, route: Route);
}

// Default notifier that only logs. A UI supplies its own toast-backed impl.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(message, "notification");
    }

    fn failure(&self, message: &str) {
        warn!(message, "notification");
    }
}

#[derive(Default)]
struct CoordinatorState {
    bookings: Vec<Booking>,
    selected_booking_id: Option<String>,
    error: Option<String>,
}

// The bookings list is mutated only by fetch_bookings (full replace); there
// is no optimistic local patching of booking status. Status transitions have
// server-side side effects the client must not assume, so every mutation is
// followed by a refetch of the authoritative list.
pub struct BookingCoordinator {
    state: Mutex<CoordinatorState>,
    list_exec: ApiExecutor<(), Vec<Booking>>,
    create_exec: ApiExecutor<CreateBookingRequest, Booking>,
    status_exec: ApiExecutor<(String, StatusUpdate), Booking>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl BookingCoordinator {
    pub fn new(
        api: Arc<dyn BookingApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let list_api = Arc::clone(&api);
        let list_exec = ApiExecutor::new(move |()| {
            let api = Arc::clone(&list_api);
            async move { api.list_bookings().await }
        });

        let create_api = Arc::clone(&api);
        let create_exec = ApiExecutor::new(move |request: CreateBookingRequest| {
            let api = Arc::clone(&create_api);
            async move { api.create_booking(request).await }
        });

        let status_exec = ApiExecutor::new(move |(id, update): (String, StatusUpdate)| {
            let api = Arc::clone(&api);
            async move { api.update_status(&id, update).await }
        });

        Self {
            state: Mutex::new(CoordinatorState::default()),
            list_exec,
            create_exec,
            status_exec,
            notifier,
            navigator,
        }
    }

    // Full replace of the local list on success; on failure the list is left
    // untouched and only the error string changes.
    pub async fn fetch_bookings(&self) {
        match self.list_exec.execute(()).await {
            RemoteCallResult::Data(bookings) => {
                debug!(count = bookings.len(), "bookings refreshed");
                let mut state = self.state.lock();
                state.bookings = bookings;
                state.error = None;
            }
            RemoteCallResult::Error(envelope) => {
                warn!(message = %envelope.message, "booking fetch failed");
                self.state.lock().error = Some(envelope.message);
            }
        }
    }

    pub async fn create_booking(&self, data: CreateBookingRequest) -> bool {
        match self.create_exec.execute(data).await {
            RemoteCallResult::Error(envelope) => {
                self.state.lock().error = Some(envelope.message.clone());
                self.notifier
                    .failure(&format!("Booking failed: {}", envelope.message));
                false
            }
            RemoteCallResult::Data(booking) => {
                info!(booking_id = %booking.id, "booking created");
                self.notifier.success("Booking created successfully");
                self.fetch_bookings().await;
                self.navigator.go_to(Route::Bookings);
                true
            }
        }
    }

    pub async fn cancel_booking(&self, booking_id: &str, reason: Option<&str>) -> bool {
        let update = StatusUpdate::cancellation(reason.unwrap_or(DEFAULT_CANCEL_REASON));

        match self
            .status_exec
            .execute((booking_id.to_string(), update))
            .await
        {
            RemoteCallResult::Error(envelope) => {
                self.state.lock().error = Some(envelope.message.clone());
                self.notifier
                    .failure(&format!("Cancellation failed: {}", envelope.message));
                false
            }
            RemoteCallResult::Data(_) => {
                info!(booking_id, "booking cancelled");
                self.notifier.success("Booking cancelled");
                self.fetch_bookings().await;
                self.navigator.go_to(Route::Bookings);
                true
            }
        }
    }

    // The pointer may lead the list: a deep-linked id is accepted before the
    // first fetch completes, and resolves once the booking arrives.
    pub fn select_booking(&self, booking_id: Option<String>) {
        self.state.lock().selected_booking_id = booking_id;
    }

    pub fn selected_booking(&self) -> Option<Booking> {
        let state = self.state.lock();
        let id = state.selected_booking_id.as_deref()?;
        state.bookings.iter().find(|b| b.id == id).cloned()
    }

    pub fn booking_by_id(&self, booking_id: &str) -> Option<Booking> {
        self.state
            .lock()
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
    }

    // Pending/confirmed, soonest first. The stable sort preserves server
    // order for equal dates.
    pub fn active_bookings(&self) -> Vec<Booking> {
        let mut active: Vec<Booking> = self
            .state
            .lock()
            .bookings
            .iter()
            .filter(|b| b.status.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.booking_date.cmp(&b.booking_date));
        active
    }

    // Completed/cancelled, most recent first, same tie-break rule.
    pub fn past_bookings(&self) -> Vec<Booking> {
        let mut past: Vec<Booking> = self
            .state
            .lock()
            .bookings
            .iter()
            .filter(|b| b.status.is_resolved())
            .cloned()
            .collect();
        past.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        past
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.state.lock().bookings.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }
}
