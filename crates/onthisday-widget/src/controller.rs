//! The events view controller.
//!
//! [`EventsViewController`] owns the whole user-facing lifecycle: it seeds
//! the date input with today, turns date changes into API calls, and renders
//! the result (or an empty state plus a toast) into an [`EventsView`].
//!
//! # State machine
//!
//! ```text
//! Idle --> Loading --> Loaded | Empty | Error --> (ready for next action)
//! ```
//!
//! # Overlapping requests
//!
//! Every fetch takes a ticket from a monotonically increasing counter at
//! the moment the date is selected, before any await. When a response
//! arrives and a newer fetch has started since, the response is dropped
//! without touching the container, the toast or the loading indicator. The
//! indicator belongs to the newest request: it turns on when a fetch starts
//! and off when the newest fetch resolves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use onthisday_types::{HistoricalEvent, MonthDay};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::EventsApi;
use crate::dates::{self, Clock, SystemClock};
use crate::error::{DateError, FetchError};
use crate::render;
use crate::view::EventsView;

/// How long an error toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Toast text when the server reports failure without a message.
pub const DEFAULT_SOFT_FAILURE_MESSAGE: &str = "未找到历史事件";

/// Toast text for any transport or decode failure.
pub const HARD_FAILURE_MESSAGE: &str = "获取历史事件失败，请稍后重试";

/// User interactions the host page forwards to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The date input changed to the carried value.
    DateChanged(String),
    /// The "today" trigger was clicked.
    TodayClicked,
}

/// What the controller is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// At least one fetch is in flight.
    Loading,
    /// Events are on screen.
    Loaded(Vec<HistoricalEvent>),
    /// The date has no events.
    Empty,
    /// The last fetch failed; the toast showed this message.
    Error(String),
}

/// Result of a single [`EventsViewController::fetch_and_display`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rendered this many event cards.
    Loaded(usize),
    /// The server returned an empty list; the empty state is showing.
    Empty,
    /// The server reported failure; the toast shows the carried message.
    SoftFailure(String),
    /// The request itself failed; the toast shows the generic message.
    HardFailure(FetchError),
    /// A newer fetch started before this one resolved; nothing was rendered.
    Superseded,
}

/// Orchestrates date selection, fetching and rendering.
pub struct EventsViewController<V, A, C = SystemClock> {
    view: Arc<V>,
    api: A,
    clock: C,
    toast_duration: Duration,
    state: Mutex<UiState>,
    fetches: Mutex<FetchTracker>,
    toast_generation: Arc<AtomicU64>,
}

impl<V, A, C> EventsViewController<V, A, C>
where
    V: EventsView,
    A: EventsApi,
    C: Clock,
{
    /// Create a controller over the given page, API and clock.
    pub fn new(view: Arc<V>, api: A, clock: C) -> Self {
        Self {
            view,
            api,
            clock,
            toast_duration: TOAST_DURATION,
            state: Mutex::new(UiState::Idle),
            fetches: Mutex::new(FetchTracker::default()),
            toast_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override how long error toasts stay visible.
    #[must_use]
    pub const fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    /// The page this controller drives.
    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    /// Current UI state.
    pub fn state(&self) -> UiState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Seed the date input with today's date.
    ///
    /// Does not fetch; the host page ships with today's events already
    /// rendered. Calling it again just resets the input. [`listen`](Self::listen)
    /// runs this before it starts consuming events.
    pub fn initialize(&self) {
        let today = dates::current_date(&self.clock);
        self.view.set_date_input(&today);
        info!(date = %today, "events view initialized");
    }

    /// Handle a change of the date input.
    ///
    /// Empty input is a no-op and returns `None`, as does input that is not
    /// a date. Otherwise the label is updated and the events fetched.
    pub async fn on_date_change(&self, selected_date: &str) -> Option<FetchOutcome> {
        let date = self.select_date(selected_date)?;
        let ticket = self.begin_fetch(date);
        Some(self.finish_fetch(date, ticket).await)
    }

    /// Reset the date input to today and load its events.
    pub async fn on_today_click(&self) -> Option<FetchOutcome> {
        let today = self.reset_to_today();
        self.on_date_change(&today).await
    }

    /// Route a forwarded UI event to its handler.
    pub async fn dispatch(&self, event: UiEvent) -> Option<FetchOutcome> {
        let (date, ticket) = self.accept(event)?;
        Some(self.finish_fetch(date, ticket).await)
    }

    /// Fetch the events for `date` and render the result.
    ///
    /// The newest request clears the loading indicator when it resolves, on
    /// every exit path, before anything is rendered. A superseded request
    /// leaves both the indicator and the page alone.
    pub async fn fetch_and_display(&self, date: MonthDay) -> FetchOutcome {
        let ticket = self.begin_fetch(date);
        self.finish_fetch(date, ticket).await
    }

    /// Apply a UI event's synchronous effects and take its ticket.
    fn accept(&self, event: UiEvent) -> Option<(MonthDay, u64)> {
        let date = match event {
            UiEvent::DateChanged(value) => self.select_date(&value)?,
            UiEvent::TodayClicked => {
                let today = self.reset_to_today();
                self.select_date(&today)?
            }
        };
        Some((date, self.begin_fetch(date)))
    }

    fn reset_to_today(&self) -> String {
        let today = dates::current_date(&self.clock);
        self.view.set_date_input(&today);
        today
    }

    /// Parse the input and update the label. `None` for empty or bad input.
    fn select_date(&self, selected_date: &str) -> Option<MonthDay> {
        let date = match dates::parse_date(selected_date).and_then(dates::month_day) {
            Ok(date) => date,
            Err(DateError::Empty) => return None,
            Err(e) => {
                warn!(error = %e, "ignoring unparseable date input");
                return None;
            }
        };
        self.view.set_date_label(&date.label());
        Some(date)
    }

    /// Take the next ticket and enter Loading.
    fn begin_fetch(&self, date: MonthDay) -> u64 {
        let mut fetches = lock(&self.fetches);
        fetches.latest = fetches.latest.wrapping_add(1);
        if !fetches.loading {
            fetches.loading = true;
            self.view.set_loading(true);
        }
        self.set_state(UiState::Loading);
        debug!(ticket = fetches.latest, %date, "fetching events");
        fetches.latest
    }

    async fn finish_fetch(&self, date: MonthDay, ticket: u64) -> FetchOutcome {
        let loading = LoadingGuard {
            fetches: &self.fetches,
            view: self.view.as_ref(),
            ticket,
        };
        let result = self.api.fetch_events(date).await;
        drop(loading);

        // Held while rendering so a newer fetch can not start in between.
        let fetches = lock(&self.fetches);
        if fetches.latest != ticket {
            debug!(ticket, %date, "discarding response for superseded request");
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                if let Some(events) = response.events() {
                    self.render_events(events);
                    if events.is_empty() {
                        self.set_state(UiState::Empty);
                        FetchOutcome::Empty
                    } else {
                        self.set_state(UiState::Loaded(events.to_vec()));
                        FetchOutcome::Loaded(events.len())
                    }
                } else {
                    let message = response
                        .error
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_SOFT_FAILURE_MESSAGE.to_owned());
                    info!(%date, %message, "events API reported failure");
                    self.show_error_toast(&message);
                    self.render_empty_state();
                    self.set_state(UiState::Error(message.clone()));
                    FetchOutcome::SoftFailure(message)
                }
            }
            Err(e) => {
                warn!(error = %e, %date, "failed to fetch events");
                self.show_error_toast(HARD_FAILURE_MESSAGE);
                self.render_empty_state();
                self.set_state(UiState::Error(HARD_FAILURE_MESSAGE.to_owned()));
                FetchOutcome::HardFailure(e)
            }
        }
    }

    /// Render `events` as cards, or the empty state when there are none.
    pub fn render_events(&self, events: &[HistoricalEvent]) {
        if events.is_empty() {
            self.render_empty_state();
            return;
        }
        self.view.set_events_html(&render::render_events(events));
    }

    /// Replace the container with the "no events" placeholder.
    pub fn render_empty_state(&self) {
        self.view.set_events_html(&render::render_empty_state());
    }

    /// Show `message` in the toast and hide it after the toast duration.
    ///
    /// A newer toast restarts the window: the older timer still fires but
    /// only hides the toast if no other message was shown in between.
    ///
    /// The dismiss timer runs on the current Tokio runtime. Called outside
    /// one, the toast is shown and stays up until the next toast.
    pub fn show_error_toast(&self, message: &str) {
        self.view.show_toast(message);
        let generation = self
            .toast_generation
            .fetch_add(1, Ordering::SeqCst)
            .wrapping_add(1);

        let view = Arc::clone(&self.view);
        let current = Arc::clone(&self.toast_generation);
        let duration = self.toast_duration;
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(duration).await;
                    if current.load(Ordering::SeqCst) == generation {
                        view.hide_toast();
                    }
                });
            }
            Err(e) => warn!(error = %e, "no runtime for toast timer; toast stays visible"),
        }
    }

    fn set_state(&self, next: UiState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Initialize the page, then consume forwarded UI events until the
    /// sender is dropped.
    ///
    /// Events are accepted in arrival order: the label is set and the
    /// ticket taken on the listener task. Only the request itself runs on
    /// its own task, so a slow fetch never blocks the next date change.
    pub fn listen(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<UiEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.initialize();
            while let Some(event) = events.recv().await {
                let Some((date, ticket)) = self.accept(event) else {
                    continue;
                };
                let controller = Arc::clone(&self);
                tokio::spawn(async move {
                    controller.finish_fetch(date, ticket).await;
                });
            }
            debug!("UI event channel closed");
        })
    }
}

/// Latest ticket handed out and whether the indicator is on.
#[derive(Debug, Default)]
struct FetchTracker {
    latest: u64,
    loading: bool,
}

impl FetchTracker {
    /// Turn the indicator off if `ticket` is still the newest request.
    fn release<V: EventsView>(&mut self, ticket: u64, view: &V) {
        if self.latest == ticket && self.loading {
            self.loading = false;
            view.set_loading(false);
        }
    }
}

fn lock(fetches: &Mutex<FetchTracker>) -> MutexGuard<'_, FetchTracker> {
    fetches.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the indicator when a fetch resolves or its future is dropped.
struct LoadingGuard<'a, V: EventsView> {
    fetches: &'a Mutex<FetchTracker>,
    view: &'a V,
    ticket: u64,
}

impl<V: EventsView> Drop for LoadingGuard<'_, V> {
    fn drop(&mut self) {
        lock(self.fetches).release(self.ticket, self.view);
    }
}
