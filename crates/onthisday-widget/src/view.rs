//! The page elements the controller drives.
//!
//! [`EventsView`] abstracts the six elements the host page must supply:
//! date input, "today" trigger, date label, events container, loading
//! indicator, and error toast. The trigger has no method here; the host
//! forwards its clicks as [`UiEvent::TodayClicked`](crate::UiEvent).
//!
//! [`PageModel`] is an in-memory implementation that records every change.
//! Hosts without a DOM (server-side rendering, tests) use it directly.

use std::sync::{Mutex, PoisonError};

/// Handle to the page elements the controller reads and writes.
///
/// Methods take `&self` because element handles are shared between the
/// controller and its toast timer. Implementations use interior mutability.
pub trait EventsView: Send + Sync + 'static {
    /// Current value of the date input (`YYYY-MM-DD`, possibly empty).
    fn date_input(&self) -> String;

    /// Replace the value of the date input.
    fn set_date_input(&self, value: &str);

    /// Replace the text of the current-date label.
    fn set_date_label(&self, label: &str);

    /// Replace the inner HTML of the events container.
    fn set_events_html(&self, html: &str);

    /// Turn the loading indicator on or off. On also dims the container.
    fn set_loading(&self, active: bool);

    /// Show the error toast with `message` as its text.
    fn show_toast(&self, message: &str);

    /// Hide the error toast.
    fn hide_toast(&self);
}

/// Snapshot of everything a [`PageModel`] holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    /// Date input value.
    pub date_input: String,
    /// Current-date label text.
    pub date_label: String,
    /// Events container inner HTML.
    pub events_html: String,
    /// Whether the loading indicator is active.
    pub loading: bool,
    /// Every `set_loading` call, in order.
    pub loading_history: Vec<bool>,
    /// Whether the toast is visible.
    pub toast_visible: bool,
    /// Text in the toast message slot.
    pub toast_message: String,
    /// Every message the toast has shown, in order.
    pub toasts: Vec<String>,
    /// Number of times the container HTML was replaced.
    pub renders: usize,
}

/// In-memory [`EventsView`].
#[derive(Debug, Default)]
pub struct PageModel {
    state: Mutex<PageState>,
}

impl PageModel {
    /// Create an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current page state.
    pub fn snapshot(&self) -> PageState {
        self.with_state(|s| s.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl EventsView for PageModel {
    fn date_input(&self) -> String {
        self.with_state(|s| s.date_input.clone())
    }

    fn set_date_input(&self, value: &str) {
        self.with_state(|s| value.clone_into(&mut s.date_input));
    }

    fn set_date_label(&self, label: &str) {
        self.with_state(|s| label.clone_into(&mut s.date_label));
    }

    fn set_events_html(&self, html: &str) {
        self.with_state(|s| {
            html.clone_into(&mut s.events_html);
            s.renders = s.renders.saturating_add(1);
        });
    }

    fn set_loading(&self, active: bool) {
        self.with_state(|s| {
            s.loading = active;
            s.loading_history.push(active);
        });
    }

    fn show_toast(&self, message: &str) {
        self.with_state(|s| {
            s.toast_visible = true;
            message.clone_into(&mut s.toast_message);
            s.toasts.push(message.to_owned());
        });
    }

    fn hide_toast(&self) {
        self.with_state(|s| s.toast_visible = false);
    }
}
