//! Server-rendered date picker page.
//!
//! The page is driven by the same [`EventsViewController`] a client would
//! use. It runs against an in-memory [`PageModel`] and a [`LocalEventsApi`]
//! that answers from [`AppState`] without a network hop, and the resulting
//! page state is written out as HTML.
//!
//! Changing the date submits `GET /?date=YYYY-MM-DD`; the "today" button
//! links to `/`.

use std::sync::Arc;

use onthisday_types::{EventsResponse, MonthDay};
use onthisday_widget::render::escape_html;
use onthisday_widget::{
    Clock, EventsApi, EventsView, EventsViewController, FetchError, PageModel, PageState,
};
use tracing::debug;

use crate::handlers;
use crate::state::AppState;

/// [`EventsApi`] answered in-process from the server's own state.
#[derive(Clone)]
pub struct LocalEventsApi {
    state: Arc<AppState>,
}

impl LocalEventsApi {
    /// Wrap the shared state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl EventsApi for LocalEventsApi {
    async fn fetch_events(&self, date: MonthDay) -> Result<EventsResponse, FetchError> {
        handlers::lookup(&self.state, date)
            .await
            .map_err(|e| FetchError::Status(e.status().as_u16()))
    }
}

/// Run the controller for `date` (or today) and render the page.
///
/// A missing, blank or unparseable date falls back to today.
pub async fn render_index(state: Arc<AppState>, date: Option<String>) -> String {
    let page = Arc::new(PageModel::new());
    let clock: Arc<dyn Clock> = Arc::clone(&state.clock);
    let controller = EventsViewController::new(
        Arc::clone(&page),
        LocalEventsApi::new(Arc::clone(&state)),
        clock,
    );
    controller.initialize();

    let selected = date.filter(|d| !d.trim().is_empty());
    let outcome = match selected {
        Some(value) => {
            page.set_date_input(&value);
            match controller.on_date_change(&value).await {
                Some(outcome) => Some(outcome),
                None => controller.on_today_click().await,
            }
        }
        None => controller.on_today_click().await,
    };
    debug!(?outcome, "index page rendered");

    render_page(&page.snapshot())
}

/// Write a page state out as a complete HTML document.
pub fn render_page(state: &PageState) -> String {
    let toast_class = if state.toast_visible {
        "error-toast active"
    } else {
        "error-toast"
    };
    let loading_class = if state.loading {
        "loading active"
    } else {
        "loading"
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>历史上的今天</title>
<style>{STYLE}</style>
</head>
<body>
<main class="container">
<header class="header">
<h1>历史上的今天</h1>
<form class="date-picker" method="get" action="/">
<input type="date" id="dateInput" name="date" value="{input}" onchange="this.form.submit()">
<a id="todayBtn" class="today-btn" href="/">今天</a>
</form>
<h2 id="currentDate" class="current-date">{label}</h2>
</header>
<div id="loadingIndicator" class="{loading_class}">加载中...</div>
<section id="eventsContainer" class="events">{events}</section>
</main>
<div id="errorToast" class="{toast_class}"><span id="errorMessage">{toast}</span></div>
</body>
</html>
"#,
        input = escape_html(&state.date_input),
        label = escape_html(&state.date_label),
        events = state.events_html,
        toast = escape_html(&state.toast_message),
    )
}

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;background:#f5f5f0;color:#222}\
.container{max-width:760px;margin:0 auto;padding:24px}\
.header{text-align:center}\
.date-picker{display:flex;gap:8px;justify-content:center}\
.today-btn{padding:4px 12px;border:1px solid #888;border-radius:4px;text-decoration:none;color:inherit}\
.event-card{display:flex;gap:16px;background:#fff;border-radius:8px;padding:16px;margin:12px 0}\
.event-year{font-weight:bold;min-width:72px;color:#a33}\
.event-title{margin:0 0 8px}\
.event-desc{margin:0;color:#555}\
.empty-state{text-align:center;color:#888;padding:48px 0}\
.loading{display:none}\
.loading.active{display:block;text-align:center}\
.error-toast{position:fixed;bottom:24px;left:50%;transform:translateX(-50%);\
background:#c33;color:#fff;padding:10px 20px;border-radius:4px;opacity:0;pointer-events:none}\
.error-toast.active{animation:toast 3s forwards}\
@keyframes toast{0%,90%{opacity:1}100%{opacity:0}}";
