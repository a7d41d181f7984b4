//! Lifecycle tests for the events view controller.
//!
//! The controller is driven against an in-memory [`PageModel`] and a
//! scripted API double, so every handler can be awaited to completion and
//! the resulting page state inspected.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use onthisday_types::{EventsResponse, HistoricalEvent, MonthDay};
use onthisday_widget::controller::{DEFAULT_SOFT_FAILURE_MESSAGE, HARD_FAILURE_MESSAGE};
use onthisday_widget::render::EMPTY_STATE_MESSAGE;
use onthisday_widget::{
    EventsApi, EventsView, EventsViewController, FetchError, FetchOutcome, FixedClock, PageModel,
    UiEvent, UiState,
};
use tokio::sync::{Notify, mpsc};

// =========================================================================
// Test doubles
// =========================================================================

type Reply = Result<EventsResponse, FetchError>;

/// Answers calls from a queue and records which dates were requested.
#[derive(Clone, Default)]
struct ScriptedApi {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<MonthDay>>>,
}

impl ScriptedApi {
    fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let api = Self::default();
        api.replies.lock().unwrap().extend(replies);
        api
    }

    fn calls(&self) -> Vec<MonthDay> {
        self.calls.lock().unwrap().clone()
    }
}

impl EventsApi for ScriptedApi {
    async fn fetch_events(&self, date: MonthDay) -> Reply {
        self.calls.lock().unwrap().push(date);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("no scripted reply".to_owned())))
    }
}

/// Holds each call until the test releases it, keyed by day of month.
#[derive(Clone)]
struct Gate {
    started: Arc<Notify>,
    release: Arc<Notify>,
    reply: Reply,
}

#[derive(Clone, Default)]
struct GatedApi {
    gates: Arc<Mutex<HashMap<u32, Gate>>>,
}

impl GatedApi {
    fn gate(&self, day: u32, reply: Reply) -> Gate {
        let gate = Gate {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            reply,
        };
        self.gates.lock().unwrap().insert(day, gate.clone());
        gate
    }
}

impl EventsApi for GatedApi {
    async fn fetch_events(&self, date: MonthDay) -> Reply {
        let gate = {
            let gates = self.gates.lock().unwrap();
            gates.get(&date.day()).cloned()
        };
        let Some(gate) = gate else {
            return Err(FetchError::Transport("no gate".to_owned()));
        };
        gate.started.notify_one();
        gate.release.notified().await;
        gate.reply
    }
}

/// Echoes the requested day back after yielding once.
#[derive(Clone, Default)]
struct EchoApi {
    calls: Arc<Mutex<Vec<MonthDay>>>,
}

impl EventsApi for EchoApi {
    async fn fetch_events(&self, date: MonthDay) -> Reply {
        self.calls.lock().unwrap().push(date);
        tokio::task::yield_now().await;
        let title = format!("day {}", date.day());
        Ok(EventsResponse::ok(vec![HistoricalEvent::new(2000, title)], date.label()))
    }
}

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
}

type TestController<A> = EventsViewController<PageModel, A, FixedClock>;

fn controller<A: EventsApi>(api: A) -> (Arc<PageModel>, TestController<A>) {
    let page = Arc::new(PageModel::new());
    let ctrl = EventsViewController::new(Arc::clone(&page), api, clock());
    (page, ctrl)
}

fn md(month: u32, day: u32) -> MonthDay {
    MonthDay::new(month, day).unwrap()
}

// =========================================================================
// Initialization and date handling
// =========================================================================

#[tokio::test]
async fn initialize_sets_today_without_fetching() {
    let api = ScriptedApi::default();
    let (page, ctrl) = controller(api.clone());

    ctrl.initialize();

    assert_eq!(page.snapshot().date_input, "2024-03-05");
    assert!(api.calls().is_empty());
    assert_eq!(ctrl.state(), UiState::Idle);
}

#[tokio::test]
async fn empty_date_is_a_noop() {
    let api = ScriptedApi::default();
    let (page, ctrl) = controller(api.clone());

    assert_eq!(ctrl.on_date_change("").await, None);
    assert_eq!(ctrl.on_date_change("   ").await, None);

    assert!(api.calls().is_empty());
    assert!(page.snapshot().loading_history.is_empty());
}

#[tokio::test]
async fn unparseable_date_is_ignored() {
    let api = ScriptedApi::default();
    let (page, ctrl) = controller(api.clone());

    assert_eq!(ctrl.on_date_change("yesterday").await, None);
    assert!(api.calls().is_empty());
    assert_eq!(page.snapshot().date_label, "");
}

#[tokio::test]
async fn date_change_updates_label_and_fetches_once() {
    let api = ScriptedApi::with_replies([Ok(EventsResponse::ok(
        vec![HistoricalEvent::new(1949, "开国大典")],
        "10月1日",
    ))]);
    let (page, ctrl) = controller(api.clone());

    let outcome = ctrl.on_date_change("2023-10-01").await;

    assert_eq!(outcome, Some(FetchOutcome::Loaded(1)));
    assert_eq!(api.calls(), vec![md(10, 1)]);
    let snap = page.snapshot();
    assert_eq!(snap.date_label, "10月1日");
    assert!(snap.events_html.contains("1949年"));
    assert!(snap.events_html.contains("开国大典"));
}

#[tokio::test]
async fn today_click_resets_input_and_fetches_today() {
    let api = ScriptedApi::with_replies([Ok(EventsResponse::ok(Vec::new(), "3月5日"))]);
    let (page, ctrl) = controller(api.clone());
    page.set_date_input("");

    let outcome = ctrl.dispatch(UiEvent::TodayClicked).await;

    assert_eq!(outcome, Some(FetchOutcome::Empty));
    assert_eq!(api.calls(), vec![md(3, 5)]);
    let snap = page.snapshot();
    assert_eq!(snap.date_input, "2024-03-05");
    assert_eq!(snap.date_label, "3月5日");
}

// =========================================================================
// fetch_and_display outcomes
// =========================================================================

#[tokio::test]
async fn title_markup_is_escaped() {
    let api = ScriptedApi::with_replies([Ok(EventsResponse::ok(
        vec![HistoricalEvent::new(2001, "<b>X</b>")],
        "3月5日",
    ))]);
    let (page, ctrl) = controller(api);

    ctrl.fetch_and_display(md(3, 5)).await;

    let html = page.snapshot().events_html;
    assert!(html.contains("&lt;b&gt;X&lt;/b&gt;"));
    assert!(!html.contains("<b>X</b>"));
}

#[tokio::test]
async fn empty_list_renders_empty_state_without_toast() {
    let api = ScriptedApi::with_replies([Ok(EventsResponse::ok(Vec::new(), "3月5日"))]);
    let (page, ctrl) = controller(api);

    let outcome = ctrl.fetch_and_display(md(3, 5)).await;

    assert_eq!(outcome, FetchOutcome::Empty);
    assert_eq!(ctrl.state(), UiState::Empty);
    let snap = page.snapshot();
    assert!(snap.events_html.contains(EMPTY_STATE_MESSAGE));
    assert!(snap.toasts.is_empty());
}

#[tokio::test]
async fn soft_failure_shows_server_message() {
    let api = ScriptedApi::with_replies([Ok(EventsResponse::failure("no data"))]);
    let (page, ctrl) = controller(api);

    let outcome = ctrl.fetch_and_display(md(3, 5)).await;

    assert_eq!(outcome, FetchOutcome::SoftFailure("no data".to_owned()));
    assert_eq!(ctrl.state(), UiState::Error("no data".to_owned()));
    let snap = page.snapshot();
    assert!(snap.toast_visible);
    assert_eq!(snap.toast_message, "no data");
    assert!(snap.events_html.contains(EMPTY_STATE_MESSAGE));
}

#[tokio::test]
async fn soft_failure_without_message_uses_default() {
    let api = ScriptedApi::with_replies([Ok(EventsResponse {
        success: true,
        ..EventsResponse::default()
    })]);
    let (page, ctrl) = controller(api);

    ctrl.fetch_and_display(md(3, 5)).await;

    assert_eq!(page.snapshot().toast_message, DEFAULT_SOFT_FAILURE_MESSAGE);
}

#[tokio::test]
async fn hard_failure_shows_generic_message() {
    let api = ScriptedApi::with_replies([Err(FetchError::Status(500))]);
    let (page, ctrl) = controller(api);

    let outcome = ctrl.fetch_and_display(md(3, 5)).await;

    assert_eq!(outcome, FetchOutcome::HardFailure(FetchError::Status(500)));
    let snap = page.snapshot();
    assert_eq!(snap.toasts, vec![HARD_FAILURE_MESSAGE.to_owned()]);
    assert!(snap.events_html.contains(EMPTY_STATE_MESSAGE));
    assert!(!snap.toast_message.contains("500"));
}

#[tokio::test]
async fn loading_cleared_exactly_once_on_every_path() {
    let replies = [
        Ok(EventsResponse::ok(vec![HistoricalEvent::new(1, "a")], "1月1日")),
        Ok(EventsResponse::ok(Vec::new(), "1月1日")),
        Ok(EventsResponse::failure("nope")),
        Err(FetchError::Decode("eof".to_owned())),
        Err(FetchError::Transport("refused".to_owned())),
    ];

    for reply in replies {
        let api = ScriptedApi::with_replies([reply]);
        let (page, ctrl) = controller(api);

        ctrl.fetch_and_display(md(1, 1)).await;

        let snap = page.snapshot();
        assert_eq!(snap.loading_history, vec![true, false]);
        assert!(!snap.loading);
        assert_eq!(snap.renders, 1);
    }
}

#[tokio::test]
async fn controller_stays_usable_after_failure() {
    let api = ScriptedApi::with_replies([
        Err(FetchError::Status(502)),
        Ok(EventsResponse::ok(vec![HistoricalEvent::new(1969, "Apollo 11")], "7月20日")),
    ]);
    let (page, ctrl) = controller(api);

    ctrl.on_date_change("2024-07-20").await;
    let outcome = ctrl.on_date_change("2024-07-20").await;

    assert_eq!(outcome, Some(FetchOutcome::Loaded(1)));
    assert!(page.snapshot().events_html.contains("Apollo 11"));
}

// =========================================================================
// Overlapping requests
// =========================================================================

#[tokio::test]
async fn stale_response_is_discarded() {
    let api = GatedApi::default();
    let first = api.gate(1, Ok(EventsResponse::ok(vec![HistoricalEvent::new(1, "old")], "3月1日")));
    let second = api.gate(2, Ok(EventsResponse::ok(vec![HistoricalEvent::new(2, "new")], "3月2日")));
    let (page, ctrl) = controller(api);
    let ctrl = Arc::new(ctrl);

    let slow = tokio::spawn({
        let ctrl = Arc::clone(&ctrl);
        async move { ctrl.fetch_and_display(md(3, 1)).await }
    });
    first.started.notified().await;

    let fast = tokio::spawn({
        let ctrl = Arc::clone(&ctrl);
        async move { ctrl.fetch_and_display(md(3, 2)).await }
    });
    second.started.notified().await;

    second.release.notify_one();
    assert_eq!(fast.await.unwrap(), FetchOutcome::Loaded(1));
    assert!(!page.snapshot().loading, "newest request has resolved");
    assert!(matches!(ctrl.state(), UiState::Loaded(_)));

    first.release.notify_one();
    assert_eq!(slow.await.unwrap(), FetchOutcome::Superseded);

    let snap = page.snapshot();
    assert!(snap.events_html.contains("new"));
    assert!(!snap.events_html.contains("old"));
    assert_eq!(snap.loading_history, vec![true, false]);
    assert_eq!(snap.renders, 1);
}

#[tokio::test]
async fn superseded_response_keeps_loading_for_newest() {
    let api = GatedApi::default();
    let first = api.gate(1, Ok(EventsResponse::ok(vec![HistoricalEvent::new(1, "old")], "3月1日")));
    let second = api.gate(2, Err(FetchError::Status(503)));
    let (page, ctrl) = controller(api);
    let ctrl = Arc::new(ctrl);

    let slow = tokio::spawn({
        let ctrl = Arc::clone(&ctrl);
        async move { ctrl.fetch_and_display(md(3, 1)).await }
    });
    first.started.notified().await;
    let fast = tokio::spawn({
        let ctrl = Arc::clone(&ctrl);
        async move { ctrl.fetch_and_display(md(3, 2)).await }
    });
    second.started.notified().await;

    first.release.notify_one();
    assert_eq!(slow.await.unwrap(), FetchOutcome::Superseded);
    let snap = page.snapshot();
    assert!(snap.loading, "newest request still in flight");
    assert_eq!(snap.renders, 0);
    assert!(snap.toasts.is_empty());

    second.release.notify_one();
    assert_eq!(
        fast.await.unwrap(),
        FetchOutcome::HardFailure(FetchError::Status(503))
    );
    let snap = page.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.loading_history, vec![true, false]);
    assert_eq!(snap.toasts, vec![HARD_FAILURE_MESSAGE.to_owned()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn listener_shows_the_last_queued_date() {
    let api = EchoApi::default();
    let (page, ctrl) = controller(api.clone());
    let ctrl = Arc::new(ctrl);

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(UiEvent::DateChanged("2024-03-01".to_owned())).unwrap();
    tx.send(UiEvent::DateChanged("2024-03-02".to_owned())).unwrap();
    drop(tx);
    Arc::clone(&ctrl).listen(rx).await.unwrap();

    for _ in 0..200 {
        let done = api.calls.lock().unwrap().len() == 2 && !page.snapshot().loading;
        if done && page.snapshot().renders > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    let snap = page.snapshot();
    assert_eq!(snap.date_label, "3月2日");
    assert!(snap.events_html.contains("day 2"));
    assert!(!snap.events_html.contains("day 1"));
    assert!(!snap.loading);
}

#[test]
fn toast_outside_a_runtime_stays_visible() {
    let (page, ctrl) = controller(ScriptedApi::default());

    ctrl.show_error_toast("offline");

    let snap = page.snapshot();
    assert!(snap.toast_visible);
    assert_eq!(snap.toast_message, "offline");
}

#[tokio::test]
async fn listener_handles_forwarded_events() {
    let api = ScriptedApi::with_replies([Ok(EventsResponse::ok(
        vec![HistoricalEvent::new(1911, "辛亥革命")],
        "10月10日",
    ))]);
    let (page, ctrl) = controller(api.clone());
    let ctrl = Arc::new(ctrl);

    let (tx, rx) = mpsc::unbounded_channel();
    let listener = Arc::clone(&ctrl).listen(rx);
    tx.send(UiEvent::DateChanged("2024-10-10".to_owned())).unwrap();
    drop(tx);
    listener.await.unwrap();

    for _ in 0..100 {
        if page.snapshot().renders > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(api.calls(), vec![md(10, 10)]);
    let snap = page.snapshot();
    assert_eq!(snap.date_input, "2024-03-05", "listen seeds the input");
    assert!(snap.events_html.contains("辛亥革命"));
}

// =========================================================================
// Toast timing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn toast_dismisses_after_three_seconds() {
    let (page, ctrl) = controller(ScriptedApi::default());

    ctrl.show_error_toast("boom");
    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(page.snapshot().toast_visible);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!page.snapshot().toast_visible);
}

#[tokio::test(start_paused = true)]
async fn newer_toast_restarts_the_window() {
    let (page, ctrl) = controller(ScriptedApi::default());

    ctrl.show_error_toast("first");
    tokio::time::sleep(Duration::from_secs(2)).await;
    ctrl.show_error_toast("second");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let snap = page.snapshot();
    assert!(snap.toast_visible, "first timer must not hide the second toast");
    assert_eq!(snap.toast_message, "second");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!page.snapshot().toast_visible);
}

#[tokio::test(start_paused = true)]
async fn toast_duration_is_configurable() {
    let page = Arc::new(PageModel::new());
    let ctrl = EventsViewController::new(Arc::clone(&page), ScriptedApi::default(), clock())
        .with_toast_duration(Duration::from_millis(500));

    ctrl.show_error_toast("quick");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!page.snapshot().toast_visible);
}
