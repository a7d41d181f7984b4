//! HTML rendering for the events container.
//!
//! Everything that comes from the API as free text (`title`, `desc`) goes
//! through [`escape_html`] before it touches markup. The year is formatted
//! from an integer and never interpolated as text.

use onthisday_types::HistoricalEvent;

/// Placeholder text shown when a date has no events.
pub const EMPTY_STATE_MESSAGE: &str = "该日期暂无历史事件记录";

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render one card per event, in the order given.
///
/// An empty slice renders the empty state.
pub fn render_events(events: &[HistoricalEvent]) -> String {
    if events.is_empty() {
        return render_empty_state();
    }
    events.iter().map(render_card).collect()
}

/// The fixed "no events for this date" placeholder.
pub fn render_empty_state() -> String {
    format!(
        r#"<div class="empty-state"><i class="fas fa-search"></i><p>{EMPTY_STATE_MESSAGE}</p></div>"#
    )
}

fn render_card(event: &HistoricalEvent) -> String {
    let year = event.year;
    let title = escape_html(&event.title);
    let desc = event
        .description()
        .map(|d| format!(r#"<p class="event-desc">{}</p>"#, escape_html(d)))
        .unwrap_or_default();

    format!(
        r#"<div class="event-card"><div class="event-year">{year}年</div><div class="event-content"><h3 class="event-title">{title}</h3>{desc}</div></div>"#
    )
}
