//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state
//! ([`crate::app`]) and input handling ([`crate::input`]).  Layout per
//! frame: an optional breaking banner, an optional stale-data warning line,
//! the scrollable list, and a one-line status bar.
//!
//! Three whole-page states replace the list: first load in progress, load
//! failed with nothing to show (with a retry hint), and the regular list —
//! which itself distinguishes "filter matched nothing" from "nothing
//! fetched".

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};
use crate::fetch::Page;
use crate::filter::CategoryFilter;
use crate::source::item::{Category, NewsItem};

/// Badge colors per category; unmapped categories get the neutral style.
fn category_color(category: &Category) -> Color {
    match category {
        Category::Politics => Color::Red,
        Category::Economy => Color::Blue,
        Category::Environment => Color::Green,
        Category::Science => Color::Magenta,
        Category::Sports => Color::Yellow,
        Category::Technology | Category::Health | Category::General | Category::Other(_) => {
            Color::DarkGray
        }
    }
}

/// Relative Arabic timestamp, matching the original formatter: absolute
/// date past 24 hours, then "منذ س ساعة" / "منذ د دقيقة" / "الآن".
fn format_relative(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = ts else {
        return "—".to_string();
    };
    let diff = now.signed_duration_since(ts);
    let hours = diff.num_hours();
    let minutes = diff.num_minutes();
    if hours > 24 {
        ts.format("%Y-%m-%d %H:%M").to_string()
    } else if hours > 0 {
        format!("منذ {hours} ساعة")
    } else if minutes > 0 {
        format!("منذ {minutes} دقيقة")
    } else {
        "الآن".to_string()
    }
}

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    match app.page {
        Page::Breaking => draw_breaking_page(app, frame),
        Page::Lebanon => draw_lebanon_page(app, frame),
    }
}

fn draw_breaking_page(app: &mut App, frame: &mut Frame) {
    let state = app.breaking.state();
    let empty = state.data.is_empty();

    if state.is_loading && empty {
        draw_full_page(frame, "جاري تحميل الأخبار العاجلة...", Color::Yellow);
        return;
    }
    if let (Some(error), true) = (&state.error, empty) {
        draw_error_page(frame, error);
        return;
    }

    let banner = !app.banner_items().is_empty();
    let warning = state.error.is_some();
    let [banner_area, warning_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(if banner { 3 } else { 0 }),
        Constraint::Length(if warning { 1 } else { 0 }),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    if banner {
        draw_banner(app, frame, banner_area);
    }
    if warning {
        draw_stale_warning(app, frame, warning_area);
    }
    draw_breaking_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

fn draw_lebanon_page(app: &mut App, frame: &mut Frame) {
    let state = app.lebanon.state();
    let empty = state.data.is_empty();

    if state.is_loading && empty {
        draw_full_page(frame, "جاري تحميل عناوين الصحف اللبنانية...", Color::Yellow);
        return;
    }
    if let (Some(error), true) = (&state.error, empty) {
        draw_error_page(frame, error);
        return;
    }

    let warning = state.error.is_some();
    let [warning_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(if warning { 1 } else { 0 }),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    if warning {
        draw_stale_warning(app, frame, warning_area);
    }
    draw_lebanon_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

// -- whole-page states -------------------------------------------------------

fn draw_full_page(frame: &mut Frame, message: &str, color: Color) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default().fg(color),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, frame.area());
}

fn draw_error_page(frame: &mut Frame, error: &str) {
    let lines = vec![
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            "اضغط r لإعادة المحاولة",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" خطأ ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(paragraph, frame.area());
}

// -- breaking page pieces ----------------------------------------------------

fn draw_banner(app: &App, frame: &mut Frame, area: Rect) {
    let items = app.banner_items();
    if items.is_empty() {
        return;
    }
    let item = &items[app.banner_index % items.len()];
    let line = Line::from(vec![
        Span::styled(
            " عاجل ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(&item.title, Style::default().add_modifier(Modifier::BOLD)),
    ]);
    let banner = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(banner, area);
}

fn draw_stale_warning(app: &App, frame: &mut Frame, area: Rect) {
    let error = match app.page {
        Page::Breaking => app.breaking.state().error.as_deref(),
        Page::Lebanon => app.lebanon.state().error.as_deref(),
    }
    .unwrap_or_default();
    let warning = Paragraph::new(Line::from(Span::styled(
        format!(" تحذير: {error} — البيانات المعروضة قديمة"),
        Style::default().fg(Color::Yellow),
    )));
    frame.render_widget(warning, area);
}

fn news_line<'a>(item: &'a NewsItem, now: DateTime<Utc>) -> Line<'a> {
    let mut spans = vec![
        Span::styled(
            format!("{:<16}", format_relative(item.published_at, now)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", item.category.as_arabic()),
            Style::default().fg(category_color(&item.category)),
        ),
        Span::raw(" "),
    ];
    if item.is_breaking {
        spans.push(Span::styled(
            "عاجل ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        &item.title,
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("[{}]", item.source),
        Style::default().fg(Color::Cyan),
    ));
    Line::from(spans)
}

fn draw_breaking_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let now = Utc::now();
    let visible = app.visible_items();
    let total = app.breaking.state().data.len();

    if visible.is_empty() {
        // Distinguish "filter matched nothing" from "nothing fetched".
        let message = if total > 0 {
            "لا توجد أخبار تطابق البحث"
        } else {
            "لا توجد أخبار متاحة حالياً"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )))
        .block(breaking_block(visible.len(), total));
        frame.render_widget(paragraph, area);
        return;
    }

    let list_items: Vec<ListItem> = visible
        .iter()
        .map(|item| ListItem::new(news_line(item, now)))
        .collect();
    let list = List::new(list_items)
        .block(breaking_block(visible.len(), total))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn breaking_block(shown: usize, total: usize) -> Block<'static> {
    Block::default()
        .title(format!(" الأخبار العاجلة — عرض {shown} من {total} "))
        .borders(Borders::ALL)
}

// -- lebanon page pieces -----------------------------------------------------

fn draw_lebanon_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let now = Utc::now();
    let newspapers = &app.lebanon.state().data;

    if newspapers.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "لا توجد صحف متاحة حالياً",
            Style::default().fg(Color::DarkGray),
        )))
        .block(lebanon_block(0, 0));
        frame.render_widget(paragraph, area);
        return;
    }

    // Row layout must match App::row_count: header, then headlines or one
    // placeholder row.
    let mut rows: Vec<ListItem> = Vec::new();
    for (name, group) in &newspapers.0 {
        let mut header = vec![Span::styled(
            name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        header.push(Span::styled(
            format!("  {} عنوان", group.count.max(group.headlines.len())),
            Style::default().fg(Color::Green),
        ));
        if let Some(website) = &group.website {
            header.push(Span::styled(
                format!("  {website}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        rows.push(ListItem::new(Line::from(header)));

        if group.headlines.is_empty() {
            rows.push(ListItem::new(Line::from(Span::styled(
                "  لا توجد عناوين متاحة حالياً",
                Style::default().fg(Color::DarkGray),
            ))));
        } else {
            for headline in &group.headlines {
                rows.push(ListItem::new(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<16}", format_relative(headline.published_at, now)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(" "),
                    Span::styled(headline.title.clone(), Style::default().fg(Color::White)),
                ])));
            }
        }
    }

    let total = newspapers.headline_count();
    let list = List::new(rows)
        .block(lebanon_block(newspapers.0.len(), total))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn lebanon_block(newspapers: usize, headlines: usize) -> Block<'static> {
    Block::default()
        .title(format!(
            " عناوين الصحف اللبنانية — {headlines} عنوان من {newspapers} صحيفة "
        ))
        .borders(Borders::ALL)
}

// -- status bar --------------------------------------------------------------

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];

    if app.input_mode == InputMode::Search {
        spans.push(Span::styled(
            format!("بحث: {}▌", app.criteria.search_term),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some((toast, _)) = &app.toast {
        spans.push(Span::styled(
            toast.clone(),
            Style::default().fg(Color::Green),
        ));
    } else {
        let (refreshing, last_updated) = match app.page {
            Page::Breaking => {
                let s = app.breaking.state();
                (s.is_refreshing, s.last_updated)
            }
            Page::Lebanon => {
                let s = app.lebanon.state();
                (s.is_refreshing, s.last_updated)
            }
        };
        if refreshing {
            spans.push(Span::styled(
                "جاري التحديث...",
                Style::default().fg(Color::Yellow),
            ));
        } else {
            spans.push(Span::styled(
                format!("آخر تحديث: {}", format_relative(last_updated, Utc::now())),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    if app.page == Page::Breaking {
        if !app.criteria.search_term.is_empty()
            || app.criteria.category != CategoryFilter::All
        {
            spans.push(Span::styled(
                format!("  تصنيف: {}", app.criteria.category.label()),
                Style::default().fg(Color::Magenta),
            ));
        }
    }

    spans.push(Span::raw(
        "  q: خروج  Tab: تبديل  r: تحديث  /: بحث  c: تصنيف  ↑/↓: تنقل",
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FetchOp, Fetched};
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::mpsc;

    fn make_item(title: &str, category: &str, breaking: bool) -> NewsItem {
        NewsItem {
            id: title.to_string(),
            title: title.to_string(),
            description: String::new(),
            source: "الجزيرة".to_string(),
            category: Category::from(category),
            published_at: Some(Utc::now()),
            is_breaking: breaking,
            url: None,
            image_url: None,
        }
    }

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| if c.symbol().is_empty() { " " } else { c.symbol() })
            .collect()
    }

    fn fresh_app() -> App {
        // The receiver is dropped; App tolerates a closed request channel.
        let (tx, _rx) = mpsc::channel();
        App::new(tx)
    }

    #[test]
    fn loading_view_when_first_load_in_flight() {
        let mut app = fresh_app();
        app.breaking.begin(FetchOp::Load);
        let text = render(&mut app);
        assert!(text.contains("جاري تحميل الأخبار العاجلة"));
    }

    #[test]
    fn error_view_with_retry_hint_when_no_data() {
        let mut app = fresh_app();
        let token = app.breaking.begin(FetchOp::Load);
        app.breaking
            .apply(token, Err("فشل في جلب الأخبار العاجلة: تعذر الاتصال بالخادم".to_string()));
        let text = render(&mut app);
        assert!(text.contains("فشل في جلب الأخبار العاجلة"));
        assert!(text.contains("اضغط r لإعادة المحاولة"));
    }

    #[test]
    fn stale_warning_shown_alongside_existing_data() {
        let mut app = fresh_app();
        let t1 = app.breaking.begin(FetchOp::Load);
        app.breaking.apply(
            t1,
            Ok(Fetched {
                data: vec![make_item("خبر قديم", "عام", false)],
                count: 1,
                last_updated: None,
            }),
        );
        let t2 = app.breaking.begin(FetchOp::Refresh);
        app.breaking
            .apply(t2, Err("فشل في تحديث الأخبار: تعذر الاتصال بالخادم".to_string()));

        let text = render(&mut app);
        assert!(text.contains("تحذير"), "inline warning is present");
        assert!(text.contains("خبر قديم"), "stale data stays on screen");
    }

    #[test]
    fn list_shows_counts_and_banner_for_breaking_items() {
        let mut app = fresh_app();
        let token = app.breaking.begin(FetchOp::Load);
        app.breaking.apply(
            token,
            Ok(Fetched {
                data: vec![
                    make_item("عاجل: حدث كبير", "سياسة", true),
                    make_item("خبر عادي", "اقتصاد", false),
                ],
                count: 2,
                last_updated: None,
            }),
        );
        let text = render(&mut app);
        assert!(text.contains("عرض 2 من 2"));
        assert!(text.contains("عاجل"));
        assert!(text.contains("حدث كبير"));
    }

    #[test]
    fn filtered_to_nothing_differs_from_nothing_fetched() {
        let mut app = fresh_app();
        let token = app.breaking.begin(FetchOp::Load);
        app.breaking.apply(
            token,
            Ok(Fetched {
                data: vec![make_item("خبر", "عام", false)],
                count: 1,
                last_updated: None,
            }),
        );
        app.criteria.search_term = "zzz".to_string();
        let filtered = render(&mut app);
        assert!(filtered.contains("لا توجد أخبار تطابق البحث"));

        let mut empty_app = fresh_app();
        let text = render(&mut empty_app);
        assert!(text.contains("لا توجد أخبار متاحة حالياً"));
    }

    #[test]
    fn lebanon_page_groups_headlines_under_newspapers() {
        let mut app = fresh_app();
        app.switch_page();
        let token = app.lebanon.begin(FetchOp::Load);
        let json = serde_json::json!({
            "النهار": {"count": 1, "website": "https://www.annahar.com",
                        "headlines": [{"title": "عنوان سياسي"}]},
            "الديار": {"count": 0, "headlines": []}
        });
        let newspapers: crate::source::Newspapers = serde_json::from_value(json).unwrap();
        app.lebanon.apply(
            token,
            Ok(Fetched {
                data: newspapers,
                count: 1,
                last_updated: None,
            }),
        );
        let text = render(&mut app);
        assert!(text.contains("النهار"));
        assert!(text.contains("عنوان سياسي"));
        assert!(text.contains("لا توجد عناوين متاحة حالياً"));
    }

    #[test]
    fn search_mode_shows_the_term_in_the_status_bar() {
        let mut app = fresh_app();
        app.input_mode = InputMode::Search;
        app.criteria.search_term = "اتفاقية".to_string();
        let text = render(&mut app);
        assert!(text.contains("بحث"));
    }

    #[test]
    fn format_relative_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 1, 27, 12, 0, 0).unwrap();
        assert_eq!(format_relative(Some(now), now), "الآن");
        assert_eq!(
            format_relative(Some(now - chrono::Duration::minutes(5)), now),
            "منذ 5 دقيقة"
        );
        assert_eq!(
            format_relative(Some(now - chrono::Duration::hours(3)), now),
            "منذ 3 ساعة"
        );
        assert_eq!(
            format_relative(Some(now - chrono::Duration::days(2)), now),
            "2025-01-25 12:00"
        );
        assert_eq!(format_relative(None, now), "—");
    }
}
