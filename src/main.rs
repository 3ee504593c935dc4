//! nashra — Arabic breaking news and Lebanese newspaper headlines in the
//! terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ FetchRequest ┌──────────┐    Msg     ┌──────────┐
//! │  app.rs  │ ───────────► │ fetch.rs │ ─────────► │  main.rs │
//! │ (state)  │              │ (worker) │  (channel) │  (loop)  │
//! └──────────┘              └──────────┘            └──────────┘
//!      ▲                                                 │
//!      │ handle_key_event() / on_msg()                   │ draw()
//! ┌──────────┐            ┌──────────┐              ┌──────────┐
//! │ input.rs │            │ sched.rs │ ──Msg::Tick─►│  ui.rs   │
//! └──────────┘            │ (timers) │              │ (render) │
//!                         └──────────┘              └──────────┘
//! ```
//!
//! * **`source/`** — the `NewsBackend` trait, wire types, and the HTTP
//!   client for the backend API.
//! * **`store`** — fetch-state bookkeeping with token-fenced responses.
//! * **`filter`** — search-term and category filtering.
//! * **`fetch`** — background worker performing the blocking HTTP calls.
//! * **`sched`** — per-page auto-refresh timers with owned stop handles.
//! * **`proxy`** — the RSS-to-JSON proxy function (`nashra proxy <url>`).
//! * **`app`** / **`ui`** / **`input`** — state, rendering, keys.

mod app;
mod fetch;
mod filter;
mod input;
mod logging;
mod proxy;
mod sched;
mod source;
mod store;
mod ui;

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use fetch::Page;
use sched::Scheduler;
use source::HttpNewsApi;
use store::FetchOp;

/// Auto-refresh cadences, fixed at deployment time.
const BREAKING_REFRESH: Duration = Duration::from_secs(300);
const LEBANON_REFRESH: Duration = Duration::from_secs(600);

/// How often the breaking banner rotates to the next item.
const BANNER_ROTATE: Duration = Duration::from_secs(5);

const DEFAULT_API: &str = "http://localhost:8000/api";

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.  This prevents the common TUI bug where a panic leaves the
/// terminal in a broken state.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.  Without this, a panic inside the event loop would leave
/// raw mode enabled and the alternate screen active.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let first = args.next();
    match first.as_deref() {
        Some("proxy") => run_proxy(args.next()),
        Some("search") => run_search(args.next().unwrap_or_default(), args.next()),
        _ => run_tui(first),
    }
}

fn api_base(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var("NASHRA_API").ok())
        .unwrap_or_else(|| DEFAULT_API.to_string())
}

/// One-shot run of the RSS proxy function against a feed URL.
fn run_proxy(url: Option<String>) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let resp = proxy::handle(url.as_deref(), &client);
    println!("{}", resp.body);
    if resp.status != 200 {
        anyhow::bail!("proxy returned status {}", resp.status);
    }
    Ok(())
}

/// One-shot server-side search, printing the raw results.
fn run_search(query: String, category: Option<String>) -> Result<()> {
    let api = HttpNewsApi::new(api_base(None))?;
    let resp = api.search(&query, category.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn run_tui(base_arg: Option<String>) -> Result<()> {
    install_panic_hook();

    let api = HttpNewsApi::new(api_base(base_arg))?;

    // -- background workers --------------------------------------------------
    let (req_tx, req_rx) = mpsc::channel();
    let (msg_tx, msg_rx) = mpsc::channel();
    let _worker = fetch::spawn(Box::new(api), req_rx, msg_tx.clone());
    let _breaking_sched = Scheduler::start(BREAKING_REFRESH, msg_tx.clone(), Page::Breaking);
    let _lebanon_sched = Scheduler::start(LEBANON_REFRESH, msg_tx, Page::Lebanon);

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(req_tx);

    // Initial loads for both pages.
    app.trigger(Page::Breaking, FetchOp::Load, false);
    app.trigger(Page::Lebanon, FetchOp::Load, false);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain worker outcomes and scheduler ticks.
    //   2. Expire the toast and rotate the banner.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);
    let mut last_rotate = Instant::now();

    loop {
        while let Ok(msg) = msg_rx.try_recv() {
            app.on_msg(msg);
        }

        app.expire_toast(Instant::now());
        if last_rotate.elapsed() >= BANNER_ROTATE {
            app.advance_banner();
            last_rotate = Instant::now();
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // Schedulers stop via Drop; dropping `app` closes the request channel so
    // the worker winds down.  A fetch still in flight is not aborted — its
    // outcome lands on a closed channel and is discarded.
    Ok(())
}
