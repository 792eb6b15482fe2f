use crate::app::{update, AppMsg, Effect};
use crate::dom::parse_fragment;
use crate::model::{load_config, AppConfig, ItemAction};
use crate::page::PageContext;
use crate::services::crud::{CrudClient, DeleteOutcome, ItemFormFetch, SubmitOutcome};
use crate::services::csrf::CookieTokenProvider;
use crate::services::envelope::Decoded;
use crate::services::transport::{cookie_jar, HttpTransport};
use crate::widgets::banner::draw_banner;
use crate::widgets::carousel::Carousel;
use crate::widgets::chrome::{centered_rect, panel_block};
use crate::widgets::modal::ModalSession;
use crate::widgets::status_bar::draw_footer_combined;
use anyhow::{bail, Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(200);
const DEBUG_PANE_H: u16 = 8;
const IN_FLIGHT: &str = "Still saving, please wait";

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::FetchCreate { url } => {
                state.dbg(format!("fetch create form {url}"));
                tracing::info!(%url, "fetching create form");
                if let (Some(client), Some(tx)) = (state.client.clone(), state.tx.clone()) {
                    crate::services::loader::spawn_fetch_create(client, url, tx);
                } else {
                    offline(state);
                }
            }
            Effect::FetchItemForm { url } => {
                state.dbg(format!("fetch item form {url}"));
                tracing::info!(%url, "fetching item form");
                if let (Some(client), Some(tx)) = (state.client.clone(), state.tx.clone()) {
                    crate::services::loader::spawn_fetch_item_form(client, url, tx);
                } else {
                    offline(state);
                }
            }
            Effect::SubmitForm { action, fields } => {
                if state.submitting {
                    state.dbg("submission already in flight, ignored");
                    show_toast(state, IN_FLIGHT, ToastLevel::Info);
                    continue;
                }
                let action = action.unwrap_or_else(|| state.page.page_path.clone());
                state.dbg(format!("submit form -> {action}"));
                tracing::info!(%action, fields = fields.len(), "submitting form");
                if let (Some(client), Some(tx)) = (state.client.clone(), state.tx.clone()) {
                    state.submitting = true;
                    state.status_text = Some("Saving…".into());
                    crate::services::loader::spawn_submit_form(client, action, fields, tx);
                } else {
                    offline(state);
                }
            }
            Effect::SubmitDelete { action, fields } => {
                if state.submitting {
                    state.dbg("submission already in flight, ignored");
                    show_toast(state, IN_FLIGHT, ToastLevel::Info);
                    continue;
                }
                let action = action.unwrap_or_else(|| state.page.page_path.clone());
                state.dbg(format!("submit delete -> {action}"));
                tracing::info!(%action, "submitting delete");
                if let (Some(client), Some(tx)) = (state.client.clone(), state.tx.clone()) {
                    state.submitting = true;
                    state.status_text = Some("Deleting…".into());
                    crate::services::loader::spawn_submit_delete(client, action, fields, tx);
                } else {
                    offline(state);
                }
            }
            Effect::CloseModal => {
                state.dbg("modal closed");
                state.modal.close();
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
        }
    }
}

fn show_toast(state: &mut AppState, text: &str, level: ToastLevel) {
    run_effects(
        state,
        vec![Effect::ShowToast {
            text: text.to_string(),
            level,
            seconds: 3,
        }],
    );
}

fn offline(state: &mut AppState) {
    state.dbg("no client, request dropped");
    show_toast(state, "Not connected to the server", ToastLevel::Error);
}

#[derive(Default)]
pub struct AppState {
    pub config: AppConfig,
    pub page: PageContext,
    pub modal: ModalSession,
    pub carousel: Carousel,
    pub selected: usize,
    // Row touched by the last create/update
    pub fresh: Option<usize>,
    pub alert: Option<String>,
    pub toast: Option<Toast>,
    pub status_text: Option<String>,
    pub tick: u64,
    pub submitting: bool,
    pub show_debug: bool,
    pub(crate) debug_log: VecDeque<String>,
    pub(crate) client: Option<CrudClient>,
    pub(crate) tx: Option<Sender<LoadMsg>>,
    pub(crate) rx: Option<Receiver<LoadMsg>>,
}

impl AppState {
    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub(crate) enum LoadOutcome {
    CreateForm(Decoded),
    ItemForm(ItemFormFetch),
    Submitted(SubmitOutcome),
    Deleted(DeleteOutcome),
}

pub(crate) struct LoadMsg {
    pub(crate) key: String,
    pub(crate) outcome: Result<LoadOutcome, String>,
    pub(crate) kind: LoadKind,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum LoadKind {
    CreateForm,
    ItemForm,
    Submit,
    Delete,
}

fn unexpected<T>(kind: LoadKind) -> Result<T, String> {
    Err(format!("unexpected outcome for {kind:?}"))
}

fn to_app_msg(msg: LoadMsg) -> AppMsg {
    let LoadMsg { key, outcome, kind } = msg;
    match kind {
        LoadKind::CreateForm => AppMsg::CreateFormLoaded(outcome.and_then(|o| match o {
            LoadOutcome::CreateForm(d) => Ok(d),
            _ => unexpected(kind),
        })),
        LoadKind::ItemForm => AppMsg::ItemFormLoaded {
            url: key,
            outcome: outcome.and_then(|o| match o {
                LoadOutcome::ItemForm(f) => Ok(f),
                _ => unexpected(kind),
            }),
        },
        LoadKind::Submit => AppMsg::FormSubmitted(outcome.and_then(|o| match o {
            LoadOutcome::Submitted(s) => Ok(s),
            _ => unexpected(kind),
        })),
        LoadKind::Delete => AppMsg::DeleteSubmitted(outcome.and_then(|o| match o {
            LoadOutcome::Deleted(d) => Ok(d),
            _ => unexpected(kind),
        })),
    }
}

// Apply worker results strictly in arrival order.
fn pump(state: &mut AppState) {
    let mut drained_msgs: Vec<LoadMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained_msgs.push(msg);
        }
    }
    for msg in drained_msgs {
        state.dbg(format!("loaded {:?} {}", msg.kind, msg.key));
        let effects = update(state, to_app_msg(msg));
        run_effects(state, effects);
    }
}

fn on_tick(state: &mut AppState) {
    state.tick = state.tick.wrapping_add(1);
    if state.carousel.tick(Instant::now()) {
        state.dbg(format!(
            "carousel -> {} ({}%)",
            state.carousel.index(),
            state.carousel.offset_percent()
        ));
    }
}

/// Loads the list page and wires the HTTP client around one cookie jar.
fn bootstrap(cfg: &AppConfig) -> Result<(CrudClient, PageContext)> {
    let list_url = cfg.list_url()?;
    let session = cfg
        .session_cookie
        .as_deref()
        .map(|v| (cfg.session_cookie_name.as_str(), v));
    let jar = cookie_jar(&list_url, session);
    let transport = HttpTransport::new(list_url.clone(), jar.clone(), cfg.request_timeout())?;
    let tokens = CookieTokenProvider::new(jar, list_url.clone(), cfg.csrf_cookie.clone());
    let client = CrudClient::new(Arc::new(transport), Arc::new(tokens));
    let res = client
        .fetch_page(list_url.as_str())
        .with_context(|| format!("loading list page {list_url}"))?;
    if !res.is_success() {
        bail!("loading list page {list_url}: HTTP {}", res.status);
    }
    let page = PageContext::from_nodes(parse_fragment(&res.body), list_url.path())
        .with_context(|| format!("reading list page {list_url}"))?;
    tracing::info!(items = page.list.len(), slides = page.slides.len(), "page loaded");
    Ok((client, page))
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    crate::logging::init(&cfg.log_path())?;
    let headless = env_flag("HIKELOG_HEADLESS");
    let headless_ticks: u64 = std::env::var("HIKELOG_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let headless_create = env_flag("HIKELOG_HEADLESS_CREATE");

    let (client, page) = match bootstrap(&cfg) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "bootstrap failed");
            if headless {
                println!("{}", serde_json::json!({ "ok": false, "error": format!("{e:#}") }));
            }
            return Err(e);
        }
    };
    let (tx, rx) = mpsc::channel::<LoadMsg>();
    let mut state = AppState {
        carousel: Carousel::new(page.slides.len(), cfg.carousel_interval()),
        config: cfg,
        page,
        client: Some(client),
        tx: Some(tx),
        rx: Some(rx),
        ..Default::default()
    };
    state.dbg(format!("page loaded: {} items", state.page.list.len()));

    if headless {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend)?;
        let mut last_tick = Instant::now();
        if headless_create {
            let effs = update(&mut state, AppMsg::CreateRequested);
            run_effects(&mut state, effs);
        }
        for _ in 0..headless_ticks {
            terminal.draw(|f| ui(f, &mut state))?;
            pump(&mut state);
            if last_tick.elapsed() >= TICK_RATE {
                on_tick(&mut state);
                last_tick = Instant::now();
            }
            std::thread::sleep(TICK_RATE);
        }
        let summary = serde_json::json!({
            "ok": state.alert.is_none(),
            "items": state.page.list.len(),
            "empty_visible": state.page.empty_visible(),
            "modal_open": state.modal.is_open(),
        });
        println!("{summary}");
        return Ok(());
    }

    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut last_tick = Instant::now();
    let res: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &mut state)) {
            break Err(e.into());
        }
        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut state, key) {
                        break Ok(());
                    }
                }
                Ok(Event::Mouse(ev)) => handle_mouse(&mut state, ev),
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        pump(&mut state);
        if last_tick.elapsed() >= TICK_RATE {
            on_tick(&mut state);
            last_tick = Instant::now();
        }
    };
    // Restore
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    res
}

/// Returns true when the app should quit.
pub(crate) fn handle_key(state: &mut AppState, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    if key.code == KeyCode::F(12) {
        state.show_debug = !state.show_debug;
        return false;
    }
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            let effs = update(state, AppMsg::AlertDismissed);
            run_effects(state, effs);
        }
        return false;
    }
    if state.modal.is_open() {
        let effs = state.modal.on_key(key);
        run_effects(state, effs);
        return false;
    }
    let msg = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.page.list.len() {
                state.selected += 1;
            }
            None
        }
        KeyCode::Char('n') | KeyCode::Char('+') => Some(AppMsg::CreateRequested),
        KeyCode::Char('e') | KeyCode::Enter => item_action(state, ItemAction::Edit),
        KeyCode::Char('d') | KeyCode::Delete => item_action(state, ItemAction::Delete),
        _ => None,
    };
    if let Some(msg) = msg {
        let effs = update(state, msg);
        run_effects(state, effs);
    }
    false
}

fn item_action(state: &mut AppState, action: ItemAction) -> Option<AppMsg> {
    match state
        .page
        .list
        .get(state.selected)
        .and_then(|it| it.action_target(action))
    {
        Some(id) => Some(AppMsg::ItemActionRequested { id, action }),
        None => {
            let text = format!("Nothing to {} here", action.as_str());
            show_toast(state, &text, ToastLevel::Info);
            None
        }
    }
}

pub(crate) fn handle_mouse(state: &mut AppState, ev: MouseEvent) {
    if state.alert.is_none() && state.modal.is_open() {
        let effs = state.modal.on_mouse(ev);
        run_effects(state, effs);
    }
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }
    let screen = f.area();
    let debug_h = if state.show_debug { DEBUG_PANE_H } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(debug_h),
            Constraint::Length(1),
        ])
        .split(screen);

    draw_banner(f, chunks[0], state);
    draw_list(f, chunks[1], state);
    if state.show_debug {
        draw_debug(f, chunks[2], state);
    }
    let help_text = help_text(state);
    draw_footer_combined(f, chunks[3], state, &help_text);

    if state.modal.is_open() {
        let tick = state.tick;
        state.modal.render(f, screen, tick);
    }
    if let Some(text) = state.alert.clone() {
        draw_alert(f, screen, &text);
    }
}

fn help_text(state: &AppState) -> String {
    if state.alert.is_some() {
        return "Enter/Esc dismiss".into();
    }
    if let Some(view) = state.modal.view() {
        return if view.close_label.is_some() {
            "↑/↓ scroll  Enter/Esc close".into()
        } else {
            "↑/↓ scroll  Esc close".into()
        };
    }
    if state.modal.is_open() {
        return "Tab next  Ctrl+S submit  Esc close".into();
    }
    let create = state
        .page
        .cta_label
        .clone()
        .or_else(|| state.page.fab_label.clone())
        .unwrap_or_else(|| "new".into());
    format!("↑/↓ select  n {create}  e edit  d delete  F12 debug  q quit")
}

fn draw_list(f: &mut Frame, area: Rect, state: &AppState) {
    let title = format!("Logs ({})", state.page.list.len());
    let block = panel_block(&title, !state.modal.is_open());
    let mut lines: Vec<Line> = Vec::new();
    if state.page.list.is_empty() {
        if let Some(p) = state.page.empty.as_ref().filter(|p| !p.hidden) {
            lines.push(Line::from(Span::styled(p.text.clone(), crate::theme::text_muted())));
        }
    }
    for (i, item) in state.page.list.iter().enumerate() {
        let style = if i == state.selected {
            crate::theme::list_cursor_style()
        } else if state.fresh == Some(i) {
            crate::theme::text_highlight()
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(item.title(), style)));
    }
    let inner_h = block.inner(area).height as usize;
    let scroll = state.selected.saturating_sub(inner_h.saturating_sub(1)) as u16;
    f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

fn draw_alert(f: &mut Frame, area: Rect, text: &str) {
    let rect = centered_rect(60, 30, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(crate::theme::text_error())
        .title("Alert");
    let p = Paragraph::new(vec![
        Line::from(text.to_string()),
        Line::from(""),
        Line::from(Span::styled("[ OK ]", crate::theme::list_cursor_style())),
    ])
    .block(block)
    .wrap(Wrap { trim: true });
    f.render_widget(p, rect);
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            "Debug",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
    // Take last `area.height` lines
    let h = area.height as usize;
    let total = state.debug_log.len();
    let start = total.saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::crud::mock::MockTransport;
    use crate::services::csrf::StaticToken;
    use crate::widgets::form::tests::LOG_FORM;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    const PAGE: &str = r#"<div id="lp-root" data-create-url="/log/new/">
      <h1>Log Pendakian</h1>
      <div id="carousel-inner"><div title="Rinjani"></div><div title="Semeru"></div></div>
      <ul id="lp-list"><li data-id="1">Rinjani trip</li><li data-id="2">Semeru trip</li></ul>
      <p id="lp-empty" hidden>No logs yet.</p></div>"#;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with(mock: Arc<MockTransport>) -> AppState {
        let (tx, rx) = mpsc::channel();
        let page = PageContext::from_nodes(parse_fragment(PAGE), "/log/").unwrap();
        AppState {
            carousel: Carousel::new(page.slides.len(), Duration::from_millis(4000)),
            page,
            client: Some(CrudClient::new(mock, Arc::new(StaticToken(Some("tok".into()))))),
            tx: Some(tx),
            rx: Some(rx),
            ..Default::default()
        }
    }

    fn wait_for(state: &mut AppState, done: impl Fn(&AppState) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(state) && Instant::now() < deadline {
            pump(state);
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(done(state), "condition not reached in time");
    }

    fn screen_text(state: &mut AppState) -> String {
        let mut term = Terminal::new(TestBackend::new(80, 24)).unwrap();
        term.draw(|f| ui(f, state)).unwrap();
        let buf = term.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..24 {
            for x in 0..80 {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn renders_banner_list_and_hints() {
        let mut st = state_with(Arc::new(MockTransport::default()));
        let text = screen_text(&mut st);
        assert!(text.contains("Log Pendakian"));
        assert!(text.contains("Rinjani trip"));
        assert!(text.contains("Logs (2)"));
        assert!(text.contains("q quit"));
    }

    #[test]
    fn create_flow_opens_modal_then_prepends() {
        let form_body = json!({ "html": LOG_FORM }).to_string();
        let saved = json!({ "ok": true, "html": "<li data-id=\"3\">Merapi trip</li>" }).to_string();
        let mock = Arc::new(MockTransport::with(vec![
            MockTransport::ok(200, &form_body),
            MockTransport::ok(200, &saved),
        ]));
        let mut st = state_with(mock.clone());

        handle_key(&mut st, key(KeyCode::Char('n')));
        wait_for(&mut st, |s| s.modal.is_open());
        assert!(screen_text(&mut st).contains("Mountain"));

        // Commit a mountain through the combobox, then submit
        for c in "sem".chars() {
            handle_key(&mut st, key(KeyCode::Char(c)));
        }
        handle_key(&mut st, key(KeyCode::Down));
        handle_key(&mut st, key(KeyCode::Enter));
        handle_key(&mut st, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(st.submitting);
        // A second submit while the first is in flight is dropped
        handle_key(&mut st, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        let toast = st.toast.as_ref().unwrap();
        assert_eq!(toast.text, IN_FLIGHT);
        assert_eq!(toast.level, ToastLevel::Info);

        wait_for(&mut st, |s| !s.modal.is_open());
        assert_eq!(st.page.list.position("3"), Some(0));
        assert!(!st.submitting);

        let reqs = mock.requests.lock().unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].url, "/log/new/");
        assert_eq!(reqs[1].method, "POST");
        assert_eq!(reqs[1].url, "/log/new/");
        assert!(reqs[1]
            .fields
            .contains(&("gunung".to_string(), "2".to_string())));
    }

    #[test]
    fn edit_fetch_that_is_not_json_raises_alert() {
        let mock = Arc::new(MockTransport::with(vec![MockTransport::ok(
            200,
            "<html>Please log in</html>",
        )]));
        let mut st = state_with(mock.clone());
        handle_key(&mut st, key(KeyCode::Down));
        handle_key(&mut st, key(KeyCode::Char('e')));
        wait_for(&mut st, |s| s.alert.is_some());
        assert!(!st.modal.is_open());
        assert_eq!(mock.requests.lock().unwrap()[0].url, "/log/2/edit/");
        assert!(screen_text(&mut st).contains("Could not open the form"));

        handle_key(&mut st, key(KeyCode::Enter));
        assert!(st.alert.is_none());
    }

    #[test]
    fn escape_closes_modal_and_q_quits_only_outside_it() {
        let mut st = state_with(Arc::new(MockTransport::default()));
        st.modal.open("<p>Hello</p>", "id_gunung");
        assert!(!handle_key(&mut st, key(KeyCode::Char('q'))));
        assert!(!handle_key(&mut st, key(KeyCode::Esc)));
        assert!(!st.modal.is_open());
        assert!(handle_key(&mut st, key(KeyCode::Char('q'))));
    }

    #[test]
    fn toast_expires_after_its_ticks() {
        let mut st = state_with(Arc::new(MockTransport::default()));
        run_effects(
            &mut st,
            vec![Effect::ShowToast {
                text: "Saved".into(),
                level: ToastLevel::Success,
                seconds: 1,
            }],
        );
        assert!(screen_text(&mut st).contains("Saved"));
        st.tick += 5;
        screen_text(&mut st);
        assert!(st.toast.is_none());
    }

    #[test]
    fn debug_pane_toggles_with_f12() {
        let mut st = state_with(Arc::new(MockTransport::default()));
        st.dbg("hello from the log");
        handle_key(&mut st, key(KeyCode::F(12)));
        assert!(screen_text(&mut st).contains("hello from the log"));
    }
}
