//! Searchable single-select. The underlying `<select>` stays authoritative for
//! the submitted value; the widget only presents a text input and a filtered
//! option panel in front of it.

use crate::dom::Element;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

pub const PANEL_ROWS: usize = 8;
pub const PLACEHOLDER: &str = "Search mountain… (type a prefix)";
const FOOTER: &str = "Enter: pick • Esc: close • ↑/↓: navigate";

#[derive(Clone, Debug, PartialEq)]
pub struct ComboOption {
    pub value: String,
    pub label: String,
}

/// Indices of `options` whose lowercased label starts with the trimmed,
/// lowercased query. An empty query keeps every option in order.
pub fn filter_options(options: &[ComboOption], query: &str) -> Vec<usize> {
    let q = query.trim().to_lowercase();
    options
        .iter()
        .enumerate()
        .filter(|(_, o)| q.is_empty() || o.label.to_lowercase().starts_with(&q))
        .map(|(i, _)| i)
        .collect()
}

pub fn empty_message(query: &str) -> String {
    if query.is_empty() {
        "No options.".to_string()
    } else {
        format!("No mountain matches “{query}”.")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Press {
    Committed,
    Inside,
    Outside,
}

#[derive(Clone, Debug, Default)]
pub struct ComboBox {
    pub select_id: String,
    // Submitted under this name
    pub name: String,
    options: Vec<ComboOption>,
    text: String,
    filtered: Vec<usize>,
    highlighted: Option<usize>,
    open: bool,
    committed: String,
    pub focused: bool,
    offset: usize,
    input_rect: Option<Rect>,
    panel_rect: Option<Rect>,
    option_rows: Vec<(u16, usize)>,
}

impl ComboBox {
    /// Wraps the single-select `#select_id` inside `scope`. None when the
    /// control is missing or allows multiple values.
    pub fn attach(scope: &Element, select_id: &str) -> Option<Self> {
        let select = scope.by_id(select_id)?;
        if select.tag != "select" || select.has_attr("multiple") {
            return None;
        }
        let nodes = select.find_all(|e| e.tag == "option");
        let options: Vec<ComboOption> = nodes
            .iter()
            .map(|o| {
                let label = o.text();
                ComboOption {
                    value: o.attr("value").map(str::to_string).unwrap_or_else(|| label.clone()),
                    label,
                }
            })
            .collect();
        // Browser default: the `selected` option, else the first one
        let current = nodes
            .iter()
            .position(|o| o.has_attr("selected"))
            .or(if options.is_empty() { None } else { Some(0) });
        Some(Self::with_options(
            select_id,
            select.attr("name").unwrap_or(select_id),
            options,
            current,
        ))
    }

    pub fn with_options(
        select_id: &str,
        name: &str,
        options: Vec<ComboOption>,
        current: Option<usize>,
    ) -> Self {
        let mut cb = Self {
            select_id: select_id.to_string(),
            name: name.to_string(),
            filtered: (0..options.len()).collect(),
            ..Default::default()
        };
        if let Some(o) = current.and_then(|i| options.get(i)) {
            cb.committed = o.value.clone();
            if !o.value.is_empty() && !o.label.is_empty() {
                cb.text = o.label.clone();
            }
        }
        cb.options = options;
        cb
    }

    pub fn options(&self) -> &[ComboOption] {
        &self.options
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn filtered(&self) -> Vec<&ComboOption> {
        self.filtered.iter().map(|&i| &self.options[i]).collect()
    }

    fn open_panel(&mut self) {
        self.filtered = filter_options(&self.options, &self.text);
        self.highlighted = None;
        self.offset = 0;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    pub fn on_focus(&mut self) {
        self.focused = true;
        self.open_panel();
    }

    pub fn on_blur(&mut self) {
        self.focused = false;
        self.close();
    }

    #[cfg(test)]
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.open_panel();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
        self.open_panel();
    }

    pub fn backspace(&mut self) {
        if self.text.pop().is_some() {
            self.open_panel();
        }
    }

    /// Commits option `idx` of the snapshot: the hidden value and the visible
    /// text move together.
    pub fn commit(&mut self, idx: usize) {
        if let Some(o) = self.options.get(idx) {
            self.committed = o.value.clone();
            self.text = o.label.clone();
            tracing::debug!(field = %self.name, value = %self.committed, "combobox commit");
        }
        self.close();
    }

    fn move_highlight(&mut self, down: bool) {
        let n = self.filtered.len();
        if n == 0 {
            return;
        }
        let next = match (self.highlighted, down) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.highlighted = Some(next);
        if next < self.offset {
            self.offset = next;
        } else if next >= self.offset + PANEL_ROWS {
            self.offset = next + 1 - PANEL_ROWS;
        }
    }

    /// Returns true when the key was consumed. Enter without a highlight and
    /// Escape on a closed panel fall through to the form.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Down | KeyCode::Up if !self.open => {
                self.open_panel();
                true
            }
            KeyCode::Down => {
                self.move_highlight(true);
                true
            }
            KeyCode::Up => {
                self.move_highlight(false);
                true
            }
            KeyCode::Enter => match self.highlighted.and_then(|h| self.filtered.get(h).copied()) {
                Some(idx) if self.open => {
                    self.commit(idx);
                    true
                }
                _ => false,
            },
            KeyCode::Esc if self.open => {
                self.close();
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Char(c) => {
                self.push_char(c);
                true
            }
            _ => false,
        }
    }

    /// Commits the option shown at filtered position `pos`.
    pub fn press_item(&mut self, pos: usize) {
        if let Some(&idx) = self.filtered.get(pos) {
            self.commit(idx);
        }
    }

    /// Pointer press at a terminal cell, hit-tested against the last render.
    pub fn press_at(&mut self, column: u16, row: u16) -> Press {
        let hit = |r: Option<Rect>| {
            r.map(|r| r.contains(Position::new(column, row)))
                .unwrap_or(false)
        };
        if self.open && hit(self.panel_rect) {
            if let Some(&(_, pos)) = self.option_rows.iter().find(|(y, _)| *y == row) {
                self.press_item(pos);
                return Press::Committed;
            }
            return Press::Inside;
        }
        if hit(self.input_rect) {
            return Press::Inside;
        }
        self.close();
        Press::Outside
    }

    /// Pre-submit check. An uncommitted widget tries an exact
    /// case-insensitive label match; if that fails the panel reopens with
    /// focus and the submission must be blocked.
    pub fn guard_submit(&mut self) -> bool {
        if self.committed.is_empty() {
            let q = self.text.trim().to_lowercase();
            if let Some(i) = self.options.iter().position(|o| o.label.to_lowercase() == q) {
                self.committed = self.options[i].value.clone();
            }
        }
        if self.committed.is_empty() {
            self.focused = true;
            self.open_panel();
            return false;
        }
        true
    }

    pub fn input_line(&self, cursor_on: bool) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        if self.text.is_empty() && !self.focused {
            spans.push(Span::styled(PLACEHOLDER, crate::theme::text_muted()));
        } else {
            let style = if self.focused {
                crate::theme::text_editing_bold()
            } else {
                Style::default()
            };
            let mut t = self.text.clone();
            if self.focused && cursor_on {
                t.push('▏');
            }
            spans.push(Span::styled(t, style));
        }
        spans.push(Span::styled(
            if self.open { " ▴" } else { " ▾" },
            crate::theme::text_muted(),
        ));
        spans
    }

    /// Draws the option panel below `input`, kept within `bounds`.
    pub fn draw_panel(&mut self, f: &mut Frame, input: Rect, bounds: Rect) {
        self.input_rect = Some(input);
        self.option_rows.clear();
        if !self.open {
            self.panel_rect = None;
            return;
        }
        let shown = self.filtered.len().clamp(1, PANEL_ROWS) as u16;
        // Rows plus the footer and two borders
        let want_h = shown + 3;
        let below = bounds.bottom().saturating_sub(input.bottom());
        let y = if below >= want_h || input.y < bounds.y + want_h {
            input.bottom()
        } else {
            input.y - want_h
        };
        let rect = Rect::new(
            input.x,
            y,
            input.width.max(24).min(bounds.right().saturating_sub(input.x)),
            want_h.min(bounds.bottom().saturating_sub(y)),
        );
        self.panel_rect = Some(rect);
        f.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(crate::theme::border_focused());
        let inner = block.inner(rect);
        f.render_widget(block, rect);
        if inner.height == 0 {
            return;
        }
        if self.filtered.is_empty() {
            f.render_widget(
                Paragraph::new(empty_message(&self.text)).style(crate::theme::text_muted()),
                inner,
            );
            return;
        }
        let rows = (inner.height.saturating_sub(1) as usize).min(PANEL_ROWS).max(1);
        let mut items: Vec<ListItem> = Vec::new();
        for (pos, &idx) in self.filtered.iter().enumerate().skip(self.offset).take(rows) {
            let o = &self.options[idx];
            self.option_rows
                .push((inner.y + (pos - self.offset) as u16, pos));
            // Marks the option the hidden control currently holds
            let mark = if !o.value.is_empty() && o.value == self.committed {
                "• "
            } else {
                "  "
            };
            items.push(ListItem::new(format!("{mark}{}", o.label)));
        }
        let mut ls = ListState::default();
        ls.select(self.highlighted.map(|h| h - self.offset.min(h)));
        let list_area = Rect::new(inner.x, inner.y, inner.width, rows as u16);
        f.render_stateful_widget(
            List::new(items).highlight_style(crate::theme::list_cursor_style()),
            list_area,
            &mut ls,
        );
        if inner.height as usize > rows {
            let foot = Rect::new(inner.x, inner.y + rows as u16, inner.width, 1);
            f.render_widget(
                Paragraph::new(FOOTER).style(crate::theme::text_muted()),
                foot,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_fragment, Element};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mountains() -> ComboBox {
        let html = r#"<form id="logpendakian-form"><select name="gunung" id="id_gunung">
            <option value="">---------</option>
            <option value="1">Rinjani</option>
            <option value="2">Semeru</option>
            <option value="3">Sindoro</option>
            <option value="4">Slamet</option>
        </select></form>"#;
        let scope = Element::root(parse_fragment(html));
        ComboBox::attach(&scope, "id_gunung").unwrap()
    }

    fn labels(cb: &ComboBox) -> Vec<String> {
        cb.filtered().iter().map(|o| o.label.clone()).collect()
    }

    #[test]
    fn attach_snapshots_options_and_blank_default() {
        let cb = mountains();
        assert_eq!(cb.name, "gunung");
        assert_eq!(cb.options().len(), 5);
        assert_eq!(cb.committed(), "");
        assert_eq!(cb.text(), "");
        assert!(!cb.is_open());
    }

    #[test]
    fn attach_shows_selected_label() {
        let html = r#"<select id="id_gunung" name="gunung"><option value="1">Rinjani</option><option value="2" selected>Semeru</option></select>"#;
        let cb = ComboBox::attach(&Element::root(parse_fragment(html)), "id_gunung").unwrap();
        assert_eq!(cb.committed(), "2");
        assert_eq!(cb.text(), "Semeru");
    }

    #[test]
    fn attach_ignores_missing_or_multiple_select() {
        let scope = Element::root(parse_fragment(r#"<select id="id_gunung" multiple></select>"#));
        assert!(ComboBox::attach(&scope, "id_gunung").is_none());
        assert!(ComboBox::attach(&scope, "nope").is_none());
    }

    #[test]
    fn filter_is_trimmed_case_insensitive_prefix() {
        let cb = mountains();
        let idx = filter_options(cb.options(), "  s ");
        let got: Vec<&str> = idx.iter().map(|&i| cb.options()[i].label.as_str()).collect();
        assert_eq!(got, vec!["Semeru", "Sindoro", "Slamet"]);
        assert_eq!(filter_options(cb.options(), "").len(), 5);
        assert!(filter_options(cb.options(), "mer").is_empty());
    }

    #[test]
    fn typing_opens_and_refilters() {
        let mut cb = mountains();
        cb.on_focus();
        assert!(cb.is_open());
        cb.on_key(key(KeyCode::Char('S')));
        cb.on_key(key(KeyCode::Char('i')));
        assert_eq!(labels(&cb), vec!["Sindoro"]);
        cb.on_key(key(KeyCode::Backspace));
        assert_eq!(labels(&cb).len(), 3);
    }

    #[test]
    fn arrows_open_first_then_cycle() {
        let mut cb = mountains();
        assert!(cb.on_key(key(KeyCode::Down)));
        assert!(cb.is_open());
        assert_eq!(cb.highlighted(), None);
        cb.on_key(key(KeyCode::Down));
        assert_eq!(cb.highlighted(), Some(0));
        cb.on_key(key(KeyCode::Up));
        assert_eq!(cb.highlighted(), Some(4));
        cb.on_key(key(KeyCode::Down));
        assert_eq!(cb.highlighted(), Some(0));
    }

    #[test]
    fn up_from_none_goes_to_last() {
        let mut cb = mountains();
        cb.set_text("s");
        cb.on_key(key(KeyCode::Up));
        assert_eq!(cb.highlighted(), Some(2));
    }

    #[test]
    fn enter_commits_highlight_and_keeps_value_label_in_sync() {
        let mut cb = mountains();
        cb.set_text("se");
        cb.on_key(key(KeyCode::Down));
        assert!(cb.on_key(key(KeyCode::Enter)));
        assert_eq!(cb.committed(), "2");
        assert_eq!(cb.text(), "Semeru");
        assert!(!cb.is_open());
        assert_eq!(cb.highlighted(), None);
    }

    #[test]
    fn enter_without_highlight_falls_through() {
        let mut cb = mountains();
        cb.set_text("se");
        assert!(!cb.on_key(key(KeyCode::Enter)));
        assert_eq!(cb.committed(), "");
    }

    #[test]
    fn escape_only_consumed_when_open() {
        let mut cb = mountains();
        cb.on_focus();
        cb.on_key(key(KeyCode::Down));
        assert!(cb.on_key(key(KeyCode::Esc)));
        assert!(!cb.is_open());
        assert_eq!(cb.highlighted(), None);
        assert!(!cb.on_key(key(KeyCode::Esc)));
    }

    #[test]
    fn typing_after_commit_keeps_committed_value() {
        let mut cb = mountains();
        cb.press_item(1);
        assert_eq!(cb.committed(), "1");
        cb.push_char('x');
        assert_eq!(cb.text(), "Rinjanix");
        assert_eq!(cb.committed(), "1");
    }

    #[test]
    fn empty_results_message_quotes_query() {
        assert_eq!(empty_message("zz"), "No mountain matches “zz”.");
        assert_eq!(empty_message(""), "No options.");
    }

    #[test]
    fn guard_commits_exact_label_match() {
        let mut cb = mountains();
        cb.set_text(" semeru ");
        cb.close();
        assert!(cb.guard_submit());
        assert_eq!(cb.committed(), "2");
    }

    #[test]
    fn guard_blocks_and_reopens_when_unresolved() {
        let mut cb = mountains();
        cb.set_text("Sem");
        cb.close();
        assert!(!cb.guard_submit());
        assert!(cb.is_open());
        assert!(cb.focused);
        assert_eq!(labels(&cb), vec!["Semeru"]);
    }

    #[test]
    fn press_on_rendered_option_commits() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let mut cb = mountains();
        cb.set_text("s");
        let mut term = Terminal::new(TestBackend::new(40, 20)).unwrap();
        term.draw(|f| {
            cb.draw_panel(f, Rect::new(2, 2, 30, 1), f.area());
        })
        .unwrap();
        // Border at y=3; first option row at y=4
        assert_eq!(cb.press_at(5, 5), Press::Committed);
        assert_eq!(cb.committed(), "3");
        assert_eq!(cb.text(), "Sindoro");
    }

    #[test]
    fn press_outside_closes_panel() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let mut cb = mountains();
        cb.on_focus();
        let mut term = Terminal::new(TestBackend::new(40, 20)).unwrap();
        term.draw(|f| {
            cb.draw_panel(f, Rect::new(2, 2, 30, 1), f.area());
        })
        .unwrap();
        assert_eq!(cb.press_at(3, 2), Press::Inside);
        assert!(cb.is_open());
        assert_eq!(cb.press_at(39, 0), Press::Outside);
        assert!(!cb.is_open());
    }
}
