//! The single modal of the list page. A session exists from `open` to
//! `close`; everything mounted for it is dropped on close.

use crate::app::Effect;
use crate::dom::{collapse_whitespace, parse_fragment, Element, Node};
use crate::widgets::chrome::{centered_rect, panel_block};
use crate::widgets::form_widget::{FormKind, FormWidget, DELETE_FORM_ID, ENTRY_FORM_ID};
use crate::widgets::Widget;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph, Wrap};

pub const CLOSE_ATTR: &str = "data-close-modal";
const DEFAULT_TITLE: &str = "Hiking log";

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "main", "form", "ul", "ol", "li",
    "h1", "h2", "h3", "h4", "h5", "h6", "table", "tr", "dl", "dt", "dd", "blockquote", "body",
    "html",
];

#[derive(Default)]
pub struct ModalSession {
    body: Option<String>,
    title: String,
    content: Option<Box<dyn Widget>>,
}

impl ModalSession {
    /// Replaces whatever is shown with `markup` and mounts its form, if any.
    /// Opening an open modal re-mounts instead of stacking.
    pub fn open(&mut self, markup: &str, select_id: &str) {
        let root = Element::root(parse_fragment(markup));
        let title = root
            .find(|e| matches!(e.tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5"))
            .map(|h| h.text())
            .filter(|t| !t.is_empty());
        let close_label = root
            .find(|e| e.has_attr(CLOSE_ATTR))
            .map(|e| e.text())
            .map(|t| if t.is_empty() { "Close".to_string() } else { t });

        let first_form = root.find(|e| e.tag == "form");
        let delete_form = root.find(|e| e.tag == "form" && e.id() == Some(DELETE_FORM_ID));
        let content: Box<dyn Widget> = match (first_form, delete_form) {
            (Some(form), _) if form.id() == Some(ENTRY_FORM_ID) => {
                let t = title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string());
                let mut w = FormWidget::new(form, FormKind::Entry, select_id, &t);
                if w.form.cancel_label.is_none() {
                    w.form.cancel_label = close_label;
                }
                Box::new(w)
            }
            (_, Some(form)) => {
                let t = title.clone().unwrap_or_else(|| "Delete".to_string());
                let mut w = FormWidget::new(form, FormKind::Delete, select_id, &t);
                if w.form.cancel_label.is_none() {
                    w.form.cancel_label = close_label;
                }
                Box::new(w)
            }
            _ => {
                let mut lines = Vec::new();
                markup_lines(&root, &mut lines);
                Box::new(MarkupView {
                    title: title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                    lines,
                    close_label,
                    scroll: 0,
                })
            }
        };
        tracing::debug!(bytes = markup.len(), "modal opened");
        self.title = title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
        self.body = Some(markup.to_string());
        self.content = Some(content);
    }

    pub fn close(&mut self) {
        self.body = None;
        self.title.clear();
        self.content = None;
    }

    pub fn is_open(&self) -> bool {
        self.body.is_some()
    }

    #[cfg(test)]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn form(&self) -> Option<&FormWidget> {
        self.content
            .as_ref()
            .and_then(|w| w.as_any().downcast_ref::<FormWidget>())
    }

    pub fn view(&self) -> Option<&MarkupView> {
        self.content
            .as_ref()
            .and_then(|w| w.as_any().downcast_ref::<MarkupView>())
    }

    /// Escape closes the modal, open dropdown included, unless the mounted
    /// content needs it (the notes editor).
    pub fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(content) = self.content.as_mut() else {
            return Vec::new();
        };
        if key.code == KeyCode::Esc && !content.captures_escape() {
            return vec![Effect::CloseModal];
        }
        content.on_key(key)
    }

    pub fn on_mouse(&mut self, ev: MouseEvent) -> Vec<Effect> {
        match self.content.as_mut() {
            Some(c) => c.on_mouse(ev),
            None => Vec::new(),
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, tick: u64) {
        let Some(content) = self.content.as_mut() else {
            return;
        };
        let rect = centered_rect(80, 80, area);
        f.render_widget(Clear, rect);
        content.render(f, rect, true, tick);
    }
}

/// Non-form markup (a server error page, a message) shown as text.
pub struct MarkupView {
    title: String,
    pub lines: Vec<String>,
    pub close_label: Option<String>,
    scroll: u16,
}

impl Widget for MarkupView {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        let mut lines: Vec<Line> = self.lines.iter().map(|l| Line::from(l.clone())).collect();
        if let Some(label) = &self.close_label {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("[ {label} ]"),
                crate::theme::list_cursor_style(),
            )));
        }
        let p = Paragraph::new(lines)
            .block(panel_block(&self.title, focused))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(p, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Enter if self.close_label.is_some() => return vec![Effect::CloseModal],
            _ => {}
        }
        Vec::new()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn is_block(e: &Element) -> bool {
    BLOCK_TAGS.contains(&e.tag.as_str())
}

fn markup_lines(el: &Element, out: &mut Vec<String>) {
    for n in &el.children {
        match n {
            Node::Text(t) => {
                let t = collapse_whitespace(t);
                if !t.is_empty() {
                    out.push(t);
                }
            }
            Node::Element(e) => {
                if e.has_attr("hidden") {
                    continue;
                }
                match e.tag.as_str() {
                    "script" | "style" | "head" | "title" => {}
                    "pre" | "textarea" => out.extend(e.raw_text().lines().map(str::to_string)),
                    _ if is_block(e) && e.child_elements().any(is_block) => markup_lines(e, out),
                    _ => {
                        let t = e.text();
                        if !t.is_empty() {
                            out.push(t);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::form::tests::LOG_FORM;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn entry_form_mounts_combobox_and_validator() {
        let mut m = ModalSession::default();
        m.open(LOG_FORM, "id_gunung");
        assert!(m.is_open());
        let fw = m.form().unwrap();
        assert_eq!(fw.kind, FormKind::Entry);
        assert!(fw.combo.is_some());
        assert_eq!(fw.form.error_box.as_ref().map(|b| b.visible), Some(false));
    }

    #[test]
    fn delete_form_is_found_after_other_markup() {
        let html = r#"<h3>Delete log?</h3><p>Rinjani, May 2024</p>
            <form id="lp-delete-form" method="post" action="/log/7/delete/">
              <input type="hidden" name="csrfmiddlewaretoken" value="abc">
              <button type="submit">Delete</button>
            </form><button data-close-modal>Keep it</button>"#;
        let mut m = ModalSession::default();
        m.open(html, "id_gunung");
        assert_eq!(m.title(), "Delete log?");
        let fw = m.form().unwrap();
        assert_eq!(fw.kind, FormKind::Delete);
        assert_eq!(fw.form.cancel_label.as_deref(), Some("Keep it"));
    }

    #[test]
    fn raw_markup_is_shown_as_text() {
        let mut m = ModalSession::default();
        m.open(
            "<div><h2>Server error</h2><p>Try again <b>later</b>.</p><p hidden>x</p></div>",
            "id_gunung",
        );
        assert!(m.form().is_none());
        let view = m.view().unwrap();
        assert_eq!(view.lines, vec!["Server error".to_string(), "Try again later .".to_string()]);
    }

    #[test]
    fn one_escape_closes_modal_with_panel_open() {
        let mut m = ModalSession::default();
        m.open(LOG_FORM, "id_gunung");
        assert!(!m.form().unwrap().combo.as_ref().unwrap().is_open());
        assert!(matches!(m.on_key(key(KeyCode::Esc)).as_slice(), [Effect::CloseModal]));

        m.open(LOG_FORM, "id_gunung");
        m.on_key(key(KeyCode::Char('r')));
        assert!(m.form().unwrap().combo.as_ref().unwrap().is_open());
        assert!(matches!(m.on_key(key(KeyCode::Esc)).as_slice(), [Effect::CloseModal]));
    }

    #[test]
    fn reopen_replaces_and_close_drops_everything() {
        let mut m = ModalSession::default();
        m.open(LOG_FORM, "id_gunung");
        m.open("<p>Saved elsewhere</p>", "id_gunung");
        assert!(m.form().is_none());
        assert_eq!(m.body(), Some("<p>Saved elsewhere</p>"));
        m.close();
        assert!(!m.is_open());
        assert!(m.body().is_none());
        assert!(m.on_key(key(KeyCode::Esc)).is_empty());
    }

    #[test]
    fn renders_inside_a_test_backend() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let mut m = ModalSession::default();
        m.open(LOG_FORM, "id_gunung");
        let mut term = Terminal::new(TestBackend::new(80, 40)).unwrap();
        term.draw(|f| m.render(f, f.area(), 0)).unwrap();
        let buf = term.backend().buffer().clone();
        let screen: String = (0..40)
            .flat_map(|y| (0..80).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(screen.contains("Mountain"));
        assert!(screen.contains("Save"));
    }
}
