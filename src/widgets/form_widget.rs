use crate::app::Effect;
use crate::dom::Element;
use crate::widgets::chrome::centered_rect;
use crate::widgets::combobox::{ComboBox, Press};
use crate::widgets::form::{draw_form, sanitize_date, FieldKind, Focus, FormState};
use crate::widgets::validator;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};
use tui_textarea::TextArea;

pub const ENTRY_FORM_ID: &str = "logpendakian-form";
pub const DELETE_FORM_ID: &str = "lp-delete-form";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    // Create/edit form with combobox and live validation
    Entry,
    Delete,
}

pub struct FormWidget {
    pub form: FormState,
    pub kind: FormKind,
    pub combo: Option<ComboBox>,
    title: String,
    focus: usize,
    // Id of the field edited since it gained focus
    dirty: Option<String>,
    editor: Option<(usize, TextArea<'static>)>,
}

impl FormWidget {
    /// Mounts a form. Entry forms get the combobox over `select_id` and the
    /// live validator.
    pub fn new(form_el: &Element, kind: FormKind, select_id: &str, title: &str) -> Self {
        let mut form = FormState::from_element(form_el);
        let mut combo = None;
        if kind == FormKind::Entry {
            combo = ComboBox::attach(form_el, select_id);
            if combo.is_some() {
                if let Some(fld) = form.field_by_id_mut(select_id) {
                    fld.kind = FieldKind::Combo;
                }
            }
            validator::attach(&mut form);
        }
        let mut w = Self {
            form,
            kind,
            combo,
            title: title.to_string(),
            focus: 0,
            dirty: None,
            editor: None,
        };
        // Focus starts on the first control; the panel waits for input
        if w.on_combo() {
            if let Some(cb) = w.combo.as_mut() {
                cb.focused = true;
            }
        }
        w
    }

    pub fn focusables(&self) -> Vec<Focus> {
        let mut out: Vec<Focus> = self
            .form
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_visible() && !f.disabled)
            .map(|(i, _)| Focus::Field(i))
            .collect();
        if self.form.submit_label.is_some() {
            out.push(Focus::Submit);
        }
        if self.form.cancel_label.is_some() {
            out.push(Focus::Cancel);
        }
        out
    }

    pub fn current_focus(&self) -> Option<Focus> {
        self.focusables().get(self.focus).copied()
    }

    fn focused_field(&self) -> Option<usize> {
        match self.current_focus() {
            Some(Focus::Field(i)) => Some(i),
            _ => None,
        }
    }

    fn on_combo(&self) -> bool {
        self.focused_field()
            .and_then(|i| self.form.fields.get(i))
            .map(|f| f.kind == FieldKind::Combo)
            .unwrap_or(false)
    }

    fn enter_focus(&mut self) {
        if self.on_combo() {
            if let Some(cb) = self.combo.as_mut() {
                cb.on_focus();
            }
        }
    }

    fn leave_focus(&mut self) {
        if self.on_combo() {
            if let Some(cb) = self.combo.as_mut() {
                cb.on_blur();
            }
        }
        self.flush_change();
    }

    // A pending edit becomes a change event
    fn flush_change(&mut self) {
        if let Some(id) = self.dirty.take() {
            if let Some(fld) = self.form.field_by_id_mut(&id) {
                if fld.kind == FieldKind::Date {
                    fld.value = sanitize_date(&fld.value);
                }
            }
            if self.kind == FormKind::Entry {
                validator::on_change(&mut self.form, &id);
            }
        }
    }

    pub fn move_focus(&mut self, forward: bool) {
        let n = self.focusables().len();
        if n == 0 {
            return;
        }
        self.leave_focus();
        self.focus = if forward {
            (self.focus + 1) % n
        } else {
            (self.focus + n - 1) % n
        };
        self.enter_focus();
    }

    pub fn focus_field_by_id(&mut self, id: &str) {
        let target = self
            .form
            .fields
            .iter()
            .position(|f| f.id.as_deref() == Some(id));
        if let Some(pos) = target.and_then(|t| {
            self.focusables()
                .iter()
                .position(|f| *f == Focus::Field(t))
        }) {
            if pos != self.focus {
                self.leave_focus();
                self.focus = pos;
            }
        }
    }

    fn edit_text(&mut self, idx: usize, key: KeyCode) -> bool {
        let Some(fld) = self.form.fields.get_mut(idx) else {
            return false;
        };
        match key {
            KeyCode::Char(c) => fld.value.push(c),
            KeyCode::Backspace => {
                if fld.value.pop().is_none() {
                    return true;
                }
            }
            _ => return false,
        }
        let id = fld.id.clone().unwrap_or_default();
        self.dirty = Some(id.clone());
        if self.kind == FormKind::Entry {
            validator::on_input(&mut self.form, &id);
        }
        true
    }

    fn open_editor(&mut self, idx: usize) {
        let Some(fld) = self.form.fields.get(idx) else {
            return;
        };
        let mut ta = if fld.value.is_empty() {
            TextArea::default()
        } else {
            TextArea::from(fld.value.lines().map(str::to_string).collect::<Vec<_>>())
        };
        ta.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Editing: {} (Ctrl+S save, Esc cancel)", fld.label)),
        );
        self.editor = Some((idx, ta));
    }

    pub fn editing(&self) -> bool {
        self.editor.is_some()
    }

    fn editor_key(&mut self, key: KeyEvent) {
        let save = key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL);
        if save {
            if let Some((idx, ta)) = self.editor.take() {
                if let Some(fld) = self.form.fields.get_mut(idx) {
                    fld.value = ta.lines().join("\n");
                    self.dirty = fld.id.clone();
                }
            }
            return;
        }
        if key.code == KeyCode::Esc {
            self.editor = None;
            return;
        }
        if let Some((_, ta)) = self.editor.as_mut() {
            ta.input(key);
        }
    }

    /// Submission as the form's submit event would run it: the disabled
    /// submit control and the combobox guard can both block it.
    pub fn try_submit(&mut self) -> Vec<Effect> {
        self.flush_change();
        if self.form.submit_disabled {
            return Vec::new();
        }
        if let Some(cb) = self.combo.as_mut() {
            if !cb.guard_submit() {
                let id = cb.select_id.clone();
                self.focus_field_by_id(&id);
                if let Some(cb) = self.combo.as_mut() {
                    cb.on_focus();
                }
                return Vec::new();
            }
        }
        let fields = self.form.serialize(self.combo.as_ref());
        let action = self.form.action.clone();
        match self.kind {
            FormKind::Entry => vec![Effect::SubmitForm { action, fields }],
            FormKind::Delete => vec![Effect::SubmitDelete { action, fields }],
        }
    }

    fn field_key(&mut self, idx: usize, key: KeyEvent) -> Vec<Effect> {
        let Some(kind) = self.form.fields.get(idx).map(|f| f.kind.clone()) else {
            return Vec::new();
        };
        match kind {
            FieldKind::Combo => {
                let consumed = self.combo.as_mut().map(|cb| cb.on_key(key)).unwrap_or(false);
                if consumed {
                    return Vec::new();
                }
                match key.code {
                    KeyCode::Enter => self.try_submit(),
                    _ => Vec::new(),
                }
            }
            FieldKind::Text | FieldKind::Number | FieldKind::Date => match key.code {
                KeyCode::Enter => self.try_submit(),
                KeyCode::Up => {
                    self.move_focus(false);
                    Vec::new()
                }
                KeyCode::Down => {
                    self.move_focus(true);
                    Vec::new()
                }
                code => {
                    self.edit_text(idx, code);
                    Vec::new()
                }
            },
            FieldKind::TextArea => {
                match key.code {
                    KeyCode::Enter => self.open_editor(idx),
                    KeyCode::Up => self.move_focus(false),
                    KeyCode::Down => self.move_focus(true),
                    _ => {}
                }
                Vec::new()
            }
            FieldKind::Checkbox => {
                match key.code {
                    KeyCode::Char(' ') => {
                        if let Some(f) = self.form.fields.get_mut(idx) {
                            f.checked = !f.checked;
                        }
                    }
                    KeyCode::Enter => return self.try_submit(),
                    KeyCode::Up => self.move_focus(false),
                    KeyCode::Down => self.move_focus(true),
                    _ => {}
                }
                Vec::new()
            }
            FieldKind::Select { .. } => {
                let step: Option<bool> = match key.code {
                    KeyCode::Left => Some(false),
                    KeyCode::Right | KeyCode::Char(' ') => Some(true),
                    _ => None,
                };
                if let Some(fwd) = step {
                    if let Some(f) = self.form.fields.get_mut(idx) {
                        if let FieldKind::Select { options, selected } = &mut f.kind {
                            let n = options.len().max(1);
                            *selected = if fwd { (*selected + 1) % n } else { (*selected + n - 1) % n };
                            if let Some((v, _)) = options.get(*selected) {
                                f.value = v.clone();
                            }
                        }
                    }
                    return Vec::new();
                }
                match key.code {
                    KeyCode::Enter => self.try_submit(),
                    KeyCode::Up => {
                        self.move_focus(false);
                        Vec::new()
                    }
                    KeyCode::Down => {
                        self.move_focus(true);
                        Vec::new()
                    }
                    _ => Vec::new(),
                }
            }
            FieldKind::Hidden => Vec::new(),
        }
    }
}

impl crate::widgets::Widget for FormWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, _focused: bool, tick: u64) {
        let cursor_on = tick % 2 == 0 && self.editor.is_none();
        let focus = self.current_focus();
        let anchor = draw_form(
            f,
            area,
            &self.title,
            &self.form,
            self.combo.as_ref(),
            focus,
            cursor_on,
        );
        if let (Some(cb), Some(input)) = (self.combo.as_mut(), anchor) {
            cb.draw_panel(f, input, area);
        }
        if let Some((_, ta)) = self.editor.as_ref() {
            let rect = centered_rect(80, 70, area);
            f.render_widget(Clear, rect);
            f.render_widget(ta, rect);
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if self.editor.is_some() {
            self.editor_key(key);
            return Vec::new();
        }
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.try_submit();
        }
        match key.code {
            KeyCode::Tab => {
                self.move_focus(true);
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.move_focus(false);
                return Vec::new();
            }
            _ => {}
        }
        match self.current_focus() {
            Some(Focus::Field(i)) => self.field_key(i, key),
            Some(Focus::Submit) => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.try_submit(),
                KeyCode::Up | KeyCode::Left => {
                    self.move_focus(false);
                    Vec::new()
                }
                KeyCode::Down | KeyCode::Right => {
                    self.move_focus(true);
                    Vec::new()
                }
                _ => Vec::new(),
            },
            Some(Focus::Cancel) => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => vec![Effect::CloseModal],
                KeyCode::Up | KeyCode::Left => {
                    self.move_focus(false);
                    Vec::new()
                }
                _ => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    fn on_mouse(&mut self, ev: MouseEvent) -> Vec<Effect> {
        if ev.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        if let Some(cb) = self.combo.as_mut() {
            if cb.press_at(ev.column, ev.row) == Press::Committed {
                let id = cb.select_id.clone();
                self.focus_field_by_id(&id);
            }
        }
        Vec::new()
    }

    fn captures_escape(&self) -> bool {
        self.editor.is_some()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
