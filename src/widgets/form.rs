use crate::dom::Element;
use crate::widgets::chrome::panel_block;
use crate::widgets::combobox::ComboBox;
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::HashMap;

pub const ERRORS_ID: &str = "lp-errors";
pub const ERRORS_HEADING: &str = "Needs fixing:";
pub const TEXTAREA_PREVIEW_LINES: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Date,
    Number,
    TextArea,
    Checkbox,
    Select {
        options: Vec<(String, String)>,
        selected: usize,
    },
    // Select replaced by the combobox widget
    Combo,
    Hidden,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub name: String,
    pub id: Option<String>,
    pub label: String,
    pub kind: FieldKind,
    // For checkboxes this is the submitted value, not the state
    pub value: String,
    pub checked: bool,
    pub min: Option<String>,
    pub max: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub errors: Vec<String>,
}

impl FormField {
    pub fn is_visible(&self) -> bool {
        !matches!(self.kind, FieldKind::Hidden)
    }
}

/// The `#lp-errors` box of a form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorPanel {
    pub visible: bool,
    pub heading: Option<String>,
    pub messages: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Field(usize),
    Submit,
    Cancel,
}

#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub id: Option<String>,
    pub action: Option<String>,
    pub fields: Vec<FormField>,
    pub nonfield_errors: Vec<String>,
    pub error_box: Option<ErrorPanel>,
    pub notes: Vec<String>,
    pub submit_label: Option<String>,
    pub submit_disabled: bool,
    pub cancel_label: Option<String>,
}

enum Piece {
    Field(FormField),
    Errors { nonfield: bool, messages: Vec<String> },
}

impl FormState {
    pub fn from_element(form: &Element) -> Self {
        let labels: HashMap<String, String> = form
            .find_all(|e| e.tag == "label")
            .into_iter()
            .filter_map(|l| Some((l.attr("for")?.to_string(), label_text(l))))
            .collect();
        let mut st = FormState {
            id: form.id().map(str::to_string),
            action: form
                .attr("action")
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            ..Default::default()
        };
        let mut pieces = Vec::new();
        scan(form, &labels, None, &mut st, &mut pieces);

        let mut pending: Vec<String> = Vec::new();
        for p in pieces {
            match p {
                Piece::Errors {
                    nonfield: true,
                    messages,
                } => st.nonfield_errors.extend(messages),
                Piece::Errors { messages, .. } => pending.extend(messages),
                Piece::Field(mut fld) => {
                    if fld.is_visible() {
                        fld.errors.append(&mut pending);
                    }
                    st.fields.push(fld);
                }
            }
        }
        if !pending.is_empty() {
            match st.fields.iter_mut().rev().find(|f| f.is_visible()) {
                Some(last) => last.errors.append(&mut pending),
                None => st.nonfield_errors.append(&mut pending),
            }
        }
        st
    }

    pub fn field_by_id(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id.as_deref() == Some(id))
    }

    pub fn field_by_id_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id.as_deref() == Some(id))
    }

    /// Current value of the control `#id`, empty when absent.
    pub fn value_of(&self, id: &str) -> &str {
        self.field_by_id(id).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Successful controls in document order, the way a browser builds
    /// form data: unnamed and disabled controls are skipped, unchecked
    /// checkboxes contribute nothing.
    pub fn serialize(&self, combo: Option<&ComboBox>) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for f in &self.fields {
            if f.name.is_empty() || f.disabled {
                continue;
            }
            let value = match &f.kind {
                FieldKind::Checkbox if !f.checked => continue,
                FieldKind::Select { options, selected } => match options.get(*selected) {
                    Some((v, _)) => v.clone(),
                    None => continue,
                },
                FieldKind::Combo => match combo {
                    Some(cb) => cb.committed().to_string(),
                    None => f.value.clone(),
                },
                _ => f.value.clone(),
            };
            out.push((f.name.clone(), value));
        }
        out
    }
}

fn label_text(l: &Element) -> String {
    l.text().trim_end_matches(':').trim().to_string()
}

fn is_control(e: &Element) -> bool {
    matches!(e.tag.as_str(), "input" | "select" | "textarea" | "label")
}

fn scan(
    el: &Element,
    labels: &HashMap<String, String>,
    wrapping_label: Option<&str>,
    st: &mut FormState,
    pieces: &mut Vec<Piece>,
) {
    for child in el.child_elements() {
        if child.has_attr("data-close-modal") {
            let t = child.text();
            st.cancel_label = Some(if t.is_empty() { "Cancel".into() } else { t });
            continue;
        }
        if child.id() == Some(ERRORS_ID) {
            st.error_box = Some(ErrorPanel {
                visible: !child.has_attr("hidden"),
                heading: child.find(|e| e.tag == "strong").map(|s| s.text()),
                messages: child.find_all(|e| e.tag == "li").iter().map(|li| li.text()).collect(),
            });
            continue;
        }
        match child.tag.as_str() {
            "input" | "select" | "textarea" => {
                if let Some(fld) = field_from(child, labels, wrapping_label, st) {
                    pieces.push(Piece::Field(fld));
                }
            }
            "ul" if child.has_class("errorlist") => pieces.push(Piece::Errors {
                nonfield: child.has_class("nonfield"),
                messages: child.find_all(|e| e.tag == "li").iter().map(|li| li.text()).collect(),
            }),
            "button" => {
                if child.attr("type").unwrap_or("submit") == "submit" {
                    st.submit_label = Some(child.text());
                    st.submit_disabled = child.has_attr("disabled");
                }
            }
            "label" => {
                let wraps = child.find(|e| e.tag != "label" && is_control(e)).is_some();
                if wraps {
                    let text = label_text(child);
                    scan(child, labels, Some(text.as_str()), st, pieces);
                }
            }
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" if child.find(is_control).is_none() => {
                let t = child.text();
                if !t.is_empty() {
                    st.notes.push(t);
                }
            }
            _ => scan(child, labels, wrapping_label, st, pieces),
        }
    }
}

fn field_from(
    el: &Element,
    labels: &HashMap<String, String>,
    wrapping_label: Option<&str>,
    st: &mut FormState,
) -> Option<FormField> {
    let id = el.id().map(str::to_string);
    let name = el.attr("name").unwrap_or("").to_string();
    let (kind, value, checked) = match el.tag.as_str() {
        "textarea" => (FieldKind::TextArea, el.raw_text(), false),
        "select" => {
            let opts = el.find_all(|e| e.tag == "option");
            let options: Vec<(String, String)> = opts
                .iter()
                .map(|o| {
                    let label = o.text();
                    (o.attr("value").map(str::to_string).unwrap_or_else(|| label.clone()), label)
                })
                .collect();
            let selected = opts.iter().position(|o| o.has_attr("selected")).unwrap_or(0);
            let value = options.get(selected).map(|o| o.0.clone()).unwrap_or_default();
            (FieldKind::Select { options, selected }, value, false)
        }
        _ => {
            let ty = el.attr("type").unwrap_or("text").to_ascii_lowercase();
            let value = el.attr("value").unwrap_or("").to_string();
            match ty.as_str() {
                "hidden" => (FieldKind::Hidden, value, false),
                "checkbox" => (
                    FieldKind::Checkbox,
                    el.attr("value").unwrap_or("on").to_string(),
                    el.has_attr("checked"),
                ),
                "date" => (FieldKind::Date, sanitize_date(&value), false),
                "number" => (FieldKind::Number, value, false),
                "submit" => {
                    st.submit_label = Some(if value.is_empty() { "Submit".into() } else { value });
                    st.submit_disabled = el.has_attr("disabled");
                    return None;
                }
                "button" | "reset" | "image" | "file" | "radio" => return None,
                _ => (FieldKind::Text, value, false),
            }
        }
    };
    let label = id
        .as_ref()
        .and_then(|i| labels.get(i).cloned())
        .or_else(|| wrapping_label.map(str::to_string))
        .or_else(|| el.attr("placeholder").map(str::to_string))
        .unwrap_or_else(|| name.clone());
    Some(FormField {
        name,
        id,
        label,
        kind,
        value,
        checked,
        min: el.attr("min").map(str::to_string),
        max: el.attr("max").map(str::to_string),
        required: el.has_attr("required"),
        disabled: el.has_attr("disabled"),
        errors: Vec::new(),
    })
}

/// What a date control keeps of typed text: `YYYY-M-D` is padded to
/// `YYYY-MM-DD`, anything that is not a calendar date becomes empty.
pub fn sanitize_date(raw: &str) -> String {
    let parts: Vec<&str> = raw.trim().split('-').collect();
    if parts.len() != 3 {
        return String::new();
    }
    let (y, m, d) = (parts[0], parts[1], parts[2]);
    if y.len() != 4 || !all_digits(y, 4) || !all_digits(m, 2) || !all_digits(d, 2) {
        return String::new();
    }
    let (Ok(year), Ok(month), Ok(day)) = (y.parse::<u32>(), m.parse::<u32>(), d.parse::<u32>())
    else {
        return String::new();
    };
    if year == 0 || !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return String::new();
    }
    format!("{year:04}-{month:02}-{day:02}")
}

fn all_digits(s: &str, max_len: usize) -> bool {
    !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit())
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Renders the form and returns the rect of the combobox input line, if it
/// is on screen, so the caller can anchor the option panel to it.
pub fn draw_form(
    f: &mut Frame,
    area: Rect,
    title: &str,
    form: &FormState,
    combo: Option<&ComboBox>,
    focus: Option<Focus>,
    cursor_on: bool,
) -> Option<Rect> {
    let mut lines: Vec<Line> = Vec::new();
    let mut focus_line = 0usize;
    let mut combo_line: Option<(usize, u16)> = None;

    for e in &form.nonfield_errors {
        lines.push(Line::from(Span::styled(format!("! {e}"), crate::theme::text_error())));
    }
    if let Some(panel) = form.error_box.as_ref().filter(|p| p.visible) {
        let heading = panel.heading.clone().unwrap_or_else(|| ERRORS_HEADING.into());
        lines.push(Line::from(Span::styled(
            heading,
            crate::theme::text_error().add_modifier(Modifier::BOLD),
        )));
        for m in &panel.messages {
            lines.push(Line::from(Span::styled(format!("  • {m}"), crate::theme::text_error())));
        }
    }
    for n in &form.notes {
        lines.push(Line::from(n.clone()));
    }
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }

    for (i, fld) in form.fields.iter().enumerate() {
        if !fld.is_visible() {
            continue;
        }
        let focused = focus == Some(Focus::Field(i));
        if focused {
            focus_line = lines.len();
        }
        let sel = if focused { '›' } else { ' ' };
        let req = if fld.required { " *" } else { "" };
        let prefix = format!("{sel} {}{req}: ", fld.label);
        let value_style = if focused {
            crate::theme::text_editing_bold()
        } else {
            Style::default()
        };
        match &fld.kind {
            FieldKind::Text | FieldKind::Number | FieldKind::Date => {
                let mut spans = vec![Span::raw(prefix)];
                if fld.value.is_empty() && !focused && fld.kind == FieldKind::Date {
                    spans.push(Span::styled("YYYY-MM-DD", crate::theme::text_muted()));
                } else {
                    let mut val = fld.value.clone();
                    if focused && cursor_on {
                        val.push('▏');
                    }
                    spans.push(Span::styled(val, value_style));
                }
                let hint = match fld.kind {
                    FieldKind::Date => fld
                        .min
                        .as_ref()
                        .filter(|m| !m.is_empty())
                        .map(|m| format!("  (from {m})")),
                    FieldKind::Number => match (fld.min.as_deref(), fld.max.as_deref()) {
                        (Some(lo), Some(hi)) => Some(format!("  ({lo}-{hi})")),
                        (Some(lo), None) => Some(format!("  (min {lo})")),
                        (None, Some(hi)) => Some(format!("  (max {hi})")),
                        (None, None) => None,
                    },
                    _ => None,
                };
                if let Some(hint) = hint {
                    spans.push(Span::styled(hint, crate::theme::text_muted()));
                }
                lines.push(Line::from(spans));
            }
            FieldKind::TextArea => {
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} {}{req}:", fld.label)),
                    Span::styled(
                        if focused { "  (Enter to edit)" } else { "" },
                        crate::theme::text_muted(),
                    ),
                ]));
                let body: Vec<&str> = if fld.value.is_empty() {
                    vec![""]
                } else {
                    fld.value.lines().collect()
                };
                for bl in body.iter().take(TEXTAREA_PREVIEW_LINES) {
                    lines.push(Line::from(vec![
                        Span::raw("    "),
                        Span::styled(bl.to_string(), value_style),
                    ]));
                }
                if body.len() > TEXTAREA_PREVIEW_LINES {
                    let more = body.len() - TEXTAREA_PREVIEW_LINES;
                    lines.push(Line::from(Span::styled(
                        format!("    … ({} more line{})", more, if more == 1 { "" } else { "s" }),
                        crate::theme::text_muted(),
                    )));
                }
            }
            FieldKind::Checkbox => {
                let mark = if fld.checked { "[x]" } else { "[ ]" };
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} ")),
                    Span::styled(format!("{mark} {}", fld.label), value_style),
                ]));
            }
            FieldKind::Select { options, selected } => {
                let label = options.get(*selected).map(|o| o.1.as_str()).unwrap_or("");
                lines.push(Line::from(vec![
                    Span::raw(prefix),
                    Span::styled(format!("‹ {label} ›"), value_style),
                ]));
            }
            FieldKind::Combo => {
                let mut spans = vec![Span::raw(prefix.clone())];
                if let Some(cb) = combo {
                    spans.extend(cb.input_line(cursor_on));
                }
                combo_line = Some((lines.len(), prefix.chars().count() as u16));
                lines.push(Line::from(spans));
            }
            FieldKind::Hidden => {}
        }
        for e in &fld.errors {
            lines.push(Line::from(Span::styled(
                format!("    {e}"),
                crate::theme::text_error(),
            )));
        }
    }

    lines.push(Line::from(""));
    let mut buttons: Vec<Span> = Vec::new();
    if let Some(label) = &form.submit_label {
        if focus == Some(Focus::Submit) {
            focus_line = lines.len();
        }
        let style = if form.submit_disabled {
            crate::theme::text_muted()
        } else if focus == Some(Focus::Submit) {
            crate::theme::list_cursor_style()
        } else {
            crate::theme::text_active_bold()
        };
        buttons.push(Span::styled(format!("[ {label} ]"), style));
        buttons.push(Span::raw("  "));
    }
    if let Some(label) = &form.cancel_label {
        if focus == Some(Focus::Cancel) {
            focus_line = lines.len();
        }
        let style = if focus == Some(Focus::Cancel) {
            crate::theme::list_cursor_style()
        } else {
            Style::default()
        };
        buttons.push(Span::styled(format!("[ {label} ]"), style));
    }
    lines.push(Line::from(buttons));

    let block = panel_block(title, true);
    let inner = block.inner(area);
    let scroll = focus_line.saturating_sub(inner.height.saturating_sub(2) as usize) as u16;
    f.render_widget(
        Paragraph::new(lines).block(block).scroll((scroll, 0)),
        area,
    );

    let (line, indent) = combo_line?;
    let y = (line as u16).checked_sub(scroll)?;
    if y >= inner.height {
        return None;
    }
    Some(Rect::new(
        inner.x + indent.min(inner.width),
        inner.y + y,
        inner.width.saturating_sub(indent),
        1,
    ))
}
