//! Cross-field checks of the hiking-log form, recomputed live while the
//! user edits.

use crate::widgets::form::{ErrorPanel, FormState, ERRORS_HEADING};

pub const START_ID: &str = "id_start_date";
pub const END_ID: &str = "id_end_date";
pub const TEAM_ID: &str = "id_team_size";
pub const RATING_ID: &str = "id_rating";

pub const END_BEFORE_START: &str = "End date must not be earlier than the start date.";
pub const TEAM_TOO_SMALL: &str = "Team size must be at least 1.";
pub const RATING_OUT_OF_RANGE: &str = "Rating must be between 1 and 5.";

/// The four values the checks read; an absent control reads as empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormSnapshot {
    pub start_date: String,
    pub end_date: String,
    pub team_size: String,
    pub rating: String,
}

impl FormSnapshot {
    pub fn from_form(form: &FormState) -> Self {
        Self {
            start_date: form.value_of(START_ID).to_string(),
            end_date: form.value_of(END_ID).to_string(),
            team_size: form.value_of(TEAM_ID).to_string(),
            rating: form.value_of(RATING_ID).to_string(),
        }
    }
}

/// Numeric reading of a control value. Blank text is zero and anything
/// unparsable is NaN, so it never compares as out of range.
pub fn numeric(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

#[allow(clippy::manual_range_contains)]
pub fn compute_errors(s: &FormSnapshot) -> Vec<String> {
    let mut errs = Vec::new();
    // ISO dates compare correctly as strings
    if !s.start_date.is_empty() && !s.end_date.is_empty() && s.end_date < s.start_date {
        errs.push(END_BEFORE_START.to_string());
    }
    if !s.team_size.is_empty() && numeric(&s.team_size) < 1.0 {
        errs.push(TEAM_TOO_SMALL.to_string());
    }
    if !s.rating.is_empty() {
        let r = numeric(&s.rating);
        // NaN is in range here; a RangeInclusive check would reject it
        if r < 1.0 || r > 5.0 {
            errs.push(RATING_OUT_OF_RANGE.to_string());
        }
    }
    errs
}

/// Shows or clears the error box and toggles the submit control. Forms
/// without an `#lp-errors` box are left untouched.
pub fn render_errors(form: &mut FormState, errors: &[String]) {
    let Some(panel) = form.error_box.as_mut() else {
        return;
    };
    if errors.is_empty() {
        *panel = ErrorPanel::default();
        form.submit_disabled = false;
    } else {
        *panel = ErrorPanel {
            visible: true,
            heading: Some(ERRORS_HEADING.to_string()),
            messages: errors.to_vec(),
        };
        form.submit_disabled = true;
    }
}

/// End date may not precede the start date: its `min` follows the start,
/// and an end already before the start is cleared.
pub fn sync_min(form: &mut FormState) {
    let start = form.value_of(START_ID).to_string();
    if let Some(end) = form.field_by_id_mut(END_ID) {
        end.min = Some(start.clone());
        if !start.is_empty() && !end.value.is_empty() && end.value < start {
            end.value.clear();
        }
    }
}

pub fn revalidate(form: &mut FormState) {
    let errs = compute_errors(&FormSnapshot::from_form(form));
    render_errors(form, &errs);
}

/// Initial pass when the form is mounted.
pub fn attach(form: &mut FormState) {
    sync_min(form);
    revalidate(form);
}

/// A committed change of control `id` (focus left after an edit).
pub fn on_change(form: &mut FormState, id: &str) {
    match id {
        START_ID => {
            sync_min(form);
            revalidate(form);
        }
        END_ID => revalidate(form),
        _ => {}
    }
}

/// An edit keystroke in control `id`.
pub fn on_input(form: &mut FormState, id: &str) {
    if id == TEAM_ID || id == RATING_ID {
        revalidate(form);
    }
}
