use crate::dom::first_element;
use crate::model::ItemAction;
use crate::services::crud::{DeleteOutcome, ItemFormFetch, SubmitOutcome};
use crate::services::envelope::Decoded;
use crate::ui::{AppState, ToastLevel};

pub const OPEN_FAILED: &str = "Could not open the form. Try reloading the page.";
pub const DELETE_FAILED: &str = "Delete failed.";
pub const NO_CREATE_URL: &str = "This page has no create endpoint.";

pub enum AppMsg {
    // CTA or FAB
    CreateRequested,
    ItemActionRequested {
        id: String,
        action: ItemAction,
    },
    CreateFormLoaded(Result<Decoded, String>),
    ItemFormLoaded {
        url: String,
        outcome: Result<ItemFormFetch, String>,
    },
    FormSubmitted(Result<SubmitOutcome, String>),
    DeleteSubmitted(Result<DeleteOutcome, String>),
    AlertDismissed,
}

#[derive(Debug)]
pub enum Effect {
    FetchCreate {
        url: String,
    },
    FetchItemForm {
        url: String,
    },
    SubmitForm {
        action: Option<String>,
        fields: Vec<(String, String)>,
    },
    SubmitDelete {
        action: Option<String>,
        fields: Vec<(String, String)>,
    },
    CloseModal,
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        CreateRequested => match state.page.create_url.clone() {
            Some(url) => {
                state.status_text = Some("Loading form…".into());
                effects.push(Effect::FetchCreate { url });
            }
            None => alert(state, NO_CREATE_URL),
        },
        ItemActionRequested { id, action } => {
            let url = state.page.action_path(&id, action);
            state.status_text = Some(format!("Loading {}…", action.as_str()));
            effects.push(Effect::FetchItemForm { url });
        }
        CreateFormLoaded(outcome) => {
            state.status_text = None;
            match outcome {
                Ok(decoded) => {
                    state.dbg("create form loaded");
                    open_modal(state, decoded.markup());
                }
                Err(e) => alert(state, &format!("Request failed: {e}")),
            }
        }
        ItemFormLoaded { url, outcome } => {
            state.status_text = None;
            match outcome {
                Ok(ItemFormFetch::Fragment(html)) => open_modal(state, &html),
                Ok(ItemFormFetch::NoFragment) => {
                    tracing::warn!(%url, "item form response has no html");
                    state.dbg(format!("no html in response from {url}"));
                }
                Ok(ItemFormFetch::NotJson { preview }) => {
                    tracing::error!(%url, %preview, "item form response is not JSON");
                    state.dbg(format!("non-JSON response from {url}"));
                    alert(state, OPEN_FAILED);
                }
                Err(e) => alert(state, &format!("Request failed: {e}")),
            }
        }
        FormSubmitted(outcome) => {
            state.submitting = false;
            state.status_text = None;
            match outcome {
                Ok(SubmitOutcome::Saved { id, html }) => {
                    apply_saved(state, id.as_deref(), &html);
                    state.modal.close();
                    effects.push(Effect::ShowToast {
                        text: "Saved".into(),
                        level: ToastLevel::Success,
                        seconds: 3,
                    });
                }
                Ok(SubmitOutcome::Rejected(decoded)) => {
                    state.dbg("submission rejected, re-rendering form");
                    open_modal(state, decoded.markup());
                }
                Err(e) => alert(state, &format!("Request failed: {e}")),
            }
        }
        DeleteSubmitted(outcome) => {
            state.submitting = false;
            state.status_text = None;
            match outcome {
                Ok(DeleteOutcome::Deleted { id }) => {
                    if state.page.list.remove(&id) {
                        tracing::info!(%id, "item removed");
                    } else {
                        tracing::warn!(%id, "deleted item not in list");
                    }
                    if state.page.list.is_empty() {
                        state.page.show_empty();
                    }
                    clamp_selection(state);
                    state.modal.close();
                    effects.push(Effect::ShowToast {
                        text: "Deleted".into(),
                        level: ToastLevel::Success,
                        seconds: 3,
                    });
                }
                Ok(DeleteOutcome::Failed { status }) => {
                    tracing::warn!(status, "delete rejected");
                    alert(state, DELETE_FAILED);
                }
                Err(e) => alert(state, &format!("Request failed: {e}")),
            }
        }
        AlertDismissed => state.alert = None,
    }
    effects
}

fn open_modal(state: &mut AppState, markup: &str) {
    let select_id = state.config.select_id.clone();
    state.modal.open(markup, &select_id);
}

/// Blocking message; the operation that raised it is abandoned.
fn alert(state: &mut AppState, text: &str) {
    tracing::error!(alert = %text);
    state.dbg(format!("alert: {text}"));
    state.alert = Some(text.to_string());
}

fn apply_saved(state: &mut AppState, id: Option<&str>, html: &str) {
    match id {
        Some(id) => {
            let Some(element) = first_element(html) else {
                state.dbg("saved fragment has no element");
                return;
            };
            if state.page.list.replace(id, element) {
                tracing::info!(%id, "item replaced");
                state.fresh = state.page.list.position(id);
            } else {
                tracing::warn!(%id, "updated item not in list");
            }
        }
        None => {
            // The placeholder goes away even when the fragment is empty
            state.page.hide_empty();
            let Some(element) = first_element(html) else {
                state.dbg("saved fragment has no element");
                return;
            };
            state.page.list.prepend(element);
            state.selected = 0;
            state.fresh = Some(0);
            tracing::info!("item prepended");
        }
    }
}

fn clamp_selection(state: &mut AppState) {
    let n = state.page.list.len();
    if n == 0 {
        state.selected = 0;
    } else if state.selected >= n {
        state.selected = n - 1;
    }
    state.fresh = None;
}

#[cfg(test)]
mod tests;
