use crate::services::crud::CrudClient;
use crate::ui::{LoadKind, LoadMsg, LoadOutcome};
use std::sync::mpsc::Sender;
use std::thread;

// Each request runs on its own thread and reports back through the UI channel.
fn spawn_request<F>(key: String, kind: LoadKind, tx: Sender<LoadMsg>, work: F)
where
    F: FnOnce() -> Result<LoadOutcome, String> + Send + 'static,
{
    thread::spawn(move || {
        let outcome = work();
        if let Err(e) = &outcome {
            tracing::warn!(%key, error = %e, "request failed");
        }
        let _ = tx.send(LoadMsg { key, outcome, kind });
    });
}

pub fn spawn_fetch_create(client: CrudClient, url: String, tx: Sender<LoadMsg>) {
    let target = url.clone();
    spawn_request(url, LoadKind::CreateForm, tx, move || {
        client
            .fetch_create(&target)
            .map(LoadOutcome::CreateForm)
            .map_err(|e| format!("{e}"))
    });
}

pub fn spawn_fetch_item_form(client: CrudClient, url: String, tx: Sender<LoadMsg>) {
    let target = url.clone();
    spawn_request(url, LoadKind::ItemForm, tx, move || {
        client
            .fetch_item_form(&target)
            .map(LoadOutcome::ItemForm)
            .map_err(|e| format!("{e}"))
    });
}

pub fn spawn_submit_form(
    client: CrudClient,
    action: String,
    fields: Vec<(String, String)>,
    tx: Sender<LoadMsg>,
) {
    let target = action.clone();
    spawn_request(action, LoadKind::Submit, tx, move || {
        client
            .submit_form(&target, &fields)
            .map(LoadOutcome::Submitted)
            .map_err(|e| format!("{e}"))
    });
}

pub fn spawn_submit_delete(
    client: CrudClient,
    action: String,
    fields: Vec<(String, String)>,
    tx: Sender<LoadMsg>,
) {
    let target = action.clone();
    spawn_request(action, LoadKind::Delete, tx, move || {
        client
            .submit_delete(&target, &fields)
            .map(LoadOutcome::Deleted)
            .map_err(|e| format!("{e}"))
    });
}
