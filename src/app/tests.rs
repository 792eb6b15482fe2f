use super::*;
use crate::dom::parse_fragment;
use crate::page::PageContext;
use crate::widgets::form::tests::LOG_FORM;

const PAGE: &str = r#"<div id="lp-root" data-create-url="/log/new/">
  <ul id="lp-list">
    <li data-id="1">Rinjani <button class="lp-action" data-action="edit" data-id="1">Edit</button></li>
    <li data-id="42">Semeru (old)</li>
  </ul>
  <p id="lp-empty" hidden>No logs yet.</p>
</div>"#;

const EMPTY_PAGE: &str = r#"<div id="lp-root" data-create-url="/log/new/">
  <ul id="lp-list"></ul>
  <p id="lp-empty">No logs yet.</p>
</div>"#;

fn state_for(html: &str) -> AppState {
    AppState {
        page: PageContext::from_nodes(parse_fragment(html), "/log/").unwrap(),
        ..Default::default()
    }
}

fn titles(st: &AppState) -> Vec<String> {
    st.page.list.iter().map(|it| it.title()).collect()
}

#[test]
fn create_success_prepends_and_hides_placeholder() {
    let mut st = state_for(EMPTY_PAGE);
    st.modal.open(LOG_FORM, "id_gunung");
    st.submitting = true;
    assert!(st.page.empty_visible());

    let effects = update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Saved {
            id: None,
            html: "\n<li data-id=\"7\">Merbabu</li>\n".into(),
        })),
    );
    assert_eq!(titles(&st), vec!["Merbabu".to_string()]);
    assert_eq!(st.page.list.position("7"), Some(0));
    assert!(!st.page.empty_visible());
    assert!(!st.modal.is_open());
    assert!(!st.submitting);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ShowToast {
            level: ToastLevel::Success,
            ..
        }]
    ));
}

#[test]
fn create_success_goes_before_existing_items() {
    let mut st = state_for(PAGE);
    update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Saved {
            id: None,
            html: "<li data-id=\"7\">Merbabu</li>".into(),
        })),
    );
    assert_eq!(st.page.list.len(), 3);
    assert_eq!(st.page.list.position("7"), Some(0));
    assert_eq!(st.fresh, Some(0));
}

#[test]
fn create_inserts_only_the_first_element_of_the_fragment() {
    let mut st = state_for(PAGE);
    update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Saved {
            id: None,
            html: "<li data-id=\"7\">Merbabu</li><li data-id=\"8\">Lawu</li>".into(),
        })),
    );
    assert_eq!(st.page.list.len(), 3);
    assert_eq!(st.page.list.position("7"), Some(0));
    assert_eq!(st.page.list.position("8"), None);
}

#[test]
fn create_with_elementless_fragment_still_hides_placeholder() {
    let mut st = state_for(EMPTY_PAGE);
    st.modal.open(LOG_FORM, "id_gunung");
    update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Saved {
            id: None,
            html: "saved".into(),
        })),
    );
    assert!(st.page.list.is_empty());
    assert!(!st.page.empty_visible());
    assert!(!st.modal.is_open());
}

#[test]
fn edit_success_replaces_in_place() {
    let mut st = state_for(PAGE);
    st.modal.open(LOG_FORM, "id_gunung");
    update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Saved {
            id: Some("42".into()),
            html: "<li data-id=\"42\">Semeru (new)</li>".into(),
        })),
    );
    assert_eq!(st.page.list.len(), 2);
    assert_eq!(st.page.list.position("42"), Some(1));
    assert_eq!(st.page.list.get(1).unwrap().title(), "Semeru (new)");
    assert_eq!(st.fresh, Some(1));
    assert!(!st.modal.is_open());
}

#[test]
fn edit_success_for_unknown_id_leaves_list_alone() {
    let mut st = state_for(PAGE);
    st.modal.open(LOG_FORM, "id_gunung");
    let before = st.page.list.clone();
    update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Saved {
            id: Some("99".into()),
            html: "<li data-id=\"99\">Lawu</li>".into(),
        })),
    );
    assert_eq!(st.page.list, before);
    assert!(!st.modal.is_open());
}

#[test]
fn rejected_submit_reopens_modal_with_server_markup() {
    let mut st = state_for(PAGE);
    st.modal.open(LOG_FORM, "id_gunung");
    let markup = LOG_FORM.replace("Entry already exists.", "Dates overlap.");
    let effects = update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Rejected(Decoded::Fragment {
            html: markup.clone(),
        }))),
    );
    assert!(effects.is_empty());
    assert!(st.alert.is_none());
    assert_eq!(st.modal.body(), Some(markup.as_str()));
    assert_eq!(
        st.modal.form().unwrap().form.nonfield_errors,
        vec!["Dates overlap.".to_string()]
    );
}

#[test]
fn rejected_submit_with_raw_body_shows_it() {
    let mut st = state_for(PAGE);
    update(
        &mut st,
        AppMsg::FormSubmitted(Ok(SubmitOutcome::Rejected(Decoded::Raw {
            text: "<p>Server Error (500)</p>".into(),
        }))),
    );
    let view = st.modal.view().unwrap();
    assert_eq!(view.lines, vec!["Server Error (500)".to_string()]);
}

#[test]
fn delete_of_last_item_shows_placeholder() {
    let mut st = state_for(
        r#"<div id="lp-root"><ul id="lp-list"><li id="lp-item-5">Lawu</li></ul>
           <p id="lp-empty" hidden>No logs yet.</p></div>"#,
    );
    st.modal.open(
        r#"<form id="lp-delete-form" action="/log/5/delete/"><button>Delete</button></form>"#,
        "id_gunung",
    );
    update(
        &mut st,
        AppMsg::DeleteSubmitted(Ok(DeleteOutcome::Deleted { id: "5".into() })),
    );
    assert!(st.page.list.is_empty());
    assert!(st.page.empty_visible());
    assert!(!st.modal.is_open());
}

#[test]
fn delete_keeps_placeholder_hidden_while_items_remain() {
    let mut st = state_for(PAGE);
    st.selected = 1;
    update(
        &mut st,
        AppMsg::DeleteSubmitted(Ok(DeleteOutcome::Deleted { id: "42".into() })),
    );
    assert_eq!(titles(&st).len(), 1);
    assert!(!st.page.empty_visible());
    assert_eq!(st.selected, 0);
}

#[test]
fn delete_failure_alerts_and_keeps_modal() {
    let mut st = state_for(PAGE);
    st.modal.open(
        r#"<form id="lp-delete-form" action="/log/42/delete/"><button>Delete</button></form>"#,
        "id_gunung",
    );
    update(
        &mut st,
        AppMsg::DeleteSubmitted(Ok(DeleteOutcome::Failed { status: 403 })),
    );
    assert_eq!(st.alert.as_deref(), Some(DELETE_FAILED));
    assert!(st.modal.is_open());
    assert_eq!(st.page.list.len(), 2);
}

#[test]
fn item_action_targets_derived_endpoint() {
    let mut st = state_for(PAGE);
    let effects = update(
        &mut st,
        AppMsg::ItemActionRequested {
            id: "42".into(),
            action: ItemAction::Delete,
        },
    );
    match effects.as_slice() {
        [Effect::FetchItemForm { url }] => assert_eq!(url, "/log/42/delete/"),
        _ => panic!("expected item form fetch"),
    }
}

#[test]
fn create_requested_uses_root_url_or_alerts() {
    let mut st = state_for(PAGE);
    match update(&mut st, AppMsg::CreateRequested).as_slice() {
        [Effect::FetchCreate { url }] => assert_eq!(url, "/log/new/"),
        _ => panic!("expected create fetch"),
    }

    let mut st = state_for(r#"<div id="lp-root"><ul id="lp-list"></ul></div>"#);
    assert!(update(&mut st, AppMsg::CreateRequested).is_empty());
    assert_eq!(st.alert.as_deref(), Some(NO_CREATE_URL));
}

#[test]
fn non_json_item_form_alerts_without_modal() {
    let mut st = state_for(PAGE);
    update(
        &mut st,
        AppMsg::ItemFormLoaded {
            url: "/log/1/edit/".into(),
            outcome: Ok(ItemFormFetch::NotJson {
                preview: "<html>login</html>".into(),
            }),
        },
    );
    assert_eq!(st.alert.as_deref(), Some(OPEN_FAILED));
    assert!(!st.modal.is_open());
}

#[test]
fn item_form_without_html_is_ignored() {
    let mut st = state_for(PAGE);
    update(
        &mut st,
        AppMsg::ItemFormLoaded {
            url: "/log/1/edit/".into(),
            outcome: Ok(ItemFormFetch::NoFragment),
        },
    );
    assert!(st.alert.is_none());
    assert!(!st.modal.is_open());
    assert!(st.debug_log.iter().any(|l| l.contains("no html")));
}

#[test]
fn create_form_opens_modal_from_either_decoding() {
    let mut st = state_for(PAGE);
    update(
        &mut st,
        AppMsg::CreateFormLoaded(Ok(Decoded::Raw {
            text: LOG_FORM.into(),
        })),
    );
    assert!(st.modal.form().is_some());
}

#[test]
fn transport_errors_alert_and_clear_in_flight_flag() {
    let mut st = state_for(PAGE);
    st.submitting = true;
    update(
        &mut st,
        AppMsg::FormSubmitted(Err("connection refused".into())),
    );
    assert!(!st.submitting);
    assert!(st.alert.as_deref().unwrap().contains("connection refused"));

    update(&mut st, AppMsg::AlertDismissed);
    assert!(st.alert.is_none());
}
