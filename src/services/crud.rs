use crate::services::csrf::{TokenProvider, FORM_TOKEN_FIELD};
use crate::services::envelope::{Decoded, Envelope};
use crate::services::transport::{
    HttpResponse, Transport, TransportError, CSRF_HEADER, REQUESTED_WITH,
};
use std::sync::Arc;

/// Result of fetching an edit/delete fragment.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemFormFetch {
    Fragment(String),
    // JSON object without `html`
    NoFragment,
    NotJson { preview: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Saved { id: Option<String>, html: String },
    Rejected(Decoded),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeleteOutcome {
    Deleted { id: String },
    Failed { status: u16 },
}

/// Background requests of the create/edit/delete workflow.
#[derive(Clone)]
pub struct CrudClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
}

impl CrudClient {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { transport, tokens }
    }

    pub fn fetch_page(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.transport.get(url, &[])
    }

    pub fn fetch_create(&self, url: &str) -> Result<Decoded, TransportError> {
        let res = self.transport.get(url, &[REQUESTED_WITH])?;
        Ok(Decoded::from_body(&res.body))
    }

    pub fn fetch_item_form(&self, url: &str) -> Result<ItemFormFetch, TransportError> {
        let res = self.transport.get(url, &[REQUESTED_WITH])?;
        let out = match serde_json::from_str::<serde_json::Value>(&res.body) {
            Ok(v) if !v.is_null() => match Envelope::parse(&res.body).and_then(|e| e.html) {
                Some(html) => ItemFormFetch::Fragment(html),
                None => ItemFormFetch::NoFragment,
            },
            _ => ItemFormFetch::NotJson {
                preview: res.body.chars().take(500).collect(),
            },
        };
        Ok(out)
    }

    pub fn submit_form(
        &self,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<SubmitOutcome, TransportError> {
        let token = self.tokens.token().unwrap_or_default();
        let headers = [(CSRF_HEADER, token.as_str()), REQUESTED_WITH];
        let res = self.transport.post_form(action, &headers, fields)?;
        if res.is_success() {
            if let Some(Envelope {
                ok: true,
                id,
                html: Some(html),
            }) = Envelope::parse(&res.body)
            {
                return Ok(SubmitOutcome::Saved { id, html });
            }
        }
        Ok(SubmitOutcome::Rejected(Decoded::from_body(&res.body)))
    }

    pub fn submit_delete(
        &self,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<DeleteOutcome, TransportError> {
        let token = fields
            .iter()
            .find(|(k, v)| k == FORM_TOKEN_FIELD && !v.is_empty())
            .map(|(_, v)| v.clone())
            .or_else(|| self.tokens.token())
            .unwrap_or_default();
        let headers = [(CSRF_HEADER, token.as_str()), REQUESTED_WITH];
        let res = self.transport.post_form(action, &headers, fields)?;
        if res.is_success() {
            if let Some(Envelope {
                ok: true,
                id: Some(id),
                ..
            }) = Envelope::parse(&res.body)
            {
                return Ok(DeleteOutcome::Deleted { id });
            }
        }
        Ok(DeleteOutcome::Failed { status: res.status })
    }
}
