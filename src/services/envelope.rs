//! Response decoding. Every body is classified exactly once here; the rest of
//! the app only sees the typed results.

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A fetched form body: the `html` of a JSON envelope, or the body as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    Fragment { html: String },
    Raw { text: String },
}

impl Decoded {
    pub fn from_body(text: &str) -> Self {
        if let Ok(JsonValue::Object(map)) = serde_json::from_str::<JsonValue>(text) {
            if let Some(html) = map.get("html") {
                return Self::Fragment {
                    html: markup_of(html),
                };
            }
        }
        Self::Raw {
            text: text.to_string(),
        }
    }

    pub fn markup(&self) -> &str {
        match self {
            Self::Fragment { html } => html,
            Self::Raw { text } => text,
        }
    }
}

fn markup_of(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    ok: Option<JsonValue>,
    #[serde(default)]
    id: Option<JsonValue>,
    #[serde(default)]
    html: Option<JsonValue>,
}

/// `{ ok, id?, html? }` as returned by the create/edit/delete endpoints.
/// Falsy JSON values (`false`, `0`, `""`, `null`) read as absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    pub ok: bool,
    pub id: Option<String>,
    pub html: Option<String>,
}

impl Envelope {
    /// None when the body is not a JSON object.
    pub fn parse(text: &str) -> Option<Self> {
        let v: JsonValue = serde_json::from_str(text).ok()?;
        if !v.is_object() {
            return None;
        }
        let raw: RawEnvelope = serde_json::from_value(v).unwrap_or_default();
        Some(Self {
            ok: raw.ok.as_ref().map(truthy).unwrap_or(false),
            id: raw.id.as_ref().and_then(id_key),
            html: raw
                .html
                .as_ref()
                .filter(|h| truthy(h))
                .map(markup_of),
        })
    }
}

fn truthy(v: &JsonValue) -> bool {
    match v {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

pub fn id_key(v: &JsonValue) -> Option<String> {
    if !truthy(v) {
        return None;
    }
    match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
