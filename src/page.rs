//! Page context: the fixed landmarks of the list page, located once at
//! bootstrap and handed to the components that need them.

use crate::dom::{Element, Node};
use crate::list::ItemList;
use crate::model::ItemAction;
use thiserror::Error;

pub const ROOT_ID: &str = "lp-root";
pub const CTA_ID: &str = "lp-cta";
pub const FAB_ID: &str = "lp-fab";
pub const LIST_ID: &str = "lp-list";
pub const EMPTY_ID: &str = "lp-empty";
pub const CAROUSEL_ID: &str = "carousel-inner";

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("page has no #lp-root element")]
    MissingRoot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placeholder {
    pub text: String,
    pub hidden: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageContext {
    pub title: String,
    pub create_url: Option<String>,
    // Path of the current page, used to derive item endpoints
    pub page_path: String,
    pub cta_label: Option<String>,
    pub fab_label: Option<String>,
    pub list: ItemList,
    pub empty: Option<Placeholder>,
    pub slides: Vec<String>,
}

impl PageContext {
    pub fn from_nodes(nodes: Vec<Node>, page_path: &str) -> Result<Self, PageError> {
        let doc = Element::root(nodes);
        let root = doc.by_id(ROOT_ID).ok_or(PageError::MissingRoot)?;
        let title = doc
            .find(|e| e.tag == "h1")
            .or_else(|| doc.find(|e| e.tag == "title"))
            .map(|e| e.text())
            .unwrap_or_default();
        let list = doc
            .by_id(LIST_ID)
            .map(ItemList::from_container)
            .unwrap_or_default();
        let empty = doc.by_id(EMPTY_ID).map(|e| Placeholder {
            text: e.text(),
            hidden: e.has_attr("hidden"),
        });
        let slides = doc
            .by_id(CAROUSEL_ID)
            .map(|c| c.child_elements().map(slide_label).collect())
            .unwrap_or_default();
        Ok(Self {
            title,
            create_url: root
                .attr("data-create-url")
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            page_path: page_path.to_string(),
            cta_label: doc.by_id(CTA_ID).map(|e| e.text()),
            fab_label: doc.by_id(FAB_ID).map(|e| e.text()),
            list,
            empty,
            slides,
        })
    }

    pub fn base_path(&self) -> &str {
        self.page_path.strip_suffix('/').unwrap_or(&self.page_path)
    }

    /// `<base>/<id>/<action>/` for a list-item action.
    pub fn action_path(&self, id: &str, action: ItemAction) -> String {
        format!("{}/{}/{}/", self.base_path(), id, action.as_str())
    }

    pub fn empty_visible(&self) -> bool {
        self.empty.as_ref().map(|p| !p.hidden).unwrap_or(false)
    }

    pub fn hide_empty(&mut self) {
        if let Some(p) = &mut self.empty {
            p.hidden = true;
        }
    }

    pub fn show_empty(&mut self) {
        if let Some(p) = &mut self.empty {
            p.hidden = false;
        }
    }
}

fn slide_label(slide: &Element) -> String {
    slide
        .find(|e| e.tag == "img")
        .and_then(|img| img.attr("alt"))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .or_else(|| slide.attr("title").map(str::to_string))
        .unwrap_or_else(|| slide.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    const PAGE: &str = r#"<html><head><title>Log</title></head><body>
        <div id="lp-root" data-create-url="/log/new/">
          <h1>Log Pendakian</h1>
          <button id="lp-cta">Tambah log</button>
          <div id="carousel-inner"><div><img src="a.jpg" alt="Rinjani"></div><div title="Semeru"></div></div>
          <ul id="lp-list"><li data-id="1">one</li></ul>
          <div id="lp-empty" hidden>Belum ada log.</div>
          <button id="lp-fab">+</button>
        </div></body></html>"#;

    #[test]
    fn builds_context_from_landmarks() {
        let ctx = PageContext::from_nodes(parse_fragment(PAGE), "/log/").unwrap();
        assert_eq!(ctx.title, "Log Pendakian");
        assert_eq!(ctx.create_url.as_deref(), Some("/log/new/"));
        assert_eq!(ctx.cta_label.as_deref(), Some("Tambah log"));
        assert_eq!(ctx.fab_label.as_deref(), Some("+"));
        assert_eq!(ctx.list.len(), 1);
        assert!(!ctx.empty_visible());
        assert_eq!(ctx.slides, vec!["Rinjani".to_string(), "Semeru".to_string()]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = PageContext::from_nodes(parse_fragment("<p>login</p>"), "/log/").unwrap_err();
        assert_eq!(err, PageError::MissingRoot);
    }

    #[test]
    fn action_path_strips_one_trailing_slash() {
        let mut ctx = PageContext {
            page_path: "/log/".into(),
            ..Default::default()
        };
        assert_eq!(ctx.action_path("42", ItemAction::Edit), "/log/42/edit/");
        ctx.page_path = "/log".into();
        assert_eq!(ctx.action_path("42", ItemAction::Delete), "/log/42/delete/");
    }

    #[test]
    fn placeholder_toggles() {
        let mut ctx = PageContext::from_nodes(parse_fragment(PAGE), "/log/").unwrap();
        ctx.show_empty();
        assert!(ctx.empty_visible());
        ctx.hide_empty();
        assert!(!ctx.empty_visible());
    }
}
