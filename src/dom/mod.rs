//! In-memory document tree for server-rendered pages and fragments.

mod fragment;

pub use fragment::{first_element, parse_fragment};

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Wrap parsed nodes under a synthetic root so the whole document can be queried.
    pub fn root(children: Vec<Node>) -> Self {
        Self {
            tag: "#root".into(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Text content with whitespace runs collapsed to single spaces.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        collapse_whitespace(&raw)
    }

    /// Text of direct text children, untouched except for the single leading
    /// newline HTML drops after `<textarea>` and `<pre>`.
    pub fn raw_text(&self) -> String {
        let mut raw = String::new();
        for n in &self.children {
            if let Node::Text(t) = n {
                raw.push_str(t);
            }
        }
        let skip = if raw.starts_with("\r\n") {
            2
        } else if raw.starts_with('\n') {
            1
        } else {
            0
        };
        raw.split_off(skip)
    }

    fn collect_text(&self, out: &mut String) {
        for n in &self.children {
            match n {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => {
                    // Block-ish boundaries should not glue words together
                    out.push(' ');
                    e.collect_text(out);
                    out.push(' ');
                }
            }
        }
    }

    /// Depth-first search in document order, including `self`.
    pub fn find<P>(&self, pred: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool + Copy,
    {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find(pred))
    }

    pub fn find_all<P>(&self, pred: P) -> Vec<&Element>
    where
        P: Fn(&Element) -> bool + Copy,
    {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if pred(e) {
                out.push(e);
            }
        });
        out
    }

    /// Visit every element (self included) in document order.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for c in self.child_elements() {
            c.walk(visit);
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.find(|e| e.id() == Some(id))
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_and_text_walk_in_document_order() {
        let root = Element::root(parse_fragment(
            r#"<div id="a"><p class="x y">Hello <b>big</b>
               world</p><p class="x">second</p></div>"#,
        ));
        let a = root.by_id("a").unwrap();
        assert_eq!(a.tag, "div");
        let xs = root.find_all(|e| e.has_class("x"));
        assert_eq!(xs.len(), 2);
        assert_eq!(xs[0].text(), "Hello big world");
        assert!(xs[0].has_class("y"));
        assert!(!xs[1].has_class("y"));
    }

    #[test]
    fn attrs_and_tags_are_read_as_parsed() {
        let root = Element::root(parse_fragment(r#"<P ID="x" hidden data-id="3">t</P>"#));
        let p = root.by_id("x").unwrap();
        assert_eq!(p.tag, "p");
        assert!(p.has_attr("hidden"));
        assert_eq!(p.attr("data-id"), Some("3"));
        assert!(!p.has_attr("class"));
    }

    #[test]
    fn raw_text_keeps_line_breaks() {
        let root = Element::root(parse_fragment("<textarea>\nline one\n  line two &amp; more</textarea>"));
        let ta = root.find(|e| e.tag == "textarea").unwrap();
        assert_eq!(ta.raw_text(), "line one\n  line two & more");
    }
}
