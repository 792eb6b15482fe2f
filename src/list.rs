use crate::dom::Element;
use crate::model::ItemAction;

pub const ITEM_ID_PREFIX: &str = "lp-item-";
pub const ACTION_CLASS: &str = "lp-action";

#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub key: Option<String>,
    pub element: Element,
}

impl ListItem {
    pub fn new(element: Element) -> Self {
        Self {
            key: item_key(&element),
            element,
        }
    }

    pub fn title(&self) -> String {
        self.element.text()
    }

    /// Action triggers inside the item, as `(id, action)` pairs.
    pub fn actions(&self) -> Vec<(String, ItemAction)> {
        self.element
            .find_all(|e| e.has_class(ACTION_CLASS))
            .into_iter()
            .filter_map(|btn| {
                let action = btn.attr("data-action").and_then(ItemAction::parse)?;
                let id = btn
                    .attr("data-id")
                    .map(str::to_string)
                    .or_else(|| self.key.clone())?;
                Some((id, action))
            })
            .collect()
    }

    /// Id to use for `action`: the matching trigger's id, else the item key.
    pub fn action_target(&self, action: ItemAction) -> Option<String> {
        self.actions()
            .into_iter()
            .find(|(_, a)| *a == action)
            .map(|(id, _)| id)
            .or_else(|| self.key.clone())
    }
}

/// The single lookup key of a list item: `data-id`, else the suffix of an
/// `lp-item-<id>` element id.
pub fn item_key(el: &Element) -> Option<String> {
    el.attr("data-id")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            el.id()
                .and_then(|id| id.strip_prefix(ITEM_ID_PREFIX))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
}

/// Items of the list container, in display order. All lookups go through the
/// key computed once when an item enters the list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemList {
    items: Vec<ListItem>,
}

impl ItemList {
    pub fn from_container(container: &Element) -> Self {
        Self {
            items: container
                .child_elements()
                .cloned()
                .map(ListItem::new)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ListItem> {
        self.items.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListItem> {
        self.items.iter()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|it| it.key.as_deref() == Some(id))
    }

    pub fn prepend(&mut self, element: Element) {
        self.items.insert(0, ListItem::new(element));
    }

    /// Replace the item keyed `id` in place. Returns false when absent.
    pub fn replace(&mut self, id: &str, element: Element) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.items[pos] = ListItem::new(element);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{first_element, parse_fragment};

    fn list_of(html: &str) -> ItemList {
        let root = Element::root(parse_fragment(html));
        ItemList::from_container(root.by_id("lp-list").unwrap())
    }

    #[test]
    fn key_prefers_data_id_then_element_id() {
        let a = first_element(r#"<li data-id="9" id="lp-item-3">a</li>"#).unwrap();
        assert_eq!(item_key(&a).as_deref(), Some("9"));
        let b = first_element(r#"<li id="lp-item-3">b</li>"#).unwrap();
        assert_eq!(item_key(&b).as_deref(), Some("3"));
        let c = first_element(r#"<li id="other">c</li>"#).unwrap();
        assert_eq!(item_key(&c), None);
    }

    #[test]
    fn replace_keeps_position_and_remove_drops() {
        let mut list = list_of(
            r#"<ul id="lp-list"><li data-id="1">one</li><li data-id="42">old</li><li data-id="3">three</li></ul>"#,
        );
        let new = first_element(r#"<li data-id="42">new</li>"#).unwrap();
        assert!(list.replace("42", new));
        assert_eq!(list.position("42"), Some(1));
        assert_eq!(list.get(1).unwrap().title(), "new");
        assert!(!list.replace("77", first_element("<li>x</li>").unwrap()));
        assert!(list.remove("1"));
        assert!(!list.remove("1"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn actions_read_trigger_ids_and_names() {
        let list = list_of(
            r#"<ul id="lp-list"><li id="lp-item-5"><span>Semeru</span>
               <button class="lp-action" data-action="edit" data-id="5">Edit</button>
               <button class="lp-action" data-action="share">Share</button>
               <button class="lp-action" data-action="delete">Delete</button></li></ul>"#,
        );
        let item = list.get(0).unwrap();
        let acts = item.actions();
        assert_eq!(
            acts,
            vec![
                ("5".to_string(), ItemAction::Edit),
                ("5".to_string(), ItemAction::Delete)
            ]
        );
        assert_eq!(item.action_target(ItemAction::Delete).as_deref(), Some("5"));
    }
}
