pub mod banner;
pub mod carousel;
pub mod chrome;
pub mod combobox;
pub mod form;
pub mod form_widget;
pub mod modal;
pub mod status_bar;
pub mod validator;

use crate::app::Effect;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::prelude::*;
use std::any::Any;

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64);
    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let _ = key;
        Vec::new()
    }
    fn on_mouse(&mut self, ev: MouseEvent) -> Vec<Effect> {
        let _ = ev;
        Vec::new()
    }
    // True while the widget needs Escape for itself (an open text editor)
    fn captures_escape(&self) -> bool {
        false
    }
    fn as_any(&self) -> &dyn Any;
}
