mod app;
mod dom;
mod list;
mod logging;
mod model;
mod page;
mod services;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    ui::run()
}
