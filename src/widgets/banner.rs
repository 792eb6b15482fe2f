use ratatui::layout::Rect;
use ratatui::prelude::Frame;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::AppState;

/// Top banner: page title on the first line, the current carousel slide with
/// its position dots on the second.
pub fn draw_banner(f: &mut Frame, area: Rect, state: &AppState) {
    let border = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(if state.status_text.is_some() {
            crate::theme::border_focused()
        } else {
            crate::theme::text_muted()
        });
    let inner = border.inner(area);

    let title = if state.page.title.is_empty() {
        "hikelog".to_string()
    } else {
        state.page.title.clone()
    };
    let mut lines = vec![Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(label) = state.page.slides.get(state.carousel.index()) {
        let mut spans = vec![Span::styled(
            format!("▶ {label}  "),
            crate::theme::text_active_bold(),
        )];
        let dots: String = (0..state.carousel.len())
            .map(|i| if i == state.carousel.index() { '●' } else { '○' })
            .collect();
        spans.push(Span::styled(dots, crate::theme::text_muted()));
        lines.push(Line::from(spans));
    }
    f.render_widget(
        Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center),
        inner,
    );
    f.render_widget(border, area);
}
