//! Run-completion dialog
//!
//! Presented once the engine reports `relocating-complete`. Acknowledging
//! it is the only path to the full reset, so the dialog offers a single
//! OK button and cannot be dismissed any other way.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use super::DialogResult;
use crate::tui::styles::Theme;

pub struct CompletionDialog {
    total: u64,
    past_tense: &'static str,
    destination: String,
}

impl CompletionDialog {
    pub fn new(total: u64, past_tense: &'static str, destination: String) -> Self {
        Self {
            total,
            past_tense,
            destination,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogResult<()> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => DialogResult::Submit(()),
            _ => DialogResult::Continue,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let dialog_width = 60;
        let dialog_height = 9;
        let x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
        let y = area.y + (area.height.saturating_sub(dialog_height)) / 2;

        let dialog_area = Rect {
            x,
            y,
            width: dialog_width.min(area.width),
            height: dialog_height.min(area.height),
        };

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.ok))
            .title(" Organised ")
            .title_style(Style::default().fg(theme.ok).bold());

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(1), Constraint::Length(2)])
            .split(inner);

        let lines = vec![
            Line::from("Your images have been organised!"),
            Line::from(Span::styled(
                self.destination.clone(),
                Style::default().fg(theme.accent),
            )),
            Line::from(format!(
                "In total, {} files were {}",
                self.total, self.past_tense
            )),
            Line::from(Span::styled(
                "o opens the destination",
                Style::default().fg(theme.dimmed),
            )),
        ];
        let message = Paragraph::new(lines)
            .style(Style::default().fg(theme.text))
            .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[0]);

        let button = Line::from(Span::styled(
            "[OK]",
            Style::default().fg(theme.ok).bold(),
        ));
        frame.render_widget(
            Paragraph::new(button).alignment(Alignment::Center),
            chunks[1],
        );
    }
}
