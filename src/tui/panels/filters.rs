//! Filters step: optional minimum size and dimensions

use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::engine::Engine;
use crate::tui::styles::Theme;
use crate::wizard::StepController;

const LABELS: [&str; 3] = [
    "Minimum file size (bytes)",
    "Minimum width (px)",
    "Minimum height (px)",
];

#[derive(Default)]
pub struct FiltersPanel {
    inputs: [Input; 3],
    focus: usize,
}

/// `parseInt(value) || null` semantics: empty, unparsable, and zero all
/// mean "filter off".
fn parse_filter<T: std::str::FromStr + PartialEq + From<u8>>(value: &str) -> Option<T> {
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|v| *v != T::from(0u8))
}

impl FiltersPanel {
    pub async fn handle_key<E: Engine>(
        &mut self,
        key: KeyEvent,
        controller: &mut StepController<E>,
    ) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.inputs.len();
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.checked_sub(1).unwrap_or(self.inputs.len() - 1);
                return;
            }
            KeyCode::Char(c) if !c.is_ascii_digit() => return,
            _ => {}
        }

        let input = &mut self.inputs[self.focus];
        let before = input.value().to_string();
        input.handle_event(&Event::Key(key));
        if input.value() == before {
            return;
        }

        let value = input.value().to_string();
        match self.focus {
            0 => controller.set_min_size(parse_filter(&value)).await,
            1 => controller.set_min_width(parse_filter(&value)).await,
            _ => controller.set_min_height(parse_filter(&value)).await,
        }
    }

    pub fn render<E: Engine>(
        &self,
        frame: &mut Frame,
        area: Rect,
        _controller: &StepController<E>,
        theme: &Theme,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        let intro = Paragraph::new(Line::from(Span::styled(
            "Skip images below these limits. Leave a field empty (or zero) to keep everything.",
            Style::default().fg(theme.dimmed),
        )))
        .wrap(Wrap { trim: true });
        frame.render_widget(intro, chunks[0]);

        for (i, input) in self.inputs.iter().enumerate() {
            let focused = i == self.focus;
            let border = if focused {
                Style::default().fg(theme.accent)
            } else {
                Style::default().fg(theme.dimmed)
            };
            let widget = Paragraph::new(input.value()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!(" {} ", LABELS[i])),
            );
            frame.render_widget(widget, chunks[i + 1]);

            if focused {
                frame.set_cursor_position((
                    chunks[i + 1].x + 1 + input.visual_cursor() as u16,
                    chunks[i + 1].y + 1,
                ));
            }
        }

        let help = Line::from(Span::styled(
            "Tab next field   digits edit",
            Style::default().fg(theme.dimmed),
        ));
        frame.render_widget(Paragraph::new(help), chunks[4]);
    }
}
