//! Naming step: template editing with live fixture previews

use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::engine::Engine;
use crate::tui::styles::Theme;
use crate::wizard::{preview, StepController, PLACEHOLDERS};

#[derive(Default)]
pub struct NamingPanel {
    input: Input,
}

impl NamingPanel {
    pub async fn handle_key<E: Engine>(
        &mut self,
        key: KeyEvent,
        controller: &mut StepController<E>,
    ) {
        if key.code == KeyCode::Tab {
            return;
        }
        let before = self.input.value().to_string();
        self.input.handle_event(&Event::Key(key));
        if self.input.value() != before {
            let value = self.input.value().to_string();
            controller.set_naming_convention(&value).await;
        }
    }

    pub fn render<E: Engine>(
        &self,
        frame: &mut Frame,
        area: Rect,
        controller: &StepController<E>,
        theme: &Theme,
    ) {
        let session = controller.session();
        let previews = controller.previews();
        let preview_rows = previews.len().max(1) as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(preview_rows),
                Constraint::Length(1),
                Constraint::Min(3),
            ])
            .split(area);

        let input = Paragraph::new(self.input.value()).block(
            Block::default().borders(Borders::ALL).title(format!(
                " Naming pattern, starting from {} ",
                session.destination_prefix()
            )),
        );
        frame.render_widget(input, chunks[0]);
        frame.set_cursor_position((
            chunks[0].x + 1 + self.input.visual_cursor() as u16,
            chunks[0].y + 1,
        ));

        let unknown = preview::unknown_placeholders(&session.naming_convention);
        if !unknown.is_empty() {
            let warning = Line::from(Span::styled(
                format!("Unknown placeholders: {}", unknown.join(", ")),
                Style::default().fg(theme.warn),
            ));
            frame.render_widget(Paragraph::new(warning), chunks[1]);
        }

        let preview_lines: Vec<Line> = if previews.is_empty() {
            vec![Line::from(Span::styled(
                "No previews yet",
                Style::default().fg(theme.dimmed),
            ))]
        } else {
            previews
                .iter()
                .map(|p| {
                    Line::from(vec![
                        Span::styled(
                            format!("{}: ", p.description),
                            Style::default().fg(theme.dimmed),
                        ),
                        Span::styled(p.path.clone(), Style::default().fg(theme.text)),
                    ])
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(preview_lines), chunks[2]);

        let placeholder_lines: Vec<Line> = PLACEHOLDERS
            .iter()
            .map(|(name, hint)| {
                Line::from(vec![
                    Span::styled(
                        format!("{{{name}}} "),
                        Style::default().fg(theme.accent).bold(),
                    ),
                    Span::styled(*hint, Style::default().fg(theme.dimmed)),
                ])
            })
            .collect();
        let catalog = Paragraph::new(placeholder_lines)
            .block(Block::default().borders(Borders::TOP).title(" Placeholders "))
            .wrap(Wrap { trim: true });
        frame.render_widget(catalog, chunks[4]);
    }
}
