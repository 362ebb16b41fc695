//! Directories step: where to look and where the photos end up

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::engine::Engine;
use crate::tui::styles::Theme;
use crate::wizard::StepController;

#[derive(Default)]
pub struct DirectoriesPanel {
    selected: usize,
}

impl DirectoriesPanel {
    pub async fn handle_key<E: Engine>(
        &mut self,
        key: KeyEvent,
        controller: &mut StepController<E>,
    ) {
        let count = controller.session().start_directories.len();
        match key.code {
            KeyCode::Char('a') => {
                controller.pick_start_directories().await;
            }
            KeyCode::Char('o') => {
                controller.pick_destination().await;
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let directory = controller
                    .session()
                    .start_directories
                    .get(self.selected)
                    .cloned();
                if let Some(directory) = directory {
                    controller.remove_start_directory(&directory).await;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if count > 0 {
                    self.selected = (self.selected + 1).min(count - 1);
                }
            }
            _ => {}
        }
        let count = controller.session().start_directories.len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    pub fn render<E: Engine>(
        &self,
        frame: &mut Frame,
        area: Rect,
        controller: &StepController<E>,
        theme: &Theme,
    ) {
        let session = controller.session();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let items: Vec<ListItem> = if session.start_directories.is_empty() {
            vec![ListItem::new(Span::styled(
                "No directories selected yet",
                Style::default().fg(theme.dimmed),
            ))]
        } else {
            session
                .start_directories
                .iter()
                .enumerate()
                .map(|(i, directory)| {
                    let style = if i == self.selected {
                        Style::default().fg(theme.accent).bold()
                    } else {
                        Style::default().fg(theme.text)
                    };
                    ListItem::new(Span::styled(directory.clone(), style))
                })
                .collect()
        };

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search for images in "),
        );
        frame.render_widget(list, chunks[0]);

        let destination = if session.destination_directory.is_empty() {
            Span::styled("Not selected yet", Style::default().fg(theme.dimmed))
        } else {
            Span::styled(
                session.destination_directory.clone(),
                Style::default().fg(theme.text),
            )
        };
        let destination = Paragraph::new(Line::from(destination)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Organise them into "),
        );
        frame.render_widget(destination, chunks[1]);

        let help = Line::from(Span::styled(
            "a add directory   d remove   o pick destination   j/k select",
            Style::default().fg(theme.dimmed),
        ));
        frame.render_widget(Paragraph::new(help), chunks[2]);
    }
}
