//! Organise step: transfer mode and the verification gate

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::engine::{Engine, TransferMode};
use crate::tui::styles::Theme;
use crate::wizard::StepController;

#[derive(Default)]
pub struct OrganisePanel;

impl OrganisePanel {
    pub async fn handle_key<E: Engine>(
        &mut self,
        key: KeyEvent,
        controller: &mut StepController<E>,
    ) {
        match key.code {
            KeyCode::Char('m') | KeyCode::Left | KeyCode::Right => {
                controller.toggle_transfer_mode().await;
            }
            KeyCode::Char('v') => {
                controller.toggle_verify().await;
            }
            _ => {}
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
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Min(1),
            ])
            .split(area);

        let mode_line = |mode: TransferMode, label: &str| {
            let marker = if session.transfer_mode == mode {
                Span::styled("(x) ", Style::default().fg(theme.accent).bold())
            } else {
                Span::styled("( ) ", Style::default().fg(theme.dimmed))
            };
            Line::from(vec![marker, Span::raw(label.to_string())])
        };
        let mode = Paragraph::new(vec![
            mode_line(TransferMode::Copy, "Copy: originals stay where they are"),
            mode_line(TransferMode::Move, "Move: originals are removed"),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Copy or move (m) "),
        );
        frame.render_widget(mode, chunks[0]);

        let verify_marker = if session.verify_before_finalize {
            Span::styled("[x] ", Style::default().fg(theme.accent).bold())
        } else {
            Span::styled("[ ] ", Style::default().fg(theme.dimmed))
        };
        let verify = Paragraph::new(vec![Line::from(vec![
            verify_marker,
            Span::raw("Show the matched files and wait for a go-ahead before touching anything"),
        ])])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Verify first (v) "),
        );
        frame.render_widget(verify, chunks[1]);

        let help = Line::from(Span::styled(
            "m toggle copy/move   v toggle verification",
            Style::default().fg(theme.dimmed),
        ));
        frame.render_widget(Paragraph::new(help), chunks[2]);
    }
}
