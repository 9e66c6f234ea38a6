use prompter_core::config::KeymapConfig;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::keymap::Keymap;
use crate::theme::Theme;

pub struct PopupWidget;

impl PopupWidget {
    /// Overlay shown while the restart pulse is active, `progress` in 0..=1
    pub fn render_restarting(frame: &mut Frame, area: Rect, progress: f64, theme: &Theme) {
        let popup_width = 28u16.min(area.width);
        let popup_height = 4u16.min(area.height);
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.popup_bg));

        let bar_width = popup_width.saturating_sub(4) as usize;
        let message = Paragraph::new(vec![
            Line::from(Span::styled(
                "↻ Restarting Script...",
                Style::default()
                    .fg(theme.popup_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                progress_bar(progress, bar_width),
                Style::default().fg(theme.accent),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);

        frame.render_widget(message, popup_area);
    }

    /// Key binding overview
    pub fn render_help(frame: &mut Frame, area: Rect, keymap: &KeymapConfig, theme: &Theme) {
        let entries = Keymap::describe(keymap);
        let key_width = entries
            .iter()
            .map(|(keys, _)| keys.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines: Vec<Line> = entries
            .into_iter()
            .map(|(keys, label)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:<width$}  ", keys, width = key_width),
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(label, Style::default().fg(theme.popup_fg)),
                ])
            })
            .collect();
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            " Click: play/pause  Drag: scroll  Hold: restart",
            Style::default().fg(theme.muted),
        )));

        let popup_width = 52u16.min(area.width);
        let popup_height = (lines.len() as u16 + 2).min(area.height);
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.popup_bg));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

/// Filled/empty bar of `width` cells
fn progress_bar(progress: f64, width: usize) -> String {
    let progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (progress * width as f64).round() as usize;
    format!("{}{}", "━".repeat(filled), "─".repeat(width - filled))
}

/// Helper function to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(20, 4, Rect::new(0, 0, 80, 24));
        assert_eq!(rect, Rect::new(30, 10, 20, 4));

        let clipped = centered_rect(100, 4, Rect::new(2, 0, 80, 24));
        assert_eq!(clipped.x, 2);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "────");
        assert_eq!(progress_bar(0.5, 4), "━━──");
        assert_eq!(progress_bar(1.0, 4), "━━━━");
        assert_eq!(progress_bar(f64::NAN, 2), "──");
        assert_eq!(progress_bar(2.0, 0), "");
    }
}
