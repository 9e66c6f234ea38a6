use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode};
use crate::keymap::Keymap;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let settings = app.prompter.settings();

        let (state_str, state_color) = if app.prompter.is_restarting() {
            ("↻ RESTART", theme.accent)
        } else if settings.is_playing {
            ("▶ PLAYING", theme.playing)
        } else {
            ("⏸ PAUSED", theme.paused)
        };

        let mut flags = Vec::new();
        if settings.is_flipped {
            flags.push("mirror");
        }
        if settings.has_outline {
            flags.push("outline");
        }

        let status_text = match (&app.mode, &app.status_message) {
            (Mode::Help, _) => " HELP".to_string(),
            (_, Some(msg)) => format!(" {}", msg),
            _ => {
                let mut text = format!(
                    " Speed {} | Size {} | {}",
                    settings.speed,
                    settings.font_size,
                    settings.text_align.as_str()
                );
                if !flags.is_empty() {
                    text.push_str(&format!(" | {}", flags.join(" ")));
                }
                text
            }
        };

        let state_text = format!(" {} ", state_str);
        let help_hint = format!(" {} ", Keymap::hint(&app.config.keymap));
        let used = state_text.width() + status_text.width() + help_hint.width();
        let padding_len = (area.width as usize).saturating_sub(used);

        let bar = Style::default().bg(theme.bar_bg);
        let line = Line::from(vec![
            Span::styled(
                state_text,
                bar.fg(state_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(status_text, bar.fg(theme.bar_fg)),
            Span::styled(" ".repeat(padding_len), bar),
            Span::styled(help_hint, bar.fg(theme.muted)),
        ]);

        frame.render_widget(Paragraph::new(line).style(bar), area);
    }
}
