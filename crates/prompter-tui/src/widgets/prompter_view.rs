use prompter_core::prompter::{ContainerDirective, RenderFrame};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::Block,
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::theme::{rgb_color, word_style};

pub struct PrompterWidget;

impl PrompterWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let render = app.prompter.render();
        let background = rgb_color(render.directive.background_color);
        frame.render_widget(Block::default().style(Style::default().bg(background)), area);

        let layout = app.prompter.layout();
        draw_words(
            frame.buffer_mut(),
            area,
            &render,
            layout.cell_width(),
            layout.cell_height(),
        );
    }
}

/// Put every visible word into the buffer at its measured cell
fn draw_words(buf: &mut Buffer, area: Rect, render: &RenderFrame<'_>, cell_w: f64, cell_h: f64) {
    let directive: &ContainerDirective = &render.directive;
    let outline = !directive.outline.is_empty();

    for word in &render.words {
        if word.is_whitespace {
            continue;
        }
        let (Some(geometry), Some(screen_y)) = (word.geometry, word.screen_y) else {
            continue;
        };

        let row = (screen_y / cell_h).round();
        if !(0.0..area.height as f64).contains(&row) {
            continue;
        }
        let y = area.y + row as u16;
        let style = word_style(
            &word.attributes,
            directive.text_color,
            directive.background_color,
            outline,
        );

        let mut col = (geometry.left / cell_w).round() as i64;
        for ch in word.text.chars() {
            let width = ch.width().unwrap_or(0) as i64;
            if width == 0 {
                continue;
            }
            let x = if directive.mirrored {
                area.width as i64 - col - width
            } else {
                col
            };
            if x >= 0 && x + width <= area.width as i64 {
                if let Some(cell) = buf.cell_mut((area.x + x as u16, y)) {
                    cell.set_char(ch).set_style(style);
                }
            }
            col += width;
        }
    }
}
