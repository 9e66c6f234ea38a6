use prompter_core::reveal::RevealAttributes;
use prompter_core::settings::Rgb;
use ratatui::style::{Color, Modifier, Style};

/// Tint mixed into words on the reading line
pub const GLOW_TINT: Rgb = Rgb { r: 59, g: 130, b: 246 };

/// Share of the word colour kept when the glow tint is applied
const GLOW_KEEP: f64 = 0.75;

/// Chrome colours for the status bar and popups
#[derive(Debug, Clone)]
pub struct Theme {
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub playing: Color,
    pub paused: Color,
    pub popup_bg: Color,
    pub popup_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bar_bg: Color::Rgb(0x1f, 0x29, 0x37),
            bar_fg: Color::Rgb(0xe5, 0xe7, 0xeb),
            muted: Color::Rgb(0x9c, 0xa3, 0xaf),
            accent: rgb_color(GLOW_TINT),
            playing: Color::Rgb(0x22, 0xc5, 0x5e),
            paused: Color::Rgb(0xea, 0xb3, 0x08),
            popup_bg: Color::Rgb(0x11, 0x18, 0x27),
            popup_fg: Color::Rgb(0xf9, 0xfa, 0xfb),
        }
    }
}

pub fn rgb_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Foreground a word is drawn with: opacity becomes a blend toward the
/// background, glow adds the blue tint
pub fn word_rgb(attributes: &RevealAttributes, text: Rgb, background: Rgb) -> Rgb {
    let faded = text.blend(background, attributes.opacity);
    if attributes.glow {
        faded.blend(GLOW_TINT, GLOW_KEEP)
    } else {
        faded
    }
}

/// Cell style for one word
pub fn word_style(
    attributes: &RevealAttributes,
    text: Rgb,
    background: Rgb,
    outline: bool,
) -> Style {
    let mut style = Style::default()
        .fg(rgb_color(word_rgb(attributes, text, background)))
        .bg(rgb_color(background));
    if outline {
        style = style.bg(rgb_color(Rgb::BLACK));
    }
    if attributes.glow || attributes.scale > 1.0 {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}
