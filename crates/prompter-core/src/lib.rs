pub mod config;
pub mod error;
pub mod gesture;
pub mod layout;
pub mod prompter;
pub mod reveal;
pub mod script;
pub mod scroll;
pub mod settings;

pub use config::{AppConfig, Pacing, ScrollConfig};
pub use error::{Error, Result};
pub use gesture::{Gesture, GestureInterpreter, PlaybackIntent};
pub use layout::{LayoutMeasurer, LayoutRequest, TextLayout, TokenBox, WordGeometry};
pub use prompter::{ContainerDirective, ContainerSize, Prompter, RenderFrame, RenderedWord};
pub use reveal::{RevealAttributes, RevealComputer};
pub use script::{Script, ScriptStats, Word};
pub use scroll::{ScrollAnimator, Viewport};
pub use settings::{Rgb, SettingUpdate, Settings, TextAlign, UpdateEffect};
