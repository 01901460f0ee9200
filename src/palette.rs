//! Terminal colors for the statusline segments.

use once_cell::sync::Lazy;
use std::env;

#[cfg(feature = "colors")]
use owo_colors::{OwoColorize, XtermColors};

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn bright_black(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn blue(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn cyan(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn green(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn red(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn truecolor(&self, _r: u8, _g: u8, _b: u8) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

static NO_COLOR: Lazy<bool> = Lazy::new(|| env::var_os("NO_COLOR").is_some());

/// Named colors used across the statusline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Model name (truecolor steel blue)
    Model,
    /// Context window bar and label
    Context,
    /// Quota block bar and label (xterm 208)
    Quota,
    /// Cost figures (xterm 178)
    Cost,
    /// Unlit bar cells (xterm 240)
    Empty,
    /// Time window label
    Clock,
    Increase,
    Decrease,
    Muted,
}

impl Tone {
    #[cfg(feature = "colors")]
    fn xterm(self) -> Option<u8> {
        match self {
            Tone::Quota => Some(208),
            Tone::Cost => Some(178),
            Tone::Empty => Some(240),
            _ => None,
        }
    }

    pub fn paint(self, text: &str) -> String {
        if *NO_COLOR || text.is_empty() {
            return text.to_string();
        }
        #[cfg(feature = "colors")]
        if let Some(code) = self.xterm() {
            return text.color(XtermColors::from(code)).to_string();
        }
        match self {
            Tone::Model => text.truecolor(91, 155, 214).to_string(),
            Tone::Context => text.blue().to_string(),
            Tone::Clock => text.cyan().to_string(),
            Tone::Increase => text.green().to_string(),
            Tone::Decrease => text.red().to_string(),
            _ => text.bright_black().to_string(),
        }
    }
}
