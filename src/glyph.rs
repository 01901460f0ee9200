//! # Glyph Module
//!
//! Braille progress bars. Each of the 10 cells holds up to six dots, so a bar
//! resolves 60 steps between 0% and 100%.

use once_cell::sync::Lazy;

use crate::palette::Tone;

pub const BAR_CELLS: usize = 10;
pub const DOTS_PER_CELL: u32 = 6;
pub const BAR_UNITS: u32 = BAR_CELLS as u32 * DOTS_PER_CELL;

/// Cell glyphs indexed by the number of lit dots (0..=6).
pub const DOTS: [char; 7] = ['⠀', '⠁', '⠃', '⠇', '⠏', '⠟', '⠿'];

static PROGRESS_BARS: Lazy<[String; 101]> =
    Lazy::new(|| std::array::from_fn(|pct| build_bar(pct as u32)));

static EMPTY_BAR: Lazy<String> = Lazy::new(|| build_bar(0));

/// Lit dot count for a percentage in 0..=100.
pub fn lit_units(percentage: u32) -> u32 {
    percentage.min(100) * BAR_UNITS / 100
}

fn build_bar(percentage: u32) -> String {
    let units = lit_units(percentage);
    let full = (units / DOTS_PER_CELL) as usize;
    let remainder = (units % DOTS_PER_CELL) as usize;

    let mut bar: String = std::iter::repeat_n(DOTS[6], full).collect();
    let empty = if remainder > 0 && full < BAR_CELLS {
        bar.push(DOTS[remainder]);
        BAR_CELLS - full - 1
    } else {
        BAR_CELLS - full
    };
    // one dimmed span for the whole unlit run
    let unlit: String = std::iter::repeat_n(DOTS[0], empty).collect();
    bar.push_str(&Tone::Empty.paint(&unlit));
    bar
}

/// Bar for `percentage`, clamped to 0..=100. Lit cells are uncolored so the
/// caller can paint the whole bar in its segment color.
pub fn render(percentage: u32) -> &'static str {
    PROGRESS_BARS
        .get(percentage.min(100) as usize)
        .map(String::as_str)
        .unwrap_or(EMPTY_BAR.as_str())
}
