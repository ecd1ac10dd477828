//! Display curve rendering onto a CPU pixel frame.

mod colour;
mod painter;

pub use colour::{hsv_to_rgb, level_to_hue, level_to_rgba};
pub use painter::{level_at_column, paint_row, Painter};
