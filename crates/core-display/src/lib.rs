//! Concrete [`core_world::Display`] implementations: a plain stdout sink, a
//! full-screen terminal redraw, and an offline PNG-frame renderer.

mod fancy;
mod simple;
mod turtle;

pub use fancy::FancyDisplay;
pub use simple::SimpleDisplay;
pub use turtle::TurtleDisplay;
