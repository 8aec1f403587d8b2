// contribart-common: glyphs, pattern compiler, and shared types.

pub mod glyph;
pub mod pattern;
pub mod remote;
pub mod types;
