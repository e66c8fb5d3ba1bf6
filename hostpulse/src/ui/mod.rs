//! UI module root: the dashboard render surface and the drawing functions for its panels.

pub mod chart;
pub mod grid;
pub mod header;
pub mod theme;
pub mod util;
