//! Driver configuration.

use crate::display::{Orientation, INIT_TABLE};
use crate::text::TextContext;

/// Software-reset settle time in milliseconds.
pub const RESET_SETTLE_MS: u32 = 50;

/// Display driver configuration
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    /// Orientation applied as the last init step.
    ///
    /// `None` leaves the controller in the init table's own addressing
    /// (portrait geometry, MADCTL `0x00`).
    pub orientation: Option<Orientation>,
    /// Delay after the software reset command (ms)
    pub reset_delay_ms: u32,
    /// Power-on command table, see [`crate::display::InitTable`]
    pub init_table: &'static [u8],
    /// Initial font, colors and wrap flag
    pub text: TextContext,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            orientation: None,
            reset_delay_ms: RESET_SETTLE_MS,
            init_table: &INIT_TABLE,
            text: TextContext::default(),
        }
    }
}

impl DisplayConfig {
    /// Same configuration with a different initial orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }
}
