//! Orientation model and memory-access-control (MADCTL) encoding.
//!
//! The controller maps the logical address space onto the panel through six
//! MADCTL bits. Each of the four supported orientations is a fixed setting
//! of those axes; the driver computes the four register bytes once when it
//! is constructed and never recomputes them.
//!
//! | Orientation      | MY | MX | MV | ML | BGR | MH | Byte   |
//! |------------------|----|----|----|----|-----|----|--------|
//! | Portrait         | 0  | 1  | 0  | 0  | 1   | 0  | `0x48` |
//! | Landscape        | 0  | 0  | 1  | 0  | 1   | 0  | `0x28` |
//! | PortraitMirror   | 1  | 0  | 0  | 0  | 1   | 0  | `0x88` |
//! | LandscapeMirror  | 1  | 1  | 1  | 0  | 1   | 0  | `0xE8` |

/// Row address order (MY).
const MADCTL_MY: u8 = 0x80;
/// Column address order (MX).
const MADCTL_MX: u8 = 0x40;
/// Row/column exchange (MV).
const MADCTL_MV: u8 = 0x20;
/// Vertical refresh order (ML).
const MADCTL_ML: u8 = 0x10;
/// BGR color filter order.
const MADCTL_BGR: u8 = 0x08;
/// Horizontal refresh order (MH).
const MADCTL_MH: u8 = 0x04;

/// Display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// 240 wide, 320 tall, connector at the bottom.
    #[default]
    Portrait,
    /// Portrait, flipped vertically.
    PortraitMirror,
    /// 320 wide, 240 tall.
    Landscape,
    /// Landscape, rotated 180°.
    LandscapeMirror,
}

impl Orientation {
    /// All orientations, in table order.
    pub const ALL: [Self; 4] = [
        Self::Portrait,
        Self::PortraitMirror,
        Self::Landscape,
        Self::LandscapeMirror,
    ];

    /// `true` for the two orientations that swap width and height.
    pub const fn is_landscape(self) -> bool {
        matches!(self, Self::Landscape | Self::LandscapeMirror)
    }

    /// Logical `(width, height)` on a panel whose native size is
    /// `pixel_width × pixel_height`.
    pub const fn logical_size(self, pixel_width: u16, pixel_height: u16) -> (u16, u16) {
        if self.is_landscape() {
            (pixel_height, pixel_width)
        } else {
            (pixel_width, pixel_height)
        }
    }

    /// MADCTL axis settings for this orientation.
    pub const fn axes(self) -> MemoryAccessAxes {
        let base = MemoryAccessAxes::DEFAULT;
        match self {
            Self::Portrait => MemoryAccessAxes {
                column_address_order: AddressOrder::Reverse,
                ..base
            },
            Self::Landscape => MemoryAccessAxes {
                row_column_exchange: true,
                ..base
            },
            Self::PortraitMirror => MemoryAccessAxes {
                row_address_order: AddressOrder::Reverse,
                ..base
            },
            Self::LandscapeMirror => MemoryAccessAxes {
                row_address_order: AddressOrder::Reverse,
                column_address_order: AddressOrder::Reverse,
                row_column_exchange: true,
                ..base
            },
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Portrait => 0,
            Self::PortraitMirror => 1,
            Self::Landscape => 2,
            Self::LandscapeMirror => 3,
        }
    }
}

/// Address or refresh direction of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressOrder {
    /// Top to bottom / left to right.
    Normal,
    /// Bottom to top / right to left.
    Reverse,
}

/// Color filter order of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    /// Red, green, blue.
    Rgb,
    /// Blue, green, red.
    Bgr,
}

/// The six MADCTL axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryAccessAxes {
    /// MY
    pub row_address_order: AddressOrder,
    /// MX
    pub column_address_order: AddressOrder,
    /// MV
    pub row_column_exchange: bool,
    /// ML
    pub vertical_refresh_order: AddressOrder,
    /// BGR
    pub color_order: ColorOrder,
    /// MH
    pub horizontal_refresh_order: AddressOrder,
}

impl MemoryAccessAxes {
    /// All axes normal, BGR panel.
    pub const DEFAULT: Self = Self {
        row_address_order: AddressOrder::Normal,
        column_address_order: AddressOrder::Normal,
        row_column_exchange: false,
        vertical_refresh_order: AddressOrder::Normal,
        color_order: ColorOrder::Bgr,
        horizontal_refresh_order: AddressOrder::Normal,
    };

    /// Encode as a MADCTL parameter byte.
    pub const fn to_madctl(self) -> u8 {
        const fn bit(set: bool, mask: u8) -> u8 {
            if set {
                mask
            } else {
                0
            }
        }
        const fn reversed(order: AddressOrder) -> bool {
            matches!(order, AddressOrder::Reverse)
        }

        bit(reversed(self.row_address_order), MADCTL_MY)
            | bit(reversed(self.column_address_order), MADCTL_MX)
            | bit(self.row_column_exchange, MADCTL_MV)
            | bit(reversed(self.vertical_refresh_order), MADCTL_ML)
            | bit(matches!(self.color_order, ColorOrder::Bgr), MADCTL_BGR)
            | bit(reversed(self.horizontal_refresh_order), MADCTL_MH)
    }
}

impl Default for MemoryAccessAxes {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The four MADCTL bytes, one per orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OrientationTable {
    bytes: [u8; 4],
}

impl OrientationTable {
    /// Compute the table from each orientation's axes.
    #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)] // index() < 4
    pub const fn new() -> Self {
        let mut bytes = [0u8; 4];
        let mut i = 0;
        while i < Orientation::ALL.len() {
            let o = Orientation::ALL[i];
            bytes[o.index()] = o.axes().to_madctl();
            i += 1;
        }
        Self { bytes }
    }

    /// MADCTL byte for `orientation`.
    #[allow(clippy::indexing_slicing)] // index() < 4
    pub const fn get(&self, orientation: Orientation) -> u8 {
        self.bytes[orientation.index()]
    }
}

impl Default for OrientationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_madctl_bytes() {
        let table = OrientationTable::new();
        assert_eq!(table.get(Orientation::Portrait), 0x48);
        assert_eq!(table.get(Orientation::Landscape), 0x28);
        assert_eq!(table.get(Orientation::PortraitMirror), 0x88);
        assert_eq!(table.get(Orientation::LandscapeMirror), 0xE8);
    }

    #[test]
    fn test_each_axis_maps_to_its_bit() {
        let base = MemoryAccessAxes { color_order: ColorOrder::Rgb, ..MemoryAccessAxes::DEFAULT };
        assert_eq!(base.to_madctl(), 0x00);
        assert_eq!(
            MemoryAccessAxes { row_address_order: AddressOrder::Reverse, ..base }.to_madctl(),
            0x80
        );
        assert_eq!(
            MemoryAccessAxes { column_address_order: AddressOrder::Reverse, ..base }.to_madctl(),
            0x40
        );
        assert_eq!(MemoryAccessAxes { row_column_exchange: true, ..base }.to_madctl(), 0x20);
        assert_eq!(
            MemoryAccessAxes { vertical_refresh_order: AddressOrder::Reverse, ..base }.to_madctl(),
            0x10
        );
        assert_eq!(MemoryAccessAxes { color_order: ColorOrder::Bgr, ..base }.to_madctl(), 0x08);
        assert_eq!(
            MemoryAccessAxes { horizontal_refresh_order: AddressOrder::Reverse, ..base }.to_madctl(),
            0x04
        );
    }

    #[test]
    fn test_logical_size_swaps_for_landscape() {
        assert_eq!(Orientation::Portrait.logical_size(240, 320), (240, 320));
        assert_eq!(Orientation::PortraitMirror.logical_size(240, 320), (240, 320));
        assert_eq!(Orientation::Landscape.logical_size(240, 320), (320, 240));
        assert_eq!(Orientation::LandscapeMirror.logical_size(240, 320), (320, 240));
    }

    #[test]
    fn test_table_is_const_evaluable() {
        const TABLE: OrientationTable = OrientationTable::new();
        assert_eq!(TABLE, OrientationTable::default());
    }
}
