//! Flash Viewer (host)
//!
//! The board's main loop run against the memory-backed mocks: bring the
//! panel up, blit both stored pictures from external flash, then print the
//! flash diagnostics screen in landscape.
//!
//! Run with: cargo run -p firmware --features std --example flash_viewer

#![allow(
    clippy::print_stdout,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::indexing_slicing
)]

use anyhow::Result;
use firmware::{colors, color565, DisplayConfig, Ili9341, Orientation, FONT_16};
use platform::config::{FLASH_PAGE_SIZE, PANEL_HEIGHT, PANEL_WIDTH, PICTURE_PAGES};
use platform::mocks::{MockDelay, MockFlash, MockLcdBus, MockPin};
use platform::NorFlashPages;

/// Orientation each stored picture was saved in, by picture number.
const PICTURE_ORIENTATION: [Orientation; 11] = [
    Orientation::Landscape,
    Orientation::PortraitMirror,
    Orientation::Portrait,
    Orientation::LandscapeMirror,
    Orientation::LandscapeMirror,
    Orientation::Landscape,
    Orientation::Landscape,
    Orientation::Landscape,
    Orientation::Landscape,
    Orientation::Landscape,
    Orientation::Landscape,
];

/// Numbers past the table fall back to picture 0's orientation.
fn picture_orientation(picture: u32) -> Orientation {
    usize::try_from(picture)
        .ok()
        .and_then(|n| PICTURE_ORIENTATION.get(n))
        .copied()
        .unwrap_or(PICTURE_ORIENTATION[0])
}

/// Two pictures worth of flash: a color gradient and a checkerboard.
fn programmed_flash() -> MockFlash {
    let (w, h) = (u32::from(PANEL_WIDTH), u32::from(PANEL_HEIGHT));
    let gradient = (0..w * h).map(|i| {
        let (x, y) = (i % w, i / w);
        color565((x * 255 / w) as u8, (y * 255 / h) as u8, 0x80)
    });
    let checker = (0..w * h).map(|i| {
        let (x, y) = (i % w, i / w);
        if (x / 20 + y / 20) % 2 == 0 {
            colors::WHITE
        } else {
            colors::DARKGREY
        }
    });
    let bytes = gradient
        .chain(checker)
        .flat_map(u16::to_le_bytes)
        .collect::<Vec<u8>>();
    MockFlash::new(bytes)
}

fn main() -> Result<()> {
    let mut flash = NorFlashPages::new(programmed_flash());
    let mut bus = MockLcdBus::new();
    bus.queue_reads(&[0x00, 0x00, 0x93, 0x41]);

    let config = DisplayConfig::default();
    let mut lcd = Ili9341::new(bus, MockPin::default(), MockDelay::default(), config);
    lcd.set_text_font(&FONT_16);
    lcd.init()?;
    let id = lcd.read_controller_id()?;

    // Every stored picture on a blue backdrop, each in the orientation it
    // was stored in, ending on picture 1.
    lcd.fill_screen(colors::BLUE);
    for picture in [0, 1] {
        lcd.set_orientation(picture_orientation(picture))?;
        lcd.draw_flash_picture(&mut flash, NorFlashPages::<MockFlash>::picture_page(picture))?;
        println!(
            "picture {picture}: {} flash pages blitted in {:?}",
            PICTURE_PAGES,
            lcd.orientation()
        );
    }
    println!("picture 42 would show in {:?}", picture_orientation(42));

    // Diagnostics screen.
    lcd.set_orientation(Orientation::Landscape)?;
    lcd.fill_screen(colors::BLACK);
    lcd.set_cursor(0, 10)?;
    lcd.print(format_args!("CONTROLLER ID : {id:#06X}\n"));
    lcd.print(format_args!("CAPACITY : {} KB\n", flash.page_count() as usize * FLASH_PAGE_SIZE / 1024));
    lcd.print(format_args!("PAGE COUNT : {}\n", flash.page_count()));
    lcd.print(format_args!("PAGE SIZE : {FLASH_PAGE_SIZE}\n"));
    lcd.print(format_args!("PICTURES : {}\n", flash.picture_count()));
    lcd.set_text_color(colors::GREENYELLOW, colors::BLACK);
    lcd.print_str("READ EXT. SPI FLASH\n");

    if let Some(fault) = lcd.fault() {
        anyhow::bail!("drawing fault: {fault}");
    }

    let cursor = lcd.cursor();
    let (bus, backlight, delay) = lcd.release();
    println!("controller id {id:#06x}, backlight {}", if backlight.is_high() { "on" } else { "off" });
    println!("text cursor ends at ({}, {})", cursor.x, cursor.y);
    println!("{} bus transactions, {} ms of delays", bus.ops().len(), delay.delays_ms().iter().sum::<u32>());
    println!("reads served by flash: {}", flash.release().reads());
    Ok(())
}
