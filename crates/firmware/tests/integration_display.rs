//! Display integration tests: the driver over both transports.
//!
//! The SPI half checks exact wire traffic with `embedded-hal-mock`; the
//! memory-bus half drives the whole init and drawing path against the
//! simulated GRAM.
//!
//! Run with: cargo test -p firmware --test integration_display
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use firmware::{
    colors, DisplayConfig, DisplayError, Ili9341, InitTable, Orientation, SpiInterface, INIT_TABLE,
    PIXEL_HEIGHT, PIXEL_WIDTH,
};
use platform::mocks::{BusOp, MockDelay, MockLcdBus, MockPin};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The three SPI expectations one `SpiDevice::write` call produces.
fn spi_device_write(data: &[u8]) -> [SpiTransaction<u8>; 3] {
    [
        SpiTransaction::transaction_start(),
        SpiTransaction::write_vec(data.to_vec()),
        SpiTransaction::transaction_end(),
    ]
}

/// SPI and DC expectations for one command followed by single-byte params.
fn command_with_params(
    spi: &mut Vec<SpiTransaction<u8>>,
    dc: &mut Vec<PinTransaction>,
    command: u8,
    params: &[u8],
) {
    spi.extend(spi_device_write(&[command]));
    dc.push(PinTransaction::set(PinState::Low));
    for &p in params {
        spi.extend(spi_device_write(&[p]));
        dc.push(PinTransaction::set(PinState::High));
    }
}

fn memory_driver(config: DisplayConfig) -> Ili9341<MockLcdBus, MockPin, MockDelay> {
    Ili9341::new(MockLcdBus::new(), MockPin::default(), MockDelay::default(), config)
}

// ---------------------------------------------------------------------------
// SPI transport
// ---------------------------------------------------------------------------

/// One pixel over SPI: CASET, PASET, RAMWR with byte params, then the color
/// word big-endian.
#[test]
fn test_pixel_over_spi_wire_format() {
    let mut spi = Vec::new();
    let mut dc = Vec::new();
    command_with_params(&mut spi, &mut dc, 0x2A, &[0x00, 0x05, 0x00, 0x05]);
    command_with_params(&mut spi, &mut dc, 0x2B, &[0x01, 0x02, 0x01, 0x02]);
    command_with_params(&mut spi, &mut dc, 0x2C, &[]);
    spi.extend(spi_device_write(&[0xF8, 0x00]));
    dc.push(PinTransaction::set(PinState::High));

    let iface = SpiInterface::new(
        SpiMock::new(&spi),
        PinMock::new(&dc),
        PinMock::new(&[]),
        NoopDelay::new(),
    );
    let mut lcd = Ili9341::new(iface, PinMock::new(&[]), NoopDelay::new(), DisplayConfig::default());
    lcd.draw_pixel(5, 0x0102, colors::RED);
    assert_eq!(lcd.fault(), None);

    let (iface, mut backlight, _) = lcd.release();
    let (mut spi, mut dc, mut rst, _) = iface.release();
    spi.done();
    dc.done();
    rst.done();
    backlight.done();
}

/// Off-canvas pixels never reach the wire.
#[test]
fn test_clipped_pixel_over_spi_is_silent() {
    let iface = SpiInterface::new(
        SpiMock::new(&[]),
        PinMock::new(&[]),
        PinMock::new(&[]),
        NoopDelay::new(),
    );
    let mut lcd = Ili9341::new(iface, PinMock::new(&[]), NoopDelay::new(), DisplayConfig::default());
    lcd.draw_pixel(-1, 10, colors::RED);
    lcd.draw_pixel(10, 400, colors::RED);

    let (iface, mut backlight, _) = lcd.release();
    let (mut spi, mut dc, mut rst, _) = iface.release();
    spi.done();
    dc.done();
    rst.done();
    backlight.done();
}

/// Orientation change over SPI: MADCTL then a full landscape window.
#[test]
fn test_landscape_over_spi() {
    let mut spi = Vec::new();
    let mut dc = Vec::new();
    command_with_params(&mut spi, &mut dc, 0x36, &[0x28]);
    command_with_params(&mut spi, &mut dc, 0x2A, &[0x00, 0x00, 0x01, 0x3F]);
    command_with_params(&mut spi, &mut dc, 0x2B, &[0x00, 0x00, 0x00, 0xEF]);
    command_with_params(&mut spi, &mut dc, 0x2C, &[]);

    let iface = SpiInterface::new(
        SpiMock::new(&spi),
        PinMock::new(&dc),
        PinMock::new(&[]),
        NoopDelay::new(),
    );
    let mut lcd = Ili9341::new(iface, PinMock::new(&[]), NoopDelay::new(), DisplayConfig::default());
    lcd.set_orientation(Orientation::Landscape).unwrap();
    assert_eq!((lcd.width(), lcd.height()), (320, 240));

    let (iface, mut backlight, _) = lcd.release();
    let (mut spi, mut dc, mut rst, _) = iface.release();
    spi.done();
    dc.done();
    rst.done();
    backlight.done();
}

/// Pixel read-back over SPI: start-only window, RAMRD, then one transfer of
/// a dummy byte and R, G, B.
#[test]
fn test_read_pixel_over_spi() {
    let mut spi = Vec::new();
    let mut dc = Vec::new();
    command_with_params(&mut spi, &mut dc, 0x2A, &[0x00, 0x0A]);
    command_with_params(&mut spi, &mut dc, 0x2B, &[0x00, 0x14]);
    command_with_params(&mut spi, &mut dc, 0x2E, &[]);
    spi.extend([
        SpiTransaction::transaction_start(),
        SpiTransaction::read_vec(vec![0xAA, 0xF8, 0x84, 0x10]),
        SpiTransaction::transaction_end(),
    ]);
    dc.push(PinTransaction::set(PinState::High));

    let iface = SpiInterface::new(
        SpiMock::new(&spi),
        PinMock::new(&dc),
        PinMock::new(&[]),
        NoopDelay::new(),
    );
    let mut lcd = Ili9341::new(iface, PinMock::new(&[]), NoopDelay::new(), DisplayConfig::default());
    assert_eq!(lcd.read_pixel(10, 20).unwrap(), 0xFC22);

    let (iface, mut backlight, _) = lcd.release();
    let (mut spi, mut dc, mut rst, _) = iface.release();
    spi.done();
    dc.done();
    rst.done();
    backlight.done();
}

// ---------------------------------------------------------------------------
// Memory-backed bus
// ---------------------------------------------------------------------------

#[test]
fn test_panel_constants() {
    assert_eq!((PIXEL_WIDTH, PIXEL_HEIGHT), (240, 320));
    assert_eq!(InitTable::parse(&INIT_TABLE).unwrap().len(), 25);
}

/// Init replays the table bit-for-bit after the reset pulse and SWRESET.
#[test]
fn test_init_trace_matches_table() {
    let mut lcd = memory_driver(DisplayConfig::default());
    lcd.init().unwrap();

    let commands = lcd.bus().commands();
    let table: Vec<u8> = InitTable::parse(&INIT_TABLE)
        .unwrap()
        .steps()
        .map(|step| step.command)
        .collect();
    assert_eq!(commands[0], 0x01);
    assert_eq!(commands[1..=table.len()], table[..]);

    let (_, backlight, delay) = lcd.release();
    assert!(backlight.is_high());
    assert_eq!(delay.delays_ms(), [50, 120, 100]);
}

/// Init leaves the panel black with the backlight on.
#[test]
fn test_init_clears_panel() {
    let mut bus = MockLcdBus::new();
    bus.fill_gram(colors::WHITE);
    let mut lcd = Ili9341::new(bus, MockPin::default(), MockDelay::default(), DisplayConfig::default());
    lcd.init().unwrap();

    assert!(lcd.properties().backlight_on);
    for (x, y) in [(0, 0), (239, 0), (0, 319), (239, 319), (120, 160)] {
        assert_eq!(lcd.bus().pixel(x, y), colors::BLACK);
    }
}

/// Draw, read back, rotate: a small application session.
#[test]
fn test_draw_and_read_back_session() {
    let mut lcd = memory_driver(DisplayConfig::default());
    lcd.init().unwrap();

    lcd.fill_rect(10, 10, 20, 20, colors::ORANGE);
    assert_eq!(lcd.read_pixel(15, 15).unwrap(), colors::ORANGE);
    assert_eq!(lcd.read_pixel(5, 5).unwrap(), colors::BLACK);

    lcd.set_orientation(Orientation::Landscape).unwrap();
    lcd.fill_screen(colors::BLUE);
    lcd.set_orientation(Orientation::Portrait).unwrap();
    assert_eq!((lcd.width(), lcd.height()), (240, 320));
    assert_eq!(lcd.fault(), None);
}

/// A bus failure mid-drawing is latched, and control calls still report it.
#[test]
fn test_fault_latching_across_calls() {
    let mut lcd = memory_driver(DisplayConfig::default());
    lcd.bus_mut().fail_after(3);

    lcd.fill_rect(0, 0, 10, 10, colors::RED);
    assert_eq!(lcd.fault(), Some(DisplayError::Bus));
    assert_eq!(lcd.bus().ops().len(), 3);

    assert_eq!(lcd.display_on(), Err(DisplayError::Bus));
    assert_eq!(lcd.clear_fault(), Some(DisplayError::Bus));
}

/// Mode toggles appear on the bus in call order.
#[test]
fn test_mode_toggles_on_bus() {
    let mut lcd = memory_driver(DisplayConfig::default());
    lcd.display_off().unwrap();
    lcd.inversion_on().unwrap();
    lcd.display_on().unwrap();
    assert_eq!(
        lcd.bus().ops(),
        [
            BusOp::Command(0x28),
            BusOp::Command(0x21),
            BusOp::Command(0x29),
        ]
    );
    assert!(lcd.properties().inverted_color);
    assert!(lcd.properties().backlight_on);
}
