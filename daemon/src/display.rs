//! Display gateway: rasterizes frames into the panel framebuffer.
//!
//! The panel is a 160x80 SPI LCD the kernel exposes as a framebuffer device
//! taking RGB565 little-endian, with its backlight behind a sysfs brightness
//! file. Frames are drawn into an in-memory Rgb888 framebuffer first, then
//! converted and written out in one shot.

use anyhow::{Context, Result};
use async_trait::async_trait;
use embedded_graphics::Pixel;
use embedded_graphics::framebuffer::Framebuffer;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::pixelcolor::raw::BigEndian;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use enviromon::chart::CHART_TOP;
use enviromon::{Frame, FrameContent};

use crate::config::DisplayConfig;

/// Panel dimensions. `WIDTH` also fixes the sample-window capacity.
pub const WIDTH: usize = 160;
pub const HEIGHT: usize = 80;

type EgFramebuffer = Framebuffer<
    Rgb888,
    <Rgb888 as PixelColor>::Raw,
    BigEndian,
    WIDTH,
    HEIGHT,
    { embedded_graphics::framebuffer::buffer_size::<Rgb888>(WIDTH, HEIGHT) },
>;

/// The panel, as the render loop sees it. Write failures are fatal to the
/// daemon, so both operations propagate errors.
#[async_trait]
pub trait DisplayGateway {
    async fn render(&mut self, frame: &Frame) -> Result<()>;
    async fn set_backlight(&mut self, on: bool, brightness: u8) -> Result<()>;
}

pub struct FbDisplay {
    config: DisplayConfig,
    fb: Box<EgFramebuffer>,
}

impl FbDisplay {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            fb: Box::new(EgFramebuffer::new()),
        }
    }
}

#[async_trait]
impl DisplayGateway for FbDisplay {
    async fn render(&mut self, frame: &Frame) -> Result<()> {
        rasterize(&mut self.fb, frame);
        let raw = rgb888_to_rgb565_le(self.fb.data());
        tokio::fs::write(&self.config.framebuffer_path, &raw)
            .await
            .with_context(|| {
                format!("failed to write framebuffer {}", self.config.framebuffer_path)
            })
    }

    async fn set_backlight(&mut self, on: bool, brightness: u8) -> Result<()> {
        let val = if on { brightness } else { 0 };
        tokio::fs::write(&self.config.backlight_path, val.to_string())
            .await
            .with_context(|| format!("failed to set backlight {}", self.config.backlight_path))
    }
}

/// Draw a frame into the Rgb888 framebuffer. Drawing into an in-memory
/// framebuffer is infallible, hence the `.ok()`s.
fn rasterize(fb: &mut EgFramebuffer, frame: &Frame) {
    match &frame.content {
        FrameContent::Blank => {
            fb.clear(Rgb888::BLACK).ok();
        }
        FrameContent::Chart { columns, label } => {
            fb.clear(Rgb888::WHITE).ok();
            for (i, column) in columns.iter().enumerate().take(WIDTH) {
                let x = i as i32;
                let (r, g, b) = column.rgb;
                Rectangle::new(
                    Point::new(x, CHART_TOP as i32),
                    Size::new(1, HEIGHT as u32 - CHART_TOP),
                )
                .into_styled(PrimitiveStyle::with_fill(Rgb888::new(r, g, b)))
                .draw(fb)
                .ok();
                Pixel(Point::new(x, column.trend_row as i32), Rgb888::BLACK)
                    .draw(fb)
                    .ok();
            }
            let style = MonoTextStyle::new(&FONT_6X10, Rgb888::BLACK);
            Text::with_baseline(label, Point::zero(), style, Baseline::Top)
                .draw(fb)
                .ok();
        }
    }
}

fn rgb888_to_rgb565_le(rgb888: &[u8]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(rgb888.len() / 3 * 2);
    for chunk in rgb888.chunks_exact(3) {
        let (r, g, b) = (chunk[0], chunk[1], chunk[2]);
        let mut rgb565: u16 = (r as u16 & 0b11111000) << 8;
        rgb565 |= (g as u16 & 0b11111100) << 3;
        rgb565 |= (b as u16) >> 3;
        raw.extend(rgb565.to_le_bytes());
    }
    raw
}
