//! LED strip abstraction.
//!
//! The render loop only speaks [`LedStrip`]: set pixels, commit with
//! `show()`, blank with `clear()`. `show()` is the atomic visible
//! update boundary; nothing reaches the physical array before it.
//! Physical WS281x output goes through [`BufferedStrip`] over any
//! `smart-leds` driver; simulation uses [`ConsoleDriver`].

use std::io::{self, Write as _};
use std::time::Duration;

use derive_more::{Display, Error};
use rgb::RGB8;
use smart_leds::{brightness, gamma, SmartLedsWrite};

/// A strip driver refused a frame.
#[derive(Debug, Display, Error)]
#[display("led strip write failed: {_0}")]
pub struct StripError(#[error(not(source))] pub String);

/// Fixed-length addressable LED array.
pub trait LedStrip {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stage a pixel color. Out-of-range indexes are ignored.
    fn set_pixel(&mut self, index: usize, color: RGB8);

    /// Stage the same color on every pixel.
    fn fill(&mut self, color: RGB8) {
        for i in 0..self.len() {
            self.set_pixel(i, color);
        }
    }

    /// Commit the staged buffer to the array.
    fn show(&mut self) -> Result<(), StripError>;

    /// Blank the array and commit, used deterministically on shutdown.
    fn clear(&mut self) -> Result<(), StripError> {
        self.fill(RGB8::default());
        self.show()
    }
}

/// Buffered strip over a `smart-leds` driver.
///
/// Gamma correction is applied first, then brightness reduction, as
/// recommended by the smart-leds docs.
pub struct BufferedStrip<D: SmartLedsWrite<Color = RGB8>> {
    driver: D,
    pixels: Vec<RGB8>,
    brightness: u8,
}

impl<D> BufferedStrip<D>
where
    D: SmartLedsWrite<Color = RGB8>,
    D::Error: std::fmt::Display,
{
    pub fn new(driver: D, led_count: usize, brightness: u8) -> Self {
        Self {
            driver,
            pixels: vec![RGB8::default(); led_count],
            brightness,
        }
    }
}

impl<D> LedStrip for BufferedStrip<D>
where
    D: SmartLedsWrite<Color = RGB8>,
    D::Error: std::fmt::Display,
{
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) -> Result<(), StripError> {
        self.driver
            .write(brightness(gamma(self.pixels.iter().copied()), self.brightness))
            .map_err(|e| StripError(e.to_string()))
    }
}

/// Terminal "driver" for running without hardware: each committed
/// frame is drawn as one colored block per LED, redrawn in place.
///
/// Plugs into [`BufferedStrip`] like any other `smart-leds` driver, so
/// simulation runs the same gamma/brightness path as real hardware.
#[derive(Debug, Default)]
pub struct ConsoleDriver;

impl SmartLedsWrite for ConsoleDriver {
    type Error = io::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut line = String::from('\r');
        for item in iterator {
            let pixel: RGB8 = item.into();
            line.push_str(&format!(
                "\x1b[48;2;{};{};{}m  ",
                pixel.r, pixel.g, pixel.b
            ));
        }
        line.push_str("\x1b[0m");

        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}

/// Sweep a color across the strip one pixel at a time, committing
/// after each pixel. Used as the boot/bring-up animation.
pub fn color_wipe(
    strip: &mut dyn LedStrip,
    color: RGB8,
    per_pixel: Duration,
    sleep: &mut dyn FnMut(Duration),
) -> Result<(), StripError> {
    for i in 0..strip.len() {
        strip.set_pixel(i, color);
        strip.show()?;
        sleep(per_pixel);
    }
    Ok(())
}

/// In-memory strip recording every committed frame, for tests.
#[cfg(test)]
pub struct MemoryStrip {
    pixels: Vec<RGB8>,
    pub frames: Vec<Vec<RGB8>>,
}

#[cfg(test)]
impl MemoryStrip {
    pub fn new(led_count: usize) -> Self {
        Self {
            pixels: vec![RGB8::default(); led_count],
            frames: Vec::new(),
        }
    }
}

#[cfg(test)]
impl LedStrip for MemoryStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) -> Result<(), StripError> {
        self.frames.push(self.pixels.clone());
        Ok(())
    }
}
