//! Screen content
//!
//! Views describe what a screen should show as a [`Scene`]; a [`Renderer`] turns that into
//! a 480x272 RGB565 [`Frame`]. [`FlatRenderer`] only paints geometry (backgrounds, bars,
//! highlight bands, the placeholder cross); text is left to richer renderers.

use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::kontrol::codec::{SCREEN_HEIGHT, SCREEN_WIDTH};

const WIDTH: usize = SCREEN_WIDTH as usize;
const HEIGHT: usize = SCREEN_HEIGHT as usize;

/// Pack 8-bit channels into RGB565
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xf8) << 8) | ((g as u16 & 0xfc) << 3) | (b as u16 >> 3)
}

pub const BLACK: u16 = rgb565(0, 0, 0);
const WHITE: u16 = rgb565(255, 255, 255);
const RED: u16 = rgb565(255, 0, 0);
const TITLE_BAR: u16 = rgb565(51, 51, 26);
const FOOTER: u16 = rgb565(26, 26, 13);
const HIGHLIGHT: u16 = rgb565(191, 102, 0);
const STRIP_BG: u16 = rgb565(51, 51, 51);
const STRIP_BG_HIGHLIGHT: u16 = rgb565(51, 26, 0);
const MUTE_ON: u16 = rgb565(0, 180, 180);
const SOLO_ON: u16 = rgb565(230, 160, 0);
const REC_ON: u16 = rgb565(200, 0, 0);
const FADER: u16 = rgb565(180, 180, 180);
const METER: u16 = rgb565(0, 200, 60);

/// One full screen of RGB565 pixels in host order
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub pixels: Vec<u16>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({} px)", self.pixels.len())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::filled(BLACK)
    }
}

impl Frame {
    pub fn filled(color: u16) -> Self {
        Self {
            pixels: vec![color; WIDTH * HEIGHT],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * WIDTH + x]
    }

    /// Fill a rectangle, clipped to the screen
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u16) {
        let x_end = (x + w).min(WIDTH);
        for row in y.min(HEIGHT)..(y + h).min(HEIGHT) {
            if x < x_end {
                self.pixels[row * WIDTH + x..row * WIDTH + x_end].fill(color);
            }
        }
    }

    /// One pixel wide rectangle outline
    pub fn stroke_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u16) {
        if w == 0 || h == 0 {
            return;
        }
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y, 1, h, color);
        self.fill_rect(x + w - 1, y, 1, h, color);
    }

    fn draw_cross(&mut self, color: u16) {
        for x in 0..WIDTH {
            let y = x * (HEIGHT - 1) / (WIDTH - 1);
            self.pixels[y * WIDTH + x] = color;
            self.pixels[y * WIDTH + (WIDTH - 1 - x)] = color;
        }
    }
}

/// What one strip column shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StripCell {
    pub name: String,
    pub muted: bool,
    pub soloed: bool,
    pub rec_enabled: Option<bool>,
    /// 0.0..=1.0
    pub fader: f32,
    /// 0.0..=1.0, 0.5 is center
    pub pan: f32,
    /// dB
    pub meter: f32,
    pub highlighted: bool,
}

/// Declarative screen content
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    /// Placeholder: red diagonals on black
    Cross,
    Menu {
        title: Vec<String>,
        options: Vec<String>,
        highlight: usize,
    },
    /// Value grid with an optional highlighted (column, row) cell
    Table {
        title: Vec<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        highlight: Option<(usize, usize)>,
    },
    /// Up to four strips plus the session footer
    StripBank {
        strips: Vec<StripCell>,
        session: String,
    },
    /// Caption with a marker sweeping across, `position` in 0.0..=1.0 of this screen
    Banner { text: String, position: Option<f32> },
}

/// Turns scenes into pixels
pub trait Renderer {
    fn render(&mut self, scene: &Scene) -> Frame;
}

/// Geometry-only renderer
#[derive(Debug, Default)]
pub struct FlatRenderer;

impl FlatRenderer {
    fn title_bar(frame: &mut Frame) {
        frame.fill_rect(0, 0, WIDTH, 22, TITLE_BAR);
    }

    fn strip(frame: &mut Frame, index: usize, cell: &StripCell) {
        let x = index * 120;
        let bg = if cell.highlighted {
            STRIP_BG_HIGHLIGHT
        } else {
            STRIP_BG
        };
        frame.fill_rect(x + 2, 2, 116, 244, bg);

        // Button row: mute, solo, record
        if cell.muted {
            frame.fill_rect(x + 6, 30, 34, 20, MUTE_ON);
        }
        if cell.soloed {
            frame.fill_rect(x + 43, 30, 34, 20, SOLO_ON);
        }
        if cell.rec_enabled == Some(true) {
            frame.fill_rect(x + 80, 30, 34, 20, REC_ON);
        }

        // Pan bar with a center tick
        frame.stroke_rect(x + 6, 60, 108, 10, FADER);
        let pan_x = x + 6 + (cell.pan.clamp(0.0, 1.0) * 107.0) as usize;
        frame.fill_rect(pan_x, 60, 2, 10, WHITE);

        // Fader and meter, bottom up
        let fader_h = (cell.fader.clamp(0.0, 1.0) * 160.0) as usize;
        frame.fill_rect(x + 30, 240 - fader_h, 20, fader_h, FADER);
        let meter_level = ((cell.meter + 60.0) / 60.0).clamp(0.0, 1.0);
        let meter_h = (meter_level * 160.0) as usize;
        frame.fill_rect(x + 70, 240 - meter_h, 10, meter_h, METER);

        if cell.highlighted {
            frame.stroke_rect(x + 1, 1, 118, 246, HIGHLIGHT);
        }
    }
}

impl Renderer for FlatRenderer {
    fn render(&mut self, scene: &Scene) -> Frame {
        let mut frame = Frame::default();
        match scene {
            Scene::Cross => frame.draw_cross(RED),
            Scene::Menu {
                options, highlight, ..
            } => {
                Self::title_bar(&mut frame);
                for (i, _) in options.iter().enumerate() {
                    let y = 35 + 35 * i;
                    frame.fill_rect(15, y, 200, 22, TITLE_BAR);
                    if i == *highlight {
                        frame.stroke_rect(15, y, 200, 22, HIGHLIGHT);
                    }
                }
            }
            Scene::Table {
                rows, highlight, ..
            } => {
                Self::title_bar(&mut frame);
                for (r, row) in rows.iter().enumerate() {
                    for (c, _) in row.iter().enumerate() {
                        let (x, y) = (c * 120 + 15, 50 + r * 25);
                        frame.fill_rect(x, y, 90, 22, TITLE_BAR);
                        if *highlight == Some((c, r)) {
                            frame.stroke_rect(x, y, 90, 22, HIGHLIGHT);
                        }
                    }
                }
            }
            Scene::StripBank { strips, .. } => {
                if strips.is_empty() {
                    frame.draw_cross(RED);
                } else {
                    for (i, cell) in strips.iter().take(4).enumerate() {
                        Self::strip(&mut frame, i, cell);
                    }
                    frame.fill_rect(0, 250, WIDTH, 22, FOOTER);
                }
            }
            Scene::Banner { position, .. } => {
                if let Some(pos) = position {
                    let center = (pos * WIDTH as f32) as i64;
                    let left = (center - 20).clamp(0, WIDTH as i64) as usize;
                    let right = (center + 20).clamp(0, WIDTH as i64) as usize;
                    frame.fill_rect(left, 200, right - left, 10, RED);
                }
            }
        }
        frame
    }
}

/// Anything that wants a copy of each uploaded screen
pub trait FrameSink {
    fn upload_frame(&mut self, screen: u8, frame: &Frame) -> Result<()>;
}

/// Writes `screen{n}.png` into a directory, overwriting on every upload
pub struct PngDumper {
    dir: PathBuf,
}

impl PngDumper {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl FrameSink for PngDumper {
    fn upload_frame(&mut self, screen: u8, frame: &Frame) -> Result<()> {
        let img = image::RgbImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
            let px = frame.pixel(x as usize, y as usize);
            let r = ((px >> 11) & 0x1f) as u8;
            let g = ((px >> 5) & 0x3f) as u8;
            let b = (px & 0x1f) as u8;
            image::Rgb([r << 3 | r >> 2, g << 2 | g >> 4, b << 3 | b >> 2])
        });
        let path = self.dir.join(format!("screen{}.png", screen));
        img.save(&path)?;
        debug!("Frame dumped to {}", path.display());
        Ok(())
    }
}
