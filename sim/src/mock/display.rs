// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Mock screen rendering
//!
//! Screens are three lines of text, rendered to a deterministic bitmap
//! with one pixel column per character and one pixel row per character bit.
//! Identical screens always produce identical frames.
//!
//! ```text
//!  x: 2 + character index
//!  y: top + line * 10 + 1 + bit (LSB first)
//! ```

use image::{Rgba, RgbaImage};

/// Number of text lines per screen
pub const LINES: usize = 3;

/// Characters per value line
pub const LINE_CHARS: usize = 12;

/// Value characters per review page (two lines)
pub const PAGE_CHARS: usize = 2 * LINE_CHARS;

const LINE_HEIGHT: u32 = 10;
const MARGIN: u32 = 2;

const FOREGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Screen content
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Screen {
    pub lines: [String; LINES],
}

impl Screen {
    /// Create a two line (title / text) screen
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lines: [title.into(), text.into(), String::new()],
        }
    }

    /// Create a paged value screen, `value` must fit within [PAGE_CHARS]
    pub fn value(title: impl Into<String>, value: &str) -> Self {
        let (a, b) = match value.char_indices().nth(LINE_CHARS) {
            Some((i, _)) => value.split_at(i),
            None => (value, ""),
        };

        Self {
            lines: [title.into(), a.to_string(), b.to_string()],
        }
    }

    /// Render screen to an image of the provided size
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

        let top = height.saturating_sub(LINES as u32 * LINE_HEIGHT) / 2;

        for (l, line) in self.lines.iter().enumerate() {
            let y0 = top + l as u32 * LINE_HEIGHT + 1;

            for (i, c) in line.bytes().enumerate() {
                let x = MARGIN + i as u32;
                if x >= width {
                    break;
                }

                for bit in 0..8 {
                    let y = y0 + bit;
                    if (c >> bit) & 1 == 1 && y < height {
                        img.put_pixel(x, y, FOREGROUND);
                    }
                }
            }
        }

        img
    }
}

/// Split a value into review pages of at most [PAGE_CHARS] characters
pub fn paginate(title: &str, value: &str) -> Vec<Screen> {
    let chars: Vec<char> = value.chars().collect();

    let chunks: Vec<String> = match chars.is_empty() {
        true => vec![String::new()],
        false => chars
            .chunks(PAGE_CHARS)
            .map(|c| c.iter().collect())
            .collect(),
    };

    let n = chunks.len();
    chunks
        .iter()
        .enumerate()
        .map(|(i, v)| match n {
            1 => Screen::value(title, v),
            _ => Screen::value(format!("{title} ({}/{n})", i + 1), v),
        })
        .collect()
}
