//! Glyph advance widths for the standard Helvetica faces.
//!
//! Values are the Adobe AFM widths (units of 1/1000 em) for printable ASCII.
//! Latin-1 letters above 0x7F fall back to the width of a digit, which is
//! close enough for centring and wrapping decisions.

use crate::pipeline::layout::{Font, FontFace};

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn glyph_width(face: FontFace, ch: char) -> u16 {
    let table = match face {
        // Oblique shares the upright metrics.
        FontFace::Regular | FontFace::Italic => &HELVETICA,
        FontFace::Bold => &HELVETICA_BOLD,
    };
    match ch as u32 {
        c @ 0x20..=0x7E => table[(c - 0x20) as usize],
        // Controls are printed as a space.
        0x00..=0x1F | 0x7F..=0x9F => table[0],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` set in `font`, in points.
pub fn text_width_pt(text: &str, font: Font) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(font.face, c) as u32).sum();
    units as f32 * font.size / 1000.0
}
