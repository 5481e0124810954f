//! Flowing page layout: cells, wrapped paragraphs and automatic page breaks.
//!
//! [`Canvas`] keeps a cursor in millimetres from the top-left corner of the
//! page and places fixed-height cells left to right, wrapping to the next
//! line on request. A cell that would cross the bottom break margin starts a
//! new page first; every page gets the configured header banner at the top
//! and footer banner at the bottom.
//!
//! The canvas only records [`DrawOp`]s. Turning them into PDF content is the
//! job of [`crate::pipeline::pdf`], which keeps the layout testable without
//! parsing PDF output.

use crate::pipeline::metrics::text_width_pt;
use serde::Serialize;

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

/// A face at a size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub face: FontFace,
    pub size: f32,
}

impl Font {
    pub const fn regular(size: f32) -> Self {
        Self {
            face: FontFace::Regular,
            size,
        }
    }

    pub const fn bold(size: f32) -> Self {
        Self {
            face: FontFace::Bold,
            size,
        }
    }

    pub const fn italic(size: f32) -> Self {
        Self {
            face: FontFace::Italic,
            size,
        }
    }

    /// Font size in millimetres.
    fn size_mm(&self) -> f32 {
        self.size / PT_PER_MM
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Where the cursor goes after a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Stay on the line, just right of the cell.
    Right,
    /// Start of the next line.
    NextLine,
}

/// One drawing instruction; all coordinates in mm from the page's top-left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        x: f32,
        baseline: f32,
        font: Font,
        text: String,
    },
    /// Stroked rectangle outline.
    Rect { x: f32, y: f32, w: f32, h: f32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rect { .. } => None,
        })
    }

    pub fn rect_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count()
    }
}

/// Page size and margins, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Left, right and top margin.
    pub margin: f32,
    /// Distance from the bottom edge at which content breaks to a new page.
    pub break_margin: f32,
    /// Horizontal padding between a cell's edge and its text.
    pub cell_padding: f32,
    pub line_width: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 10.0,
        break_margin: 15.0,
        cell_padding: 1.0,
        line_width: 0.2,
    };

    fn break_trigger(&self) -> f32 {
        self.height - self.break_margin
    }

    fn content_right(&self) -> f32 {
        self.width - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// A single centred line repeated on every page.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub text: String,
    pub font: Font,
    pub height: f32,
    /// Header: gap below the banner. Footer: distance of the banner's top
    /// from the bottom edge.
    pub offset: f32,
}

impl Banner {
    pub fn new(text: impl Into<String>, font: Font, height: f32, offset: f32) -> Self {
        Self {
            text: text.into(),
            font,
            height,
            offset,
        }
    }
}

/// Cursor-based layout surface producing [`Page`]s.
#[derive(Debug, Clone)]
pub struct Canvas {
    geometry: PageGeometry,
    header: Option<Banner>,
    footer: Option<Banner>,
    pages: Vec<Page>,
    x: f32,
    y: f32,
    font: Font,
}

impl Canvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            header: None,
            footer: None,
            pages: Vec::new(),
            x: geometry.margin,
            y: geometry.margin,
            font: Font::regular(12.0),
        }
    }

    pub fn with_header(mut self, banner: Banner) -> Self {
        self.header = Some(banner);
        self
    }

    pub fn with_footer(mut self, banner: Banner) -> Self {
        self.footer = Some(banner);
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Current cursor `(x, y)`.
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    /// Close the current page (drawing its footer) and open a new one with
    /// the header already placed.
    pub fn add_page(&mut self) {
        self.close_page();
        self.pages.push(Page::default());
        self.x = self.geometry.margin;
        self.y = self.geometry.margin;

        if let Some(header) = self.header.clone() {
            let body_font = self.font;
            self.font = header.font;
            self.place_cell(0.0, header.height, &header.text, false, Align::Center, Advance::NextLine);
            self.ln(header.offset);
            self.font = body_font;
        }
    }

    /// Move to the start of a line `h` mm further down.
    pub fn ln(&mut self, h: f32) {
        self.x = self.geometry.margin;
        self.y += h;
    }

    /// Place one single-line cell.
    ///
    /// `w == 0` extends the cell to the right margin. Starts a new page first
    /// if the cell would cross the break margin.
    pub fn cell(&mut self, w: f32, h: f32, text: &str, border: bool, align: Align, advance: Advance) {
        if self.pages.is_empty() {
            self.add_page();
        }
        if self.y + h > self.geometry.break_trigger() {
            let x = self.x;
            self.add_page();
            self.x = x;
        }
        self.place_cell(w, h, text, border, align, advance);
    }

    /// Place a word-wrapped, left-aligned paragraph as a stack of `h`-high
    /// lines, honouring explicit `\n`. Leaves the cursor at the left margin
    /// below the last line.
    pub fn multi_cell(&mut self, w: f32, h: f32, text: &str) {
        let w = self.resolve_width(w);
        let max_pt = (w - 2.0 * self.geometry.cell_padding) * PT_PER_MM;
        for line in wrap_text(text, self.font, max_pt) {
            self.cell(w, h, &line, false, Align::Left, Advance::NextLine);
        }
        self.x = self.geometry.margin;
    }

    /// Finish the last page and return every page.
    pub fn finish(mut self) -> Vec<Page> {
        self.close_page();
        self.pages
    }

    fn resolve_width(&self, w: f32) -> f32 {
        if w == 0.0 {
            self.geometry.content_right() - self.x
        } else {
            w
        }
    }

    fn close_page(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        if let Some(footer) = self.footer.clone() {
            let body_font = self.font;
            self.font = footer.font;
            self.x = self.geometry.margin;
            self.y = self.geometry.height - footer.offset;
            self.place_cell(0.0, footer.height, &footer.text, false, Align::Center, Advance::Right);
            self.font = body_font;
        }
    }

    /// Draw a cell at the cursor without any page-break check.
    fn place_cell(&mut self, w: f32, h: f32, text: &str, border: bool, align: Align, advance: Advance) {
        let w = self.resolve_width(w);
        let font = self.font;
        let (x, y) = (self.x, self.y);
        let pad = self.geometry.cell_padding;

        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let Some(page) = self.pages.last_mut() else {
            return;
        };

        if border {
            page.ops.push(DrawOp::Rect { x, y, w, h });
        }

        if !text.is_empty() {
            let text_w = text_width_pt(text, font) / PT_PER_MM;
            let dx = match align {
                Align::Left => pad,
                Align::Right => w - pad - text_w,
                Align::Center => (w - text_w) / 2.0,
            };
            page.ops.push(DrawOp::Text {
                x: x + dx,
                baseline: y + 0.5 * h + 0.3 * font.size_mm(),
                font,
                text: text.to_string(),
            });
        }

        match advance {
            Advance::Right => self.x += w,
            Advance::NextLine => {
                self.x = self.geometry.margin;
                self.y += h;
            }
        }
    }
}

/// Greedy word wrap to `max_pt`, breaking inside words only when a single
/// word is wider than the line. `\r\n` and `\r` count as line breaks.
pub fn wrap_text(text: &str, font: Font, max_pt: f32) -> Vec<String> {
    let fits = |s: &str| text_width_pt(s, font) <= max_pt;
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for (i, word) in paragraph.split(' ').enumerate() {
            let candidate = if i == 0 {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            for ch in word.chars() {
                line.push(ch);
                if !fits(&line) && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                }
            }
        }
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(PageGeometry::A4)
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        let lines = wrap_text("hello world", Font::regular(12.0), 500.0);
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn wrap_honours_newlines() {
        let lines = wrap_text("a\nb\n\nc", Font::regular(12.0), 500.0);
        assert_eq!(lines, vec!["a", "b", "", "c"]);
    }

    #[test]
    fn wrap_treats_carriage_returns_as_newlines() {
        let lines = wrap_text("Line one\r\nLine two\rthree", Font::regular(12.0), 500.0);
        assert_eq!(lines, vec!["Line one", "Line two", "three"]);
    }

    #[test]
    fn wrap_breaks_between_words() {
        let font = Font::regular(12.0);
        let max = text_width_pt("alpha beta", font);
        let lines = wrap_text("alpha beta gamma", font, max);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn wrap_splits_overlong_word() {
        let font = Font::regular(10.0);
        let max = text_width_pt("0000", font);
        let lines = wrap_text("0000000000", font, max);
        assert_eq!(lines, vec!["0000", "0000", "00"]);
    }

    #[test]
    fn cell_advances_right_then_next_line() {
        let mut c = canvas();
        c.cell(90.0, 8.0, "A", true, Align::Left, Advance::Right);
        assert_eq!(c.position(), (100.0, 10.0));
        c.cell(0.0, 8.0, "B", true, Align::Left, Advance::NextLine);
        assert_eq!(c.position(), (10.0, 18.0));

        let pages = c.finish();
        let rects: Vec<_> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { x, w, .. } => Some((*x, *w)),
                _ => None,
            })
            .collect();
        // zero width runs to the right margin
        assert_eq!(rects, vec![(10.0, 90.0), (100.0, 100.0)]);
    }

    #[test]
    fn right_aligned_text_ends_at_padding() {
        let mut c = canvas();
        c.set_font(Font::regular(12.0));
        c.cell(90.0, 8.0, "Income Tax", false, Align::Right, Advance::NextLine);
        let pages = c.finish();
        let DrawOp::Text { x, .. } = &pages[0].ops[0] else {
            panic!("expected text");
        };
        let w = text_width_pt("Income Tax", Font::regular(12.0)) / PT_PER_MM;
        assert!((x + w - 99.0).abs() < 1e-3);
    }

    #[test]
    fn header_and_footer_on_every_page() {
        let mut c = canvas()
            .with_header(Banner::new("HEAD", Font::bold(14.0), 10.0, 5.0))
            .with_footer(Banner::new("FOOT", Font::italic(10.0), 10.0, 15.0));
        c.add_page();
        assert_eq!(c.position(), (10.0, 25.0));
        for _ in 0..40 {
            c.cell(0.0, 8.0, "line", false, Align::Left, Advance::NextLine);
        }
        let pages = c.finish();
        assert!(pages.len() >= 2);
        for page in &pages {
            let texts: Vec<_> = page.texts().collect();
            assert_eq!(texts.first(), Some(&"HEAD"));
            assert_eq!(texts.last(), Some(&"FOOT"));
        }
    }

    #[test]
    fn page_breaks_before_crossing_trigger() {
        let mut c = canvas();
        c.add_page();
        c.ln(270.0); // y = 280
        c.cell(0.0, 8.0, "x", false, Align::Left, Advance::NextLine);
        let pages = c.finish();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].texts().next().is_none());
        assert_eq!(pages[1].texts().collect::<Vec<_>>(), vec!["x"]);
    }
}
