//! PDF encoding of laid-out pages.
//!
//! Pages are written with lopdf using the three base-14 Helvetica faces in
//! WinAnsiEncoding, so no font data is embedded. Content streams are left
//! uncompressed, and neither a creation date nor a file identifier is
//! written: the same pages always encode to the same bytes.

use crate::pipeline::layout::{DrawOp, FontFace, Page, PageGeometry, PT_PER_MM};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

const PRODUCER: &str = "paysheet";

/// Failure to turn pages into a PDF.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RenderError {
    /// A character has no single-byte representation in the document fonts.
    #[error("character {ch:?} cannot be encoded in \"{text}\"")]
    Unencodable { ch: char, text: String },

    #[error("PDF encoding failed: {0}")]
    Pdf(String),
}

/// Map text to WinAnsi bytes. Latin-1 shares its code points with
/// WinAnsi; C0 and C1 control characters print as a space. Anything above
/// U+00FF is rejected.
pub fn to_win_ansi(text: &str) -> Result<Vec<u8>, RenderError> {
    text.chars()
        .map(|ch| match ch as u32 {
            c @ (0x20..=0x7E | 0xA0..=0xFF) => Ok(c as u8),
            0x00..=0x1F | 0x7F..=0x9F => Ok(b' '),
            _ => Err(RenderError::Unencodable {
                ch,
                text: text.to_string(),
            }),
        })
        .collect()
}

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Italic => "F3",
    }
}

fn add_font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Content-stream operations for one page.
fn page_operations(page: &Page, geometry: &PageGeometry) -> Result<Vec<Operation>, RenderError> {
    let to_pt = |mm: f32| mm * PT_PER_MM;
    let flip = |mm: f32| (geometry.height - mm) * PT_PER_MM;

    let mut ops = vec![Operation::new("w", vec![to_pt(geometry.line_width).into()])];

    for op in &page.ops {
        match op {
            DrawOp::Rect { x, y, w, h } => {
                ops.push(Operation::new(
                    "re",
                    vec![
                        to_pt(*x).into(),
                        flip(y + h).into(),
                        to_pt(*w).into(),
                        to_pt(*h).into(),
                    ],
                ));
                ops.push(Operation::new("S", vec![]));
            }
            DrawOp::Text {
                x,
                baseline,
                font,
                text,
            } => {
                let bytes = to_win_ansi(text)?;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![font_resource(font.face).into(), font.size.into()],
                ));
                ops.push(Operation::new("Td", vec![to_pt(*x).into(), flip(*baseline).into()]));
                ops.push(Operation::new("Tj", vec![Object::string_literal(bytes)]));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }

    Ok(ops)
}

/// Encode `pages` into a complete PDF document.
pub fn encode_document(pages: &[Page], geometry: &PageGeometry, title: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let fonts = dictionary! {
        "F1" => add_font(&mut doc, "Helvetica"),
        "F2" => add_font(&mut doc, "Helvetica-Bold"),
        "F3" => add_font(&mut doc, "Helvetica-Oblique"),
    };
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, geometry)?,
        };
        let stream = content.encode().map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, stream));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        (geometry.width * PT_PER_MM).into(),
        (geometry.height * PT_PER_MM).into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(to_win_ansi(title)?),
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(out)
}
