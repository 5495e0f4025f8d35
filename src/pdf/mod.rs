//! Arabic PDF generation: shape, reorder for display, then place right-aligned on an A4 page.

use anyhow::{Context, anyhow};
use printpdf::{Mm, PdfDocument};
use unicode_bidi::{BidiInfo, Level};

pub const DEFAULT_TEXT: &str = "مرحبا بكم في نظام طلبات الموارد البشرية";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const FIRST_BASELINE_MM: f32 = PAGE_HEIGHT_MM - 30.0;
const FONT_SIZE_PT: f32 = 16.0;
const LINE_SPACING: f32 = 1.5;
const MM_PER_PT: f32 = 25.4 / 72.0;

#[cfg(test)]
pub(crate) const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Contextual joining into Arabic Presentation Forms-B. printpdf places glyphs without an
/// OpenType shaper, so letters must already be in their isolated/initial/medial/final forms.
pub fn shape_arabic(line: &str) -> String {
    ar_reshaper::reshape_line(line)
}

/// Reorders one logical line into left-to-right display order, right-to-left paragraph level.
pub fn visual_order(line: &str) -> String {
    let bidi = BidiInfo::new(line, Some(Level::rtl()));
    bidi.paragraphs
        .iter()
        .map(|para| bidi.reorder_line(para, para.range.clone()).into_owned())
        .collect()
}

/// Lines ready to be drawn: shaped, then visually ordered.
pub fn layout_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| visual_order(&shape_arabic(line.trim_end())))
        .collect()
}

struct Metrics<'a> {
    face: ttf_parser::Face<'a>,
}

impl<'a> Metrics<'a> {
    fn parse(font: &'a [u8]) -> anyhow::Result<Self> {
        let face = ttf_parser::Face::parse(font, 0).map_err(|e| anyhow!("invalid font: {e}"))?;
        Ok(Self { face })
    }

    /// Advance width of `text` at `size_pt`, in millimetres.
    fn width_mm(&self, text: &str, size_pt: f32) -> f32 {
        let units_per_em = f32::from(self.face.units_per_em());
        let advance: u32 = text
            .chars()
            .filter_map(|c| self.face.glyph_index(c))
            .filter_map(|gid| self.face.glyph_hor_advance(gid))
            .map(u32::from)
            .sum();
        advance as f32 / units_per_em * size_pt * MM_PER_PT
    }
}

/// Renders `text` on one A4 page and returns the PDF bytes.
/// `font` must be a TrueType font that covers Arabic Presentation Forms-B.
pub fn render_arabic_pdf(text: &str, font: &[u8]) -> anyhow::Result<Vec<u8>> {
    let metrics = Metrics::parse(font)?;

    let (doc, page, layer) = PdfDocument::new(
        "Arabic document",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let pdf_font = doc
        .add_external_font(font)
        .map_err(|e| anyhow!("failed to embed font: {e:?}"))?;
    let layer = doc.get_page(page).get_layer(layer);

    let line_height_mm = FONT_SIZE_PT * LINE_SPACING * MM_PER_PT;
    for (index, line) in layout_lines(text).iter().enumerate() {
        let y = FIRST_BASELINE_MM - index as f32 * line_height_mm;
        if y < MARGIN_MM {
            tracing::warn!(dropped_from = index, "Text does not fit on one page");
            break;
        }
        // right-aligned against the margin
        let x = (PAGE_WIDTH_MM - MARGIN_MM - metrics.width_mm(line, FONT_SIZE_PT)).max(MARGIN_MM);
        layer.use_text(line.as_str(), FONT_SIZE_PT, Mm(x), Mm(y), &pdf_font);
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("{e:?}"))
        .context("failed to serialize PDF")
}
