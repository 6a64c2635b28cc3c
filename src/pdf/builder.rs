use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::imageops::FilterType;
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use std::io::Write;

use super::fonts::{encode_win_ansi, FontFace, ASCENT};
use super::layout::{fit_centered, RenderCursor};
use crate::core::{ColumnAlign, ImagePlacementError, PdfConfig, RenderResult, Rgb};
use crate::models::ImageRef;

/// Longest edge, in pixels, an attachment is stored at.
const MAX_IMAGE_EDGE: u32 = 1600;

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgb) -> Self {
        TextStyle {
            face: FontFace::Regular,
            size,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.face = FontFace::Bold;
        self
    }
}

struct RefAllocator {
    next: i32,
}

impl RefAllocator {
    fn new(first: i32) -> Self {
        RefAllocator { next: first }
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next);
        self.next += 1;
        r
    }
}

struct LinkRecord {
    rect: Rect,
    uri: String,
}

struct PageRecord {
    content: Content,
    images: Vec<(String, Ref)>,
    links: Vec<LinkRecord>,
}

impl PageRecord {
    fn new() -> Self {
        PageRecord {
            content: Content::new(),
            images: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// In-progress document. Callers draw in top-down page coordinates on the
/// newest page; everything is written out by [`PageStream::finish`].
pub struct PageStream {
    pdf: Pdf,
    refs: RefAllocator,
    config: PdfConfig,
    catalog_id: Ref,
    page_tree_id: Ref,
    font_ids: [Ref; 2],
    width: f32,
    height: f32,
    pages: Vec<PageRecord>,
    image_count: usize,
}

impl PageStream {
    /// Opens a document with one empty page.
    pub fn new(config: PdfConfig) -> Self {
        let (width, height) = config.page_dimensions();
        let mut refs = RefAllocator::new(1);
        let catalog_id = refs.alloc();
        let page_tree_id = refs.alloc();
        let font_ids = [refs.alloc(), refs.alloc()];

        PageStream {
            pdf: Pdf::new(),
            refs,
            config,
            catalog_id,
            page_tree_id,
            font_ids,
            width,
            height,
            pages: vec![PageRecord::new()],
            image_count: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Appends a page and moves the cursor to its top margin.
    pub fn new_page(&mut self, cursor: &mut RenderCursor) {
        self.pages.push(PageRecord::new());
        cursor.start_page();
        debug_assert_eq!(cursor.page() + 1, self.pages.len());
    }

    fn current(&mut self) -> &mut PageRecord {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Converts a top-down rectangle into PDF user space.
    fn to_pdf_rect(&self, x: f32, y: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
        (x, self.height - y - h, w, h)
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) -> &mut Self {
        let (px, py, pw, ph) = self.to_pdf_rect(x, y, w, h);
        let (r, g, b) = fill.components();
        self.current()
            .content
            .save_state()
            .set_fill_rgb(r, g, b)
            .rect(px, py, pw, ph)
            .fill_nonzero()
            .restore_state();
        self
    }

    pub fn fill_and_stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Rgb,
        stroke: Rgb,
    ) -> &mut Self {
        let (px, py, pw, ph) = self.to_pdf_rect(x, y, w, h);
        let (fr, fg, fb) = fill.components();
        let (sr, sg, sb) = stroke.components();
        self.current()
            .content
            .save_state()
            .set_fill_rgb(fr, fg, fb)
            .set_stroke_rgb(sr, sg, sb)
            .set_line_width(1.0)
            .rect(px, py, pw, ph)
            .fill_nonzero_and_stroke()
            .restore_state();
        self
    }

    pub fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        style.face.text_width(text, style.size)
    }

    /// Draws one line of text whose line box starts at (`x`, `y`).
    pub fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> &mut Self {
        let baseline = self.height - y - ASCENT * style.size;
        let (r, g, b) = style.color.components();
        let encoded = encode_win_ansi(text);
        self.current()
            .content
            .set_fill_rgb(r, g, b)
            .begin_text()
            .set_font(Name(style.face.resource_name()), style.size)
            .next_line(x, baseline)
            .show(Str(&encoded))
            .end_text();
        self
    }

    /// Draws text aligned inside a horizontal span of `width`.
    pub fn text_in(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        width: f32,
        align: ColumnAlign,
        style: &TextStyle,
    ) -> &mut Self {
        let text_width = self.text_width(text, style);
        let offset = match align {
            ColumnAlign::Left => 0.0,
            ColumnAlign::Center => (width - text_width) / 2.0,
            ColumnAlign::Right => width - text_width,
        };
        self.text(text, x + offset.max(0.0), y, style)
    }

    /// Makes a top-down rectangle on the current page open `uri`.
    pub fn link(&mut self, x: f32, y: f32, w: f32, h: f32, uri: &str) -> &mut Self {
        let (px, py, pw, ph) = self.to_pdf_rect(x, y, w, h);
        self.current().links.push(LinkRecord {
            rect: Rect::new(px, py, px + pw, py + ph),
            uri: uri.to_string(),
        });
        self
    }

    /// Fits the image into the box at (`x`, `y`), keeping its aspect ratio
    /// and centering it.
    pub fn place_image(
        &mut self,
        image: &ImageRef,
        x: f32,
        y: f32,
        box_w: f32,
        box_h: f32,
    ) -> Result<(), ImagePlacementError> {
        let bytes = std::fs::read(&image.path).map_err(|source| ImagePlacementError::Read {
            path: image.path.clone(),
            source,
        })?;
        let mut decoded =
            image::load_from_memory(&bytes).map_err(|source| ImagePlacementError::Decode {
                path: image.path.clone(),
                source,
            })?;
        if decoded.width() > MAX_IMAGE_EDGE || decoded.height() > MAX_IMAGE_EDGE {
            decoded = decoded.resize(MAX_IMAGE_EDGE, MAX_IMAGE_EDGE, FilterType::Triangle);
        }

        let rgba = decoded.to_rgba8();
        let (px_w, px_h) = rgba.dimensions();
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
        let rgb: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();

        let encode_err = |source| ImagePlacementError::Encode {
            path: image.path.clone(),
            source,
        };
        let compressed_rgb = deflate(&rgb).map_err(encode_err)?;
        let compressed_alpha = if has_alpha {
            let alpha: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
            Some(deflate(&alpha).map_err(encode_err)?)
        } else {
            None
        };

        let smask_ref = match compressed_alpha {
            Some(data) => {
                let mask_ref = self.refs.alloc();
                let mut mask = self.pdf.image_xobject(mask_ref, &data);
                mask.filter(Filter::FlateDecode);
                mask.width(px_w as i32);
                mask.height(px_h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            }
            None => None,
        };

        let xobj_ref = self.refs.alloc();
        {
            let mut xobj = self.pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(px_w as i32);
            xobj.height(px_h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }

        self.image_count += 1;
        let name = format!("Im{}", self.image_count);
        let (dx, dy, w, h) = fit_centered(px_w as f32, px_h as f32, box_w, box_h);
        let (pdf_x, pdf_y, _, _) = self.to_pdf_rect(x + dx, y + dy, w, h);

        let page = self.current();
        page.content
            .save_state()
            .transform([w, 0.0, 0.0, h, pdf_x, pdf_y])
            .x_object(Name(name.as_bytes()))
            .restore_state();
        page.images.push((name, xobj_ref));
        Ok(())
    }

    /// Writes pages, fonts, annotations and metadata and returns the file.
    pub fn finish(mut self) -> RenderResult<Vec<u8>> {
        for (face, font_id) in FontFace::ALL.iter().zip(self.font_ids) {
            self.pdf
                .type1_font(font_id)
                .base_font(Name(face.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let pages = std::mem::take(&mut self.pages);
        let page_ids: Vec<Ref> = pages.iter().map(|_| self.refs.alloc()).collect();

        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        self.pdf
            .pages(self.page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        for (page, page_id) in pages.into_iter().zip(page_ids) {
            let content_id = self.refs.alloc();
            let raw = page.content.finish();
            if self.config.compress {
                let compressed = deflate(raw.as_slice())?;
                self.pdf
                    .stream(content_id, &compressed)
                    .filter(Filter::FlateDecode);
            } else {
                self.pdf.stream(content_id, raw.as_slice());
            }

            let annot_ids: Vec<Ref> = page
                .links
                .iter()
                .map(|link| {
                    let annot_id = self.refs.alloc();
                    let mut annot = self.pdf.annotation(annot_id);
                    annot
                        .subtype(AnnotationType::Link)
                        .rect(link.rect)
                        .border(0.0, 0.0, 0.0, None);
                    annot
                        .action()
                        .action_type(ActionType::Uri)
                        .uri(Str(link.uri.as_bytes()));
                    annot_id
                })
                .collect();

            let mut pdf_page = self.pdf.page(page_id);
            pdf_page
                .media_box(Rect::new(0.0, 0.0, self.width, self.height))
                .parent(self.page_tree_id)
                .contents(content_id);
            if !annot_ids.is_empty() {
                pdf_page.annotations(annot_ids.iter().copied());
            }
            let mut resources = pdf_page.resources();
            {
                let mut fonts = resources.fonts();
                for (face, font_id) in FontFace::ALL.iter().zip(self.font_ids) {
                    fonts.pair(Name(face.resource_name()), font_id);
                }
            }
            if !page.images.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &page.images {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        let info_id = self.refs.alloc();
        self.pdf
            .document_info(info_id)
            .title(TextStr(&self.config.title))
            .producer(TextStr("invoice-renderer"));

        Ok(self.pdf.finish())
    }
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
