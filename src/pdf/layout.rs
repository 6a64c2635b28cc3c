use crate::core::PdfConfig;

/// Line height as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;

/// Write position for one render call. Offsets are measured down from the
/// top edge of the current page.
#[derive(Debug, Clone)]
pub struct RenderCursor {
    page: usize,
    y: f32,
    top: f32,
    bottom: f32,
}

impl RenderCursor {
    pub fn new(config: &PdfConfig) -> Self {
        RenderCursor {
            page: 0,
            y: config.margin.top,
            top: config.margin.top,
            bottom: config.printable_bottom(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    /// Skips `lines` blank lines of text at `font_size`.
    pub fn move_down(&mut self, lines: f32, font_size: f32) {
        self.y += lines * font_size * LINE_SPACING;
    }

    /// True when a block of `height` still fits above the bottom margin.
    pub fn fits(&self, height: f32) -> bool {
        self.y + height <= self.bottom
    }

    pub(crate) fn start_page(&mut self) {
        self.page += 1;
        self.y = self.top;
    }
}

/// Fixed grid used for attachment pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryGeometry {
    pub columns: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    pub gutter: f32,
}

impl Default for GalleryGeometry {
    fn default() -> Self {
        GalleryGeometry {
            columns: 2,
            cell_width: 250.0,
            cell_height: 200.0,
            gutter: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryPlacement {
    pub index: usize,
    /// Pages after the one the gallery starts on.
    pub page_offset: usize,
    pub column: usize,
    pub row: usize,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryPlan {
    pub placements: Vec<GalleryPlacement>,
    pub rows: usize,
    /// Cursor offset after the last row, on the last gallery page.
    pub end_y: f32,
}

impl GalleryPlan {
    pub fn pages(&self) -> usize {
        self.placements
            .last()
            .map(|p| p.page_offset + 1)
            .unwrap_or(0)
    }
}

impl GalleryGeometry {
    /// Places `count` cells row by row starting at `start_y`. Before each
    /// cell, a new page starts if the cell would cross `bottom`. The row
    /// cursor advances after each full row, and once more after a trailing
    /// partial row. A zero column count is treated as one column.
    pub fn plan(&self, count: usize, left: f32, start_y: f32, top: f32, bottom: f32) -> GalleryPlan {
        let columns = self.columns.max(1);
        let mut placements = Vec::with_capacity(count);
        let mut page_offset = 0;
        let mut y = start_y;

        for index in 0..count {
            let column = index % columns;
            let row = index / columns;

            if y + self.cell_height > bottom {
                page_offset += 1;
                y = top;
            }

            placements.push(GalleryPlacement {
                index,
                page_offset,
                column,
                row,
                x: left + column as f32 * (self.cell_width + self.gutter),
                y,
            });

            if column == columns - 1 {
                y += self.cell_height + self.gutter;
            }
        }

        if count % columns != 0 {
            y += self.cell_height + self.gutter;
        }

        GalleryPlan {
            placements,
            rows: count.div_ceil(columns),
            end_y: y,
        }
    }
}

/// Scales a `width` x `height` image into a `box_w` x `box_h` box without
/// distortion, centered on both axes. Returns `(dx, dy, w, h)` relative to
/// the box's top-left corner.
pub fn fit_centered(width: f32, height: f32, box_w: f32, box_h: f32) -> (f32, f32, f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let scale = (box_w / width).min(box_h / height);
    let (w, h) = (width * scale, height * scale);
    ((box_w - w) / 2.0, (box_h - h) / 2.0, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP: f32 = 50.0;
    const BOTTOM: f32 = 791.89;

    fn coords(plan: &GalleryPlan) -> Vec<(usize, usize)> {
        plan.placements.iter().map(|p| (p.column, p.row)).collect()
    }

    #[test]
    fn three_images_fill_a_two_by_two_grid() {
        let plan = GalleryGeometry::default().plan(3, 50.0, 90.0, TOP, BOTTOM);
        assert_eq!(coords(&plan), vec![(0, 0), (1, 0), (0, 1)]);
        assert_eq!(plan.rows, 2);
        assert_eq!(plan.pages(), 1);
        assert_eq!(plan.placements[1].x, 320.0);
        assert_eq!(plan.placements[2].y, 310.0);
    }

    #[test]
    fn partial_row_still_advances_cursor() {
        let plan = GalleryGeometry::default().plan(3, 50.0, 90.0, TOP, BOTTOM);
        assert_eq!(plan.end_y, 90.0 + 2.0 * 220.0);

        let even = GalleryGeometry::default().plan(4, 50.0, 90.0, TOP, BOTTOM);
        assert_eq!(even.end_y, plan.end_y);
    }

    #[test]
    fn rows_that_overflow_start_a_new_page() {
        let plan = GalleryGeometry::default().plan(10, 50.0, 90.0, TOP, BOTTOM);
        assert_eq!(plan.rows, 5);
        assert_eq!(plan.pages(), 2);

        // Rows start at 90, 310, 530; the fourth would end at 950.
        let fourth_row = &plan.placements[6];
        assert_eq!(fourth_row.page_offset, 1);
        assert_eq!(fourth_row.y, TOP);
        assert_eq!(plan.placements[7].page_offset, 1);
        assert_eq!(plan.placements[7].y, TOP);
        assert!(plan.placements[5].page_offset == 0);
    }

    #[test]
    fn no_images_no_pages() {
        let plan = GalleryGeometry::default().plan(0, 50.0, 90.0, TOP, BOTTOM);
        assert!(plan.placements.is_empty());
        assert_eq!(plan.rows, 0);
        assert_eq!(plan.pages(), 0);
        assert_eq!(plan.end_y, 90.0);
    }

    #[test]
    fn zero_columns_lay_out_as_a_single_column() {
        let geometry = GalleryGeometry {
            columns: 0,
            ..GalleryGeometry::default()
        };
        let plan = geometry.plan(3, 50.0, 90.0, TOP, BOTTOM);
        assert_eq!(coords(&plan), vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(plan.rows, 3);
        assert!(plan.placements.iter().all(|p| p.x == 50.0));
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let (dx, dy, w, h) = fit_centered(1000.0, 500.0, 250.0, 200.0);
        assert_eq!((w, h), (250.0, 125.0));
        assert_eq!((dx, dy), (0.0, 37.5));

        let (dx, _, w, h) = fit_centered(100.0, 400.0, 250.0, 200.0);
        assert_eq!((w, h), (50.0, 200.0));
        assert_eq!(dx, 100.0);
    }

    #[test]
    fn cursor_breaks_at_bottom_margin() {
        let mut cursor = RenderCursor::new(&PdfConfig::default());
        assert!(cursor.fits(700.0));
        cursor.advance(700.0);
        assert!(!cursor.fits(100.0));
        cursor.start_page();
        assert_eq!(cursor.page(), 1);
        assert_eq!(cursor.y(), cursor.top());
    }
}
