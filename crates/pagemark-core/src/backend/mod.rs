pub mod poppler;

use crate::error::PagemarkError;
use crate::geometry::{NativeRect, Point, Region};
use crate::navigator::Document;
use crate::templates::SlotId;
use std::path::PathBuf;

/// A page rendered to a raster, in display pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Location of the raster image.
    pub raster: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Number of pages in the document the page belongs to.
    pub page_count: usize,
}

/// Renders document pages to rasters.
pub trait PageRenderer {
    /// Number of pages; [`PagemarkError::PageUnavailable`] if the document
    /// has no readable pages.
    fn page_count(&self, document: &Document) -> Result<usize, PagemarkError>;

    /// Render page `page_index` (0-based).
    ///
    /// Fails with [`PagemarkError::PageUnavailable`] when the page geometry
    /// cannot be determined.
    fn render(&self, document: &Document, page_index: usize)
        -> Result<RenderedPage, PagemarkError>;
}

/// Extracts the literal text inside a rectangle of a page.
pub trait TextExtractor {
    /// `rect` is in native document units, with signed extents.
    fn extract(
        &self,
        document: &Document,
        page_index: usize,
        rect: &NativeRect,
    ) -> Result<String, PagemarkError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

impl<T: PageRenderer + ?Sized> PageRenderer for &T {
    fn page_count(&self, document: &Document) -> Result<usize, PagemarkError> {
        (**self).page_count(document)
    }

    fn render(
        &self,
        document: &Document,
        page_index: usize,
    ) -> Result<RenderedPage, PagemarkError> {
        (**self).render(document, page_index)
    }
}

impl<T: TextExtractor + ?Sized> TextExtractor for &T {
    fn extract(
        &self,
        document: &Document,
        page_index: usize,
        rect: &NativeRect,
    ) -> Result<String, PagemarkError> {
        (**self).extract(document, page_index, rect)
    }

    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }
}

/// What the session shows of its current position.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    pub document: &'a Document,
    pub doc_index: usize,
    pub doc_count: usize,
    pub page_index: usize,
    pub page: &'a RenderedPage,
}

/// Shows rendered pages and selection overlays to the user.
pub trait DisplaySurface {
    /// Replace the displayed raster.
    fn show_page(&mut self, view: &PageView<'_>);

    /// Redraw the overlays of the active slot over the displayed raster.
    fn draw_overlays(&mut self, slot: SlotId, regions: &[Region], pending: Option<Point>);

    /// A line of feedback for the user (progress, recovered errors).
    fn notify(&mut self, message: &str);
}
