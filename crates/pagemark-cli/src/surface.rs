use pagemark_core::backend::{DisplaySurface, PageView};
use pagemark_core::geometry::{Point, Region};
use pagemark_core::templates::SlotId;
use std::io::Write;

/// Display surface for a terminal: reports the rendered raster and the
/// overlays as text. The raster itself is left on disk for an image viewer.
pub struct TerminalSurface<W: Write> {
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        TerminalSurface { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    // A closed terminal is not worth aborting the session over.
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn show_page(&mut self, view: &PageView<'_>) {
        self.line(&format!(
            "[{}/{}] {}  page {}/{}  {}x{}  {}",
            view.doc_index + 1,
            view.doc_count,
            view.document.id(),
            view.page_index + 1,
            view.page.page_count,
            view.page.width,
            view.page.height,
            view.page.raster.display()
        ));
    }

    fn draw_overlays(&mut self, slot: SlotId, regions: &[Region], pending: Option<Point>) {
        self.line(&format!("  template {}: {} region(s)", slot, regions.len()));
        for (i, region) in regions.iter().enumerate() {
            self.line(&format!("    #{} {}", i + 1, region));
        }
        if let Some(point) = pending {
            self.line(&format!("    pending {}", point));
        }
    }

    fn notify(&mut self, message: &str) {
        self.line(&format!("» {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_core::backend::RenderedPage;
    use pagemark_core::navigator::Document;
    use std::path::PathBuf;

    fn output(surface: TerminalSurface<Vec<u8>>) -> String {
        String::from_utf8(surface.into_inner()).unwrap()
    }

    #[test]
    fn test_show_page_line() {
        let mut surface = TerminalSurface::new(Vec::new());
        let document = Document::new("invoices/march.pdf");
        let page = RenderedPage {
            raster: PathBuf::from("/tmp/p.png"),
            width: 612,
            height: 792,
            page_count: 3,
        };
        surface.show_page(&PageView {
            document: &document,
            doc_index: 1,
            doc_count: 4,
            page_index: 0,
            page: &page,
        });
        assert_eq!(
            output(surface),
            "[2/4] invoices/march.pdf  page 1/3  612x792  /tmp/p.png\n"
        );
    }

    #[test]
    fn test_overlays_with_pending_point() {
        let mut surface = TerminalSurface::new(Vec::new());
        let region = Region {
            anchor: Point::new(10.0, 20.0),
            width: 40.0,
            height: -5.0,
        };
        surface.draw_overlays(
            SlotId::new(2).unwrap(),
            &[region],
            Some(Point::new(1.0, 2.0)),
        );
        assert_eq!(
            output(surface),
            "  template 2: 1 region(s)\n    #1 (10, 20) +40x-5\n    pending (1, 2)\n"
        );
    }
}
