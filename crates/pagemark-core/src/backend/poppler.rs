use crate::backend::{PageRenderer, RenderedPage, TextExtractor};
use crate::error::PagemarkError;
use crate::geometry::{NativeRect, NATIVE_UNITS_PER_INCH};
use crate::navigator::Document;
use std::collections::hash_map::DefaultHasher;
use std::ffi::OsStr;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Renderer and text extractor backed by poppler-utils
/// (`pdfinfo`, `pdftoppm` and `pdftotext`).
pub struct Poppler {
    dpi: f64,
    raster_dir: PathBuf,
    // Keeps the default raster directory alive for the lifetime of the backend.
    _scratch: Option<tempfile::TempDir>,
}

impl Poppler {
    /// Rasters go to a private temporary directory.
    pub fn new(dpi: f64) -> Result<Self, PagemarkError> {
        let scratch = tempfile::Builder::new().prefix("pagemark-").tempdir()?;
        Ok(Poppler {
            dpi,
            raster_dir: scratch.path().to_path_buf(),
            _scratch: Some(scratch),
        })
    }

    pub fn with_raster_dir(
        dpi: f64,
        raster_dir: impl Into<PathBuf>,
    ) -> Result<Self, PagemarkError> {
        let raster_dir = raster_dir.into();
        std::fs::create_dir_all(&raster_dir)?;
        Ok(Poppler {
            dpi,
            raster_dir,
            _scratch: None,
        })
    }

    /// Check if the poppler tools are available on the system.
    pub fn is_available() -> bool {
        ["pdfinfo", "pdftoppm", "pdftotext"].iter().all(|tool| {
            Command::new(tool)
                .arg("-v")
                .output()
                .map(|o| o.status.success() || !o.stderr.is_empty())
                .unwrap_or(false)
        })
    }

    fn pdfinfo(
        &self,
        document: &Document,
        page_index: Option<usize>,
    ) -> Result<String, PagemarkError> {
        let page = page_index.map(|p| (p + 1).to_string());
        let mut args: Vec<&OsStr> = Vec::new();
        if let Some(page) = &page {
            args.extend([OsStr::new("-f"), OsStr::new(page), OsStr::new("-l"), OsStr::new(page)]);
        }
        args.push(document.path.as_os_str());

        match run_tool("pdfinfo", args) {
            Err(PagemarkError::ToolFailed { stderr, .. }) => Err(PagemarkError::PageUnavailable {
                document: document.id(),
                page: page_index.unwrap_or(0),
                reason: stderr.trim().to_string(),
            }),
            other => other,
        }
    }

    fn page_info(&self, document: &Document, page_index: usize) -> Result<PageInfo, PagemarkError> {
        let stdout = self.pdfinfo(document, Some(page_index))?;
        parse_pdfinfo(&stdout, page_index).map_err(|reason| PagemarkError::PageUnavailable {
            document: document.id(),
            page: page_index,
            reason,
        })
    }

    fn raster_path(&self, document: &Document, page_index: usize) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        document.path.hash(&mut hasher);
        self.raster_dir
            .join(format!("page-{:016x}-{}", hasher.finish(), page_index + 1))
    }
}

impl PageRenderer for Poppler {
    fn page_count(&self, document: &Document) -> Result<usize, PagemarkError> {
        let stdout = self.pdfinfo(document, None)?;
        parse_page_count(&stdout).map_err(|reason| PagemarkError::PageUnavailable {
            document: document.id(),
            page: 0,
            reason,
        })
    }

    fn render(
        &self,
        document: &Document,
        page_index: usize,
    ) -> Result<RenderedPage, PagemarkError> {
        let info = self.page_info(document, page_index)?;

        let page = (page_index + 1).to_string();
        let dpi = format!("{}", self.dpi);
        let prefix = self.raster_path(document, page_index);
        run_tool(
            "pdftoppm",
            [
                OsStr::new("-f"),
                OsStr::new(&page),
                OsStr::new("-l"),
                OsStr::new(&page),
                OsStr::new("-r"),
                OsStr::new(&dpi),
                OsStr::new("-png"),
                OsStr::new("-singlefile"),
                document.path.as_os_str(),
                prefix.as_os_str(),
            ],
        )?;

        let scale = self.dpi / NATIVE_UNITS_PER_INCH;
        let rendered = RenderedPage {
            raster: prefix.with_extension("png"),
            width: (info.width * scale).round() as u32,
            height: (info.height * scale).round() as u32,
            page_count: info.page_count,
        };
        debug!(
            document = %document.id(),
            page = page_index,
            width = rendered.width,
            height = rendered.height,
            "page rendered"
        );
        Ok(rendered)
    }
}

impl TextExtractor for Poppler {
    fn extract(
        &self,
        document: &Document,
        page_index: usize,
        rect: &NativeRect,
    ) -> Result<String, PagemarkError> {
        let page = (page_index + 1).to_string();
        let [x, y, w, h] = crop_args(rect);
        let resolution = NATIVE_UNITS_PER_INCH.to_string();

        // At -r 72 pdftotext crop coordinates are native units.
        let stdout = run_tool(
            "pdftotext",
            [
                OsStr::new("-f"),
                OsStr::new(&page),
                OsStr::new("-l"),
                OsStr::new(&page),
                OsStr::new("-r"),
                OsStr::new(&resolution),
                OsStr::new("-x"),
                OsStr::new(&x),
                OsStr::new("-y"),
                OsStr::new(&y),
                OsStr::new("-W"),
                OsStr::new(&w),
                OsStr::new("-H"),
                OsStr::new(&h),
                OsStr::new("-layout"),
                document.path.as_os_str(),
                OsStr::new("-"),
            ],
        )?;

        Ok(clean_text(&stdout))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PageInfo {
    page_count: usize,
    width: f64,
    height: f64,
}

fn run_tool<'a>(
    tool: &'static str,
    args: impl IntoIterator<Item = &'a OsStr>,
) -> Result<String, PagemarkError> {
    let output = Command::new(tool).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PagemarkError::ToolNotFound { tool }
        } else {
            PagemarkError::Extraction(format!("{} failed: {}", tool, e))
        }
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(PagemarkError::ToolFailed { tool, code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `pdfinfo -f N -l N` output for the page count and the size of page N.
fn parse_pdfinfo(output: &str, page_index: usize) -> Result<PageInfo, String> {
    let page_count = parse_page_count(output)?;
    let wanted = page_index + 1;
    if wanted > page_count {
        return Err(format!("document has only {} page(s)", page_count));
    }

    let mut size = None;
    for line in output.lines() {
        // "Page    1 size: 612 x 792 pts (letter)"
        let Some(rest) = line.strip_prefix("Page ") else {
            continue;
        };
        let Some((number, dims)) = rest.trim_start().split_once(" size:") else {
            continue;
        };
        if number.trim().parse::<usize>().ok() != Some(wanted) {
            continue;
        }
        size = parse_size(dims);
    }

    let (width, height) = size.ok_or("page size not reported")?;
    Ok(PageInfo {
        page_count,
        width,
        height,
    })
}

fn parse_page_count(output: &str) -> Result<usize, String> {
    let count = output
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse::<usize>().ok())
        .ok_or("page count not reported")?;
    if count == 0 {
        return Err("document has no pages".into());
    }
    Ok(count)
}

fn parse_size(dims: &str) -> Option<(f64, f64)> {
    let mut parts = dims.split_whitespace();
    let width = parts.next()?.parse::<f64>().ok()?;
    if parts.next()? != "x" {
        return None;
    }
    let height = parts.next()?.parse::<f64>().ok()?;
    (width > 0.0 && height > 0.0).then_some((width, height))
}

/// pdftotext wants integer, non-negative crop extents.
fn crop_args(rect: &NativeRect) -> [String; 4] {
    let (x, y, w, h) = rect.normalized();
    [x.round(), y.round(), w.round(), h.round()].map(|v| format!("{}", v.max(0.0) as i64))
}

fn clean_text(raw: &str) -> String {
    raw.trim_end_matches(|c: char| c == '\x0c' || c.is_whitespace())
        .to_string()
}
