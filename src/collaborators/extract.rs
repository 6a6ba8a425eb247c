//! Text extraction from documents.

use super::TextExtractor;
use crate::error::{LectioError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Extracts text from plain text, markdown, PDF and PPTX files.
///
/// PDFs go through `pdftotext` (poppler), slide decks through `unzip`.
#[derive(Debug, Default, Clone)]
pub struct FileTextExtractor;

impl FileTextExtractor {
    pub fn new() -> Self {
        Self
    }

    async fn extract_pdf(&self, path: &Path) -> Result<String> {
        let output = run_tool("pdftotext", |cmd| {
            cmd.arg("-layout").arg(path).arg("-");
        })
        .await?;

        // pdftotext separates pages with form feeds
        let pages: Vec<&str> = output
            .split('\u{c}')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        Ok(pages.join("\n\n"))
    }

    async fn extract_pptx(&self, path: &Path) -> Result<String> {
        let listing = run_tool("unzip", |cmd| {
            cmd.arg("-Z1").arg(path);
        })
        .await?;

        let slides = slide_entries(&listing);
        debug!("Found {} slides", slides.len());

        let mut texts = Vec::with_capacity(slides.len());
        for entry in slides {
            let xml = run_tool("unzip", |cmd| {
                cmd.arg("-p").arg(path).arg(&entry);
            })
            .await?;
            texts.push(slide_text(&xml));
        }

        Ok(texts.join("\n\n"))
    }
}

#[async_trait]
impl TextExtractor for FileTextExtractor {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> Result<String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" => read_text(path).await,
            "pdf" => self.extract_pdf(path).await,
            "pptx" => self.extract_pptx(path).await,
            other => Err(LectioError::UnsupportedFormat(format!(
                "no text extractor for .{}",
                other
            ))),
        }
    }
}

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a:p>.*?</a:p>|<a:p\s[^>]*>.*?</a:p>").expect("valid regex"));
static TEXT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a:t>(.*?)</a:t>").expect("valid regex"));

/// Slide XML entries of a PPTX archive listing, in slide-number order.
fn slide_entries(listing: &str) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = listing
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let number = line
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, line.to_string()))
        })
        .collect();

    slides.sort_by_key(|(n, _)| *n);
    slides.into_iter().map(|(_, entry)| entry).collect()
}

/// Text runs of one slide. Each paragraph becomes one line.
fn slide_text(xml: &str) -> String {
    PARAGRAPH
        .find_iter(xml)
        .map(|p| {
            TEXT_RUN
                .captures_iter(p.as_str())
                .filter_map(|c| c.get(1))
                .map(|m| unescape_xml(m.as_str()))
                .collect::<String>()
        })
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Run an external tool and return its stdout.
/// Read a plain-text source. Bytes that are not UTF-8 cannot be segmented.
async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => {
            LectioError::Segmentation(format!("{} is not valid UTF-8 text", path.display()))
        }
        _ => LectioError::Io(e),
    })
}

async fn run_tool(program: &str, configure: impl FnOnce(&mut Command)) -> Result<String> {
    let mut cmd = Command::new(program);
    configure(&mut cmd);

    let result = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LectioError::ToolNotFound(program.to_string()));
        }
        Err(e) => return Err(LectioError::ToolFailed(format!("{}: {}", program, e))),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LectioError::Extraction(format!("{} failed: {}", program, stderr.trim())));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_entries_sorted_numerically() {
        let listing = "[Content_Types].xml\nppt/slides/slide10.xml\nppt/slides/slide2.xml\n\
                       ppt/slides/_rels/slide2.xml.rels\nppt/slides/slide1.xml\nppt/slideLayouts/slideLayout1.xml\n";
        assert_eq!(
            slide_entries(listing),
            vec![
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
                "ppt/slides/slide10.xml",
            ]
        );
    }

    #[test]
    fn test_slide_text_joins_runs_per_paragraph() {
        let xml = r#"<p:sld><p:txBody>
            <a:p><a:r><a:rPr lang="en-US"/><a:t>Photo</a:t></a:r><a:r><a:t>synthesis</a:t></a:r></a:p>
            <a:p lvl="1"><a:r><a:t>Light &amp; water</a:t></a:r></a:p>
            <a:p><a:endParaRPr/></a:p>
        </p:txBody></p:sld>"#;
        assert_eq!(slide_text(xml), "Photosynthesis\nLight & water");
    }

    #[tokio::test]
    async fn test_reads_text_files_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Week 1\nCells.").unwrap();

        let text = FileTextExtractor::new().extract(&path).await.unwrap();
        assert_eq!(text, "# Week 1\nCells.");
    }

    #[tokio::test]
    async fn test_missing_text_file_is_error() {
        let result = FileTextExtractor::new().extract(Path::new("/nonexistent/notes.txt")).await;
        assert!(matches!(result, Err(LectioError::Io(_))));
    }

    #[tokio::test]
    async fn test_undecodable_text_is_segmentation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe, 0x6f]).unwrap();

        let result = FileTextExtractor::new().extract(&path).await;
        assert!(matches!(result, Err(LectioError::Segmentation(msg)) if msg.contains("notes.txt")));
    }

    #[tokio::test]
    async fn test_rejects_unknown_extension() {
        let result = FileTextExtractor::new().extract(Path::new("movie.mp4")).await;
        assert!(matches!(result, Err(LectioError::UnsupportedFormat(_))));
    }
}
