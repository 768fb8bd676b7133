//! In-process fallback strategy: extract slide text and typeset it as a
//! plain-text PDF, one page per slide. Always available, but limited to
//! OOXML presentations and loses all layout and imagery.

use std::path::PathBuf;

use {async_trait::async_trait, tracing::info};

use crate::{
    ConversionJob, Strategy,
    error::{Error, Result},
    pdf, pptx,
};

/// Extensions this strategy can read: the zip-based OOXML family.
const SUPPORTED: &[&str] = &["pptx", "pptm", "ppsx"];

pub struct SlideTextStrategy;

#[async_trait]
impl Strategy for SlideTextStrategy {
    fn name(&self) -> &'static str {
        "slide_text"
    }

    fn available(&self) -> bool {
        true
    }

    async fn run(&self, job: &ConversionJob) -> Result<PathBuf> {
        let ext = job
            .source()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !SUPPORTED.contains(&ext.as_str()) {
            return Err(Error::failed(format!(
                "slide text extraction reads OOXML presentations only, not .{ext}"
            )));
        }

        let slides = pptx::slide_texts(job.source())?;
        let pages: Vec<Vec<String>> = slides
            .into_iter()
            .enumerate()
            .map(|(i, paragraphs)| {
                let mut lines = vec![format!("Slide {}", i + 1), String::new()];
                lines.extend(paragraphs);
                lines
            })
            .collect();

        let stem = job
            .source()
            .file_stem()
            .ok_or_else(|| Error::failed("source file has no name"))?;
        let output = job.workdir().join(stem).with_extension("pdf");
        pdf::write_text_pdf(&output, &pages)?;
        info!(pages = pages.len(), output = %output.display(), "slide text conversion complete");
        Ok(output)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::tests::build_pptx;

    #[tokio::test]
    async fn converts_a_pptx_to_a_text_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("talk.pptx");
        std::fs::write(&source, build_pptx(&[&["Intro"], &["Body", "Detail"], &["End"]]))
            .unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let job = ConversionJob::new(&source, out_dir.path()).unwrap();
        let produced = SlideTextStrategy.run(&job).await.unwrap();

        assert_eq!(pdf::page_count(&produced).unwrap(), 3);
    }

    #[tokio::test]
    async fn refuses_legacy_binary_formats() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("old.ppt");
        std::fs::write(&source, b"binary ole").unwrap();

        let job = ConversionJob::new(&source, dir.path()).unwrap();
        let err = SlideTextStrategy.run(&job).await.unwrap_err();
        assert!(err.to_string().contains("OOXML"));
    }
}
