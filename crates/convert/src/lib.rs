//! Presentation conversion pipeline.
//!
//! Converts PowerPoint-family files to PDF by trying an ordered list of
//! strategies: LibreOffice when installed, then an in-process slide-text
//! fallback. Unavailable strategies are skipped silently; failures are
//! recorded and only reported together once every strategy has been
//! exhausted. All intermediate files live in a scratch directory that is
//! removed on every exit path; only the final PDF lands in the caller's
//! output directory.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use {async_trait::async_trait, tracing::warn};

use limelight_config::ConvertConfig;

pub mod error;
pub mod pdf;
pub mod pptx;
pub mod slidetext;
pub mod soffice;

pub use {
    error::{Error, Result},
    slidetext::SlideTextStrategy,
    soffice::LibreOfficeStrategy,
};

/// Extensions the pipeline accepts as conversion input.
const CONVERTIBLE: &[&str] = &["pptx", "ppt", "pptm", "pps", "ppsx", "odp"];

/// True when `path` names a format the pipeline can try to convert.
pub fn is_convertible(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CONVERTIBLE.contains(&ext.to_ascii_lowercase().as_str()))
}

/// One conversion attempt: a source file, a caller-owned output directory,
/// and a scratch directory removed when the job drops.
pub struct ConversionJob {
    source: PathBuf,
    out_dir: PathBuf,
    workdir: tempfile::TempDir,
}

impl ConversionJob {
    pub fn new(source: &Path, out_dir: &Path) -> Result<Self> {
        Ok(Self {
            source: source.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
            workdir: tempfile::tempdir()?,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Where the finished PDF lands.
    pub fn output_path(&self) -> Result<PathBuf> {
        let stem = self
            .source
            .file_stem()
            .ok_or_else(|| Error::failed("source file has no name"))?;
        Ok(self.out_dir.join(stem).with_extension("pdf"))
    }
}

/// A way of turning the job's source into a PDF inside the job's workdir.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap probe; an unavailable strategy is skipped without being counted
    /// as a failure.
    fn available(&self) -> bool;

    async fn run(&self, job: &ConversionJob) -> Result<PathBuf>;
}

/// Convert `source` to a PDF in `out_dir` using the default strategy order.
pub async fn convert(source: &Path, out_dir: &Path, config: &ConvertConfig) -> Result<PathBuf> {
    let strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(LibreOfficeStrategy::new(Duration::from_secs(
            config.soffice_timeout_seconds,
        ))),
        Box::new(SlideTextStrategy),
    ];
    convert_with(&strategies, source, out_dir, config).await
}

/// Convert with an explicit strategy list. The source-size bound is enforced
/// before any strategy is probed.
pub async fn convert_with(
    strategies: &[Box<dyn Strategy>],
    source: &Path,
    out_dir: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf> {
    if !is_convertible(source) {
        return Err(Error::UnsupportedFormat(source.display().to_string()));
    }

    let actual = std::fs::metadata(source)?.len();
    if actual > config.max_source_bytes {
        return Err(Error::SourceTooLarge {
            actual,
            limit: config.max_source_bytes,
        });
    }

    let job = ConversionJob::new(source, out_dir)?;
    let mut failures: Vec<String> = Vec::new();

    for strategy in strategies {
        if !strategy.available() {
            continue;
        }
        match strategy.run(&job).await {
            Ok(produced) => {
                let target = job.output_path()?;
                std::fs::copy(&produced, &target)?;
                return Ok(target);
            },
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "conversion strategy failed");
                failures.push(format!("{}: {e}", strategy.name()));
            },
        }
    }

    if failures.is_empty() {
        Err(Error::failed("no conversion strategy available"))
    } else {
        Err(Error::failed(format!(
            "all conversion strategies failed: {}",
            failures.join("; ")
        )))
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;
    use crate::pptx::tests::build_pptx;

    struct FakeStrategy {
        name: &'static str,
        available: bool,
        succeed: bool,
        probed: Arc<AtomicBool>,
    }

    impl FakeStrategy {
        fn new(name: &'static str, available: bool, succeed: bool) -> Self {
            Self {
                name,
                available,
                succeed,
                probed: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl Strategy for FakeStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn available(&self) -> bool {
            self.probed.store(true, Ordering::SeqCst);
            self.available
        }

        async fn run(&self, job: &ConversionJob) -> Result<PathBuf> {
            if self.succeed {
                let out = job.workdir().join("fake.pdf");
                pdf::write_text_pdf(&out, &[vec!["page".to_owned()]])?;
                Ok(out)
            } else {
                Err(Error::failed("deliberate failure"))
            }
        }
    }

    fn test_config() -> ConvertConfig {
        ConvertConfig {
            max_source_bytes: 10_000,
            soffice_timeout_seconds: 5,
        }
    }

    fn sample_source(dir: &Path) -> PathBuf {
        let source = dir.join("deck.pptx");
        std::fs::write(&source, build_pptx(&[&["hello"]])).unwrap();
        source
    }

    #[tokio::test]
    async fn fallback_succeeds_after_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(FakeStrategy::new("first", true, false)),
            Box::new(FakeStrategy::new("second", true, true)),
        ];

        let out = convert_with(&strategies, &source, dir.path(), &test_config())
            .await
            .unwrap();
        assert_eq!(out, dir.path().join("deck.pdf"));
        assert!(out.is_file());
    }

    #[tokio::test]
    async fn unavailable_strategies_are_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(FakeStrategy::new("absent", false, true)),
            Box::new(FakeStrategy::new("present", true, true)),
        ];

        convert_with(&strategies, &source, dir.path(), &test_config())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_available_strategy_is_its_own_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let strategies: Vec<Box<dyn Strategy>> =
            vec![Box::new(FakeStrategy::new("absent", false, true))];

        let err = convert_with(&strategies, &source, dir.path(), &test_config())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no conversion strategy available"));
    }

    #[tokio::test]
    async fn aggregate_error_names_every_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(FakeStrategy::new("first", true, false)),
            Box::new(FakeStrategy::new("second", true, false)),
        ];

        let err = convert_with(&strategies, &source, dir.path(), &test_config())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("first"));
        assert!(message.contains("second"));
    }

    #[tokio::test]
    async fn oversized_source_is_rejected_before_any_probe() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("big.pptx");
        std::fs::write(&source, vec![0u8; 20_000]).unwrap();

        let probe = FakeStrategy::new("probe", true, true);
        let probed = Arc::clone(&probe.probed);
        let strategies: Vec<Box<dyn Strategy>> = vec![Box::new(probe)];

        let err = convert_with(&strategies, &source, dir.path(), &test_config())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceTooLarge { actual: 20_000, .. }));
        assert!(!probed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"text").unwrap();

        let err = convert(&source, dir.path(), &test_config()).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn scratch_directory_is_removed_on_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());

        let job = ConversionJob::new(&source, dir.path()).unwrap();
        let workdir = job.workdir().to_path_buf();
        assert!(workdir.is_dir());
        drop(job);
        assert!(!workdir.exists());
    }
}
