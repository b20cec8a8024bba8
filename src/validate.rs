// src/validate.rs

//! Post-build artifact validation.
//!
//! Each binary font is classified by presence and size, then checked for
//! content: the WOFF2 magic bytes, an external file-type sniff for the
//! TrueType and WOFF files, and a structural parse of the TrueType font.
//! Findings are data; nothing here returns an error.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::ValidationConfig;

pub const WOFF2_MAGIC: [u8; 4] = [0x77, 0x4f, 0x46, 0x32];

// --- Artifacts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Woff2,
    Woff,
    Ttf,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Woff2, ArtifactKind::Woff, ArtifactKind::Ttf];

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Woff2 => "woff2",
            ArtifactKind::Woff => "woff",
            ArtifactKind::Ttf => "ttf",
        }
    }

    pub fn path_in(self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{}.{}", stem, self.extension()))
    }

    pub fn size_limit(self, config: &ValidationConfig) -> u64 {
        match self {
            ArtifactKind::Woff2 => config.max_woff2_bytes,
            ArtifactKind::Woff => config.max_woff_bytes,
            ArtifactKind::Ttf => config.max_ttf_bytes,
        }
    }

    /// Substring the file-type utility reports for this format.
    fn sniff_expectation(self) -> Option<&'static str> {
        match self {
            ArtifactKind::Woff2 => None,
            ArtifactKind::Woff => Some("Web Open Font Format"),
            ArtifactKind::Ttf => Some("TrueType"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Presence and size classification, in increasing order of health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactState {
    Missing,
    PresentEmpty,
    PresentOversized,
    PresentValid,
}

impl ArtifactState {
    pub fn classify(size: Option<u64>, limit: u64) -> ArtifactState {
        match size {
            None => ArtifactState::Missing,
            Some(0) => ArtifactState::PresentEmpty,
            Some(n) if n > limit => ArtifactState::PresentOversized,
            Some(_) => ArtifactState::PresentValid,
        }
    }
}

impl fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactState::Missing => "missing",
            ArtifactState::PresentEmpty => "empty",
            ArtifactState::PresentOversized => "oversized",
            ArtifactState::PresentValid => "valid",
        };
        f.write_str(s)
    }
}

// --- Format sniffing ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sniff {
    /// The utility's description of the data.
    Detected(String),
    /// No answer; never counts against the artifact.
    Unavailable(String),
}

/// External file-type detection.
pub trait FormatSniffer {
    fn detect_format(&self, data: &[u8]) -> Sniff;
}

/// Runs `<command> -b -` with the data on stdin.
#[derive(Debug, Clone)]
pub struct FileCommandSniffer {
    pub command: String,
    pub timeout: Duration,
}

impl FileCommandSniffer {
    pub fn from_config(config: &ValidationConfig) -> Self {
        FileCommandSniffer {
            command: config.sniff_command.clone(),
            timeout: Duration::from_millis(config.sniff_timeout_ms),
        }
    }
}

impl FormatSniffer for FileCommandSniffer {
    fn detect_format(&self, data: &[u8]) -> Sniff {
        let spawned = Command::new(&self.command)
            .args(["-b", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return Sniff::Unavailable(format!("cannot run '{}': {}", self.command, e)),
        };

        // The utility may stop reading early; a broken pipe is expected.
        let stdin = child.stdin.take();
        let input = data.to_vec();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                let _ = stdin.write_all(&input);
            }
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = writer.join();
                    return Sniff::Unavailable(format!(
                        "'{}' timed out after {} ms",
                        self.command,
                        self.timeout.as_millis()
                    ));
                }
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(e) => return Sniff::Unavailable(format!("waiting for '{}': {}", self.command, e)),
            }
        };
        let _ = writer.join();

        if !status.success() {
            return Sniff::Unavailable(format!("'{}' exited with {}", self.command, status));
        }
        let mut output = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            if let Err(e) = stdout.read_to_string(&mut output) {
                return Sniff::Unavailable(format!("reading '{}' output: {}", self.command, e));
            }
        }
        let output = output.trim();
        if output.is_empty() {
            Sniff::Unavailable(format!("'{}' printed nothing", self.command))
        } else {
            Sniff::Detected(output.to_string())
        }
    }
}

/// Used when sniffing is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSniffer;

impl FormatSniffer for NoSniffer {
    fn detect_format(&self, _data: &[u8]) -> Sniff {
        Sniff::Unavailable("sniffing disabled".to_string())
    }
}

// --- Reports ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    /// A mismatch tolerated outside strict mode.
    Warning(String),
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size: Option<u64>,
    pub limit: u64,
    pub state: ArtifactState,
    pub checks: Vec<Check>,
}

impl ArtifactReport {
    pub fn passed(&self) -> bool {
        self.state == ArtifactState::PresentValid
            && !self.checks.iter().any(|c| matches!(c.outcome, CheckOutcome::Failed(_)))
    }

    pub fn warnings(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CheckOutcome::Warning(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub artifacts: Vec<ArtifactReport>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.artifacts.iter().all(ArtifactReport::passed)
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactReport> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.artifacts {
            let size = a.size.map_or_else(|| "-".to_string(), |s| s.to_string());
            writeln!(
                f,
                "{:<6} {:<10} {:>8} / {} bytes  {}",
                a.kind,
                a.state,
                size,
                a.limit,
                a.path.display()
            )?;
            for check in &a.checks {
                match &check.outcome {
                    CheckOutcome::Passed => writeln!(f, "       ok    {}", check.name)?,
                    CheckOutcome::Warning(m) => writeln!(f, "       warn  {}: {}", check.name, m)?,
                    CheckOutcome::Failed(m) => writeln!(f, "       FAIL  {}: {}", check.name, m)?,
                    CheckOutcome::Skipped(m) => writeln!(f, "       skip  {}: {}", check.name, m)?,
                }
            }
        }
        let valid = self.artifacts.iter().filter(|a| a.passed()).count();
        let warnings: usize = self.artifacts.iter().map(ArtifactReport::warnings).sum();
        write!(
            f,
            "validation {}: {}/{} artifacts valid, {} warning(s)",
            if self.passed() { "passed" } else { "FAILED" },
            valid,
            self.artifacts.len(),
            warnings
        )
    }
}

// --- Validator ---

pub struct Validator<'a> {
    config: &'a ValidationConfig,
    sniffer: &'a dyn FormatSniffer,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a ValidationConfig, sniffer: &'a dyn FormatSniffer) -> Self {
        Validator { config, sniffer }
    }

    fn mismatch(&self, message: String) -> CheckOutcome {
        if self.config.strict {
            CheckOutcome::Failed(message)
        } else {
            CheckOutcome::Warning(message)
        }
    }

    /// Validates all three artifacts `<stem>.{woff2,woff,ttf}` in `dir`.
    pub fn validate_dir(&self, dir: &Path, stem: &str) -> ValidationReport {
        let artifacts = ArtifactKind::ALL
            .iter()
            .map(|&kind| self.validate_file(kind, &kind.path_in(dir, stem)))
            .collect();
        let report = ValidationReport { artifacts };
        if report.passed() {
            info!("All artifacts valid in {}", dir.display());
        } else {
            warn!("Artifact validation failed in {}", dir.display());
        }
        report
    }

    pub fn validate_file(&self, kind: ArtifactKind, path: &Path) -> ArtifactReport {
        let limit = kind.size_limit(self.config);
        let mut checks = Vec::new();
        let data = match std::fs::read(path) {
            Ok(data) => Some(data),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                checks.push(Check {
                    name: "read",
                    outcome: CheckOutcome::Failed(e.to_string()),
                });
                None
            }
        };
        let size = data.as_ref().map(|d| d.len() as u64);
        let state = ArtifactState::classify(size, limit);
        if let Some(data) = data.as_deref().filter(|d| !d.is_empty()) {
            checks.extend(self.content_checks(kind, data));
        }

        match state {
            ArtifactState::PresentValid => debug!("{}: {} bytes, within {}", kind, size.unwrap_or(0), limit),
            _ => warn!("{} at {}: {}", kind, path.display(), state),
        }
        for check in &checks {
            match &check.outcome {
                CheckOutcome::Warning(m) | CheckOutcome::Failed(m) => warn!("{} {}: {}", kind, check.name, m),
                CheckOutcome::Skipped(m) => debug!("{} {} skipped: {}", kind, check.name, m),
                CheckOutcome::Passed => {}
            }
        }
        ArtifactReport {
            kind,
            path: path.to_path_buf(),
            size,
            limit,
            state,
            checks,
        }
    }

    /// Checks on non-empty content. Independent of the size state.
    pub fn content_checks(&self, kind: ArtifactKind, data: &[u8]) -> Vec<Check> {
        let mut checks = Vec::new();
        if kind == ArtifactKind::Woff2 {
            let outcome = if data.starts_with(&WOFF2_MAGIC) {
                CheckOutcome::Passed
            } else {
                let head: Vec<String> = data.iter().take(4).map(|b| format!("{:02x}", b)).collect();
                self.mismatch(format!("starts with {}, expected 774f4632", head.join("")))
            };
            checks.push(Check { name: "magic", outcome });
        }

        if let Some(expected) = kind.sniff_expectation() {
            let outcome = if !self.config.sniff {
                CheckOutcome::Skipped("sniffing disabled".to_string())
            } else {
                match self.sniffer.detect_format(data) {
                    Sniff::Detected(found) if found.contains(expected) => CheckOutcome::Passed,
                    Sniff::Detected(found) => self.mismatch(format!("detected '{}', expected '{}'", found, expected)),
                    Sniff::Unavailable(reason) => CheckOutcome::Skipped(reason),
                }
            };
            checks.push(Check { name: "sniff", outcome });
        }

        if kind == ArtifactKind::Ttf {
            let outcome = match ttf_parser::Face::parse(data, 0) {
                Ok(face) if face.number_of_glyphs() > 0 => CheckOutcome::Passed,
                Ok(_) => self.mismatch("font has no glyphs".to_string()),
                Err(e) => self.mismatch(format!("not a parseable font: {}", e)),
            };
            checks.push(Check {
                name: "structure",
                outcome,
            });
        }
        checks
    }
}
