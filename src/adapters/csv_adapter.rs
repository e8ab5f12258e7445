//! CSV reference file adapter.
//!
//! Reference files arrive with no declared encoding. The whole file is read
//! once and decoded under each candidate encoding in turn; the first encoding
//! that decodes every byte without a malformed sequence is used for the
//! entire load.

use crate::domain::error::BlotterError;
use crate::domain::issue::{parse_issue, IssueMap};
use crate::domain::reconcile::parse_number;
use crate::ports::reference_port::ReferencePort;
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

pub const DEFAULT_ISSUE_COLUMN: &str = "Issues";
pub const DEFAULT_YIELD_COLUMN: &str = "Average Simple Yield";
pub const DEFAULT_ENCODINGS: &[&str] = &[
    "utf-8-sig",
    "utf-8",
    "shift_jis",
    "cp932",
    "euc-jp",
    "iso-2022-jp",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A candidate text encoding for reference files.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEncoding {
    label: String,
    encoding: &'static Encoding,
    strip_bom: bool,
}

impl SourceEncoding {
    /// Resolve a label. Accepts WHATWG labels plus the common codec spellings
    /// `utf-8-sig`, `cp932`, `euc_jp` and `iso2022_jp`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let (lookup, strip_bom) = match normalized.as_str() {
            "utf-8-sig" | "utf_8_sig" | "utf8-sig" => ("utf-8", true),
            "cp932" | "ms932" => ("windows-31j", false),
            "euc_jp" | "eucjp" => ("euc-jp", false),
            "iso2022_jp" | "iso2022jp" => ("iso-2022-jp", false),
            other => (other, false),
        };
        let encoding = Encoding::for_label(lookup.as_bytes())?;
        Some(SourceEncoding {
            label: label.trim().to_string(),
            encoding,
            strip_bom,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Strict decode of the whole input. `None` on any malformed sequence.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        let bytes = if self.strip_bom {
            bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
        } else {
            bytes
        };
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
    }
}

pub fn default_encodings() -> Vec<SourceEncoding> {
    DEFAULT_ENCODINGS
        .iter()
        .filter_map(|label| SourceEncoding::from_label(label))
        .collect()
}

/// Column names and candidate encodings for a reference file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSettings {
    pub issue_column: String,
    pub yield_column: String,
    pub encodings: Vec<SourceEncoding>,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        ReferenceSettings {
            issue_column: DEFAULT_ISSUE_COLUMN.to_string(),
            yield_column: DEFAULT_YIELD_COLUMN.to_string(),
            encodings: default_encodings(),
        }
    }
}

pub struct CsvReferenceAdapter {
    settings: ReferenceSettings,
}

impl CsvReferenceAdapter {
    pub fn new(settings: ReferenceSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ReferenceSettings {
        &self.settings
    }

    /// First candidate encoding that decodes all of `bytes`, with the text.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<(&SourceEncoding, Cow<'a, str>)> {
        self.settings.encodings.iter().find_map(|encoding| {
            let text = encoding.decode(bytes);
            if text.is_none() {
                debug!(encoding = encoding.label(), "reference file does not decode");
            }
            text.map(|t| (encoding, t))
        })
    }

    /// Build the issue map from decoded CSV text. Rows without a recognizable
    /// issue name are skipped; later rows replace earlier ones per ticker.
    pub fn parse_table(&self, text: &str) -> IssueMap {
        let mut issues = IssueMap::new();
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut headers: Vec<String> = match rdr.headers() {
            Ok(h) => h.iter().map(str::to_string).collect(),
            Err(e) => {
                warn!(error = %e, "unreadable reference header");
                return issues;
            }
        };
        // The csv reader drops a leading BOM on its own. Text decoded as plain
        // utf-8 still carries it, and it belongs to the first column name.
        if text.starts_with('\u{feff}') {
            if let Some(first) = headers.first_mut().filter(|h| !h.starts_with('\u{feff}')) {
                first.insert(0, '\u{feff}');
            }
        }
        // Duplicate column names resolve to the last occurrence.
        let column = |name: &str| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.as_str() == name)
                .map(|(i, _)| i)
                .last()
        };
        let issue_idx = column(&self.settings.issue_column);
        let yield_idx = column(&self.settings.yield_column);
        if issue_idx.is_none() {
            warn!(
                column = %self.settings.issue_column,
                "issue column missing from reference header"
            );
            return issues;
        }

        for (row, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(row = row + 1, error = %e, "skipping unreadable reference row");
                    continue;
                }
            };

            let Some(raw) = issue_idx.and_then(|i| record.get(i)).filter(|s| !s.is_empty())
            else {
                continue;
            };
            let Some(issue) = parse_issue(raw) else {
                debug!(raw, "skipping unrecognized issue");
                continue;
            };
            let closing_yield = yield_idx
                .and_then(|i| record.get(i))
                .and_then(parse_number);

            issues.insert(issue.ticker.clone(), issue.with_closing_yield(closing_yield));
        }

        issues
    }
}

impl ReferencePort for CsvReferenceAdapter {
    fn try_load(&self, path: &Path) -> Result<IssueMap, BlotterError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BlotterError::ReferenceNotFound {
                path: path.display().to_string(),
            },
            _ => BlotterError::ReferenceRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;

        let Some((encoding, text)) = self.decode(&bytes) else {
            return Err(BlotterError::ReferenceUndecodable {
                path: path.display().to_string(),
                tried: self
                    .settings
                    .encodings
                    .iter()
                    .map(|e| e.label().to_string())
                    .collect(),
            });
        };

        let issues = self.parse_table(&text);
        info!(
            path = %path.display(),
            encoding = encoding.label(),
            issues = issues.len(),
            "loaded reference file"
        );
        Ok(issues)
    }
}
