#![allow(dead_code)]

use bondblotter::domain::error::BlotterError;
use bondblotter::domain::issue::{parse_issue, Issue, IssueMap};
use bondblotter::ports::reference_port::ReferencePort;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const REFERENCE_CSV: &str = "Issues,Average Simple Yield,Code\n\
    T-BILL123,0.123456,100\n\
    JGB45(10),1.0,200\n\
    JGB I/L7,2.5,300\n\
    CASH-USD,9.9,400\n";

/// Reference port that never touches the filesystem.
pub struct MockReferencePort {
    pub issues: IssueMap,
    pub error: Option<fn() -> BlotterError>,
}

impl MockReferencePort {
    pub fn new() -> Self {
        Self {
            issues: IssueMap::new(),
            error: None,
        }
    }

    pub fn with_issue(mut self, raw: &str, closing_yield: Option<f64>) -> Self {
        let issue = parse_issue(raw)
            .expect("fixture issue must be recognized")
            .with_closing_yield(closing_yield);
        self.issues.insert(issue.ticker.clone(), issue);
        self
    }

    pub fn failing(mut self, error: fn() -> BlotterError) -> Self {
        self.error = Some(error);
        self
    }
}

impl ReferencePort for MockReferencePort {
    fn try_load(&self, _path: &Path) -> Result<IssueMap, BlotterError> {
        match self.error {
            Some(make) => Err(make()),
            None => Ok(self.issues.clone()),
        }
    }
}

pub fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

pub fn make_issue(ticker: &str, raw: &str, closing_yield: Option<f64>) -> Issue {
    Issue {
        ticker: ticker.to_string(),
        raw: raw.to_string(),
        closing_yield,
    }
}
