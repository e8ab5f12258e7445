//! Reference issues and security-name normalization.
//!
//! Reference files name government securities in free text (`T-BILL1234`,
//! `JGB372(10)`, `JGB I/L28`). [`parse_issue`] maps those names onto the
//! short tickers used throughout the blotter. Names outside the known
//! families are not errors: reference files carry plenty of rows that are
//! not bonds, and callers simply skip them.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Ticker prefix for treasury discount bills.
pub const BILL_PREFIX: &str = "JT";
/// Ticker prefix for inflation-indexed bonds.
pub const INFLATION_PREFIX: &str = "JBI";
/// Fallback prefix for coupon bonds whose term has no dedicated prefix.
pub const GENERIC_BOND_PREFIX: &str = "JGB";

/// Issues keyed by ticker. Iteration order is ticker order.
pub type IssueMap = BTreeMap<String, Issue>;

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub ticker: String,
    pub raw: String,
    pub closing_yield: Option<f64>,
}

impl Issue {
    pub fn with_closing_yield(mut self, closing_yield: Option<f64>) -> Self {
        self.closing_yield = closing_yield;
        self
    }
}

/// Ticker prefix for a coupon bond of the given term in years.
///
/// The term is looked up by its literal digits, so `"05"` is not `"5"`.
pub fn term_prefix(term: &str) -> &'static str {
    match term {
        "2" => "JN",
        "5" => "JS",
        "10" => "JB",
        "20" => "JL",
        "30" => "JX",
        "40" => "JU",
        _ => GENERIC_BOND_PREFIX,
    }
}

struct IssueFamily {
    name: &'static str,
    pattern: Regex,
    ticker: fn(&Captures<'_>) -> String,
}

fn family(name: &'static str, pattern: &str, ticker: fn(&Captures<'_>) -> String) -> IssueFamily {
    IssueFamily {
        name,
        pattern: Regex::new(pattern).expect("issue family pattern is a valid regex"),
        ticker,
    }
}

// Order matters: the first family that matches wins.
static FAMILIES: LazyLock<[IssueFamily; 3]> = LazyLock::new(|| {
    [
        family("bill", r"^T-BILL(\d+)$", |caps| {
            format!("{BILL_PREFIX}{}", &caps[1])
        }),
        family("bond", r"^JGB(\d+)\((\d+)\)$", |caps| {
            format!("{}{}", term_prefix(&caps[2]), &caps[1])
        }),
        family("inflation", r"^JGB I/L(\d+)$", |caps| {
            format!("{INFLATION_PREFIX}{}", &caps[1])
        }),
    ]
});

/// Parse a raw security name into an [`Issue`], or `None` if the name
/// belongs to no known family.
pub fn parse_issue(raw: &str) -> Option<Issue> {
    FAMILIES.iter().find_map(|family| {
        family.pattern.captures(raw).map(|caps| {
            let ticker = (family.ticker)(&caps);
            tracing::trace!(raw, ticker = %ticker, family = family.name, "recognized issue");
            Issue {
                ticker,
                raw: raw.to_string(),
                closing_yield: None,
            }
        })
    })
}
