//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvReferenceAdapter, ReferenceSettings, SourceEncoding};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::BlotterError;
use crate::domain::issue::{parse_issue, Issue, IssueMap};
use crate::domain::ledger::TradeLedger;
use crate::domain::reconcile::{parse_number, spread_from_trade_yield, trade_yield_from_spread};
use crate::domain::ticket::{TradeTicket, DEFAULT_QUANTITY};
use crate::ports::config_port::ConfigPort;
use crate::ports::reference_port::ReferencePort;

#[derive(Parser, Debug)]
#[command(name = "bondblotter", about = "Bond trade blotter against closing yields")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List reference issues sorted by ticker
    Issues {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        reference: Option<PathBuf>,
    },
    /// Show the ticker for security names
    Parse {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Reprice from a spread or from a trade yield
    Price {
        #[arg(long, allow_negative_numbers = true)]
        closing: f64,
        #[arg(
            long,
            allow_negative_numbers = true,
            conflicts_with = "trade_yield",
            required_unless_present = "trade_yield"
        )]
        spread: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        trade_yield: Option<f64>,
    },
    /// Enter trades from commands on stdin
    Session {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        reference: Option<PathBuf>,
    },
}

/// Everything the front end reads from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub reference_path: Option<PathBuf>,
    pub reference: ReferenceSettings,
    pub default_quantity: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            reference_path: None,
            reference: ReferenceSettings::default(),
            default_quantity: DEFAULT_QUANTITY,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Issues { config, reference } => run_issues(config.as_ref(), reference),
        Command::Parse { names } => run_parse(&names),
        Command::Price {
            closing,
            spread,
            trade_yield,
        } => run_price(closing, spread, trade_yield),
        Command::Session { config, reference } => run_session_cmd(config.as_ref(), reference),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = BlotterError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn parse_encodings(input: &str) -> Result<Vec<SourceEncoding>, BlotterError> {
    let invalid = |reason: String| BlotterError::ConfigInvalid {
        section: "reference".into(),
        key: "encodings".into(),
        reason,
    };
    input
        .split(',')
        .map(str::trim)
        .map(|label| {
            if label.is_empty() {
                return Err(invalid("empty token in encoding list".into()));
            }
            SourceEncoding::from_label(label)
                .ok_or_else(|| invalid(format!("unknown encoding label `{label}`")))
        })
        .collect()
}

fn column_setting(
    config: &dyn ConfigPort,
    key: &str,
    default: String,
) -> Result<String, BlotterError> {
    match config.get_string("reference", key) {
        Some(name) => Ok(name),
        None if config.has_key("reference", key) => Err(BlotterError::ConfigInvalid {
            section: "reference".into(),
            key: key.into(),
            reason: "column name must not be empty".into(),
        }),
        None => Ok(default),
    }
}

pub fn build_reference_settings(config: &dyn ConfigPort) -> Result<ReferenceSettings, BlotterError> {
    let mut settings = ReferenceSettings::default();
    settings.issue_column = column_setting(config, "issue_column", settings.issue_column)?;
    settings.yield_column = column_setting(config, "yield_column", settings.yield_column)?;
    if settings.issue_column == settings.yield_column {
        return Err(BlotterError::ConfigInvalid {
            section: "reference".into(),
            key: "yield_column".into(),
            reason: "issue and yield columns must differ".into(),
        });
    }
    if let Some(labels) = config.get_string("reference", "encodings") {
        settings.encodings = parse_encodings(&labels)?;
    }
    Ok(settings)
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<AppSettings, BlotterError> {
    let default_quantity = config.get_double("ticket", "default_quantity", DEFAULT_QUANTITY);
    if !(default_quantity.is_finite() && default_quantity > 0.0) {
        return Err(BlotterError::ConfigInvalid {
            section: "ticket".into(),
            key: "default_quantity".into(),
            reason: "default_quantity must be positive".into(),
        });
    }
    Ok(AppSettings {
        reference_path: config.get_string("reference", "path").map(PathBuf::from),
        reference: build_reference_settings(config)?,
        default_quantity,
    })
}

/// Settings from `--config` (or defaults), with `--reference` taking
/// precedence over `[reference] path`.
fn resolve_settings(
    config_path: Option<&PathBuf>,
    reference_override: Option<PathBuf>,
) -> Result<(AppSettings, PathBuf), ExitCode> {
    let mut settings = match config_path {
        Some(path) => {
            let config = load_config(path)?;
            build_settings(&config).map_err(|e| {
                eprintln!("error: {e}");
                ExitCode::from(&e)
            })?
        }
        None => AppSettings::default(),
    };
    if reference_override.is_some() {
        settings.reference_path = reference_override;
    }
    match settings.reference_path.clone() {
        Some(path) => Ok((settings, path)),
        None => {
            eprintln!("error: no reference file (use --reference or set [reference] path)");
            Err(ExitCode::from(2))
        }
    }
}

pub fn format_issue(issue: &Issue) -> String {
    let closing = issue
        .closing_yield
        .map(|y| format!("{y:.6}"))
        .unwrap_or_else(|| "-".to_string());
    format!("{:<10} {:>10}  {}", issue.ticker, closing, issue.raw)
}

fn run_issues(config_path: Option<&PathBuf>, reference: Option<PathBuf>) -> ExitCode {
    let (settings, path) = match resolve_settings(config_path, reference) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let adapter = CsvReferenceAdapter::new(settings.reference);
    let issues = match adapter.try_load(&path) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for issue in issues.values() {
        println!("{}", format_issue(issue));
    }
    eprintln!("{} issues", issues.len());
    ExitCode::SUCCESS
}

fn run_parse(names: &[String]) -> ExitCode {
    for name in names {
        match parse_issue(name) {
            Some(issue) => println!("{name} -> {}", issue.ticker),
            None => println!("{name} -> not recognized"),
        }
    }
    ExitCode::SUCCESS
}

fn run_price(closing: f64, spread: Option<f64>, trade_yield: Option<f64>) -> ExitCode {
    let (spread, trade_yield) = match trade_yield {
        Some(ty) => (spread_from_trade_yield(Some(closing), Some(ty)), ty),
        None => (spread.unwrap_or(0.0), trade_yield_from_spread(Some(closing), spread)),
    };
    println!("closing      {closing:.6}");
    println!("spread (bp)  {spread:.4}");
    println!("trade yield  {trade_yield:.6}");
    ExitCode::SUCCESS
}

fn run_session_cmd(config_path: Option<&PathBuf>, reference: Option<PathBuf>) -> ExitCode {
    let (settings, path) = match resolve_settings(config_path, reference) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let issues = CsvReferenceAdapter::new(settings.reference).load(&path);
    if issues.is_empty() {
        eprintln!("No issues loaded");
        return ExitCode::SUCCESS;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_session(&issues, settings.default_quantity, stdin.lock(), &mut stdout.lock()) {
        Ok(ledger) => {
            eprintln!("{} trades entered", ledger.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// One line of session input.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Select(String),
    Closing(f64),
    Spread(f64),
    Yield(f64),
    Quantity(f64),
    Add,
    Mark(Vec<u64>),
    RemoveSelected,
    Delete(u64),
    List,
    Ticket,
    Help,
    Quit,
}

const SESSION_HELP: &str = "\
commands:
  select <ticker>    choose an issue (copies its closing yield)
  closing <y>        set the closing yield
  spread <bp>        set the spread; reprices the trade yield
  yield <y>          set the trade yield; reprices the spread
  qty <q>            set the quantity
  add                book the ticket into the ledger
  mark <id>...       replace the selection (no ids clears it)
  remove-selected    delete every selected trade
  delete <id>        delete one trade
  list               show the ledger
  ticket             show the ticket
  help               show this list
  quit (or exit)     end the session";

impl SessionCommand {
    /// Parse a line. Blank lines and `#` comments give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, BlotterError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let invalid = |reason: &str| BlotterError::InvalidCommand {
            line: line.to_string(),
            reason: reason.to_string(),
        };
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let number = || match args.as_slice() {
            [value] => parse_number(value).ok_or_else(|| invalid("expected a number")),
            _ => Err(invalid("expected one number")),
        };
        let id = |text: &str| text.parse::<u64>().map_err(|_| invalid("expected a trade id"));
        let no_args = |cmd: SessionCommand| {
            if args.is_empty() {
                Ok(cmd)
            } else {
                Err(invalid("takes no arguments"))
            }
        };

        let cmd = match verb.to_ascii_lowercase().as_str() {
            "select" => match args.as_slice() {
                [ticker] => SessionCommand::Select(ticker.to_string()),
                _ => return Err(invalid("expected one ticker")),
            },
            "closing" => SessionCommand::Closing(number()?),
            "spread" => SessionCommand::Spread(number()?),
            "yield" => SessionCommand::Yield(number()?),
            "qty" => SessionCommand::Quantity(number()?),
            "add" => no_args(SessionCommand::Add)?,
            "mark" => SessionCommand::Mark(args.iter().map(|a| id(a)).collect::<Result<_, _>>()?),
            "remove-selected" => no_args(SessionCommand::RemoveSelected)?,
            "delete" => match args.as_slice() {
                [value] => SessionCommand::Delete(id(value)?),
                _ => return Err(invalid("expected one trade id")),
            },
            "list" => no_args(SessionCommand::List)?,
            "ticket" => no_args(SessionCommand::Ticket)?,
            "help" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            _ => return Err(invalid("unknown command")),
        };
        Ok(Some(cmd))
    }
}

fn write_ticket<W: Write>(out: &mut W, ticket: &TradeTicket) -> io::Result<()> {
    writeln!(
        out,
        "issue={} closing={:.6} spread={:.4} yield={:.6} qty={}",
        ticket.issue.as_deref().unwrap_or("-"),
        ticket.closing_yield,
        ticket.spread_bp,
        ticket.trade_yield,
        ticket.quantity
    )
}

fn write_ledger<W: Write>(out: &mut W, ledger: &TradeLedger) -> io::Result<()> {
    writeln!(
        out,
        "   {:>4}  {:<10} {:>10} {:>12} {:>11} {:>10}",
        "ID", "Issue", "Close", "Trade Yield", "Spread(bp)", "Quantity"
    )?;
    for trade in ledger.trades() {
        let mark = if ledger.is_selected(trade.id) { '*' } else { ' ' };
        writeln!(
            out,
            " {mark} {:>4}  {:<10} {:>10.6} {:>12.6} {:>11.4} {:>10}",
            trade.id,
            trade.issue,
            trade.closing_yield,
            trade.trade_yield,
            trade.spread_bp,
            trade.quantity
        )?;
    }
    Ok(())
}

fn apply<W: Write>(
    cmd: SessionCommand,
    issues: &IssueMap,
    ticket: &mut TradeTicket,
    ledger: &mut TradeLedger,
    out: &mut W,
) -> Result<(), BlotterError> {
    match cmd {
        SessionCommand::Select(ticker) => {
            let issue = issues
                .get(&ticker)
                .ok_or(BlotterError::UnknownIssue { ticker })?;
            ticket.select_issue(issue);
            writeln!(out, "Selected: {}", issue.ticker)?;
        }
        SessionCommand::Closing(v) => ticket.set_closing_yield(v),
        SessionCommand::Spread(v) => {
            ticket.set_spread(v);
            write_ticket(out, ticket)?;
        }
        SessionCommand::Yield(v) => {
            ticket.set_trade_yield(v);
            write_ticket(out, ticket)?;
        }
        SessionCommand::Quantity(v) => ticket.set_quantity(v),
        SessionCommand::Add => {
            let trade = ticket.book(ledger)?;
            writeln!(out, "Added {} (trade {})", trade.issue, trade.id)?;
        }
        SessionCommand::Mark(ids) => {
            ledger.update_selection(ids);
            writeln!(out, "{} selected", ledger.selection().len())?;
        }
        SessionCommand::RemoveSelected => {
            let removed = ledger.remove_selected();
            writeln!(out, "Removed {removed} trades")?;
        }
        SessionCommand::Delete(id) => {
            ledger
                .remove_by_id(id)
                .ok_or(BlotterError::UnknownTrade { id })?;
            writeln!(out, "Deleted trade {id}")?;
        }
        SessionCommand::List => write_ledger(out, ledger)?,
        SessionCommand::Ticket => write_ticket(out, ticket)?,
        SessionCommand::Help => writeln!(out, "{SESSION_HELP}")?,
        SessionCommand::Quit => {}
    }
    Ok(())
}

/// Drive a ledger from line commands until `quit` or end of input. The
/// first issue in ticker order starts out selected. A bad line is reported
/// on `out` and the session carries on; only I/O failures end it early.
pub fn run_session<R: BufRead, W: Write>(
    issues: &IssueMap,
    default_quantity: f64,
    input: R,
    out: &mut W,
) -> Result<TradeLedger, BlotterError> {
    let mut ledger = TradeLedger::new();
    let mut ticket = TradeTicket::with_quantity(default_quantity);
    // Start on the first issue so a bare `add` books against a real ticker
    // and the closing yield is filled in, rather than an empty ticket at 0.0.
    if let Some(first) = issues.values().next() {
        ticket.select_issue(first);
    }

    for line in input.lines() {
        let line = line?;
        let result = SessionCommand::parse(&line).and_then(|cmd| match cmd {
            Some(SessionCommand::Quit) => Ok(true),
            Some(cmd) => apply(cmd, issues, &mut ticket, &mut ledger, out).map(|_| false),
            None => Ok(false),
        });
        match result {
            Ok(true) => break,
            Ok(false) => {}
            Err(BlotterError::Io(e)) => return Err(BlotterError::Io(e)),
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }
    Ok(ledger)
}
