use log::{debug, info, warn};

use point_allocation::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::ballot::chart::*;
use crate::ballot::config_reader::*;
use crate::ballot::io_csv::*;

pub mod chart;
pub mod config_reader;
pub mod io_csv;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BallotError {
    // ******* Validation errors ********
    #[snafu(display("{source}"))]
    Validation { source: AllocationErrors },
    #[snafu(display(
        "Could not understand {edit:?}: expected PROJECT=POINTS with a project number between 1 and {count}"
    ))]
    InvalidEdit { edit: String, count: usize },
    #[snafu(display("Could not understand the starting points {values:?}: expected {count} comma-separated numbers"))]
    InvalidStart { values: String, count: usize },

    // ******* Configuration errors ********
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },

    // ******* Storage errors ********
    #[snafu(display("Error opening the ballot log {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the ballot log {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Error writing to the ballot log {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error writing to the ballot log {path}"))]
    WritingLog {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(
        "The ballot log {path} was written for the projects {found:?}, but the configured projects are {expected:?}"
    ))]
    SchemaMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[snafu(display("Line {lineno} of the ballot log {path} has {found} values, expected {expected}"))]
    RowLength {
        path: String,
        lineno: u64,
        found: usize,
        expected: usize,
    },
    #[snafu(display("Line {lineno} of the ballot log {path}: {content:?} is not a number of points"))]
    CellParse {
        source: std::num::ParseIntError,
        path: String,
        lineno: u64,
        content: String,
    },
    #[snafu(display("Error removing the ballot log {path}"))]
    RemovingLog {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BallotResult<T> = Result<T, BallotError>;

/// How a new ballot reaches the log file.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum WriteMode {
    /// Reads the whole log, adds the ballot and writes everything back.
    Rewrite,
    /// Only writes the new line at the end of the file.
    Append,
}

/// A ballot read back from the log.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    /// Position in the log, starting at 0.
    pub position: usize,
    pub allocation: Allocation,
}

/// The points received by each project over all the ballots, in project order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Aggregate {
    pub totals: Vec<(String, u64)>,
    pub ballots: usize,
}

impl Aggregate {
    pub fn empty(rules: &BallotRules) -> Aggregate {
        Aggregate {
            totals: rules.projects.iter().map(|p| (p.clone(), 0)).collect(),
            ballots: 0,
        }
    }

    /// No ballot has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.ballots == 0
    }

    pub fn values(&self) -> Vec<u64> {
        self.totals.iter().map(|(_, t)| *t).collect()
    }
}

/// The shared log of ballots.
///
/// There is no locking of any kind: two submissions running at the same time may
/// both read the log before either writes it back, and one of the ballots is then lost.
pub struct BallotStore {
    rules: BallotRules,
    path: PathBuf,
    write_mode: WriteMode,
}

impl BallotStore {
    pub fn new<P: AsRef<Path>>(rules: &BallotRules, path: P, write_mode: WriteMode) -> BallotStore {
        BallotStore {
            rules: rules.clone(),
            path: path.as_ref().to_path_buf(),
            write_mode,
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Records a ballot. The allocation must use exactly the whole budget.
    pub fn submit(&self, allocation: &Allocation) -> BallotResult<()> {
        allocation.validate(&self.rules).context(ValidationSnafu {})?;
        let row = allocation.values();
        match self.write_mode {
            WriteMode::Rewrite => {
                let mut rows = if self.path.exists() {
                    read_ballot_log(&self.path, &self.rules.projects)?
                } else {
                    Vec::new()
                };
                rows.push(row);
                write_ballot_log(&self.path, &self.rules.projects, &rows)?;
                info!(
                    "submit: recorded ballot {} in {:?}",
                    rows.len(),
                    self.path
                );
            }
            WriteMode::Append => {
                append_ballot(&self.path, &self.rules.projects, &row)?;
                info!("submit: appended ballot to {:?}", self.path);
            }
        }
        Ok(())
    }

    /// All the ballots of the log, in the order in which they were recorded.
    pub fn ballots(&self) -> BallotResult<Vec<Ballot>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let rows = read_ballot_log(&self.path, &self.rules.projects)?;
        let mut res: Vec<Ballot> = Vec::new();
        for (position, row) in rows.iter().enumerate() {
            res.push(Ballot {
                position,
                allocation: Allocation::from_values(&self.rules, row)
                    .context(ValidationSnafu {})?,
            });
        }
        Ok(res)
    }

    /// Sums the points of every project over all the ballots.
    ///
    /// A missing log is not an error: all the totals are zero.
    pub fn aggregate(&self) -> BallotResult<Aggregate> {
        let mut res = Aggregate::empty(&self.rules);
        if !self.path.exists() {
            debug!("aggregate: no ballot log at {:?}", self.path);
            return Ok(res);
        }
        let ballots = self.ballots()?;
        for b in ballots.iter() {
            for ((_, total), (_, v)) in res.totals.iter_mut().zip(b.allocation.points.iter()) {
                *total += *v as u64;
            }
        }
        res.ballots = ballots.len();
        debug!("aggregate: {:?}", res);
        Ok(res)
    }

    /// Deletes the log. Returns false if there was nothing to delete.
    pub fn reset(&self) -> BallotResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("reset: removed {:?}", self.path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("reset: nothing to remove at {:?}", self.path);
                Ok(false)
            }
            Err(e) => Err(e).context(RemovingLogSnafu {
                path: self.path.display().to_string(),
            }),
        }
    }
}

/// Reads an edit of the form `PROJECT=POINTS`, with the project numbered from 1.
/// Returns the 0-based slot.
fn parse_edit(edit: &str, count: usize) -> BallotResult<(usize, u32)> {
    let parsed = edit.split_once('=').and_then(|(p, v)| {
        let project = p.trim().parse::<usize>().ok()?;
        let points = v.trim().parse::<u32>().ok()?;
        Some((project, points))
    });
    match parsed {
        Some((project, points)) if project >= 1 && project <= count => Ok((project - 1, points)),
        _ => InvalidEditSnafu {
            edit: edit.to_string(),
            count,
        }
        .fail(),
    }
}

/// Reads the comma-separated values a session starts from.
fn parse_start(values: &str, count: usize) -> BallotResult<Vec<u32>> {
    let parsed: Option<Vec<u32>> = values
        .split(',')
        .map(|v| v.trim().parse::<u32>().ok())
        .collect();
    match parsed {
        Some(res) if res.len() == count => Ok(res),
        _ => InvalidStartSnafu { values, count }.fail(),
    }
}

pub fn run_vote(
    settings: &Settings,
    start: Option<&str>,
    edits: &[String],
    dry_run: bool,
) -> BallotResult<()> {
    let rules = &settings.rules;
    let mut session = match start {
        Some(values) => {
            let values = parse_start(values, rules.project_count())?;
            AllocationController::from_values(rules, &values).context(ValidationSnafu {})?
        }
        None => AllocationController::new(rules),
    };
    for edit in edits.iter() {
        let (index, points) = parse_edit(edit, rules.project_count())?;
        if let Some(notice) = session.set_value(index, points).context(ValidationSnafu {})? {
            println!("Warning: {}", notice);
            if notice.invariant_violated {
                println!(
                    "Warning: the other projects already exceed {} points.",
                    notice.budget
                );
            }
        }
    }
    print!("{}", render_session(&session));
    if let Some(msg) = completion_message(&session) {
        println!("{}", msg);
    }

    if dry_run {
        info!("run_vote: dry run, the ballot is not recorded");
        return Ok(());
    }

    let store = BallotStore::new(rules, &settings.log_path, settings.write_mode);
    store.submit(&session.into_allocation())?;
    println!("Thank you! Your ballot has been recorded.");
    Ok(())
}

pub fn run_results(
    settings: &Settings,
    out: Option<String>,
    reference: Option<String>,
    width: Option<usize>,
) -> BallotResult<()> {
    let store = BallotStore::new(&settings.rules, &settings.log_path, settings.write_mode);
    let aggregate = store.aggregate()?;
    print!(
        "{}",
        render_bar_chart(&aggregate, width.unwrap_or(DEFAULT_CHART_WIDTH))
    );

    let result_js = summary_json(&settings.rules, &aggregate);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            info!("Writing the results to {}", path);
            fs::write(path, &pretty_js_stats).context(WritingLogSnafu { path })?;
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated results and reference results")
        }
    }
    Ok(())
}

pub fn run_reset(settings: &Settings) -> BallotResult<()> {
    let store = BallotStore::new(&settings.rules, &settings.log_path, settings.write_mode);
    if store.reset()? {
        println!("All the ballots in {} have been deleted.", store.path().display());
    } else {
        println!("No ballot to delete.");
    }
    Ok(())
}

pub fn run(args: &Args) -> BallotResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => BallotConfig::default(),
    };
    let settings = resolve_settings(&config, args)?;
    info!("settings: {:?}", settings);

    match &args.command {
        Command::Vote {
            start,
            set,
            dry_run,
        } => run_vote(&settings, start.as_deref(), set, *dry_run),
        Command::Results {
            out,
            reference,
            width,
        } => run_results(&settings, out.clone(), reference.clone(), *width),
        Command::Reset => run_reset(&settings),
    }
}
