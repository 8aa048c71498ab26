use clap::{Parser, Subcommand};

/// Distribute a fixed budget of points across projects, record the ballots and show the results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the settings of the vote (budget, projects, log file).
    /// The options below override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default votes.csv) The CSV file in which the ballots are recorded.
    #[clap(short, long, value_parser)]
    pub log: Option<String>,

    /// (default 10) The number of points every ballot must distribute.
    #[clap(short, long, value_parser)]
    pub budget: Option<u32>,

    /// (default 7) The number of projects, named 'Project 1', 'Project 2', etc.
    /// Ignored if project names are provided.
    #[clap(short, long, value_parser)]
    pub projects: Option<usize>,

    /// (repeated, optional) The names of the projects, in display order.
    #[clap(long, value_parser)]
    pub project_name: Vec<String>,

    /// If passed as an argument, ballots are appended to the end of the log instead of
    /// rewriting the whole file.
    #[clap(long, takes_value = false)]
    pub append: bool,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fills in a ballot and records it if it uses exactly the whole budget.
    Vote {
        /// (comma-separated points, optional) Starts from these values instead of zero, for
        /// instance to resume a ballot that was left unfinished.
        #[clap(long, value_parser)]
        start: Option<String>,

        /// (PROJECT=POINTS, repeated) Sets the points of a project (numbered from 1).
        /// The changes are applied in order; a change that goes over the budget is reduced.
        #[clap(short, long = "set", value_parser)]
        set: Vec<String>,

        /// Only shows the resulting allocation, without recording it.
        #[clap(long, takes_value = false)]
        dry_run: bool,
    },
    /// Shows the total of the points received by each project.
    Results {
        /// (file path or 'stdout', optional) Writes the results in JSON format to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path, optional) A reference file with results in JSON format. If provided, the
        /// results are checked against it.
        #[clap(short, long, value_parser)]
        reference: Option<String>,

        /// (default 40) The width of the longest bar of the chart.
        #[clap(short, long, value_parser)]
        width: Option<usize>,
    },
    /// Deletes all the recorded ballots.
    Reset,
}
