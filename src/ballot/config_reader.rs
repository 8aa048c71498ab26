use crate::ballot::*;

use point_allocation::builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

pub const DEFAULT_LOG_PATH: &str = "votes.csv";

/// The content of the JSON configuration file. All the keys are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallotConfig {
    pub budget: Option<u32>,
    #[serde(rename = "projectCount")]
    pub project_count: Option<usize>,
    #[serde(rename = "projectNames")]
    pub project_names: Option<Vec<String>>,
    #[serde(rename = "maxPerProject")]
    pub max_per_project: Option<u32>,
    #[serde(rename = "logPath")]
    pub log_path: Option<String>,
    #[serde(rename = "writeMode")]
    pub write_mode: Option<String>,
}

impl BallotConfig {
    pub fn write_mode(&self) -> BallotResult<Option<WriteMode>> {
        match self.write_mode.as_deref() {
            None => Ok(None),
            Some("rewrite") => Ok(Some(WriteMode::Rewrite)),
            Some("append") => Ok(Some(WriteMode::Append)),
            Some(x) => whatever!("unknown write mode: {} (expected rewrite or append)", x),
        }
    }
}

/// Everything a command needs, after merging the defaults, the file and the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub rules: BallotRules,
    pub log_path: PathBuf,
    pub write_mode: WriteMode,
}

/// Reads the configuration file. A relative log path is taken relative to the
/// directory of the configuration file.
pub fn read_config(path: &str) -> BallotResult<BallotConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: BallotConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);

    if let Some(log_path) = config.log_path.clone() {
        let parent = Path::new(path).parent();
        if let Some(root_p) = parent.filter(|_| Path::new(&log_path).is_relative()) {
            let p: PathBuf = root_p.join(&log_path);
            config.log_path = Some(p.display().to_string());
        }
    }
    Ok(config)
}

pub fn resolve_settings(config: &BallotConfig, args: &Args) -> BallotResult<Settings> {
    let budget = args
        .budget
        .or(config.budget)
        .unwrap_or(BallotRules::DEFAULT_BUDGET);
    let mut builder = Builder::new(budget);

    if !args.project_name.is_empty() {
        builder = builder
            .project_names(&args.project_name)
            .context(ValidationSnafu {})?;
    } else if let Some(count) = args.projects {
        builder = builder.project_count(count).context(ValidationSnafu {})?;
    } else if let Some(names) = &config.project_names {
        if let Some(count) = config.project_count {
            if count != names.len() {
                whatever!(
                    "projectCount is {} but {} projectNames are given",
                    count,
                    names.len()
                )
            }
        }
        builder = builder.project_names(names).context(ValidationSnafu {})?;
    } else if let Some(count) = config.project_count {
        builder = builder.project_count(count).context(ValidationSnafu {})?;
    }

    if let Some(max) = config.max_per_project {
        builder = builder.max_per_project(max);
    }
    let rules = builder.build().context(ValidationSnafu {})?;

    let log_path = args
        .log
        .clone()
        .or_else(|| config.log_path.clone())
        .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string());

    let write_mode = if args.append {
        WriteMode::Append
    } else {
        config.write_mode()?.unwrap_or(WriteMode::Rewrite)
    };

    Ok(Settings {
        rules,
        log_path: PathBuf::from(log_path),
        write_mode,
    })
}

/// Reads a JSON summary of results, to compare it with the results of a run.
pub fn read_summary(path: String) -> BallotResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
