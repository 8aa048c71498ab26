// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A finished (or in-progress) distribution of points, one entry per project
/// in the configured order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Allocation {
    pub points: Vec<(String, u32)>,
}

impl Allocation {
    /// Builds an allocation from raw values, pairing them with the project names of the rules.
    pub fn from_values(rules: &BallotRules, values: &[u32]) -> Result<Allocation, AllocationErrors> {
        if values.len() != rules.projects.len() {
            return Err(AllocationErrors::ProjectMismatch {
                expected: rules.projects.clone(),
                found: values.len(),
            });
        }
        Ok(Allocation {
            points: rules
                .projects
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        })
    }

    pub fn total(&self) -> u64 {
        self.points.iter().map(|(_, p)| *p as u64).sum()
    }

    pub fn values(&self) -> Vec<u32> {
        self.points.iter().map(|(_, p)| *p).collect()
    }

    /// Checks that this allocation can be recorded as a ballot under the given rules:
    /// same projects in the same order, every value in range, and a total equal to the budget.
    pub fn validate(&self, rules: &BallotRules) -> Result<(), AllocationErrors> {
        let same_projects = self.points.len() == rules.projects.len()
            && self
                .points
                .iter()
                .zip(rules.projects.iter())
                .all(|((name, _), expected)| name == expected);
        if !same_projects {
            return Err(AllocationErrors::ProjectMismatch {
                expected: rules.projects.clone(),
                found: self.points.len(),
            });
        }
        for (index, (_, p)) in self.points.iter().enumerate() {
            if *p > rules.max_per_project {
                return Err(AllocationErrors::ValueOutOfRange {
                    index,
                    value: *p,
                    max: rules.max_per_project,
                });
            }
        }
        let total = self.total();
        if total != rules.budget as u64 {
            return Err(AllocationErrors::BudgetMismatch {
                total,
                budget: rules.budget,
            });
        }
        Ok(())
    }
}

// ******** Output data structures *********

/// Emitted when an edit pushed the total over the budget and the slot was reduced.
///
/// The notice is informational: the edit has already been applied (with the reduced value)
/// when the caller receives it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ClampNotice {
    pub index: usize,
    pub project: String,
    pub requested: u32,
    pub clamped_to: u32,
    pub budget: u32,
    /// The other slots were already above the budget before this edit.
    /// The slot was floored at zero but the session total still exceeds the budget.
    pub invariant_violated: bool,
}

impl Display for ClampNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total exceeds {}. Reducing {} to {}.",
            self.budget, self.project, self.clamped_to
        )
    }
}

/// Errors raised when an edit or an allocation does not fit the rules.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AllocationErrors {
    EmptyProjects,
    DuplicateProject(String),
    IndexOutOfRange { index: usize, count: usize },
    ValueOutOfRange { index: usize, value: u32, max: u32 },
    BudgetMismatch { total: u64, budget: u32 },
    ProjectMismatch { expected: Vec<String>, found: usize },
}

impl Error for AllocationErrors {}

impl Display for AllocationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationErrors::EmptyProjects => write!(f, "at least one project is required"),
            AllocationErrors::DuplicateProject(name) => {
                write!(f, "project {:?} is listed more than once", name)
            }
            AllocationErrors::IndexOutOfRange { index, count } => write!(
                f,
                "project index {} is out of range (there are {} projects)",
                index, count
            ),
            AllocationErrors::ValueOutOfRange { index, value, max } => write!(
                f,
                "value {} for project index {} is above the maximum of {}",
                value, index, max
            ),
            AllocationErrors::BudgetMismatch { total, budget } => write!(
                f,
                "total of {} points does not match the budget of {}",
                total, budget
            ),
            AllocationErrors::ProjectMismatch { expected, found } => write!(
                f,
                "allocation does not match the configured projects {:?} ({} values found)",
                expected, found
            ),
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotRules {
    /// The exact number of points each ballot must distribute.
    pub budget: u32,
    /// Upper bound for a single project. Usually equal to the budget, so that
    /// one project may absorb everything.
    pub max_per_project: u32,
    /// Project display names, in display order. Also the column headers of the log.
    pub projects: Vec<String>,
}

impl BallotRules {
    pub const DEFAULT_BUDGET: u32 = 10;
    pub const DEFAULT_PROJECT_COUNT: usize = 7;

    /// Rules with the given budget and explicit project names.
    pub fn new(budget: u32, projects: &[String]) -> Result<BallotRules, AllocationErrors> {
        let rules = BallotRules {
            budget,
            max_per_project: budget,
            projects: projects.to_vec(),
        };
        rules.check()?;
        Ok(rules)
    }

    /// Rules with `count` projects named `Project 1` .. `Project N`.
    pub fn with_project_count(budget: u32, count: usize) -> Result<BallotRules, AllocationErrors> {
        BallotRules::new(budget, &default_project_names(count))
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub(crate) fn check(&self) -> Result<(), AllocationErrors> {
        if self.projects.is_empty() {
            return Err(AllocationErrors::EmptyProjects);
        }
        for (idx, name) in self.projects.iter().enumerate() {
            if self.projects[..idx].contains(name) {
                return Err(AllocationErrors::DuplicateProject(name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for BallotRules {
    fn default() -> Self {
        BallotRules {
            budget: BallotRules::DEFAULT_BUDGET,
            max_per_project: BallotRules::DEFAULT_BUDGET,
            projects: default_project_names(BallotRules::DEFAULT_PROJECT_COUNT),
        }
    }
}

/// The names used when none are configured.
pub fn default_project_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Project {}", i)).collect()
}
