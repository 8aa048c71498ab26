pub use crate::config::*;

/// A builder for the rules of a point allocation.
///
/// ```
/// pub use point_allocation::builder::Builder;
/// # use point_allocation::AllocationErrors;
///
/// let rules = Builder::new(10)
///     .project_names(&["Garden".to_string(), "Library".to_string()])?
///     .build()?;
///
/// assert_eq!(rules.max_per_project, 10);
///
/// # Ok::<(), AllocationErrors>(())
/// ```
pub struct Builder {
    pub(crate) _budget: u32,
    pub(crate) _max_per_project: Option<u32>,
    pub(crate) _projects: Vec<String>,
}

impl Builder {
    /// Starts with the given budget and the default seven projects.
    pub fn new(budget: u32) -> Builder {
        Builder {
            _budget: budget,
            _max_per_project: None,
            _projects: default_project_names(BallotRules::DEFAULT_PROJECT_COUNT),
        }
    }

    /// Replaces the projects by `Project 1` .. `Project N`.
    pub fn project_count(self, count: usize) -> Result<Builder, AllocationErrors> {
        if count == 0 {
            return Err(AllocationErrors::EmptyProjects);
        }
        Ok(Builder {
            _projects: default_project_names(count),
            ..self
        })
    }

    /// Replaces the projects by the given names, in order.
    pub fn project_names(self, names: &[String]) -> Result<Builder, AllocationErrors> {
        if names.is_empty() {
            return Err(AllocationErrors::EmptyProjects);
        }
        Ok(Builder {
            _projects: names.to_vec(),
            ..self
        })
    }

    /// Caps a single project. When not set, the cap is the budget.
    pub fn max_per_project(self, max: u32) -> Builder {
        Builder {
            _max_per_project: Some(max),
            ..self
        }
    }

    pub fn build(self) -> Result<BallotRules, AllocationErrors> {
        let rules = BallotRules {
            budget: self._budget,
            max_per_project: self._max_per_project.unwrap_or(self._budget),
            projects: self._projects,
        };
        rules.check()?;
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_seven_projects() {
        let rules = Builder::new(10).build().unwrap();
        assert_eq!(rules, BallotRules::default());
        assert_eq!(rules.projects[6], "Project 7");
    }

    #[test]
    fn rejects_duplicate_names() {
        let res = Builder::new(10)
            .project_names(&["A".to_string(), "B".to_string(), "A".to_string()])
            .unwrap()
            .build();
        assert_eq!(res, Err(AllocationErrors::DuplicateProject("A".to_string())));
    }

    #[test]
    fn rejects_no_projects() {
        assert!(Builder::new(10).project_count(0).is_err());
        assert!(Builder::new(10).project_names(&[]).is_err());
    }

    #[test]
    fn custom_cap() {
        let rules = Builder::new(10)
            .project_count(4)
            .unwrap()
            .max_per_project(5)
            .build()
            .unwrap();
        assert_eq!(rules.max_per_project, 5);
        assert_eq!(rules.project_count(), 4);
    }
}
