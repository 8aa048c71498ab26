/*!
This crate keeps a participant's distribution of a fixed budget of points across
a fixed set of projects within the budget while the participant is still editing it.

Each session owns one [`AllocationController`]. Every change of one project's value
goes through [`AllocationController::set_value`]: if the change would push the total
above the budget, the value is reduced to what is still available and a
[`ClampNotice`] is returned to the caller.

```
use point_allocation::*;

let rules = BallotRules::with_project_count(10, 4)?;
let mut session = AllocationController::new(&rules);

assert_eq!(session.set_value(0, 8)?, None);
let notice = session.set_value(1, 5)?.unwrap();
assert_eq!((notice.index, notice.clamped_to), (1, 2));
assert_eq!(session.current_total(), 10);

let ballot = session.snapshot();
ballot.validate(&rules)?;
# Ok::<(), AllocationErrors>(())
```

See the [manual] for the command line interface built on top of it.
*/

pub mod builder;
mod config;
pub mod manual;

use log::{debug, info, warn};

pub use crate::config::*;

/// The in-progress allocation of one participant.
///
/// All slots start at zero. The controller keeps no history: once the allocation
/// has been handed off with [`AllocationController::snapshot`] or
/// [`AllocationController::into_allocation`], the session can be dropped.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AllocationController {
    rules: BallotRules,
    values: Vec<u32>,
}

impl AllocationController {
    pub fn new(rules: &BallotRules) -> AllocationController {
        AllocationController {
            rules: rules.clone(),
            values: vec![0; rules.project_count()],
        }
    }

    /// Restores a session from values held by the caller.
    ///
    /// The length and the range of each value are checked, the total is not:
    /// a stale set of values may already exceed the budget.
    pub fn from_values(
        rules: &BallotRules,
        values: &[u32],
    ) -> Result<AllocationController, AllocationErrors> {
        if values.len() != rules.project_count() {
            return Err(AllocationErrors::ProjectMismatch {
                expected: rules.projects.clone(),
                found: values.len(),
            });
        }
        for (index, v) in values.iter().enumerate() {
            check_value(rules, index, *v)?;
        }
        let res = AllocationController {
            rules: rules.clone(),
            values: values.to_vec(),
        };
        if res.current_total() > rules.budget as u64 {
            warn!(
                "from_values: restored session is already above the budget: {} > {}",
                res.current_total(),
                rules.budget
            );
        }
        Ok(res)
    }

    /// Sets the value of one slot, reducing it if the total would exceed the budget.
    ///
    /// Returns the clamp notice when the stored value differs from the requested one.
    /// Out-of-range inputs are rejected and leave the session unchanged.
    ///
    /// When the other slots alone are already above the budget, the slot is set to zero
    /// and the notice is flagged with `invariant_violated`.
    pub fn set_value(
        &mut self,
        index: usize,
        new_value: u32,
    ) -> Result<Option<ClampNotice>, AllocationErrors> {
        if index >= self.values.len() {
            return Err(AllocationErrors::IndexOutOfRange {
                index,
                count: self.values.len(),
            });
        }
        check_value(&self.rules, index, new_value)?;

        let other_total: i64 = self
            .values
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .map(|(_, v)| *v as i64)
            .sum();
        // Negative when the other slots already exceed the budget.
        let max_allowed: i64 = self.rules.budget as i64 - other_total;
        debug!(
            "set_value: index: {} new_value: {} other_total: {} max_allowed: {}",
            index, new_value, other_total, max_allowed
        );

        if (new_value as i64) <= max_allowed {
            self.values[index] = new_value;
            return Ok(None);
        }

        let invariant_violated = max_allowed < 0;
        let clamped_to = max_allowed.max(0) as u32;
        self.values[index] = clamped_to;
        let notice = ClampNotice {
            index,
            project: self.rules.projects[index].clone(),
            requested: new_value,
            clamped_to,
            budget: self.rules.budget,
            invariant_violated,
        };
        if invariant_violated {
            warn!(
                "set_value: other projects already hold {} points (budget {}), {} set to 0",
                other_total, self.rules.budget, notice.project
            );
        } else {
            info!("set_value: {}", notice);
        }
        Ok(Some(notice))
    }

    pub fn current_total(&self) -> u64 {
        self.values.iter().map(|v| *v as u64).sum()
    }

    // Negative above the budget.
    pub fn remaining(&self) -> i64 {
        self.rules.budget as i64 - self.current_total() as i64
    }

    pub fn is_complete(&self) -> bool {
        self.current_total() == self.rules.budget as u64
    }

    pub fn value(&self, index: usize) -> Option<u32> {
        self.values.get(index).cloned()
    }

    pub fn rules(&self) -> &BallotRules {
        &self.rules
    }

    pub fn snapshot(&self) -> Allocation {
        Allocation {
            points: self
                .rules
                .projects
                .iter()
                .cloned()
                .zip(self.values.iter().cloned())
                .collect(),
        }
    }

    /// Ends the session and hands the allocation off.
    pub fn into_allocation(self) -> Allocation {
        self.snapshot()
    }
}

fn check_value(rules: &BallotRules, index: usize, value: u32) -> Result<(), AllocationErrors> {
    if value > rules.max_per_project {
        return Err(AllocationErrors::ValueOutOfRange {
            index,
            value,
            max: rules.max_per_project,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn four_projects() -> BallotRules {
        BallotRules::with_project_count(10, 4).unwrap()
    }

    #[test]
    fn starts_at_zero() {
        let session = AllocationController::new(&BallotRules::default());
        assert_eq!(session.current_total(), 0);
        assert_eq!(session.snapshot().values(), vec![0; 7]);
        assert_eq!(session.remaining(), 10);
        assert!(!session.is_complete());
    }

    #[test]
    fn clamps_to_what_is_left() {
        init();
        let mut session = AllocationController::new(&four_projects());
        assert_eq!(session.set_value(0, 8), Ok(None));
        let notice = session.set_value(1, 5).unwrap().unwrap();
        assert_eq!(notice.index, 1);
        assert_eq!(notice.clamped_to, 2);
        assert_eq!(notice.requested, 5);
        assert!(!notice.invariant_violated);
        assert_eq!(notice.to_string(), "Total exceeds 10. Reducing Project 2 to 2.");
        assert_eq!(session.value(1), Some(2));
        assert_eq!(session.current_total(), 10);
        assert!(session.is_complete());
    }

    #[test]
    fn lowering_a_value_is_never_clamped() {
        let mut session = AllocationController::new(&four_projects());
        session.set_value(0, 10).unwrap();
        assert_eq!(session.set_value(0, 4), Ok(None));
        assert_eq!(session.set_value(1, 6), Ok(None));
        assert_eq!(session.snapshot().values(), vec![4, 6, 0, 0]);
    }

    #[test]
    fn full_slot_blocks_others() {
        let mut session = AllocationController::new(&four_projects());
        session.set_value(2, 10).unwrap();
        let notice = session.set_value(3, 1).unwrap().unwrap();
        assert_eq!(notice.clamped_to, 0);
        assert_eq!(session.value(3), Some(0));
    }

    #[test]
    fn total_never_exceeds_budget() {
        let mut session = AllocationController::new(&BallotRules::default());
        // A fixed pseudo-random walk over the slots.
        let mut x: u32 = 7;
        for _ in 0..500 {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            let index = (x >> 8) as usize % 7;
            let value = (x >> 16) % 11;
            let before: Vec<u32> = session.snapshot().values();
            let other: i64 = before
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != index)
                .map(|(_, v)| *v as i64)
                .sum();
            let notice = session.set_value(index, value).unwrap();
            assert!(session.current_total() <= 10);
            match notice {
                Some(n) => assert_eq!(n.clamped_to as i64, 10 - other),
                None => assert_eq!(session.value(index), Some(value)),
            }
        }
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        let mut session = AllocationController::new(&four_projects());
        session.set_value(0, 3).unwrap();
        assert_eq!(
            session.set_value(4, 1),
            Err(AllocationErrors::IndexOutOfRange { index: 4, count: 4 })
        );
        assert_eq!(
            session.set_value(0, 11),
            Err(AllocationErrors::ValueOutOfRange {
                index: 0,
                value: 11,
                max: 10
            })
        );
        assert_eq!(session.value(0), Some(3));
    }

    #[test]
    fn stale_session_floors_at_zero() {
        init();
        let rules = four_projects();
        let mut session = AllocationController::from_values(&rules, &[6, 6, 0, 3]).unwrap();
        assert_eq!(session.current_total(), 15);
        let notice = session.set_value(3, 4).unwrap().unwrap();
        assert_eq!(notice.clamped_to, 0);
        assert!(notice.invariant_violated);
        assert_eq!(session.value(3), Some(0));
        // The violation came from the other slots and is still there.
        assert_eq!(session.current_total(), 12);
        assert_eq!(session.remaining(), -2);
    }

    #[test]
    fn restore_checks_shape() {
        let rules = four_projects();
        assert!(AllocationController::from_values(&rules, &[1, 2, 3]).is_err());
        assert!(AllocationController::from_values(&rules, &[11, 0, 0, 0]).is_err());
    }

    #[test]
    fn snapshot_pairs_names_and_values() {
        let rules = BallotRules::new(10, &["Garden".to_string(), "Library".to_string()]).unwrap();
        let mut session = AllocationController::new(&rules);
        session.set_value(1, 7).unwrap();
        let snap = session.snapshot();
        assert_eq!(
            snap.points,
            vec![("Garden".to_string(), 0), ("Library".to_string(), 7)]
        );
        assert_eq!(session.into_allocation(), snap);
    }

    #[test]
    fn validate_requires_exact_budget() {
        let rules = four_projects();
        let ok = Allocation::from_values(&rules, &[3, 3, 2, 2]).unwrap();
        assert_eq!(ok.validate(&rules), Ok(()));
        let over = Allocation::from_values(&rules, &[5, 5, 5, 0]).unwrap();
        assert_eq!(
            over.validate(&rules),
            Err(AllocationErrors::BudgetMismatch {
                total: 15,
                budget: 10
            })
        );
        let under = Allocation::from_values(&rules, &[1, 0, 0, 0]).unwrap();
        assert!(under.validate(&rules).is_err());
    }

    #[test]
    fn validate_checks_projects() {
        let rules = four_projects();
        let other = BallotRules::with_project_count(10, 3).unwrap();
        let alloc = Allocation::from_values(&other, &[5, 5, 0]).unwrap();
        assert!(matches!(
            alloc.validate(&rules),
            Err(AllocationErrors::ProjectMismatch { .. })
        ));
        let renamed = Allocation {
            points: vec![
                ("Project 2".to_string(), 5),
                ("Project 1".to_string(), 5),
                ("Project 3".to_string(), 0),
                ("Project 4".to_string(), 0),
            ],
        };
        assert!(renamed.validate(&rules).is_err());
    }
}
