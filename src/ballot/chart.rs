// Text rendering of a session and of the results.

use crate::ballot::*;

use serde_json::json;
use serde_json::Value as JSValue;

pub const DEFAULT_CHART_WIDTH: usize = 40;

// Sliders wider than this are scaled down.
const MAX_SLIDER_WIDTH: u32 = 20;

/// One horizontal bar per project, the longest one being `width` characters.
pub fn render_bar_chart(aggregate: &Aggregate, width: usize) -> String {
    if aggregate.is_empty() {
        return "No votes yet.\n".to_string();
    }
    let name_width = aggregate
        .totals
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    let max_total = aggregate.values().into_iter().max().unwrap_or(0);

    let mut out = String::new();
    for (name, total) in aggregate.totals.iter() {
        let len = if max_total == 0 {
            0
        } else {
            // Any project with points gets at least one mark.
            let l = (*total * width as u64 / max_total) as usize;
            if *total > 0 {
                l.max(1)
            } else {
                l
            }
        };
        out.push_str(&format!(
            "{:<nw$} | {:<bw$} {}\n",
            name,
            "#".repeat(len),
            total,
            nw = name_width,
            bw = width
        ));
    }
    out
}

/// The current state of a session, as shown to the participant.
pub fn render_session(session: &AllocationController) -> String {
    let rules = session.rules();
    let name_width = rules
        .projects
        .iter()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0);
    let slider_width = rules.max_per_project.min(MAX_SLIDER_WIDTH);

    let mut out = format!(
        "Distribute {} Points Across {} Projects\n",
        rules.budget,
        rules.project_count()
    );
    for (name, value) in session.snapshot().points.iter() {
        let filled = if rules.max_per_project == 0 {
            0
        } else {
            (*value as u64 * slider_width as u64 / rules.max_per_project as u64) as usize
        };
        out.push_str(&format!(
            "{:<nw$} [{}{}] {}\n",
            name,
            "#".repeat(filled),
            "-".repeat(slider_width as usize - filled),
            value,
            nw = name_width
        ));
    }
    out.push_str(&format!(
        "Total allocated: {} / {}\n",
        session.current_total(),
        rules.budget
    ));
    out
}

/// What is still missing before the session can be submitted, if anything.
pub fn completion_message(session: &AllocationController) -> Option<String> {
    if session.is_complete() {
        return None;
    }
    let remaining = session.remaining();
    if remaining > 0 {
        Some(format!("{} points left to distribute.", remaining))
    } else {
        Some(format!(
            "{} points over the budget of {}.",
            -remaining,
            session.rules().budget
        ))
    }
}

/// The results in JSON format, as written by `results --out`.
pub fn summary_json(rules: &BallotRules, aggregate: &Aggregate) -> JSValue {
    let results: Vec<JSValue> = aggregate
        .totals
        .iter()
        .map(|(name, total)| json!({"project": name, "points": total}))
        .collect();
    json!({
        "config": {
            "budget": rules.budget,
            "projects": rules.projects,
        },
        "ballots": aggregate.ballots,
        "results": results
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(values: &[u64], ballots: usize) -> Aggregate {
        let rules = BallotRules::with_project_count(10, values.len()).unwrap();
        let mut res = Aggregate::empty(&rules);
        for ((_, t), v) in res.totals.iter_mut().zip(values.iter()) {
            *t = *v;
        }
        res.ballots = ballots;
        res
    }

    #[test]
    fn empty_chart() {
        assert_eq!(render_bar_chart(&aggregate(&[0, 0], 0), 10), "No votes yet.\n");
    }

    #[test]
    fn bars_are_proportional() {
        let chart = render_bar_chart(&aggregate(&[13, 3, 2, 0], 2), 26);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("Project 1 | {} 13", "#".repeat(26)));
        assert_eq!(lines[1], format!("Project 2 | {:<26} 3", "#".repeat(6)));
        assert_eq!(lines[2], format!("Project 3 | {:<26} 2", "#".repeat(4)));
        assert_eq!(lines[3], format!("Project 4 | {:<26} 0", ""));
    }

    #[test]
    fn small_totals_stay_visible() {
        let chart = render_bar_chart(&aggregate(&[100, 1], 10), 10);
        assert!(chart.lines().nth(1).unwrap().starts_with("Project 2 | # "));
    }

    #[test]
    fn session_display() {
        let rules = BallotRules::with_project_count(10, 4).unwrap();
        let mut session = AllocationController::new(&rules);
        session.set_value(0, 8).unwrap();
        session.set_value(1, 5).unwrap();
        assert_eq!(
            render_session(&session),
            "Distribute 10 Points Across 4 Projects\n\
             Project 1 [########--] 8\n\
             Project 2 [##--------] 2\n\
             Project 3 [----------] 0\n\
             Project 4 [----------] 0\n\
             Total allocated: 10 / 10\n"
        );
    }

    #[test]
    fn completion() {
        let rules = BallotRules::with_project_count(10, 4).unwrap();
        let mut session = AllocationController::new(&rules);
        session.set_value(0, 7).unwrap();
        assert_eq!(
            completion_message(&session),
            Some("3 points left to distribute.".to_string())
        );
        session.set_value(1, 3).unwrap();
        assert_eq!(completion_message(&session), None);

        let stale = AllocationController::from_values(&rules, &[6, 6, 0, 0]).unwrap();
        assert_eq!(
            completion_message(&stale),
            Some("2 points over the budget of 10.".to_string())
        );
    }

    #[test]
    fn summary_layout() {
        let rules = BallotRules::with_project_count(10, 2).unwrap();
        let js = summary_json(&rules, &aggregate(&[13, 7], 2));
        assert_eq!(
            js,
            json!({
                "config": {"budget": 10, "projects": ["Project 1", "Project 2"]},
                "ballots": 2,
                "results": [
                    {"project": "Project 1", "points": 13},
                    {"project": "Project 2", "points": 7}
                ]
            })
        );
    }
}
