use std::collections::HashSet;

use serde::Serialize;

use crate::report;
use crate::testing::{Outcome, TestCase, TestRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub total: usize,
}

impl Summary {
    pub fn of(outcomes: &[Outcome]) -> Self {
        Self {
            passed: outcomes.iter().filter(|o| o.passed()).count(),
            total: outcomes.len(),
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// `None` when nothing has been run.
    pub fn score_percent(&self) -> Option<f64> {
        (self.total > 0).then(|| 100.0 * self.passed as f64 / self.total as f64)
    }
}

/// Ordered record of outcomes for one run over a list of testcases.
#[derive(Debug, Clone)]
pub struct Session {
    runner: TestRunner,
    outcomes: Vec<Outcome>,
}

impl Session {
    pub fn new(runner: TestRunner) -> Self {
        Self {
            runner,
            outcomes: Vec::new(),
        }
    }

    pub fn runner(&self) -> &TestRunner {
        &self.runner
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn reset(&mut self) {
        self.outcomes.clear();
    }

    /// Runs one testcase and appends its outcome.
    /// Unnamed cases are called `"Test N"` after their position in this session.
    pub async fn run_case(&mut self, case: &TestCase) -> &Outcome {
        let name = match &case.name {
            Some(name) => name.clone(),
            None => {
                let taken: HashSet<String> =
                    self.outcomes.iter().map(|o| o.test_name.clone()).collect();
                default_name(self.outcomes.len() + 1, &taken)
            }
        };
        self.run_named(&name, case).await
    }

    async fn run_named(&mut self, name: &str, case: &TestCase) -> &Outcome {
        let outcome = self
            .runner
            .execute(name, &case.input, &case.expected_output)
            .await;
        log::debug!("{}: {}", outcome.test_name, outcome.status);
        self.outcomes.push(outcome);
        &self.outcomes[self.outcomes.len() - 1]
    }

    pub async fn run_batch(&mut self, cases: &[TestCase]) -> &[Outcome] {
        self.run_batch_with(cases, |_, _| ()).await
    }

    /// Like [`Session::run_batch`], calling `on_outcome(index, outcome)` as each case finishes.
    pub async fn run_batch_with<F>(&mut self, cases: &[TestCase], mut on_outcome: F) -> &[Outcome]
    where
        F: FnMut(usize, &Outcome),
    {
        self.reset();
        let names = assign_names(cases);
        for (i, (case, name)) in cases.iter().zip(&names).enumerate() {
            let outcome = self.run_named(name, case).await;
            on_outcome(i, outcome);
        }
        &self.outcomes
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.outcomes)
    }

    /// `(passed, total)`
    pub fn score(&self) -> (usize, usize) {
        let Summary { passed, total } = self.summary();
        (passed, total)
    }

    pub fn report(&self) -> String {
        report::render_text(&self.outcomes)
    }

    pub fn report_json(&self) -> serde_json::Result<String> {
        report::render_json(&self.outcomes)
    }
}

/// Display names for a batch: explicit names are kept and unnamed cases get `"Test N"`
/// after their position. A default that collides with another name gets a `" (k)"` suffix.
pub fn assign_names(cases: &[TestCase]) -> Vec<String> {
    let mut taken: HashSet<String> = cases.iter().filter_map(|c| c.name.clone()).collect();
    cases
        .iter()
        .enumerate()
        .map(|(i, c)| match &c.name {
            Some(name) => name.clone(),
            None => {
                let name = default_name(i + 1, &taken);
                taken.insert(name.clone());
                name
            }
        })
        .collect()
}

fn default_name(position: usize, taken: &HashSet<String>) -> String {
    let base = format!("Test {}", position);
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|k| format!("{} ({})", base, k))
        .find(|name| !taken.contains(name))
        .unwrap_or(base)
}
