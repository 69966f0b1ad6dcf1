// Plan applier: replays the apply half of a plan, or walks it backwards
// replaying the revert half. A failed request stops the run; requests
// that already went through are left as they are, so a partial run is
// undone by reverting the same plan.
//
// `preview` renders the same walk as text and never touches a transport.

use crate::api::{ApiClient, Transport};
use crate::plan::{Direction, Plan};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::io::Write;

pub struct Applier<'a, T> {
    client: &'a ApiClient<T>,
    progress: ProgressBar,
}

impl<'a, T: Transport> Applier<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Applier {
            client,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report each executed request on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run every operation's apply requests, first operation first.
    pub fn apply(&self, plan: &Plan) -> Result<()> {
        self.run(plan, Direction::Apply)
    }

    /// Run every operation's revert requests, last operation first.
    pub fn revert(&self, plan: &Plan) -> Result<()> {
        self.run(plan, Direction::Revert)
    }

    // The bar is cleared whether or not the run succeeds.
    fn run(&self, plan: &Plan, direction: Direction) -> Result<()> {
        self.progress.set_length(plan.request_count(direction) as u64);
        let result = self.send_all(plan, direction);
        self.progress.finish_and_clear();
        result
    }

    fn send_all(&self, plan: &Plan, direction: Direction) -> Result<()> {
        let label = verb(direction);
        for (index, op) in plan.execution_order(direction) {
            for (position, request) in op.requests(direction).iter().enumerate() {
                let method = request.http_method()?;
                tracing::info!(operation = index, request = position, %method, path = request.path(), "{label}");
                self.client
                    .execute(method, request.path(), request.body())
                    .with_context(|| {
                        format!("executing {label} request {position} for operation {index}")
                    })?;
                self.progress.inc(1);
            }
        }
        Ok(())
    }
}

fn verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Apply => "apply",
        Direction::Revert => "revert",
    }
}

/// Describe what a run in `direction` would do, without executing it.
/// Operations are numbered in execution order.
pub fn preview<W: Write>(plan: &Plan, direction: Direction, out: &mut W) -> Result<()> {
    let action = match direction {
        Direction::Apply => "execute",
        Direction::Revert => "revert",
    };
    writeln!(
        out,
        "Dry run mode: would {action} {} operations with {} total requests",
        plan.len(),
        plan.request_count(direction)
    )?;

    for (step, (_, op)) in plan.execution_order(direction).into_iter().enumerate() {
        let number = step + 1;
        let requests = op.requests(direction);
        writeln!(out, "Operation {number}: {} requests", requests.len())?;
        for (position, request) in requests.iter().enumerate() {
            writeln!(
                out,
                "  Request {number}.{}: {} {}",
                position + 1,
                request.method(),
                request.path()
            )?;
            if let Some(body) = request.body() {
                let pretty = body
                    .pretty()
                    .with_context(|| format!("rendering body of request {number}.{}", position + 1))?;
                writeln!(out, "    Body: {}", pretty.replace('\n', "\n    "))?;
            }
        }
    }
    Ok(())
}
