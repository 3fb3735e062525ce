use std::fmt::Write as _;

use crate::types::{RunId, RunRecord, SweepGroup};

use super::python::{
    comment_text, experiment_line, write_generic_loop, write_load_run, write_preamble, write_show,
};
use super::traits::{CodeGenerator, RenderContext, with_single_run};

/// Generic loader for plain runs, unrecognized sweep classes and runs that
/// are not in the database.
#[derive(Debug)]
pub struct FallbackGenerator;

impl CodeGenerator for FallbackGenerator {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String {
        with_single_run(group, ctx, |run| render_run(run, ctx))
    }
}

pub(crate) fn render_run(run: &RunRecord, ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    let title = format!("Run {}: {}", run.run_id, run.sweep.describe());
    write_preamble(&mut out, &title, &experiment_line(run), ctx);
    write_load_run(&mut out, run.run_id);
    out.push('\n');

    if !run.setpoints.is_empty() {
        let _ = writeln!(out, "# Setpoints: {}", comment_text(&run.setpoints.join(", ")));
    }
    if !run.dependents.is_empty() {
        let _ = writeln!(out, "# Dependents: {}", comment_text(&run.dependents.join(", ")));
    }
    write_generic_loop(&mut out, "", &format!("\"Run {}: \"", run.run_id));
    write_show(&mut out, ctx);
    out
}

/// Universal loader for a run id with no record behind it.
pub fn render_missing_run(run_id: RunId, ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    let title = format!("Run {run_id}: not found in the database; generic loader");
    write_preamble(&mut out, &title, "", ctx);
    write_load_run(&mut out, run_id);
    out.push('\n');
    write_generic_loop(&mut out, "", &format!("\"Run {run_id}: \""));
    write_show(&mut out, ctx);
    out
}
