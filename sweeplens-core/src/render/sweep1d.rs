use crate::types::{RunRecord, Sweep, SweepGroup};

use super::fallback;
use super::python::{
    axis_key, experiment_line, measured_keys, write_generic_loop, write_line_plots,
    write_load_run, write_preamble, write_show,
};
use super::traits::{CodeGenerator, RenderContext, with_single_run};

/// Line plots of the followed parameters against the swept one.
#[derive(Debug)]
pub struct Sweep1DGenerator;

impl CodeGenerator for Sweep1DGenerator {
    fn name(&self) -> &'static str {
        "sweep1d"
    }

    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String {
        with_single_run(group, ctx, |run| render_run(run, ctx))
    }
}

fn render_run(run: &RunRecord, ctx: &RenderContext<'_>) -> String {
    let Sweep::Sweep1D { set_param, .. } = &run.sweep else {
        return fallback::render_run(run, ctx);
    };
    let mut out = String::new();
    let title = format!("Run {}: {}", run.run_id, run.sweep.describe());
    write_preamble(&mut out, &title, &experiment_line(run), ctx);
    write_load_run(&mut out, run.run_id);
    out.push('\n');

    let x = axis_key(&mut out, "Swept parameter", set_param.as_ref(), run, 0);
    let measured = measured_keys(&mut out, &run.sweep, run);
    match x {
        Some(x) if !measured.is_empty() => {
            write_line_plots(&mut out, run.run_id, &x, &measured);
        }
        _ => write_generic_loop(&mut out, "", &format!("\"Run {}: \"", run.run_id)),
    }
    write_show(&mut out, ctx);
    out
}
