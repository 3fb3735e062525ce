use std::fmt::Write as _;

use crate::types::{RunRecord, Sweep, SweepGroup, flatten_path};

use super::fallback;
use super::python::{
    comment_text, experiment_line, lookup, measured_keys, py_ident, python_str,
    write_generic_loop, write_load_run, write_preamble, write_show,
};
use super::traits::{CodeGenerator, RenderContext, with_single_run};

/// One figure per measured parameter with a subplot per swept parameter.
#[derive(Debug)]
pub struct SimulGenerator;

impl CodeGenerator for SimulGenerator {
    fn name(&self) -> &'static str {
        "simul_sweep"
    }

    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String {
        with_single_run(group, ctx, |run| render_run(run, ctx))
    }
}

fn render_run(run: &RunRecord, ctx: &RenderContext<'_>) -> String {
    let Sweep::SimulSweep { set_params, .. } = &run.sweep else {
        return fallback::render_run(run, ctx);
    };
    let mut out = String::new();
    let title = format!("Run {}: {}", run.run_id, run.sweep.describe());
    write_preamble(&mut out, &title, &experiment_line(run), ctx);
    write_load_run(&mut out, run.run_id);
    out.push('\n');

    let swept: Vec<String> = if set_params.is_empty() {
        if !run.setpoints.is_empty() {
            let _ = writeln!(
                out,
                "# Swept parameters not in the sweep metadata; using setpoints {} from the run description",
                comment_text(&run.setpoints.join(", "))
            );
        }
        run.setpoints.iter().map(|s| flatten_path(s)).collect()
    } else {
        set_params.keys().map(|k| flatten_path(k)).collect()
    };
    let measured = measured_keys(&mut out, &run.sweep, run);

    if swept.is_empty() || measured.is_empty() {
        write_generic_loop(&mut out, "", &format!("\"Run {}: \"", run.run_id));
    } else {
        for m in &measured {
            write_subplots(&mut out, run, &swept, m);
        }
    }
    write_show(&mut out, ctx);
    out
}

fn write_subplots(out: &mut String, run: &RunRecord, swept: &[String], m: &str) {
    let mv = py_ident(m);
    out.push('\n');
    let _ = writeln!(out, "{mv} = {}", lookup(m, m));
    let _ = writeln!(out, "fig, axes = plt.subplots(1, {}, squeeze=False)", swept.len());
    for (i, x) in swept.iter().enumerate() {
        let xv = py_ident(x);
        let _ = writeln!(out, "{xv} = {}", lookup(m, x));
        let _ = writeln!(out, "axes[0][{i}].plot({xv}, {mv})");
        let _ = writeln!(out, "axes[0][{i}].set_xlabel({})", python_str(x));
        let _ = writeln!(out, "axes[0][{i}].set_ylabel({})", python_str(m));
    }
    let _ = writeln!(out, "fig.suptitle({})", python_str(&format!("Run {}: {m}", run.run_id)));
}
