use std::fmt::Write as _;

use crate::types::{RunRecord, Sweep, SweepGroup};

use super::fallback;
use super::python::{
    axis_key, experiment_line, lookup, measured_keys, py_ident, python_str, write_generic_loop,
    write_load_run, write_preamble, write_show,
};
use super::traits::{CodeGenerator, RenderContext, with_single_run};

/// A lone `Sweep2D` run: a color map when the run spans several outer
/// values, a line plot otherwise.
#[derive(Debug)]
pub struct Sweep2DGenerator;

impl CodeGenerator for Sweep2DGenerator {
    fn name(&self) -> &'static str {
        "sweep2d"
    }

    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String {
        with_single_run(group, ctx, |run| render_run(run, ctx))
    }
}

fn render_run(run: &RunRecord, ctx: &RenderContext<'_>) -> String {
    let Sweep::Sweep2D { inner, outer, .. } = &run.sweep else {
        return fallback::render_run(run, ctx);
    };
    let mut out = String::new();
    let title = format!("Run {}: {}", run.run_id, run.sweep.describe());
    write_preamble(&mut out, &title, &experiment_line(run), ctx);
    write_load_run(&mut out, run.run_id);
    out.push('\n');

    let inner = axis_key(&mut out, "Inner sweep parameter", inner.as_ref(), run, 0);
    let outer = axis_key(&mut out, "Outer sweep parameter", outer.as_ref(), run, 1);
    let measured = measured_keys(&mut out, &run.sweep, run);

    match (inner, outer) {
        (Some(inner), Some(outer)) if !measured.is_empty() => {
            for m in &measured {
                write_map_or_line(&mut out, run, &inner, &outer, m);
            }
        }
        _ => write_generic_loop(&mut out, "", &format!("\"Run {}: \"", run.run_id)),
    }
    write_show(&mut out, ctx);
    out
}

fn write_map_or_line(out: &mut String, run: &RunRecord, inner: &str, outer: &str, m: &str) {
    let (iv, ov, mv) = (py_ident(inner), py_ident(outer), py_ident(m));
    out.push('\n');
    let _ = writeln!(out, "{mv} = np.ravel({})", lookup(m, m));
    let _ = writeln!(out, "{iv} = np.ravel({})", lookup(m, inner));
    let _ = writeln!(out, "{ov} = np.ravel({})", lookup(m, outer));
    let _ = writeln!(out, "n_outer = len(np.unique({ov}))");
    out.push_str("plt.figure()\n");
    out.push_str("if n_outer > 1:\n");
    let _ = writeln!(out, "    n_inner = len({iv}) // n_outer");
    let _ = writeln!(out, "    grid = {mv}[: n_outer * n_inner].reshape(n_outer, n_inner)");
    let _ = writeln!(
        out,
        "    plt.pcolormesh({iv}[:n_inner], {ov}[::n_inner][:n_outer], grid, shading=\"auto\")"
    );
    let _ = writeln!(out, "    plt.xlabel({})", python_str(inner));
    let _ = writeln!(out, "    plt.ylabel({})", python_str(outer));
    let _ = writeln!(out, "    plt.colorbar(label={})", python_str(m));
    out.push_str("else:\n");
    let _ = writeln!(out, "    plt.plot({iv}, {mv})");
    let _ = writeln!(out, "    plt.xlabel({})", python_str(inner));
    let _ = writeln!(out, "    plt.ylabel({})", python_str(m));
    let _ = writeln!(out, "plt.title({})", python_str(&format!("Run {}: {m}", run.run_id)));
}
