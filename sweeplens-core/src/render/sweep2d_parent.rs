use std::fmt::Write as _;

use crate::types::{ParamRef, RunRecord, Sweep, SweepGroup};

use super::python::{
    axis_key, lookup, measured_keys, py_ident, python_id_list, python_str, write_preamble,
    write_show,
};
use super::traits::{CodeGenerator, RenderContext};

/// Reassembles a 2D scan recorded as several `Sweep2D` runs: every member is
/// loaded, the flattened arrays are concatenated, and the grid shape is
/// inferred from the distinct outer values.
#[derive(Debug)]
pub struct Sweep2DParentGenerator;

impl CodeGenerator for Sweep2DParentGenerator {
    fn name(&self) -> &'static str {
        "sweep2d_parent"
    }

    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        let context = format!(
            "Experiment '{}' (id {}), sample '{}'",
            group.experiment_name, group.experiment_id, group.sample_name
        );
        write_preamble(&mut out, &group.description, &context, ctx);
        out.push('\n');
        let _ = writeln!(out, "run_ids = {}", python_id_list(&group.run_ids));
        out.push('\n');

        let title = format!("Runs {}", joined_ids(group));
        let axes = group.runs.first().and_then(|first| known_axes(&mut out, first));
        match axes {
            Some((inner, outer, measured)) => {
                write_known(&mut out, &title, &inner, &outer, &measured);
            }
            None => write_generic(&mut out, &title),
        }
        write_show(&mut out, ctx);
        out
    }
}

fn joined_ids(group: &SweepGroup<'_>) -> String {
    let ids: Vec<String> = group.run_ids.iter().map(ToString::to_string).collect();
    ids.join(", ")
}

/// Inner, outer and measured keys taken from the first member, or `None`
/// when any of them is unknown.
fn known_axes(out: &mut String, first: &RunRecord) -> Option<(String, String, Vec<String>)> {
    let (inner, outer): (Option<&ParamRef>, Option<&ParamRef>) = match &first.sweep {
        Sweep::Sweep2D { inner, outer, .. } => (inner.as_ref(), outer.as_ref()),
        _ => (None, None),
    };
    let inner = axis_key(out, "Inner sweep parameter", inner, first, 0);
    let outer = axis_key(out, "Outer sweep parameter", outer, first, 1);
    let measured = measured_keys(out, &first.sweep, first);
    match (inner, outer) {
        (Some(inner), Some(outer)) if !measured.is_empty() => Some((inner, outer, measured)),
        _ => None,
    }
}

fn write_known(out: &mut String, title: &str, inner: &str, outer: &str, measured: &[String]) {
    let (iv, ov) = (py_ident(inner), py_ident(outer));
    let first = &measured[0];

    let _ = writeln!(out, "{iv}_parts = []");
    let _ = writeln!(out, "{ov}_parts = []");
    for m in measured {
        let _ = writeln!(out, "{}_parts = []", py_ident(m));
    }
    out.push_str("for run_id in run_ids:\n");
    out.push_str("    data = load_by_id(run_id).get_parameter_data()\n");
    let _ = writeln!(out, "    {iv}_parts.append(np.ravel({}))", lookup(first, inner));
    let _ = writeln!(out, "    {ov}_parts.append(np.ravel({}))", lookup(first, outer));
    for m in measured {
        let _ = writeln!(out, "    {}_parts.append(np.ravel({}))", py_ident(m), lookup(m, m));
    }
    out.push('\n');

    let _ = writeln!(out, "{iv} = np.concatenate({iv}_parts)");
    let _ = writeln!(out, "{ov} = np.concatenate({ov}_parts)");
    for m in measured {
        let mv = py_ident(m);
        let _ = writeln!(out, "{mv} = np.concatenate({mv}_parts)");
    }
    let _ = writeln!(out, "n_outer = max(len(np.unique({ov})), 1)");
    let _ = writeln!(out, "n_inner = len({iv}) // n_outer");
    out.push_str("print(\"Combined grid shape:\", (n_outer, n_inner))\n");

    for m in measured {
        let mv = py_ident(m);
        out.push('\n');
        let _ = writeln!(out, "grid = {mv}[: n_outer * n_inner].reshape(n_outer, n_inner)");
        out.push_str("plt.figure()\n");
        let _ = writeln!(
            out,
            "plt.pcolormesh({iv}[:n_inner], {ov}[::n_inner][:n_outer], grid, shading=\"auto\")"
        );
        let _ = writeln!(out, "plt.xlabel({})", python_str(inner));
        let _ = writeln!(out, "plt.ylabel({})", python_str(outer));
        let _ = writeln!(out, "plt.colorbar(label={})", python_str(m));
        let _ = writeln!(out, "plt.title({})", python_str(&format!("{title}: {m}")));
    }
}

/// Axes taken from each dataset: the first dependent, its first setpoint as
/// the inner axis and its last setpoint as the outer axis.
fn write_generic(out: &mut String, title: &str) {
    out.push_str("inner_parts = []\n");
    out.push_str("outer_parts = []\n");
    out.push_str("measured_parts = []\n");
    out.push_str("for run_id in run_ids:\n");
    out.push_str("    data = load_by_id(run_id).get_parameter_data()\n");
    out.push_str("    name = next(iter(data))\n");
    out.push_str("    entry = data[name]\n");
    out.push_str("    setpoints = [key for key in entry if key != name]\n");
    out.push_str("    inner_parts.append(np.ravel(entry[setpoints[0]]))\n");
    out.push_str("    outer_parts.append(np.ravel(entry[setpoints[-1]]))\n");
    out.push_str("    measured_parts.append(np.ravel(entry[name]))\n");
    out.push('\n');
    out.push_str("inner = np.concatenate(inner_parts)\n");
    out.push_str("outer = np.concatenate(outer_parts)\n");
    out.push_str("measured = np.concatenate(measured_parts)\n");
    out.push_str("n_outer = max(len(np.unique(outer)), 1)\n");
    out.push_str("n_inner = len(inner) // n_outer\n");
    out.push_str("print(\"Combined grid shape:\", (n_outer, n_inner))\n");
    out.push('\n');
    out.push_str("grid = measured[: n_outer * n_inner].reshape(n_outer, n_inner)\n");
    out.push_str("plt.figure()\n");
    out.push_str(
        "plt.pcolormesh(inner[:n_inner], outer[::n_inner][:n_outer], grid, shading=\"auto\")\n",
    );
    out.push_str("plt.colorbar(label=name)\n");
    let _ = writeln!(out, "plt.title({} + name)", python_str(&format!("{title}: ")));
}
