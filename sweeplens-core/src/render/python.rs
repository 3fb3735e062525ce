// Shared helpers for writing Python snippets.
//
// Every user-supplied string reaches the output through `python_str`,
// `py_ident` or `comment_text`, so names from the database cannot break the
// generated syntax.

use std::fmt::Write as _;

use crate::types::{ParamRef, RunId, RunRecord, Sweep, flatten_path};

use super::traits::RenderContext;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Names the generated code binds itself.
const RESERVED_NAMES: &[&str] = &[
    "np", "plt", "data", "dataset", "datasets", "run_id", "run_ids", "name", "entry", "key",
    "setpoints", "grid", "n_outer", "n_inner", "fig", "axes", "load_by_id",
    "initialise_or_create_database_at", "print", "len", "next", "iter", "str",
];

/// Double-quoted Python string literal.
pub fn python_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Python list literal of run ids, in the given order.
pub fn python_id_list(ids: &[RunId]) -> String {
    let items: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Variable name for a flattened parameter key. ASCII identifiers pass
/// through unchanged, so the variable and its lookup key stay identical;
/// anything else (including non-ASCII letters and digits) becomes `_`.
pub fn py_ident(flat: &str) -> String {
    let mut ident: String = flat
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if PYTHON_KEYWORDS.contains(&ident.as_str()) || RESERVED_NAMES.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Single-line text safe to place after `# `.
pub fn comment_text(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Header comments, imports and database selection.
pub fn write_preamble(out: &mut String, title: &str, context_line: &str, ctx: &RenderContext<'_>) {
    let _ = writeln!(out, "# {}", comment_text(title));
    if !context_line.is_empty() {
        let _ = writeln!(out, "# {}", comment_text(context_line));
    }
    out.push_str("import numpy as np\n");
    out.push_str("import matplotlib.pyplot as plt\n");
    let _ = writeln!(
        out,
        "from {} import initialise_or_create_database_at, load_by_id",
        ctx.codegen.loader_import.trim()
    );
    out.push('\n');
    let _ = writeln!(
        out,
        "initialise_or_create_database_at({})",
        python_str(ctx.database_path)
    );
}

/// `Experiment 'x' (id 1), sample 'y'` for a run.
pub fn experiment_line(run: &RunRecord) -> String {
    format!(
        "Experiment '{}' (id {}), sample '{}'",
        run.experiment_name, run.experiment_id, run.sample_name
    )
}

pub fn write_load_run(out: &mut String, run_id: RunId) {
    out.push('\n');
    let _ = writeln!(out, "dataset = load_by_id({run_id})");
    out.push_str("data = dataset.get_parameter_data()\n");
}

/// Plot every dependent of `data` against its first setpoint. `title_prefix`
/// is a Python expression evaluating to a string.
pub fn write_generic_loop(out: &mut String, indent: &str, title_prefix: &str) {
    let _ = writeln!(out, "{indent}for name, entry in data.items():");
    let _ = writeln!(out, "{indent}    setpoints = [key for key in entry if key != name]");
    let _ = writeln!(out, "{indent}    plt.figure()");
    let _ = writeln!(out, "{indent}    if setpoints:");
    let _ = writeln!(out, "{indent}        plt.plot(entry[setpoints[0]], entry[name])");
    let _ = writeln!(out, "{indent}        plt.xlabel(setpoints[0])");
    let _ = writeln!(out, "{indent}    else:");
    let _ = writeln!(out, "{indent}        plt.plot(entry[name])");
    let _ = writeln!(out, "{indent}    plt.ylabel(name)");
    let _ = writeln!(out, "{indent}    plt.title({title_prefix} + name)");
}

/// One line plot per measured parameter against `x`.
pub fn write_line_plots(out: &mut String, run_id: RunId, x: &str, measured: &[String]) {
    let x_var = py_ident(x);
    for m in measured {
        let m_var = py_ident(m);
        out.push('\n');
        let _ = writeln!(out, "{m_var} = {}", lookup(m, m));
        let _ = writeln!(out, "{x_var} = {}", lookup(m, x));
        out.push_str("plt.figure()\n");
        let _ = writeln!(out, "plt.plot({x_var}, {m_var})");
        let _ = writeln!(out, "plt.xlabel({})", python_str(x));
        let _ = writeln!(out, "plt.ylabel({})", python_str(m));
        let _ = writeln!(out, "plt.title({})", python_str(&format!("Run {run_id}: {m}")));
    }
}

pub fn write_show(out: &mut String, ctx: &RenderContext<'_>) {
    if ctx.codegen.show_plots {
        out.push('\n');
        out.push_str("plt.show()\n");
    }
}

/// `data["dependent"]["key"]`.
pub fn lookup(dependent: &str, key: &str) -> String {
    format!("data[{}][{}]", python_str(dependent), python_str(key))
}

/// Flattened keys of the measured parameters: followed parameters, else the
/// run description's dependents. Empty when neither is known; a comment
/// explaining the substitution is written in both fallback cases.
pub fn measured_keys(out: &mut String, sweep: &Sweep, run: &RunRecord) -> Vec<String> {
    let followed = sweep.followed();
    if !followed.is_empty() {
        return followed.into_iter().map(flatten_path).collect();
    }
    if !run.dependents.is_empty() {
        out.push_str(
            "# No followed parameters in the sweep metadata; using dependents from the run description\n",
        );
        return run.dependents.iter().map(|d| flatten_path(d)).collect();
    }
    out.push_str("# No followed parameters recorded; plotting every parameter in the dataset\n");
    Vec::new()
}

/// Flattened key of a swept axis: the metadata parameter, else the run
/// description's setpoint at `index`.
pub fn axis_key(
    out: &mut String,
    label: &str,
    param: Option<&ParamRef>,
    run: &RunRecord,
    index: usize,
) -> Option<String> {
    if let Some(p) = param {
        return Some(p.flat());
    }
    if let Some(setpoint) = run.setpoints.get(index) {
        let _ = writeln!(
            out,
            "# {label} not in the sweep metadata; using setpoint '{}' from the run description",
            comment_text(setpoint)
        );
        return Some(flatten_path(setpoint));
    }
    let _ = writeln!(out, "# {label} not recorded; axes are taken from the dataset");
    None
}
