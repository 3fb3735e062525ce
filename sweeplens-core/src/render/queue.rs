use std::fmt::Write as _;

use crate::types::SweepGroup;

use super::python::{
    comment_text, python_id_list, write_generic_loop, write_preamble, write_show,
};
use super::traits::{CodeGenerator, RenderContext};

/// Loads every run of a queued batch and plots each dataset generically.
#[derive(Debug)]
pub struct QueueBatchGenerator;

impl CodeGenerator for QueueBatchGenerator {
    fn name(&self) -> &'static str {
        "queue_batch"
    }

    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        write_preamble(&mut out, &group.description, &batch_context(group), ctx);
        out.push('\n');
        let _ = writeln!(out, "run_ids = {}", python_id_list(&group.run_ids));
        for run in &group.runs {
            let _ = writeln!(out, "# Run {}: {}", run.run_id, comment_text(&run.sweep.describe()));
        }
        out.push('\n');

        out.push_str("datasets = {}\n");
        out.push_str("for run_id in run_ids:\n");
        out.push_str("    datasets[run_id] = load_by_id(run_id).get_parameter_data()\n");
        out.push('\n');
        out.push_str("for run_id, data in datasets.items():\n");
        write_generic_loop(&mut out, "    ", "\"Run \" + str(run_id) + \": \"");
        write_show(&mut out, ctx);
        out
    }
}

/// Batches may cross experiments; name them all when they do.
fn batch_context(group: &SweepGroup<'_>) -> String {
    let mut experiments: Vec<String> = Vec::new();
    for run in &group.runs {
        let label = format!("'{}' (id {})", run.experiment_name, run.experiment_id);
        if !experiments.contains(&label) {
            experiments.push(label);
        }
    }
    match experiments.as_slice() {
        [] => String::new(),
        [_] => format!(
            "Experiment '{}' (id {}), sample '{}'",
            group.experiment_name, group.experiment_id, group.sample_name
        ),
        _ => format!("Experiments {}", experiments.join(", ")),
    }
}
