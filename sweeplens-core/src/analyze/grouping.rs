// Grouping engine: partitions classified runs into sweep groups.
//
// Passes, in priority order:
// 1. Sweep2D parents: same-experiment Sweep2D runs (one run per outer value)
// 2. Queue batches: maximal consecutive-id runs launched by the sweep queue
// 3. Singletons: everything left over

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::config::GroupingSection;
use crate::types::{ExperimentId, GroupKind, RunId, RunRecord, SweepGroup, SweepKind};

/// Partition `runs` into sweep groups, sorted by each group's smallest run id.
/// Every run lands in exactly one group.
pub fn group_runs<'a>(runs: &'a [RunRecord], config: &GroupingSection) -> Vec<SweepGroup<'a>> {
    let mut ordered: Vec<&RunRecord> = runs.iter().collect();
    ordered.sort_by_key(|r| r.run_id);

    let mut assigned: HashSet<RunId> = HashSet::new();
    let mut groups = Vec::new();

    for members in sweep2d_buckets(&ordered, config.min_parent_runs) {
        assigned.extend(members.iter().map(|r| r.run_id));
        groups.push(parent_group(members));
    }

    let queued: Vec<&RunRecord> = ordered
        .iter()
        .copied()
        .filter(|r| !assigned.contains(&r.run_id))
        .filter(|r| r.launched_by.as_deref() == Some(config.queue_tag.as_str()))
        .collect();
    for batch in split_consecutive(&queued) {
        assigned.extend(batch.iter().map(|r| r.run_id));
        groups.push(batch_group(batch));
    }

    for run in ordered {
        if !assigned.contains(&run.run_id) {
            groups.push(SweepGroup::new(
                GroupKind::Single,
                run.kind(),
                vec![run],
                run.sweep.describe(),
            ));
        }
    }

    groups.sort_by_key(SweepGroup::min_run_id);
    debug!(runs = runs.len(), groups = groups.len(), "Grouped runs");
    groups
}

/// Same-experiment `Sweep2D` buckets large enough to form a parent.
fn sweep2d_buckets<'a>(ordered: &[&'a RunRecord], min_runs: usize) -> Vec<Vec<&'a RunRecord>> {
    let mut buckets: BTreeMap<ExperimentId, Vec<&RunRecord>> = BTreeMap::new();
    for run in ordered.iter().copied().filter(|r| r.kind() == SweepKind::Sweep2D) {
        buckets.entry(run.experiment_id).or_default().push(run);
    }
    buckets
        .into_values()
        .filter(|members| members.len() >= min_runs.max(2))
        .collect()
}

/// Split runs (sorted by id) wherever the next id is not exactly one more
/// than the previous.
fn split_consecutive<'a>(runs: &[&'a RunRecord]) -> Vec<Vec<&'a RunRecord>> {
    let mut batches: Vec<Vec<&RunRecord>> = Vec::new();
    for &run in runs {
        let extends_last = batches
            .last()
            .and_then(|batch| batch.last())
            .is_some_and(|prev| prev.run_id.0 + 1 == run.run_id.0);
        if extends_last {
            let last = batches.len() - 1;
            batches[last].push(run);
        } else {
            batches.push(vec![run]);
        }
    }
    batches
}

fn parent_group(members: Vec<&RunRecord>) -> SweepGroup<'_> {
    let description = match members.first() {
        Some(first) => format!(
            "{}, reassembled from {} runs",
            first.sweep.describe(),
            members.len()
        ),
        None => String::new(),
    };
    SweepGroup::new(GroupKind::Sweep2DParent, SweepKind::Sweep2D, members, description)
}

fn batch_group(members: Vec<&RunRecord>) -> SweepGroup<'_> {
    let sweep_kind = members.first().map_or(SweepKind::Plain, |r| r.kind());

    let mut kinds: Vec<SweepKind> = Vec::new();
    for run in &members {
        if !kinds.contains(&run.kind()) {
            kinds.push(run.kind());
        }
    }
    let kind_names: Vec<&str> = kinds.iter().map(SweepKind::as_str).collect();
    let description = format!(
        "Queued batch of {} run{}: {}",
        members.len(),
        if members.len() == 1 { "" } else { "s" },
        kind_names.join(", ")
    );

    SweepGroup::new(GroupKind::QueueBatch, sweep_kind, members, description)
}
