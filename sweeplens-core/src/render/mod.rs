//! Python code generation for run groups.
//!
//! Each group is rendered by exactly one [`CodeGenerator`], chosen from its
//! group kind and, for single-run groups, its sweep kind.

pub mod fallback;
pub mod python;
pub mod queue;
pub mod simul;
pub mod sweep0d;
pub mod sweep1d;
pub mod sweep2d;
pub mod sweep2d_parent;
pub mod traits;

pub use traits::{CodeGenerator, RenderContext};

use crate::types::{GroupKind, SweepGroup, SweepKind};

/// Generator responsible for a group.
pub fn generator_for(group: &SweepGroup<'_>) -> &'static dyn CodeGenerator {
    match group.group_kind {
        GroupKind::Sweep2DParent => &sweep2d_parent::Sweep2DParentGenerator,
        GroupKind::QueueBatch => &queue::QueueBatchGenerator,
        GroupKind::Single => match group.sweep_kind {
            SweepKind::Sweep0D => &sweep0d::Sweep0DGenerator,
            SweepKind::Sweep1D => &sweep1d::Sweep1DGenerator,
            SweepKind::Sweep2D => &sweep2d::Sweep2DGenerator,
            SweepKind::SimulSweep => &simul::SimulGenerator,
            SweepKind::Plain | SweepKind::Unrecognized => &fallback::FallbackGenerator,
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{ExperimentId, ParamMap, RunId, RunRecord, Sweep};

    pub fn run_with(id: i64, sweep: Sweep) -> RunRecord {
        RunRecord {
            run_id: RunId(id),
            experiment_id: ExperimentId(1),
            experiment_name: "cooldown".into(),
            sample_name: "chip_a".into(),
            setpoints: Vec::new(),
            dependents: Vec::new(),
            sweep,
            launched_by: None,
        }
    }

    pub fn follow(paths: &[&str]) -> ParamMap {
        paths
            .iter()
            .map(|p| ((*p).to_string(), serde_json::Value::Null))
            .collect()
    }

    /// Structural checks on generated Python: no unresolved `{name}`
    /// markers, ASCII-only code outside strings and comments, brackets
    /// balanced per line outside strings and comments,
    /// four-space indentation, and every block opener followed by a deeper
    /// line.
    pub fn assert_well_formed(code: &str) {
        assert!(!code.trim().is_empty(), "empty code");
        assert!(!has_template_marker(code), "unresolved marker in:\n{code}");

        let lines: Vec<&str> = code.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            let indent = line.len() - line.trim_start().len();
            assert_eq!(indent % 4, 0, "odd indentation on line {i}: {line:?}");

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            assert_eq!(bracket_depth(trimmed), 0, "unbalanced line {i}: {line:?}");

            if trimmed.ends_with(':') {
                let next = lines[i + 1..]
                    .iter()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| panic!("block opener at end: {line:?}"));
                let next_indent = next.len() - next.trim_start().len();
                assert!(next_indent > indent, "empty block after {line:?}");
            }
        }
    }

    fn has_template_marker(code: &str) -> bool {
        let mut rest = code;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            if let Some(close) = after.find('}') {
                let inner = &after[..close];
                if !inner.is_empty() && inner.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return true;
                }
            }
            rest = after;
        }
        false
    }

    fn bracket_depth(line: &str) -> i32 {
        let mut depth = 0;
        let mut in_str = false;
        let mut escaped = false;
        for c in line.chars() {
            if in_str {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_str = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_str = true,
                '#' => break,
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                c => assert!(c.is_ascii(), "non-ASCII {c:?} outside a string: {line:?}"),
            }
        }
        assert!(!in_str, "unterminated string: {line:?}");
        depth
    }
}
