use crate::config::CodegenSection;
use crate::types::{RunRecord, SweepGroup};

/// Inputs shared by every generator for one analysis call.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Absolute path of the measurement database, embedded as a literal.
    pub database_path: &'a str,
    pub codegen: &'a CodegenSection,
}

/// Common interface for the per-kind and per-group code generators.
pub trait CodeGenerator: Send + Sync {
    /// Human-readable name for this generator.
    fn name(&self) -> &'static str;

    /// Generate loading/plotting code for a group. Never fails: missing
    /// attributes become placeholder comments and generic names.
    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String;
}

/// Run `render` on the single member of a group, or fall back to the
/// universal loader when the group is unexpectedly empty.
pub(crate) fn with_single_run(
    group: &SweepGroup<'_>,
    ctx: &RenderContext<'_>,
    render: impl FnOnce(&RunRecord) -> String,
) -> String {
    match group.runs.first() {
        Some(run) => render(run),
        None => super::fallback::render_missing_run(
            group.min_run_id().unwrap_or_default(),
            ctx,
        ),
    }
}
