use crate::types::{RunRecord, Sweep, SweepGroup, flatten_path};

use super::fallback;
use super::python::{
    experiment_line, measured_keys, write_generic_loop, write_line_plots, write_load_run,
    write_preamble, write_show,
};
use super::traits::{CodeGenerator, RenderContext, with_single_run};

/// Time traces of the followed parameters.
#[derive(Debug)]
pub struct Sweep0DGenerator;

impl CodeGenerator for Sweep0DGenerator {
    fn name(&self) -> &'static str {
        "sweep0d"
    }

    fn generate(&self, group: &SweepGroup<'_>, ctx: &RenderContext<'_>) -> String {
        with_single_run(group, ctx, |run| render_run(run, ctx))
    }
}

fn render_run(run: &RunRecord, ctx: &RenderContext<'_>) -> String {
    if !matches!(run.sweep, Sweep::Sweep0D { .. }) {
        return fallback::render_run(run, ctx);
    }
    let mut out = String::new();
    let title = format!("Run {}: {}", run.run_id, run.sweep.describe());
    write_preamble(&mut out, &title, &experiment_line(run), ctx);
    write_load_run(&mut out, run.run_id);
    out.push('\n');

    // The sweep tool records elapsed time as the only setpoint.
    let time_key = run
        .setpoints
        .first()
        .map_or_else(|| "time".to_string(), |s| flatten_path(s));
    let measured = measured_keys(&mut out, &run.sweep, run);
    if measured.is_empty() {
        write_generic_loop(&mut out, "", &format!("\"Run {}: \"", run.run_id));
    } else {
        write_line_plots(&mut out, run.run_id, &time_key, &measured);
    }
    write_show(&mut out, ctx);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodegenSection;
    use crate::render::test_support::{assert_well_formed, follow, run_with};
    use crate::types::{GroupKind, SweepKind};

    fn ctx(codegen: &CodegenSection) -> RenderContext<'_> {
        RenderContext { database_path: "/data/lab.db", codegen }
    }

    #[test]
    fn plots_each_followed_parameter_against_time() {
        let codegen = CodegenSection::default();
        let run = run_with(7, Sweep::Sweep0D { follow: follow(&["dmm.v1", "lockin.x"]) });
        let group = SweepGroup::new(GroupKind::Single, SweepKind::Sweep0D, vec![&run], String::new());

        let code = Sweep0DGenerator.generate(&group, &ctx(&codegen));
        assert!(code.starts_with("# Run 7: Sweep0D time trace\n"));
        assert!(code.contains("dmm_v1 = data[\"dmm_v1\"][\"dmm_v1\"]\n"));
        assert!(code.contains("time = data[\"dmm_v1\"][\"time\"]\n"));
        assert!(code.contains("plt.plot(time, lockin_x)\n"));
        assert!(code.contains("plt.title(\"Run 7: lockin_x\")"));
        assert!(code.ends_with("plt.show()\n"));
        assert_well_formed(&code);
    }

    #[test]
    fn uses_recorded_time_setpoint() {
        let codegen = CodegenSection::default();
        let mut run = run_with(3, Sweep::Sweep0D { follow: follow(&["dmm.v1"]) });
        run.setpoints = vec!["elapsed".into()];
        let code = render_run(&run, &ctx(&codegen));
        assert!(code.contains("elapsed = data[\"dmm_v1\"][\"elapsed\"]"));
        assert_well_formed(&code);
    }

    #[test]
    fn no_followed_parameters_uses_generic_loop() {
        let codegen = CodegenSection::default();
        let run = run_with(3, Sweep::Sweep0D { follow: follow(&[]) });
        let code = render_run(&run, &ctx(&codegen));
        assert!(code.contains("# No followed parameters recorded"));
        assert!(code.contains("for name, entry in data.items():"));
        assert_well_formed(&code);
    }
}
