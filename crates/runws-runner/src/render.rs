//! Display-mode renderers.
//!
//! The orchestrator reports unit lifecycle events to a [`Renderer`]; what
//! (if anything) reaches the terminal is decided here. Each [`RenderMode`]
//! maps to one implementation through [`renderer_for`].

use core::time::Duration;
use std::sync::Arc;

use console::style;
use runws_core::RenderMode;

use crate::orchestrator::UnitState;
use crate::output::Console;

/// Receives unit lifecycle events from the orchestrator.
///
/// Calls may arrive concurrently from several units.
pub trait Renderer: Send + Sync {
    /// Scheduling is about to begin for `total` units.
    fn run_started(&self, total: usize);

    /// A unit was skipped before scheduling.
    fn unit_skipped(&self, title: &str);

    /// A unit's action has started.
    fn unit_started(&self, title: &str);

    /// A unit reached a terminal state.
    fn unit_settled(&self, title: &str, state: UnitState, elapsed: Duration);

    /// Buffered output of a settled unit.
    fn output_block(&self, title: &str, output: &str);
}

/// Renderer for `mode`, writing through `console`.
pub fn renderer_for(mode: RenderMode, console: Arc<dyn Console>) -> Arc<dyn Renderer> {
    match mode {
        RenderMode::Default => Arc::new(DefaultRenderer { console }),
        RenderMode::Verbose => Arc::new(VerboseRenderer { console }),
        RenderMode::Simple => Arc::new(SimpleRenderer { console }),
        RenderMode::Silent => Arc::new(SilentRenderer),
    }
}

/// Human-readable elapsed time, e.g. `850ms` or `2.4s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

/// Styled status lines for an interactive terminal.
struct DefaultRenderer {
    console: Arc<dyn Console>,
}

impl Renderer for DefaultRenderer {
    fn run_started(&self, _total: usize) {}

    fn unit_skipped(&self, title: &str) {
        self.console.log(&format!(
            "{} {title} {}",
            style("↓").yellow(),
            style("[SKIPPED]").dim()
        ));
    }

    fn unit_started(&self, title: &str) {
        self.console.log(&format!("{} {title}", style("❯").cyan()));
    }

    fn unit_settled(&self, title: &str, state: UnitState, elapsed: Duration) {
        let marker = if state == UnitState::Failed {
            style("✖").red()
        } else {
            style("✔").green()
        };
        self.console.log(&format!(
            "{marker} {title} {}",
            style(format!("[{}]", format_elapsed(elapsed))).dim()
        ));
    }

    fn output_block(&self, title: &str, output: &str) {
        self.console.log(&style(title).bold().to_string());
        for line in output.lines() {
            self.console.log(&format!("  {line}"));
        }
    }
}

/// Every event, tagged, unstyled.
struct VerboseRenderer {
    console: Arc<dyn Console>,
}

impl Renderer for VerboseRenderer {
    fn run_started(&self, total: usize) {
        self.console.log(&format!("[STARTED] running {total} commands"));
    }

    fn unit_skipped(&self, title: &str) {
        self.console.log(&format!("[SKIPPED] {title}"));
    }

    fn unit_started(&self, title: &str) {
        self.console.log(&format!("[STARTED] {title}"));
    }

    fn unit_settled(&self, title: &str, state: UnitState, elapsed: Duration) {
        let tag = if state == UnitState::Failed { "FAILED" } else { "SUCCESS" };
        self.console
            .log(&format!("[{tag}] {title} [{}]", format_elapsed(elapsed)));
    }

    fn output_block(&self, title: &str, output: &str) {
        self.console.log(&format!("[OUTPUT] {title}"));
        for line in output.lines() {
            self.console.log(&format!("[OUTPUT] {line}"));
        }
    }
}

/// One plain line per outcome, for logs without a terminal.
struct SimpleRenderer {
    console: Arc<dyn Console>,
}

impl Renderer for SimpleRenderer {
    fn run_started(&self, _total: usize) {}

    fn unit_skipped(&self, title: &str) {
        self.console.log(&format!("↓ {title} [SKIPPED]"));
    }

    fn unit_started(&self, _title: &str) {}

    fn unit_settled(&self, title: &str, state: UnitState, elapsed: Duration) {
        let marker = if state == UnitState::Failed { "✖" } else { "✔" };
        self.console
            .log(&format!("{marker} {title} [{}]", format_elapsed(elapsed)));
    }

    fn output_block(&self, title: &str, output: &str) {
        self.console.log(&format!("{title}\n{output}"));
    }
}

/// Renders nothing.
struct SilentRenderer;

impl Renderer for SilentRenderer {
    fn run_started(&self, _total: usize) {}

    fn unit_skipped(&self, _title: &str) {}

    fn unit_started(&self, _title: &str) {}

    fn unit_settled(&self, _title: &str, _state: UnitState, _elapsed: Duration) {}

    fn output_block(&self, _title: &str, _output: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryConsole;

    fn exercise(mode: RenderMode) -> Arc<MemoryConsole> {
        let console = Arc::new(MemoryConsole::new());
        let renderer = renderer_for(mode, Arc::clone(&console) as Arc<dyn Console>);
        renderer.run_started(2);
        renderer.unit_skipped("npm run test --workspace ws/b");
        renderer.unit_started("npm run test --workspace ws/a");
        renderer.unit_settled(
            "npm run test --workspace ws/a",
            UnitState::Failed,
            Duration::from_millis(1500),
        );
        renderer.output_block("npm run test --workspace ws/a", "line one\nline two");
        console
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(850)), "850ms");
        assert_eq!(format_elapsed(Duration::from_millis(2400)), "2.4s");
    }

    #[test]
    fn test_silent_renders_nothing() {
        let console = exercise(RenderMode::Silent);
        assert!(console.logs().is_empty());
        assert!(console.errors().is_empty());
    }

    #[test]
    fn test_verbose_tags_every_event() {
        let logs = exercise(RenderMode::Verbose).logs();
        assert_eq!(
            logs,
            vec![
                "[STARTED] running 2 commands",
                "[SKIPPED] npm run test --workspace ws/b",
                "[STARTED] npm run test --workspace ws/a",
                "[FAILED] npm run test --workspace ws/a [1.5s]",
                "[OUTPUT] npm run test --workspace ws/a",
                "[OUTPUT] line one",
                "[OUTPUT] line two",
            ]
        );
    }

    #[test]
    fn test_simple_prints_titled_block() {
        let logs = exercise(RenderMode::Simple).logs();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0], "↓ npm run test --workspace ws/b [SKIPPED]");
        assert_eq!(logs[1], "✖ npm run test --workspace ws/a [1.5s]");
        assert_eq!(logs[2], "npm run test --workspace ws/a\nline one\nline two");
    }

    #[test]
    fn test_default_mentions_every_unit() {
        let logs = exercise(RenderMode::Default).logs();
        assert!(logs.iter().any(|line| line.contains("ws/b") && line.contains("SKIPPED")));
        assert!(logs.iter().any(|line| line.contains("line two")));
    }
}
