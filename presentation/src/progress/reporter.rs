//! Progress reporting for review execution

use colored::Colorize;
use crew_application::ports::progress::ProgressNotifier;
use crew_domain::{SourceDocument, StageId};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a stage bar on the terminal
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_review_start(&self, source: &SourceDocument, total_stages: usize) {
        let pb = ProgressBar::new(total_stages as u64);
        pb.set_style(Self::stage_style());
        pb.set_prefix(source.name.clone());
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_stage_start(&self, stage: StageId, role: &str) {
        self.with_bar(|pb| pb.set_message(format!("{} ({})", stage.display_name(), role)));
    }

    fn on_stage_complete(&self, stage: StageId, success: bool) {
        self.with_bar(|pb| {
            if success {
                pb.println(format!("  {} {}", "v".green(), stage.display_name()));
                pb.inc(1);
            } else {
                pb.println(format!("  {} {}", "x".red(), stage.display_name()));
            }
        });
    }

    fn on_review_complete(&self, success: bool) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(pb) = guard.take()
        {
            if success {
                pb.finish_with_message(format!("{}", "Review complete!".green()));
            } else {
                pb.abandon_with_message(format!("{}", "Review failed".red()));
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_review_start(&self, source: &SourceDocument, total_stages: usize) {
        println!(
            "{} {} ({} lines, {} stages)",
            "->".cyan(),
            source.name.bold(),
            source.line_count(),
            total_stages
        );
    }

    fn on_stage_start(&self, stage: StageId, role: &str) {
        println!("  {} {} ({})", "..".dimmed(), stage.display_name(), role);
    }

    fn on_stage_complete(&self, stage: StageId, success: bool) {
        if success {
            println!("  {} {}", "v".green(), stage.display_name());
        } else {
            println!("  {} {} (failed)", "x".red(), stage.display_name());
        }
    }

    fn on_review_complete(&self, _success: bool) {
        println!();
    }
}
