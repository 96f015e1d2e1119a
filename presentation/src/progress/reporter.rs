//! Progress reporting for intake runs

use colored::Colorize;
use crew_application::RunProgressNotifier;
use crew_domain::{RunPhase, SubmissionReceipt, SynthesizedDecision, WorkerKind, WorkerResult};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with one spinner per specialist
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<BTreeMap<WorkerKind, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(BTreeMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn phase_display_name(phase: RunPhase) -> &'static str {
        match phase {
            RunPhase::Idle => "Preparing instructions",
            RunPhase::Dispatched => "Dispatching specialists",
            RunPhase::Collecting => "Collecting results",
            RunPhase::Complete => "All specialists reported",
        }
    }

    fn outcome_line(result: &WorkerResult) -> String {
        match result.failure_info() {
            None => format!("{} done", "v".green()),
            Some(failure) => format!("{} {}", "x".red(), failure.kind),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RunProgressNotifier for ProgressReporter {
    fn on_phase(&self, phase: RunPhase) {
        if phase == RunPhase::Complete {
            let _ = self.multi.println(format!(
                "{} {}",
                "->".cyan(),
                Self::phase_display_name(phase).bold()
            ));
        }
    }

    fn on_worker_start(&self, worker: WorkerKind) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(worker.display_name().to_string());
        pb.set_message("working...");
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(worker, pb);
        }
    }

    fn on_worker_complete(&self, result: &WorkerResult) {
        let bar = self
            .bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(&result.worker));
        if let Some(pb) = bar {
            pb.finish_with_message(Self::outcome_line(result));
        }
    }

    fn on_decision(&self, decision: &SynthesizedDecision) {
        let _ = self.multi.println(format!(
            "{} Assessment ready ({} confidence)",
            "->".cyan(),
            decision.confidence_level
        ));
    }

    fn on_submitted(&self, receipt: &SubmissionReceipt) {
        let _ = self
            .multi
            .println(format!("{} Filed as {}", "->".cyan(), receipt.id.bold()));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl RunProgressNotifier for SimpleProgress {
    fn on_phase(&self, phase: RunPhase) {
        println!(
            "{} {}",
            "->".cyan(),
            ProgressReporter::phase_display_name(phase).bold()
        );
    }

    fn on_worker_start(&self, worker: WorkerKind) {
        println!("  {} {}", "..".dimmed(), worker.display_name());
    }

    fn on_worker_complete(&self, result: &WorkerResult) {
        match result.failure_info() {
            None => println!("  {} {}", "v".green(), result.worker.display_name()),
            Some(failure) => println!(
                "  {} {} ({})",
                "x".red(),
                result.worker.display_name(),
                failure.kind
            ),
        }
    }

    fn on_decision(&self, decision: &SynthesizedDecision) {
        println!("{} {}", "->".cyan(), decision.hypothesis);
    }
}
