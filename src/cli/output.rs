//! CLI output formatting utilities.

use crate::job::{Job, JobStatus};
use crate::pipeline::AggregatedResult;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print the terminal state of a job.
    pub fn job(job: &Job) {
        let status = match job.status() {
            JobStatus::Done => style(job.status().to_string()).green().bold(),
            JobStatus::Failed => style(job.status().to_string()).red().bold(),
            _ => style(job.status().to_string()).yellow(),
        };
        println!("  {} {} ({})", style("*").cyan(), style(&job.filename).bold(), status);
        Output::kv("Job", &job.id.to_string());
        if let Some(location) = job.result_location() {
            Output::kv("Result", location);
        }
        if let Some(error) = job.error() {
            Output::kv("Error", error);
        }
    }

    /// Print a short digest of a result.
    pub fn result_digest(result: &AggregatedResult) {
        Output::header("Summary");
        println!("{}", content_preview(&result.summary, 600));

        let failed_quizzes = result.quizzes.iter().filter(|q| q.is_failed()).count();
        let failed_cards = result.flashcards.iter().filter(|c| c.is_failed()).count();
        println!();
        Output::kv(
            "Quiz items",
            &format!("{} ({} failed)", result.quizzes.len(), failed_quizzes),
        );
        Output::kv(
            "Flashcards",
            &format!("{} ({} failed)", result.flashcards.len(), failed_cards),
        );

        let mut locales: Vec<_> = result.localized.iter().collect();
        locales.sort_by(|a, b| a.0.cmp(b.0));
        for (locale, text) in locales {
            let value = match text.error() {
                Some(error) => format!("failed: {}", error),
                None => "ok".to_string(),
            };
            Output::kv(locale, &value);
        }

        for failure in &result.summary_failures {
            Output::warning(&format!(
                "{:?} summary {} skipped: {}",
                failure.stage, failure.index, failure.error
            ));
        }
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 100), "short text");
        assert_eq!(content_preview("abcdef", 3), "abc...");
        assert_eq!(content_preview("नमस्ते दुनिया", 3).chars().count(), 6);
    }
}
