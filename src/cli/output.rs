//! Colored output helpers for CLI
//!
//! Results go to stdout; progress and status lines go to stderr so that
//! `--format json` and `--format bibtex` output can be piped.

use crate::progress::ProgressEvent;
use crate::research::SearchSummary;
use crate::types::{Reference, UNKNOWN_AUTHOR};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        if self.colored {
            eprintln!(
                "\n   {} {}\n",
                "papyrus".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            eprintln!("\n   papyrus v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✓".green().bold(), message.green());
        } else {
            eprintln!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "•".blue(), message);
        } else {
            eprintln!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            eprintln!("  [WARN] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            eprintln!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            eprintln!("  [CREATED] {} {}", file_type, path);
        }
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            eprintln!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            eprintln!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            eprintln!("\n  {} {}", "tip:".dimmed(), message.dimmed().italic());
        } else {
            eprintln!("\n  [TIP] {}", message);
        }
    }

    pub fn command(&self, cmd: &str) {
        if self.colored {
            eprintln!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            eprintln!("     $ {}", cmd);
        }
    }

    /// Print one progress event as a status line
    pub fn progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::AgentStarted { agent } => self.info(&format!("{} searching", agent)),
            ProgressEvent::AgentRetrying {
                agent,
                attempt,
                delay_ms,
            } => self.warning(&format!(
                "{} rate limited (attempt {}), retrying in {:.1}s",
                agent,
                attempt,
                *delay_ms as f64 / 1000.0
            )),
            ProgressEvent::AgentFinished { agent, candidates } => {
                self.success(&format!("{} found {} candidate(s)", agent, candidates))
            }
            ProgressEvent::AgentFailed { agent, error } => {
                self.error(&format!("{} failed: {}", agent, error))
            }
            ProgressEvent::CandidatesMerged { raw, unique } => self.info(&format!(
                "{} candidate(s), {} after deduplication",
                raw, unique
            )),
            ProgressEvent::ReferenceValidated {
                completed,
                total,
                title,
                verified,
            } => {
                let mark = if *verified { "verified" } else { "unverified" };
                if self.colored {
                    eprintln!(
                        "  {} {} {}",
                        format!("[{}/{}]", completed, total).dimmed(),
                        truncate(title, 60),
                        format!("({})", mark).dimmed()
                    );
                } else {
                    eprintln!("  [{}/{}] {} ({})", completed, total, truncate(title, 60), mark);
                }
            }
            ProgressEvent::SearchCompleted { retained } => {
                self.success(&format!("{} reference(s) retained", retained))
            }
        }
    }

    /// Print a numbered reference listing
    pub fn reference(&self, index: usize, reference: &Reference) {
        let authors = format_authors(&reference.authors);
        let status = if reference.is_verified {
            "verified"
        } else {
            "unverified"
        };

        if self.colored {
            let status = if reference.is_verified {
                status.green().to_string()
            } else {
                status.yellow().to_string()
            };
            println!(
                "  {} {} {}",
                format!("{:>3}.", index).dimmed(),
                reference.title.bright_white().bold(),
                format!("[{}]", status)
            );
        } else {
            println!("  {:>3}. {} [{}]", index, reference.title, status);
        }

        println!("       {} ({})", authors, reference.year);
        if let Some(venue) = &reference.venue {
            println!("       {}", venue);
        }
        if let Some(doi) = &reference.doi {
            println!("       https://doi.org/{}", doi);
        }
        if let Some(count) = reference.citation_count {
            println!("       cited by {}", count);
        }
        println!("       via {}", reference.source);
    }

    pub fn summary(&self, summary: &SearchSummary) {
        if self.colored {
            eprintln!(
                "\n  {} verified, {} unverified",
                summary.verified.to_string().green().bold(),
                summary.unverified.to_string().yellow().bold()
            );
        } else {
            eprintln!("\n  {}", summary);
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn format_authors(authors: &[String]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [one] => one.clone(),
        [first, second] => format!("{} and {}", first, second),
        [first, ..] => format!("{} et al.", first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
    }

    #[test]
    fn test_format_authors() {
        assert_eq!(format_authors(&[]), "Unknown");
        assert_eq!(format_authors(&["A".to_string()]), "A");
        assert_eq!(
            format_authors(&["A".to_string(), "B".to_string()]),
            "A and B"
        );
        assert_eq!(
            format_authors(&["A".to_string(), "B".to_string(), "C".to_string()]),
            "A et al."
        );
    }

    #[test]
    fn test_output_methods_no_panic() {
        let mut reference = Reference::candidate("Deep learning", "Journal Scout")
            .with_doi("10.1038/nature14539");
        reference.citation_count = Some(3);

        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("ok");
            output.warning("careful");
            output.reference(1, &reference);
            output.progress(&ProgressEvent::AgentRetrying {
                agent: "Journal Scout".to_string(),
                attempt: 1,
                delay_ms: 2000,
            });
            output.progress(&ProgressEvent::ReferenceValidated {
                completed: 1,
                total: 2,
                title: "x".repeat(100),
                verified: false,
            });
            output.summary(&SearchSummary {
                verified: 1,
                unverified: 0,
            });
        }
    }
}
