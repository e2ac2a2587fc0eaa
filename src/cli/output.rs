//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        eprintln!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        eprintln!("{} {}", style(">>").green().bold(), msg);
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

    /// Print a visit result block by block, dimming the separators.
    pub fn visit_result(text: &str, separator: &str) {
        let blocks: Vec<&str> = text.split(separator).collect();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                println!("{}", style(separator.trim()).dim());
            }
            println!("{}", block.trim_end());
        }
    }

    /// Create a spinner on stderr.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Count of failed blocks in a visit result.
pub fn count_failures(text: &str, separator: &str) -> usize {
    text.split(separator)
        .filter(|block| block.contains("as follows: \n\nError: "))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_failures() {
        let sep = "\n=======\n";
        let text = format!(
            "The useful information in a for user goal g as follows: \n\nEvidence in page: \nE{}\
             The useful information in b for user goal g as follows: \n\nError: Batch timeout exceeded\n\n",
            sep
        );
        assert_eq!(count_failures(&text, sep), 1);
        assert_eq!(count_failures("", sep), 0);
    }
}
