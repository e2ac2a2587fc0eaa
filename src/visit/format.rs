//! Human-readable response blocks returned to the caller.

/// Separator between per-URL blocks.
pub const BLOCK_SEPARATOR: &str = "\n=======\n";

pub const FETCH_FAILED: &str = "Failed to fetch webpage";
pub const SUMMARY_FAILED: &str = "Summary generation failed";
pub const PARSE_FAILED: &str = "Summary parsing failed";
pub const BATCH_TIMEOUT: &str = "Batch timeout exceeded";

const UNAVAILABLE_EVIDENCE: &str =
    "The provided webpage content could not be accessed. Please check the URL or file format.";
const UNAVAILABLE_SUMMARY: &str =
    "The webpage content could not be processed, and therefore, no information is available.";

fn header(url: &str, goal: &str) -> String {
    format!(
        "The useful information in {} for user goal {} as follows: \n\n",
        url, goal
    )
}

/// Block for a URL that could not be summarized.
pub fn failure_block(url: &str, goal: &str, error: Option<&str>) -> String {
    let mut block = header(url, goal);
    if let Some(error) = error {
        block.push_str(&format!("Error: {}\n\n", error));
    }
    block.push_str(&format!("Evidence in page: \n{}\n\n", UNAVAILABLE_EVIDENCE));
    block.push_str(&format!("Summary: \n{}\n\n", UNAVAILABLE_SUMMARY));
    block
}

/// Block carrying extracted evidence and summary.
pub fn success_block(url: &str, goal: &str, evidence: &str, summary: &str) -> String {
    let mut block = header(url, goal);
    block.push_str(&format!("Evidence in page: \n{}\n\n", evidence));
    block.push_str(&format!("Summary: \n{}\n\n", summary));
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_block_layout() {
        let block = failure_block("https://a.io", "find x", Some(BATCH_TIMEOUT));
        assert_eq!(
            block,
            "The useful information in https://a.io for user goal find x as follows: \n\n\
             Error: Batch timeout exceeded\n\n\
             Evidence in page: \n\
             The provided webpage content could not be accessed. Please check the URL or file format.\n\n\
             Summary: \n\
             The webpage content could not be processed, and therefore, no information is available.\n\n"
        );
    }

    #[test]
    fn test_failure_block_without_error() {
        let block = failure_block("u", "g", None);
        assert!(!block.contains("Error:"));
        assert!(block.starts_with("The useful information in u for user goal g"));
    }

    #[test]
    fn test_success_block_layout() {
        let block = success_block("u", "g", "E", "S");
        assert_eq!(
            block,
            "The useful information in u for user goal g as follows: \n\n\
             Evidence in page: \nE\n\n\
             Summary: \nS\n\n"
        );
    }
}
