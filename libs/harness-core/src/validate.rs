use crate::error::SubmissionRejected;
use tracing::warn;

/// Rejects code containing any forbidden keyword. Matching is a plain
/// substring search; blank entries are ignored.
pub fn validate_submission<S: AsRef<str>>(
    code: &str,
    blacklist: &[S],
) -> Result<(), SubmissionRejected> {
    let mut illegal: Vec<String> = Vec::new();
    for keyword in blacklist.iter().map(|k| k.as_ref().trim()) {
        if !keyword.is_empty() && code.contains(keyword) && !illegal.iter().any(|k| k == keyword) {
            illegal.push(keyword.to_string());
        }
    }

    if illegal.is_empty() {
        Ok(())
    } else {
        warn!(illegal = ?illegal, "Submission rejected by blacklist");
        Err(SubmissionRejected { illegal })
    }
}
