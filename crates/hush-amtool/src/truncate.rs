//! Output truncation for error messages.
//!
//! `kubectl` and `amtool` failures are reported with their stderr, which can
//! be long (stack traces, full JSON dumps). Middle-omission keeps both the
//! start of the output and the final error line.

/// Default maximum characters quoted from a command's output.
pub const DEFAULT_MAX_CHARS: usize = 2_000;

/// Truncate `output` to at most `max_chars` characters using middle-omission.
///
/// The split is done on character boundaries, so multi-byte sequences are
/// never broken.
pub fn truncate_output(output: &str, max_chars: usize) -> String {
    if output.len() <= max_chars {
        return output.to_owned();
    }

    let chars: Vec<char> = output.chars().collect();
    let total = chars.len();

    if total <= max_chars {
        return output.to_owned();
    }

    let half = max_chars / 2;
    let head: String = chars[..half].iter().collect();
    let tail: String = chars[total - half..].iter().collect();
    let omitted = total - 2 * half;

    format!("{head} ... [{omitted} chars omitted] ... {tail}")
}
