//! Rewrites that make captured output byte-stable
//!
//! `connstat` emits wall-clock date-times and epoch seconds that can never
//! reproduce across runs; masking them is the only way to keep `.out`
//! fixtures comparable byte-for-byte.

use std::sync::OnceLock;

use regex::Regex;

const EPOCH_DATETIME: &str = "1970-01-01T00:00:00";
const EPOCH_SECONDS: &str = "0000000000";

/// Replace all timestamp lines with fixed sentinels.
///
/// Two line shapes are rewritten, each optionally prefixed by repetitions of
/// the two-character `"= "` marker used by nested report sections:
/// - an ISO-8601 date-time (`YYYY-MM-DDTHH:MM:SS`) becomes
///   `1970-01-01T00:00:00`
/// - exactly ten decimal digits (seconds since the epoch) become
///   `0000000000`
///
/// The marker repetition count is preserved so masking only touches the
/// timestamp payload, never the report structure around it.
pub fn normalize_timestamps(text: &str) -> String {
    static ISO: OnceLock<Regex> = OnceLock::new();
    static EPOCH: OnceLock<Regex> = OnceLock::new();

    let iso = ISO.get_or_init(|| {
        Regex::new(r"(?m)^((?:= )*)\d{4}-\d\d-\d\dT\d\d:\d\d:\d\d$").unwrap()
    });
    let epoch = EPOCH.get_or_init(|| Regex::new(r"(?m)^((?:= )*)\d{10}$").unwrap());

    let text = iso.replace_all(text, format!("${{1}}{EPOCH_DATETIME}"));
    let text = epoch.replace_all(&text, format!("${{1}}{EPOCH_SECONDS}"));
    text.into_owned()
}

/// Normalize line endings
pub fn normalize_lines(data: &str) -> String {
    normalize_lines_chars(data.chars()).collect()
}

fn normalize_lines_chars(data: impl Iterator<Item = char>) -> impl Iterator<Item = char> {
    normalize_line_endings::normalized(data)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn iso_line_is_masked() {
        let actual = normalize_timestamps("2024-03-15T09:26:53\n");
        assert_eq!(actual, "1970-01-01T00:00:00\n");
    }

    #[test]
    fn epoch_line_is_masked() {
        let actual = normalize_timestamps("1710494813\n");
        assert_eq!(actual, "0000000000\n");
    }

    #[test]
    fn marker_prefix_is_preserved() {
        let actual = normalize_timestamps("= = 2024-01-01T00:00:00\n");
        assert_eq!(actual, "= = 1970-01-01T00:00:00\n");

        let actual = normalize_timestamps("= 1710494813\n");
        assert_eq!(actual, "= 0000000000\n");
    }

    #[test]
    fn only_whole_lines_match() {
        let cases = [
            "timestamp: 2024-03-15T09:26:53\n",
            "2024-03-15T09:26:53 end\n",
            "171049481\n",
            "17104948130\n",
            "=  1710494813\n",
        ];
        for case in cases {
            assert_eq!(normalize_timestamps(case), case);
        }
    }

    #[test]
    fn masks_lines_within_larger_output() {
        let output = "\
laddr,lport,raddr,rport,state
1710494813
10.0.0.1,51980,10.0.0.2,443,ESTABLISHED
= 2024-03-15T09:26:53
= 10.0.0.1,51981,10.0.0.2,443,TIME_WAIT
";
        let expected = "\
laddr,lport,raddr,rport,state
0000000000
10.0.0.1,51980,10.0.0.2,443,ESTABLISHED
= 1970-01-01T00:00:00
= 10.0.0.1,51981,10.0.0.2,443,TIME_WAIT
";
        assert_eq!(normalize_timestamps(output), expected);
    }

    #[test]
    fn idempotent() {
        let output = "= 2024-03-15T09:26:53\n1710494813\nConnections: 3\n";
        let once = normalize_timestamps(output);
        let twice = normalize_timestamps(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn invariant_to_time() {
        let first = "1710494813\nConnections: 3\n";
        let second = "1710581213\nConnections: 3\n";
        assert_eq!(normalize_timestamps(first), normalize_timestamps(second));
    }

    #[test]
    fn normalize_lines_strips_carriage_returns() {
        assert_eq!(normalize_lines("a\r\nb\n"), "a\nb\n");
    }
}
