// Pure formatting and parsing helpers shared by the views: byte sizes,
// dates, URL fragments, URL resolution and regex escaping.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

lazy_static! {
    static ref RE_DATE_TOKENS: Regex = Regex::new("YYYY|MM|DD|HH|mm|ss").unwrap();
}

/// Human-readable byte count with two decimals ("1.5 KB", "0 B").
pub fn format_file_size(bytes: f64) -> String {
    format_file_size_round(bytes, 2)
}

/// Same with an explicit decimal precision. Units step in powers of 1024;
/// trailing zeros are trimmed from the printed value.
pub fn format_file_size_round(bytes: f64, round: usize) -> String {
    if bytes == 0.0 || !bytes.is_finite() || bytes < 0.0 {
        return "0 B".to_string();
    }
    let exp = (bytes.ln() / 1024f64.ln()).floor();
    let i = (exp.max(0.0) as usize).min(SIZE_UNITS.len() - 1);
    let value = bytes / 1024f64.powi(i as i32);
    let formatted = format!("{value:.round$}");
    let printed = trim_trailing_zeros(&formatted);
    format!("{} {}", printed, SIZE_UNITS[i])
}

fn trim_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Render `date` through a token format string ("YYYY-MM-DD HH:mm:ss").
/// Unparseable input comes back unchanged; text outside the known tokens
/// passes through as-is. Inputs carrying an offset keep their wall-clock
/// time instead of being converted to local.
pub fn format_date(date: &str, format: &str) -> String {
    let Some(dt) = parse_date_lenient(date) else {
        return date.to_string();
    };
    RE_DATE_TOKENS
        .replace_all(format, |caps: &regex::Captures| match &caps[0] {
            "YYYY" => format!("{:04}", dt.year()),
            "MM" => format!("{:02}", dt.month()),
            "DD" => format!("{:02}", dt.day()),
            "HH" => format!("{:02}", dt.hour()),
            "mm" => format!("{:02}", dt.minute()),
            "ss" => format!("{:02}", dt.second()),
            other => other.to_string(),
        })
        .into_owned()
}

fn parse_date_lenient(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    None
}

/// Parse a URL fragment ("#q=iron+giant&tracker=alpha&raw") into a key/value
/// map. Items without '=' map to None. '+' in values becomes space before
/// percent-decoding; on duplicate keys the last item wins.
pub fn get_hash_args(fragment: &str) -> HashMap<String, Option<String>> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut args = HashMap::new();
    if fragment.is_empty() {
        return args;
    }
    for item in fragment.split('&') {
        match item.split_once('=') {
            Some((key, value)) => {
                let spaced = value.replace('+', " ");
                args.insert(percent_decode(key), Some(percent_decode(&spaced)));
            }
            None => {
                args.insert(percent_decode(item), None);
            }
        }
    }
    args
}

fn percent_decode(s: &str) -> String {
    match urlencoding::decode(s) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}

/// Resolve `url` against `base`. An empty base returns `url` untouched and a
/// base that fails to parse falls back to plain concatenation.
pub fn resolve_url(base: &str, url: &str) -> String {
    if base.is_empty() {
        return url.to_string();
    }
    match Url::parse(base).and_then(|b| b.join(url)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => format!("{base}{url}"),
    }
}

/// Escape regex metacharacters so user input can be embedded in a pattern
/// as a literal (column filters build "^value$" out of this).
pub fn escape_regex(text: &str) -> String {
    regex::escape(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_zero_and_exact_units() {
        assert_eq!(format_file_size(0.0), "0 B");
        assert_eq!(format_file_size(1024.0), "1 KB");
        assert_eq!(format_file_size(500.0), "500 B");
    }

    #[test]
    fn file_size_trims_trailing_zeros() {
        assert_eq!(format_file_size(1536.0), "1.5 KB");
        assert_eq!(format_file_size_round(1536.0, 0), "2 KB");
        assert_eq!(format_file_size_round(1234.0, 3), "1.205 KB");
    }

    #[test]
    fn file_size_units_are_monotonic() {
        let samples = [
            (1.5 * 1024f64, "KB"),
            (1.5 * 1024f64.powi(2), "MB"),
            (1.5 * 1024f64.powi(3), "GB"),
            (1.5 * 1024f64.powi(4), "TB"),
            (1.5 * 1024f64.powi(5), "PB"),
        ];
        for (bytes, unit) in samples {
            let printed = format_file_size(bytes);
            assert!(printed.ends_with(unit), "{bytes} -> {printed}");
        }
    }

    #[test]
    fn file_size_clamps_odd_inputs() {
        // sub-byte values stay in the byte bucket, absurd ones in the top one
        assert!(format_file_size(0.5).ends_with(" B"));
        assert!(format_file_size(1e40).ends_with(" YB"));
        assert_eq!(format_file_size(f64::NAN), "0 B");
        assert_eq!(format_file_size(-1.0), "0 B");
    }

    #[test]
    fn date_substitutes_each_token() {
        let input = "2023-04-05 06:07:08";
        assert_eq!(format_date(input, "YYYY"), "2023");
        assert_eq!(format_date(input, "MM"), "04");
        assert_eq!(format_date(input, "DD"), "05");
        assert_eq!(format_date(input, "HH"), "06");
        assert_eq!(format_date(input, "mm"), "07");
        assert_eq!(format_date(input, "ss"), "08");
        assert_eq!(
            format_date(input, "YYYY-MM-DD HH:mm:ss"),
            "2023-04-05 06:07:08"
        );
    }

    #[test]
    fn date_leaves_unknown_text_alone() {
        assert_eq!(format_date("2023-04-05", "DD/MM/YYYY (UTC)"), "05/04/2023 (UTC)");
    }

    #[test]
    fn date_passes_unparseable_through() {
        assert_eq!(format_date("not a date", "YYYY-MM-DD"), "not a date");
        assert_eq!(format_date("", "YYYY"), "");
    }

    #[test]
    fn date_accepts_rfc3339_and_keeps_wall_clock() {
        assert_eq!(
            format_date("2023-04-05T06:07:08+02:00", "HH:mm"),
            "06:07"
        );
    }

    #[test]
    fn hash_args_round_trip() {
        let args = get_hash_args("#q=hello+world&tracker=alpha%26beta");
        assert_eq!(args["q"], Some("hello world".to_string()));
        assert_eq!(args["tracker"], Some("alpha&beta".to_string()));
    }

    #[test]
    fn hash_args_key_without_value() {
        let args = get_hash_args("search&q=x");
        assert_eq!(args["search"], None);
        assert_eq!(args["q"], Some("x".to_string()));
    }

    #[test]
    fn hash_args_empty_and_duplicates() {
        assert!(get_hash_args("").is_empty());
        assert!(get_hash_args("#").is_empty());
        let args = get_hash_args("q=first&q=second");
        assert_eq!(args["q"], Some("second".to_string()));
    }

    #[test]
    fn resolve_url_joins_and_falls_back() {
        assert_eq!(resolve_url("", "/api/v2.0/"), "/api/v2.0/");
        assert_eq!(
            resolve_url("http://localhost:9117", "/api/v2.0/indexers"),
            "http://localhost:9117/api/v2.0/indexers"
        );
        // absolute urls win over the base
        assert_eq!(
            resolve_url("http://localhost:9117", "http://other/x"),
            "http://other/x"
        );
        // unparseable base degrades to concatenation
        assert_eq!(resolve_url("nonsense", "/path"), "nonsense/path");
    }

    #[test]
    fn escape_makes_literals_safe() {
        let escaped = escape_regex("1.0 (x64)?");
        let re = Regex::new(&format!("^{escaped}$")).unwrap();
        assert!(re.is_match("1.0 (x64)?"));
        assert!(!re.is_match("1x0 (x64)"));
    }
}
