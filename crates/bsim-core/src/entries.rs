//! Free-text budget entry parser.
//!
//! Users send lines like `Coffee 50000`, `Kofe: 25000` or `Rent - 1 200 000`.
//! Each line that ends in an amount yields one [`ParsedEntry`]; everything else
//! is skipped, so a message with a typo still records its valid lines.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::ParsedEntry;

fn command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/\w+(?:@\w+)?\s?").expect("valid regex"))
}

// Everything after the label is a trailing run of digit groups; which of
// those groups belong to the amount is decided in `amount_start`.
fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<label>.*?)[ \t]*[:\-]?[ \t]+(?P<run>[0-9]+(?:[ \x{a0}]+[0-9]+)*)$")
            .expect("valid regex")
    })
}

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("valid regex"))
}

/// Remove one leading `/command` (optionally `/command@bot`) from the message.
pub fn strip_command(text: &str) -> &str {
    match command_re().find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Extract `(label, amount)` pairs, one per matching line, in input order.
pub fn parse_entries(text: &str) -> Vec<ParsedEntry> {
    strip_command(text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<ParsedEntry> {
    let caps = line_re().captures(line)?;
    let run = caps.name("run")?;

    let groups: Vec<_> = digits_re().find_iter(run.as_str()).collect();
    let start = amount_start(&groups.iter().map(|g| g.as_str()).collect::<Vec<_>>());
    let amount_at = run.start() + groups.get(start)?.start();

    let label = if start == 0 {
        caps.name("label")?.as_str().trim()
    } else {
        line[..amount_at].trim()
    };
    if !label.chars().any(|c| !c.is_ascii_digit() && !c.is_whitespace()) {
        return None;
    }

    let amount = parse_amount(&line[amount_at..])?;
    Some(ParsedEntry::new(label, amount))
}

/// Index of the first digit group that belongs to the amount.
///
/// Thousands grouping (`5 000 000`) wins. Otherwise the amount is the last
/// group, extended left while it starts with `0`: `Room 204 50000` keeps `204`
/// in the label while `Salary 5 000000` reads as five million.
fn amount_start(groups: &[&str]) -> usize {
    let last = groups.len().saturating_sub(1);
    let grouped = (0..last).find(|&i| {
        (1..=3).contains(&groups[i].len()) && groups[i + 1..].iter().all(|g| g.len() == 3)
    });
    if let Some(i) = grouped {
        return i;
    }

    let mut start = last;
    while start > 0 && groups[start].starts_with('0') {
        start -= 1;
    }
    start
}

/// Parse a digit run that may use spaces as thousands separators.
pub fn parse_amount(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}
