//! npm version range syntax on top of the `semver` crate
//!
//! `semver::VersionReq` follows Cargo's dialect: comparators are comma
//! separated, a bare version means `^`, and there is no `||` or hyphen range.
//! npm ranges are rewritten into one Cargo requirement per `||` alternative.

use semver::{Version, VersionReq};

/// A parsed npm range: satisfied when any alternative matches
#[derive(Debug, Clone, PartialEq)]
pub struct NpmRange {
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    /// Parse an npm range. Returns `None` for anything that is not a range,
    /// such as dist-tags, URLs, or `github:` references.
    pub fn parse(input: &str) -> Option<Self> {
        let alternatives = input
            .split("||")
            .map(translate_set)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { alternatives })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// Parse a concrete version, accepting npm's loose `v` / `=` prefixes
pub fn parse_version(input: &str) -> Option<Version> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// Whether a string is meaningful to semver at all, as version or as range
pub fn is_semver(input: &str) -> bool {
    parse_version(input).is_some() || NpmRange::parse(input).is_some()
}

/// Translate one space-separated comparator set into a Cargo requirement
fn translate_set(set: &str) -> Option<VersionReq> {
    let set = set.trim();
    if set.is_empty() {
        return Some(VersionReq::STAR);
    }

    if let Some((low, high)) = split_hyphen(set) {
        let low = strip_wildcards(low)?;
        let high = strip_wildcards(high)?;
        let mut comparators = Vec::new();
        if let Some(low) = low {
            comparators.push(format!(">={}", low));
        }
        if let Some(high) = high {
            comparators.push(format!("<={}", high));
        }
        return build_req(&comparators);
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in set.split_whitespace() {
        // `>= 1.2.3` spreads one comparator over two tokens
        if is_operator(token) {
            if pending_op.is_some() {
                return None;
            }
            pending_op = Some(token);
            continue;
        }
        let token = match pending_op.take() {
            Some(op) => format!("{}{}", op, token),
            None => token.to_string(),
        };
        if let Some(comparator) = translate_comparator(&token)? {
            comparators.push(comparator);
        }
    }
    if pending_op.is_some() {
        return None;
    }

    build_req(&comparators)
}

fn build_req(comparators: &[String]) -> Option<VersionReq> {
    if comparators.is_empty() {
        return Some(VersionReq::STAR);
    }
    VersionReq::parse(&comparators.join(", ")).ok()
}

fn split_hyphen(set: &str) -> Option<(&str, &str)> {
    let (low, high) = set.split_once(" - ")?;
    Some((low.trim(), high.trim()))
}

fn is_operator(token: &str) -> bool {
    matches!(token, "^" | "~" | "~>" | ">" | ">=" | "<" | "<=" | "=")
}

/// Translate one comparator. An inner `None` means the comparator matches anything.
fn translate_comparator(token: &str) -> Option<Option<String>> {
    let split = token
        .find(|c: char| c.is_ascii_alphanumeric() || c == '*')
        .unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    let op = match op {
        "" | "=" => "=",
        "~>" => "~",
        "^" | "~" | ">" | ">=" | "<" | "<=" => op,
        _ => return None,
    };

    let Some(version) = strip_wildcards(version)? else {
        return Some(match op {
            // `<*` and `>*` can never match
            "<" | ">" => Some("<0.0.0-0".to_string()),
            _ => None,
        });
    };
    Some(Some(format!("{}{}", op, version)))
}

/// Drop a leading `v` and trailing `x`/`X`/`*` components: `1.2.x` becomes `1.2`.
///
/// Cargo reads a partial version after `=`, `~`, `^`, `<=` and `>` the same way
/// npm reads the wildcard form. Returns `Some(None)` when nothing is left.
fn strip_wildcards(version: &str) -> Option<Option<String>> {
    let version = version.strip_prefix('v').unwrap_or(version);
    if version.is_empty() {
        return None;
    }

    let (core, suffix) = match version.find(&['-', '+'][..]) {
        Some(pos) => version.split_at(pos),
        None => (version, ""),
    };

    let mut parts = Vec::new();
    for part in core.split('.') {
        if matches!(part, "x" | "X" | "*") {
            break;
        }
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        parts.push(part);
    }
    if parts.len() > 3 {
        return None;
    }
    if parts.is_empty() {
        return Some(None);
    }
    // a prerelease tag is only meaningful on a full version
    if !suffix.is_empty() && parts.len() < 3 {
        return None;
    }
    Some(Some(format!("{}{}", parts.join("."), suffix)))
}
