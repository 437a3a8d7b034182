use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

use crate::path_utils::FerryPath;

/// Date/time tokens and their chrono equivalents.
///
/// Lookup prefers an exact-case hit, otherwise the first case-insensitive hit
/// wins. This departs from a purely case-insensitive scan in one place: there
/// `%mm%` would hit `MM` first and expand to the month, here it is the minute.
/// Every other spelling (`%YYYYMMDD%`, `%hhmmss%`) still resolves
/// case-insensitively.
const DATE_TOKENS: &[(&str, &str)] = &[
    ("yyyyMMddHHmmss", "%Y%m%d%H%M%S"),
    ("yyyyMMdd_HHmmss", "%Y%m%d_%H%M%S"),
    ("yyyy-MM-dd_HH-mm-ss", "%Y-%m-%d_%H-%M-%S"),
    ("yyyyMMdd", "%Y%m%d"),
    ("yyyy-MM-dd", "%Y-%m-%d"),
    ("HHmmss", "%H%M%S"),
    ("yyyy", "%Y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
];

const SOURCE_FILE_NAME: &str = "SourceFileName";

/// Expands `%Token%` placeholders in destination file name templates.
pub struct FileNameFormatter;

impl FileNameFormatter {
    /// Format against the current local time, sampled once.
    pub fn format(template: &str, source: &str) -> String {
        Self::format_at(template, source, &Local::now())
    }

    /// Format against an explicit instant. Every token in one template sees the
    /// same timestamp.
    ///
    /// Substituted text is never rescanned, so a source name that happens to
    /// contain `%HH%` survives verbatim. Unknown `%...%` sequences are kept.
    pub fn format_at<Tz>(template: &str, source: &str, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self::format_name_at(template, FerryPath::file_name(source), now)
    }

    /// Like [`format`](Self::format) for a name that is already a bare file
    /// name. Nothing in it is treated as a separator.
    pub fn format_name(template: &str, source_name: &str) -> String {
        Self::format_name_at(template, source_name, &Local::now())
    }

    pub fn format_name_at<Tz>(template: &str, source_name: &str, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if template.trim().is_empty() {
            return source_name.to_string();
        }

        let mut out = String::with_capacity(template.len() + source_name.len());
        let mut rest = template;
        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('%') else {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let token = &after[..end];
            match expand(token, source_name, now) {
                Some(value) => {
                    out.push_str(&value);
                    rest = &after[end + 1..];
                }
                None => {
                    // The closing '%' may open the next token.
                    out.push('%');
                    out.push_str(token);
                    rest = &after[end..];
                }
            }
        }
        out.push_str(rest);

        if out.trim().is_empty() {
            source_name.to_string()
        } else {
            out
        }
    }
}

fn expand<Tz>(token: &str, source_name: &str, now: &DateTime<Tz>) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if token.eq_ignore_ascii_case(SOURCE_FILE_NAME) {
        return Some(source_name.to_string());
    }
    let (_, pattern) = DATE_TOKENS
        .iter()
        .find(|(name, _)| *name == token)
        .or_else(|| {
            DATE_TOKENS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(token))
        })?;
    Some(now.format(pattern).to_string())
}
