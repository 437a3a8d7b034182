use chrono::{TimeZone, Utc};
use ferry_core::FileNameFormatter;

fn fixed() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 42).unwrap()
}

#[test]
fn source_file_name_is_verbatim() {
    assert_eq!(
        FileNameFormatter::format("%SourceFileName%", "invoice.csv"),
        "invoice.csv"
    );
    assert_eq!(
        FileNameFormatter::format("%sourcefilename%", "/staging/job/invoice.csv"),
        "invoice.csv"
    );
}

#[test]
fn template_without_tokens_is_unchanged() {
    for template in ["fixed.txt", "100% done.txt", "%unknown%.txt", "a%%b", "%"] {
        assert_eq!(
            FileNameFormatter::format_at(template, "x.csv", &fixed()),
            template
        );
    }
}

#[test]
fn empty_template_falls_back_to_source() {
    assert_eq!(FileNameFormatter::format("", "a.csv"), "a.csv");
    assert_eq!(FileNameFormatter::format("   ", "dir/a.csv"), "a.csv");
}

#[test]
fn date_tokens_share_one_instant() {
    let name = FileNameFormatter::format_at(
        "%yyyyMMdd%_%HHmmss%_%SourceFileName%",
        "a.csv",
        &fixed(),
    );
    assert_eq!(name, "20240307_090542_a.csv");

    let name = FileNameFormatter::format_at(
        "%yyyy-MM-dd_HH-mm-ss%-%yyyyMMdd_HHmmss%-%yyyyMMddHHmmss%",
        "a",
        &fixed(),
    );
    assert_eq!(name, "2024-03-07_09-05-42-20240307_090542-20240307090542");
}

#[test]
fn exact_case_lowercase_mm_is_minute_not_month() {
    // A plain case-insensitive scan would expand %mm% to the month ("03").
    let name = FileNameFormatter::format_at("%yyyy%%MM%%dd%-%HH%%mm%%ss%", "a", &fixed());
    assert_eq!(name, "20240307-090542");
    assert_eq!(FileNameFormatter::format_at("%mm%", "a", &fixed()), "05");
    assert_eq!(FileNameFormatter::format_at("%Mm%", "a", &fixed()), "03");
}

#[test]
fn tokens_match_case_insensitively() {
    assert_eq!(
        FileNameFormatter::format_at("%YYYYMMDD%.log", "a", &fixed()),
        "20240307.log"
    );
    assert_eq!(
        FileNameFormatter::format_at("%hhmmss%", "a", &fixed()),
        "090542"
    );
}

#[test]
fn substituted_source_name_is_not_rescanned() {
    assert_eq!(
        FileNameFormatter::format_at("%SourceFileName%", "odd%HH%name.txt", &fixed()),
        "odd%HH%name.txt"
    );
}

#[test]
fn unknown_token_does_not_swallow_following_token() {
    assert_eq!(
        FileNameFormatter::format_at("%foo%HH%", "a", &fixed()),
        "%foo09"
    );
}

#[test]
fn bare_names_keep_backslashes() {
    assert_eq!(
        FileNameFormatter::format_name_at("%SourceFileName%", "x\\y.csv", &fixed()),
        "x\\y.csv"
    );
    assert_eq!(
        FileNameFormatter::format_at("%SourceFileName%", "x\\y.csv", &fixed()),
        "y.csv"
    );
}
