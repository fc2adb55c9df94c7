use std::sync::LazyLock;

use regex::Regex;

use crate::store::LinkRecord;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// "March 3rd, 2023" / "march 3" — month names spelled out, ordinal suffix
// and year optional.
static BODY_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)({})[\s,]+(\d{{1,2}})(?:st|nd|rd|th)?(?:,\s*(\d{{4}}))?",
        MONTH_NAMES.join("|")
    ))
    .unwrap()
});

// "02-02-2022" / "07-04-23" anywhere in the decoded href.
static HREF_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})-(\d{1,2})-(\d{2,4})").unwrap());

// "April 5 2021" with arbitrary non-digit separators in the decoded href.
static HREF_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)({})[^\d]*(\d{{1,2}})[^\d]*(\d{{4}})",
        MONTH_NAMES.join("|")
    ))
    .unwrap()
});

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// Infer a `YYYY-MM-DD` date from a link's visible text and href.
///
/// Three strategies run in order: spelled-out date in the body, numeric
/// `MM-DD-YY(YY)` in the href, month name in the href. The first strategy to
/// resolve a component wins it; later strategies only fill what is still
/// missing. Components nothing resolves come back as the literal `yyyy`,
/// `mm`, `dd` placeholders, so the result is never empty.
pub fn infer_date(body: &str, href: &str) -> String {
    let mut year: Option<String> = None;
    let mut month: Option<String> = None;
    let mut day: Option<String> = None;

    let decoded = urlencoding::decode(href)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| href.to_string());

    if let Some(caps) = BODY_MONTH_DAY.captures(body) {
        // An alternation miss can't reach here, but an unrecognized month
        // name must read as "no match", not a panic.
        if let Some(m) = month_number(&caps[1]) {
            month = Some(format!("{m:02}"));
            if let Ok(d) = caps[2].parse::<u32>() {
                day = Some(format!("{d:02}"));
            }
            year = caps.get(3).map(|y| y.as_str().to_string());
        }
    }

    if month.is_none() || day.is_none() || year.is_none() {
        if let Some(caps) = HREF_NUMERIC.captures(&decoded) {
            if month.is_none() {
                if let Ok(m) = caps[1].parse::<u32>() {
                    month = Some(format!("{m:02}"));
                }
            }
            if day.is_none() {
                if let Ok(d) = caps[2].parse::<u32>() {
                    day = Some(format!("{d:02}"));
                }
            }
            if year.is_none() {
                if let Ok(mut y) = caps[3].parse::<u32>() {
                    if y < 100 {
                        y += 2000;
                    }
                    year = Some(y.to_string());
                }
            }
        }
    }

    if month.is_none() || day.is_none() || year.is_none() {
        if let Some(caps) = HREF_MONTH.captures(&decoded) {
            if let Some(m) = month_number(&caps[1]) {
                if month.is_none() {
                    month = Some(format!("{m:02}"));
                }
                if day.is_none() {
                    if let Ok(d) = caps[2].parse::<u32>() {
                        day = Some(format!("{d:02}"));
                    }
                }
                if year.is_none() {
                    year = Some(caps[3].to_string());
                }
            }
        }
    }

    format!(
        "{}-{}-{}",
        year.as_deref().unwrap_or("yyyy"),
        month.as_deref().unwrap_or("mm"),
        day.as_deref().unwrap_or("dd"),
    )
}

/// Stamp every record with its inferred date.
pub fn add_dates(links: Vec<LinkRecord>) -> Vec<LinkRecord> {
    links
        .into_iter()
        .map(|mut link| {
            link.date = Some(infer_date(&link.body, &link.href));
            link
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_wins_over_href() {
        let date = infer_date(
            "Meeting on March 3rd, 2023",
            "https://example.gov/minutes/02-02-2022/file",
        );
        assert_eq!(date, "2023-03-03");
    }

    #[test]
    fn numeric_href_with_short_year() {
        let date = infer_date("", "https://example.gov/07-04-23/doc.pdf");
        assert_eq!(date, "2023-07-04");
    }

    #[test]
    fn numeric_href_with_full_year() {
        let date = infer_date("", "/sites/default/files/minutes_12-19-2022.pdf");
        assert_eq!(date, "2022-12-19");
    }

    #[test]
    fn no_cues_yields_placeholders() {
        assert_eq!(infer_date("Agenda", "/about-us"), "yyyy-mm-dd");
    }

    #[test]
    fn body_without_year_filled_from_href() {
        // Body seeds month and day; only the year comes from the href.
        let date = infer_date("March 3rd", "/minutes/02-02-2022/file");
        assert_eq!(date, "2022-03-03");
    }

    #[test]
    fn body_without_year_alone_keeps_placeholder() {
        assert_eq!(infer_date("Hearing May 7", "/hearing"), "yyyy-05-07");
    }

    #[test]
    fn named_month_in_percent_encoded_href() {
        let date = infer_date("", "/files/Voting%20Minutes%20April%205%2C%202021.pdf");
        assert_eq!(date, "2021-04-05");
    }

    #[test]
    fn named_month_in_href_with_separators() {
        assert_eq!(infer_date("", "/docs/September_14_2020_minutes.pdf"), "2020-09-14");
    }

    #[test]
    fn body_match_is_case_insensitive() {
        assert_eq!(infer_date("MEETING JANUARY 9, 2024", ""), "2024-01-09");
    }

    #[test]
    fn ordinal_suffixes() {
        assert_eq!(infer_date("June 1st, 2022", ""), "2022-06-01");
        assert_eq!(infer_date("June 2nd, 2022", ""), "2022-06-02");
        assert_eq!(infer_date("June 23rd, 2022", ""), "2022-06-23");
    }

    #[test]
    fn two_digit_year_boundary() {
        assert_eq!(infer_date("", "/07-04-99/doc.pdf"), "2099-07-04");
    }

    #[test]
    fn add_dates_stamps_every_record() {
        let links = vec![
            LinkRecord::new("/02-02-2022/a.pdf", ""),
            LinkRecord::new("/nowhere", "no date here"),
        ];
        let dated = add_dates(links);
        assert_eq!(dated[0].date.as_deref(), Some("2022-02-02"));
        assert_eq!(dated[1].date.as_deref(), Some("yyyy-mm-dd"));
    }
}
