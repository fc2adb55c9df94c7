use crate::store::{ExcludeList, LinkRecord, LinkStats};

/// A link filter drops records and keeps the survivors in order. Removals
/// are attributed to the filter's stats bucket by the chain runner.
pub trait LinkFilter {
    fn name(&self) -> &'static str;
    fn apply(&self, links: Vec<LinkRecord>) -> Vec<LinkRecord>;
}

/// Run filters in registration order, recording each one's removal count.
pub fn apply_filters(
    filters: &[&dyn LinkFilter],
    mut links: Vec<LinkRecord>,
    stats: &mut LinkStats,
) -> Vec<LinkRecord> {
    for filter in filters {
        let before = links.len();
        links = filter.apply(links);
        stats.record_removed(filter.name(), before - links.len());
    }
    links
}

const CLIENT_SIDE_PREFIXES: [&str; 4] = ["tel:", "mailto:", "#", "javascript:"];

/// Drops client-side references (tel:, mailto:, fragments, javascript:).
pub struct ClientSideFilter;

impl LinkFilter for ClientSideFilter {
    fn name(&self) -> &'static str {
        "client_side_links"
    }

    fn apply(&self, links: Vec<LinkRecord>) -> Vec<LinkRecord> {
        links
            .into_iter()
            .filter(|link| {
                let href = link.href.to_lowercase();
                !CLIENT_SIDE_PREFIXES.iter().any(|p| href.starts_with(p))
            })
            .collect()
    }
}

/// Drops records whose href is on the exclude list.
pub struct ExcludeListFilter<'a> {
    exclude: &'a ExcludeList,
}

impl<'a> ExcludeListFilter<'a> {
    pub fn new(exclude: &'a ExcludeList) -> Self {
        Self { exclude }
    }
}

impl LinkFilter for ExcludeListFilter<'_> {
    fn name(&self) -> &'static str {
        "excluded_links"
    }

    fn apply(&self, links: Vec<LinkRecord>) -> Vec<LinkRecord> {
        links
            .into_iter()
            .filter(|link| !self.exclude.contains(&link.href))
            .collect()
    }
}

const VIDEO_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Partition links into (video, minutes) by video-host substring. Total:
/// every input lands in exactly one of the two outputs.
pub fn split_video_links(links: Vec<LinkRecord>) -> (Vec<LinkRecord>, Vec<LinkRecord>) {
    let mut video = Vec::new();
    let mut minutes = Vec::new();

    for link in links {
        let href = link.href.to_lowercase();
        if VIDEO_HOSTS.iter().any(|host| href.contains(host)) {
            video.push(link);
        } else {
            minutes.push(link);
        }
    }

    (video, minutes)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn record(href: &str) -> LinkRecord {
        LinkRecord::new(href, "")
    }

    #[test]
    fn client_side_prefixes_removed_any_case() {
        let links = vec![
            record("tel:+16175551234"),
            record("MAILTO:board@example.gov"),
            record("#main-content"),
            record("JavaScript:void(0)"),
            record("/minutes/03-01-2023.pdf"),
            record("https://example.gov/agenda"),
        ];
        let kept = ClientSideFilter.apply(links);
        let hrefs: Vec<&str> = kept.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["/minutes/03-01-2023.pdf", "https://example.gov/agenda"]
        );
    }

    #[test]
    fn exclude_filter_matches_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclude.json");
        std::fs::write(&path, r#"["/bad.pdf"]"#).unwrap();
        let exclude = ExcludeList::load(&path).unwrap();

        let links = vec![record("/bad.pdf"), record("/bad.pdf?v=2"), record("/good.pdf")];
        let kept = ExcludeListFilter::new(&exclude).apply(links);
        let hrefs: Vec<&str> = kept.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/bad.pdf?v=2", "/good.pdf"]);
    }

    #[test]
    fn chain_preserves_order_and_accounts_for_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclude.json");
        std::fs::write(&path, r#"["/excluded.pdf"]"#).unwrap();
        let exclude = ExcludeList::load(&path).unwrap();

        let links = vec![
            record("/first.pdf"),
            record("mailto:x@example.gov"),
            record("/excluded.pdf"),
            record("/second.pdf"),
            record("#top"),
            record("/third.pdf"),
        ];
        let total = links.len();

        let client_side = ClientSideFilter;
        let exclude_filter = ExcludeListFilter::new(&exclude);
        let chain: [&dyn LinkFilter; 2] = [&client_side, &exclude_filter];

        let mut stats = LinkStats::default();
        let kept = apply_filters(&chain, links, &mut stats);

        let hrefs: Vec<&str> = kept.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/first.pdf", "/second.pdf", "/third.pdf"]);
        assert_eq!(stats.client_side_links, 2);
        assert_eq!(stats.excluded_links, 1);
        assert_eq!(
            stats.client_side_links + stats.excluded_links + kept.len(),
            total
        );
    }

    #[test]
    fn video_split_is_a_total_partition() {
        let links = vec![
            record("https://www.youtube.com/watch?v=abc"),
            record("/minutes/03-01-2023.pdf"),
            record("https://YOUTU.BE/xyz"),
            record("/agenda"),
        ];
        let total = links.len();

        let (video, minutes) = split_video_links(links);
        assert_eq!(video.len() + minutes.len(), total);
        assert_eq!(video.len(), 2);
        assert!(minutes.iter().all(|l| !l.href.to_lowercase().contains("youtu")));
    }

    #[test]
    fn empty_input_passes_through() {
        let mut stats = LinkStats::default();
        let client_side = ClientSideFilter;
        let chain: [&dyn LinkFilter; 1] = [&client_side];
        let kept = apply_filters(&chain, Vec::new(), &mut stats);
        assert!(kept.is_empty());
        assert_eq!(stats.client_side_links, 0);
    }
}
