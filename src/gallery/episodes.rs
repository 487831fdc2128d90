//! Compact episode lists: `[1, 2, 3, 7, 9, 10]` renders as `1-3, 7, 9-10`

/// Episode numbers from episode URLs; a trailing segment that is not a number counts as 0
pub fn episode_numbers<S: AsRef<str>>(urls: &[S]) -> Vec<u32> {
    urls.iter()
        .map(|url| {
            url.as_ref()
                .rsplit('/')
                .next()
                .and_then(|segment| segment.parse().ok())
                .unwrap_or(0)
        })
        .collect()
}

/// Sorted, run-collapsed episode list
pub fn format_episode_ranges<S: AsRef<str>>(urls: &[S]) -> String {
    let mut numbers = episode_numbers(urls);
    numbers.sort_unstable();
    numbers.dedup();

    let mut ranges: Vec<String> = Vec::new();
    let mut iter = numbers.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let (mut start, mut end) = (first, first);
    for number in iter {
        if number == end + 1 {
            end = number;
        } else {
            ranges.push(render_run(start, end));
            start = number;
            end = number;
        }
    }
    ranges.push(render_run(start, end));

    ranges.join(", ")
}

fn render_run(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

pub fn episode_label(count: usize) -> &'static str {
    if count == 1 {
        "Episode"
    } else {
        "Episodes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(numbers: &[u32]) -> Vec<String> {
        numbers
            .iter()
            .map(|n| format!("https://rickandmortyapi.com/api/episode/{}", n))
            .collect()
    }

    #[test]
    fn test_collapses_runs() {
        assert_eq!(format_episode_ranges(&urls(&[1, 2, 3, 7, 9, 10])), "1-3, 7, 9-10");
    }

    #[test]
    fn test_sorts_before_collapsing() {
        assert_eq!(format_episode_ranges(&urls(&[10, 2, 1, 9])), "1-2, 9-10");
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(format_episode_ranges(&urls(&[28])), "28");
        assert_eq!(format_episode_ranges::<String>(&[]), "");
    }

    #[test]
    fn test_repeated_episode_keeps_run() {
        assert_eq!(format_episode_ranges(&urls(&[4, 5, 5, 6])), "4-6");
    }

    #[test]
    fn test_unparseable_segment_counts_as_zero() {
        assert_eq!(episode_numbers(&["https://example.com/episode/pilot"]), vec![0]);
        assert_eq!(format_episode_ranges(&["bogus", "https://x/episode/1"]), "0-1");
    }

    #[test]
    fn test_label() {
        assert_eq!(episode_label(1), "Episode");
        assert_eq!(episode_label(0), "Episodes");
        assert_eq!(episode_label(41), "Episodes");
    }
}
