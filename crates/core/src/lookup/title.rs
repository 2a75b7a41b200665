//! Title normalization and search-candidate selection.

use crate::rating::SearchHit;

/// Release years this far apart still count as the same film.
pub const YEAR_TOLERANCE: i64 = 1;

/// Lowercase, drop apostrophes, turn other punctuation into spaces and
/// collapse whitespace. `&` reads as "and".
pub fn normalize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        match c {
            '\'' | '\u{2019}' | '`' => {}
            '&' => out.push_str(" and "),
            c if c.is_alphanumeric() => out.extend(c.to_lowercase()),
            _ => out.push(' '),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pick the search hit that best matches `title` / `year`.
///
/// Non-movie hits are ignored. Hits whose normalized name equals the
/// normalized title are preferred; within that pool the closest release year
/// inside [`YEAR_TOLERANCE`] wins, earliest in service order on ties. Without a
/// year match a hit is only accepted when it is the single exact title match.
pub fn select_candidate<'a>(
    hits: &'a [SearchHit],
    title: &str,
    year: Option<i32>,
) -> Option<&'a SearchHit> {
    let wanted = normalize_title(title);
    let movies: Vec<&SearchHit> = hits.iter().filter(|h| h.is_movie()).collect();
    let title_matches: Vec<&SearchHit> = movies
        .iter()
        .copied()
        .filter(|h| normalize_title(&h.name) == wanted)
        .collect();

    let pool = if title_matches.is_empty() {
        &movies
    } else {
        &title_matches
    };

    if let Some(year) = year {
        let closest = pool
            .iter()
            .enumerate()
            .filter_map(|(idx, hit)| {
                let distance = (i64::from(hit.release_year?) - i64::from(year)).abs();
                (distance <= YEAR_TOLERANCE).then_some((distance, idx, *hit))
            })
            .min_by_key(|(distance, idx, _)| (*distance, *idx));

        if let Some((_, _, hit)) = closest {
            return Some(hit);
        }
    }

    match title_matches.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}
