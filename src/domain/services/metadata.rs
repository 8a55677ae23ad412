//! Track metadata extraction from upload filenames.
//!
//! Bulk uploads usually arrive as files named like
//! `"03 - Daft Punk - Digital Love.mp3"` or
//! `"Get Lucky (feat. Pharrell Williams).flac"`. The browser may also send
//! tags it read from the file; those always win over what the filename
//! suggests.

use serde::{Deserialize, Serialize};

/// Metadata known about a track before it exists in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub featured_artists: Vec<String>,
    pub track_number: Option<u32>,
    pub duration_ms: Option<i32>,
}

impl TrackMetadata {
    /// Fill gaps in `self` (client tags) from `fallback` (filename).
    pub fn merged_with(self, fallback: TrackMetadata) -> TrackMetadata {
        TrackMetadata {
            title: self.title.filter(|t| !t.trim().is_empty()).or(fallback.title),
            artists: if self.artists.is_empty() {
                fallback.artists
            } else {
                self.artists
            },
            featured_artists: if self.featured_artists.is_empty() {
                fallback.featured_artists
            } else {
                self.featured_artists
            },
            track_number: self.track_number.or(fallback.track_number),
            duration_ms: self.duration_ms.or(fallback.duration_ms),
        }
    }
}

const FEAT_MARKERS: &[&str] = &["feat.", "ft.", "featuring"];

/// Parse what we can out of a filename.
pub fn extract_from_filename(filename: &str) -> TrackMetadata {
    // Drop any directory part a browser might send along.
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    let stem = stem.replace('_', " ");
    let (track_number, rest) = split_track_number(stem.trim());

    let parts: Vec<&str> = rest
        .split(" - ")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let (artist_part, title_part) = match parts.as_slice() {
        [] => (None, None),
        [title] => (None, Some(title.to_string())),
        [artist, title @ ..] => (Some(*artist), Some(title.join(" - "))),
    };

    let mut featured_artists = Vec::new();
    let title = title_part.map(|t| {
        let (clean, featured) = split_featuring(&t);
        featured_artists.extend(featured);
        clean
    });

    let mut artists = Vec::new();
    if let Some(artist_part) = artist_part {
        let (main, featured) = split_featuring(artist_part);
        artists = split_artist_list(&main);
        featured_artists.extend(featured);
    }

    TrackMetadata {
        title: title.filter(|t| !t.is_empty()),
        artists,
        featured_artists,
        track_number,
        duration_ms: None,
    }
}

/// Split a leading track number: `"03 - Title"`, `"3. Title"`, `"03 Title"`.
fn split_track_number(input: &str) -> (Option<u32>, &str) {
    let digits = input.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || digits > 3 {
        return (None, input);
    }
    let rest = &input[digits..];
    let trimmed = rest.trim_start_matches([' ', '.', '-', ')']);
    // Require a separator, so "2Pac - Changes" keeps its artist.
    if trimmed.len() == rest.len() || trimmed.is_empty() {
        return (None, input);
    }
    (input[..digits].parse().ok(), trimmed.trim_start())
}

/// Pull a `(feat. X, Y)` / `feat. X` clause out of a string.
fn split_featuring(input: &str) -> (String, Vec<String>) {
    for marker in FEAT_MARKERS {
        let Some(pos) = find_word(input, marker) else {
            continue;
        };

        let bracketed = pos > 0 && matches!(input.as_bytes()[pos - 1], b'(' | b'[');
        let start = if bracketed { pos - 1 } else { pos };
        let after = &input[pos + marker.len()..];
        let (names, tail) = if bracketed {
            match after.find([')', ']']) {
                Some(end) => (&after[..end], &after[end + 1..]),
                None => (after, ""),
            }
        } else {
            (after, "")
        };

        let clean = format!("{}{}", input[..start].trim_end(), tail.trim_end());
        return (clean.trim().to_string(), split_artist_list(names));
    }
    (input.trim().to_string(), Vec::new())
}

/// Find the ASCII `marker`, ignoring case, where it starts a word.
///
/// Matches are byte-wise against `haystack` itself, so the returned offset
/// and `offset + marker.len()` are always char boundaries.
fn find_word(haystack: &str, marker: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let needle = marker.as_bytes();
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        bytes[i..].len() >= needle.len()
            && bytes[i..i + needle.len()].eq_ignore_ascii_case(needle)
            && (i == 0 || matches!(bytes[i - 1], b' ' | b'(' | b'['))
    })
}

fn split_artist_list(input: &str) -> Vec<String> {
    input
        .split([',', '&'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_number_artist_title() {
        let meta = extract_from_filename("03 - Daft Punk - Digital Love.mp3");
        assert_eq!(
            meta,
            TrackMetadata {
                title: Some("Digital Love".into()),
                artists: vec!["Daft Punk".into()],
                featured_artists: vec![],
                track_number: Some(3),
                duration_ms: None,
            }
        );
    }

    #[test]
    fn test_title_only() {
        let meta = extract_from_filename("Intro.flac");
        assert_eq!(meta.title.as_deref(), Some("Intro"));
        assert!(meta.artists.is_empty());
        assert_eq!(meta.track_number, None);
    }

    #[test]
    fn test_featuring_in_title() {
        let meta = extract_from_filename("Daft Punk - Get Lucky (feat. Pharrell Williams & Nile Rodgers).wav");
        assert_eq!(meta.title.as_deref(), Some("Get Lucky"));
        assert_eq!(meta.artists, vec!["Daft Punk".to_string()]);
        assert_eq!(
            meta.featured_artists,
            vec!["Pharrell Williams".to_string(), "Nile Rodgers".to_string()]
        );
    }

    #[test]
    fn test_featuring_in_artist_part() {
        let meta = extract_from_filename("Calvin Harris ft. Rihanna - This Is What You Came For.mp3");
        assert_eq!(meta.artists, vec!["Calvin Harris".to_string()]);
        assert_eq!(meta.featured_artists, vec!["Rihanna".to_string()]);
        assert_eq!(meta.title.as_deref(), Some("This Is What You Came For"));
    }

    #[test]
    fn test_artist_list_and_underscores() {
        let meta = extract_from_filename("1._Simon_&_Garfunkel_-_The_Boxer.ogg");
        assert_eq!(meta.track_number, Some(1));
        assert_eq!(
            meta.artists,
            vec!["Simon".to_string(), "Garfunkel".to_string()]
        );
        assert_eq!(meta.title.as_deref(), Some("The Boxer"));
    }

    #[test]
    fn test_leading_digits_without_separator_are_kept() {
        let meta = extract_from_filename("2Pac - Changes.mp3");
        assert_eq!(meta.track_number, None);
        assert_eq!(meta.artists, vec!["2Pac".to_string()]);
    }

    #[test]
    fn test_title_with_dashes() {
        let meta = extract_from_filename("Artist - Part 1 - Part 2.mp3");
        assert_eq!(meta.title.as_deref(), Some("Part 1 - Part 2"));
    }

    #[test]
    fn test_path_is_ignored() {
        let meta = extract_from_filename("C:\\music\\album\\07 Song.mp3");
        assert_eq!(meta.track_number, Some(7));
        assert_eq!(meta.title.as_deref(), Some("Song"));
    }

    #[test]
    fn test_featuring_is_case_insensitive() {
        let meta = extract_from_filename("Artist - Song FEAT. Guest.mp3");
        assert_eq!(meta.title.as_deref(), Some("Song"));
        assert_eq!(meta.featured_artists, vec!["Guest".to_string()]);
    }

    #[test]
    fn test_featuring_after_case_changing_characters() {
        // U+212A KELVIN SIGN lowercases to a shorter ASCII 'k'
        let meta = extract_from_filename("Artist - \u{212A}\u{212A}\u{212A}\u{212A} ééééééé feat. Bob.mp3");
        assert_eq!(
            meta.title.as_deref(),
            Some("\u{212A}\u{212A}\u{212A}\u{212A} ééééééé")
        );
        assert_eq!(meta.featured_artists, vec!["Bob".to_string()]);

        let meta = extract_from_filename("İstanbul Ⱥ (ft. Ünal) - Şarkı.flac");
        assert_eq!(meta.artists, vec!["İstanbul Ⱥ".to_string()]);
        assert_eq!(meta.featured_artists, vec!["Ünal".to_string()]);
        assert_eq!(meta.title.as_deref(), Some("Şarkı"));
    }

    #[test]
    fn test_merge_prefers_client_tags() {
        let tags = TrackMetadata {
            title: Some("Tagged".into()),
            duration_ms: Some(1000),
            ..Default::default()
        };
        let from_name = extract_from_filename("05 - Someone - Named.mp3");
        let merged = tags.merged_with(from_name);
        assert_eq!(merged.title.as_deref(), Some("Tagged"));
        assert_eq!(merged.artists, vec!["Someone".to_string()]);
        assert_eq!(merged.track_number, Some(5));
        assert_eq!(merged.duration_ms, Some(1000));
    }

    #[test]
    fn test_merge_ignores_blank_title() {
        let tags = TrackMetadata {
            title: Some("   ".into()),
            ..Default::default()
        };
        let merged = tags.merged_with(extract_from_filename("Real Title.mp3"));
        assert_eq!(merged.title.as_deref(), Some("Real Title"));
    }
}
