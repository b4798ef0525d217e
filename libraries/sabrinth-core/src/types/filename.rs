/// Filename-derived metadata
///
/// Last-resort metadata source: when neither embedded tags nor a sidecar
/// document yield anything, the file stem still gives a displayable title and
/// often an artist ("01 - Artist - Title.mp3" layouts are common in ripped
/// and downloaded collections).
use std::path::Path;

/// Separators conventionally used between artist and title in file names
const ARTIST_TITLE_SEPARATORS: [&str; 3] = [" - ", " \u{2014} ", " \u{2013} "];

/// Result of parsing a file stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    /// Artist portion, when the stem contains a recognized separator
    pub artist: Option<String>,
    /// Title portion, never empty
    pub title: String,
}

/// Parse artist and title out of a file name
///
/// Underscores are treated as spaces, a leading track index ("01 - ", "07.")
/// is stripped, and the first artist/title separator splits the remainder.
pub fn parse_stem(path: &Path) -> ParsedFilename {
    let stem = path
        .file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let despaced = stem.replace('_', " ");
    let cleaned = strip_track_index(&despaced).trim();

    for sep in ARTIST_TITLE_SEPARATORS {
        if let Some((artist, title)) = cleaned.split_once(sep) {
            let artist = artist.trim();
            let title = title.trim();
            if !artist.is_empty() && !title.is_empty() {
                return ParsedFilename {
                    artist: Some(artist.to_string()),
                    title: title.to_string(),
                };
            }
        }
    }

    let title = if cleaned.is_empty() {
        stem.trim().to_string()
    } else {
        cleaned.to_string()
    };
    ParsedFilename {
        artist: None,
        title: if title.is_empty() {
            "Unknown".to_string()
        } else {
            title
        },
    }
}

/// Strip a leading track index like "01 - ", "3. " or "12 "
fn strip_track_index(stem: &str) -> &str {
    let trimmed = stem.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 3 {
        return trimmed;
    }
    let rest = &trimmed[digits..];
    let rest_trimmed = rest.trim_start();
    let after_sep = rest_trimmed
        .strip_prefix('-')
        .or_else(|| rest_trimmed.strip_prefix('.'))
        .or_else(|| rest_trimmed.strip_prefix('_'));
    match after_sep {
        Some(tail) if !tail.trim().is_empty() => tail.trim_start(),
        // A bare "12 Title" only counts as an index when a space follows
        None if rest.starts_with(' ') && !rest_trimmed.is_empty() => rest_trimmed,
        _ => trimmed,
    }
}

/// Normalize a tag value, mapping whitespace-only strings to `None`
pub fn clean_text(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extract a four-digit year from the front of a date string ("20210317",
/// "2021-03-17", "2021")
pub fn parse_year(value: &str) -> Option<u32> {
    let digits: String = value.trim().chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_artist_and_title() {
        let parsed = parse_stem(Path::new("/music/Daft Punk - Aerodynamic.mp3"));
        assert_eq!(parsed.artist.as_deref(), Some("Daft Punk"));
        assert_eq!(parsed.title, "Aerodynamic");
    }

    #[test]
    fn strips_leading_track_index() {
        let parsed = parse_stem(Path::new("01 - Artist - Song.flac"));
        assert_eq!(parsed.artist.as_deref(), Some("Artist"));
        assert_eq!(parsed.title, "Song");

        let parsed = parse_stem(Path::new("07. Interlude.mp3"));
        assert_eq!(parsed.artist, None);
        assert_eq!(parsed.title, "Interlude");
    }

    #[test]
    fn underscores_become_spaces() {
        let parsed = parse_stem(Path::new("some_song_name.ogg"));
        assert_eq!(parsed.title, "some song name");
    }

    #[test]
    fn underscored_stem_with_track_index() {
        let parsed = parse_stem(Path::new("03_-_Artist_-_Deep_Cut.mp3"));
        assert_eq!(parsed.artist.as_deref(), Some("Artist"));
        assert_eq!(parsed.title, "Deep Cut");
    }

    #[test]
    fn plain_title_without_separator() {
        let parsed = parse_stem(Path::new("Bohemian Rhapsody.m4a"));
        assert_eq!(parsed.artist, None);
        assert_eq!(parsed.title, "Bohemian Rhapsody");
    }

    #[test]
    fn year_prefix_parsing() {
        assert_eq!(parse_year("20210317"), Some(2021));
        assert_eq!(parse_year("1999-12-31"), Some(1999));
        assert_eq!(parse_year("n/a"), None);
        assert_eq!(parse_year("99"), None);
    }

    #[test]
    fn clean_text_drops_blank_values() {
        assert_eq!(clean_text("  "), None);
        assert_eq!(clean_text(" Queen "), Some("Queen".to_string()));
    }
}
