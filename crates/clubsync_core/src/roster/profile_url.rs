//! Member portfolio link derivation.

/// Builds `{base}/{segment}` from a display name.
///
/// Spaces become `_` and a handful of Latin accents are transliterated; the
/// segment is the longest prefix of `[A-Za-z0-9_]`. A truncated segment is
/// logged and still used. `None` when nothing usable remains.
pub fn derive_internal_profile_url(base_url: &str, display_name: &str) -> Option<String> {
    let tweaked: String = display_name.trim().chars().map(transliterate).collect();
    let segment: String = tweaked
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();

    if segment.len() != tweaked.len() {
        log::warn!(
            "event=profile_url module=roster status=truncated name=\"{}\" segment={}",
            display_name,
            segment
        );
    }
    if segment.is_empty() {
        return None;
    }
    Some(format!("{}/{}", base_url.trim_end_matches('/'), segment))
}

fn transliterate(ch: char) -> char {
    match ch {
        ' ' => '_',
        'á' => 'a',
        'é' | 'ë' => 'e',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::derive_internal_profile_url;

    const BASE: &str = "https://www.fotogroepwaalre.nl/fotos";

    #[test]
    fn transliterates_known_accents() {
        assert_eq!(
            derive_internal_profile_url(BASE, "José Daniëls").as_deref(),
            Some("https://www.fotogroepwaalre.nl/fotos/Jose_Daniels")
        );
        assert_eq!(
            derive_internal_profile_url(BASE, "François Hermans").as_deref(),
            Some("https://www.fotogroepwaalre.nl/fotos/Francois_Hermans")
        );
    }

    #[test]
    fn unknown_characters_truncate() {
        assert_eq!(
            derive_internal_profile_url(BASE, "Ekin Özbiçer").as_deref(),
            Some("https://www.fotogroepwaalre.nl/fotos/Ekin_")
        );
        assert_eq!(derive_internal_profile_url(BASE, "Øyvind"), None);
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        assert_eq!(
            derive_internal_profile_url("https://example.nl/", "An Anders").as_deref(),
            Some("https://example.nl/An_Anders")
        );
    }
}
