//! Classifies an anidb `<error>` XML root returned inside an otherwise
//! successful HTTP response. anidb signals not-found, client bans, and
//! everything else through the text of this one element rather than
//! distinct HTTP statuses.

use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnidbErrorKind {
    NotFound,
    Banned,
    Unknown(String),
}

/// `None` means the document is a regular `<anime>` root, not an error.
pub fn classify_error_document(data: &[u8]) -> Option<AnidbErrorKind> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_error = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"error" {
                    in_error = true;
                } else if in_error {
                    // nested markup inside <error> is unexpected; bail out
                    // rather than misclassify based on a stray child tag.
                } else {
                    return None;
                }
            }
            Ok(Event::Text(e)) if in_error => {
                if let Ok(unescaped) = e.unescape() {
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
        buf.clear();
    }

    if !in_error {
        return None;
    }

    let lowered = text.to_lowercase();
    if lowered.contains("not found") || lowered.contains("no such anime") {
        Some(AnidbErrorKind::NotFound)
    } else if lowered.contains("banned") {
        Some(AnidbErrorKind::Banned)
    } else {
        Some(AnidbErrorKind::Unknown(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_not_found() {
        let doc = br#"<error>anime not found</error>"#;
        assert_eq!(classify_error_document(doc), Some(AnidbErrorKind::NotFound));
    }

    #[test]
    fn classifies_banned() {
        let doc = br#"<error>client banned - too many requests</error>"#;
        assert_eq!(classify_error_document(doc), Some(AnidbErrorKind::Banned));
    }

    #[test]
    fn classifies_unknown_error_text() {
        let doc = br#"<error>internal server hiccup</error>"#;
        assert!(matches!(classify_error_document(doc), Some(AnidbErrorKind::Unknown(_))));
    }

    #[test]
    fn regular_anime_document_is_not_an_error() {
        let doc = br#"<anime id="1"><titles/></anime>"#;
        assert_eq!(classify_error_document(doc), None);
    }
}
