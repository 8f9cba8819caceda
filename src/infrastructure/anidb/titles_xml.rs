//! SAX-style parser for the anidb titles dump (`anime-titles.xml`, usually
//! gzip-compressed on disk). Streams `<title>` elements, each carrying the
//! surrounding `<anime aid=…>` wrapper's id.

use std::io::Read;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::entities::Title;
use crate::shared::error::ParseError;

fn maybe_decompress(data: &[u8]) -> std::borrow::Cow<'_, [u8]> {
    if data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b {
        let mut decoder = flate2::read::GzDecoder::new(data);
        let mut out = Vec::new();
        if decoder.read_to_end(&mut out).is_ok() {
            return std::borrow::Cow::Owned(out);
        }
    }
    std::borrow::Cow::Borrowed(data)
}

/// Parses the titles dump into one `Title` per `<title>` element, each
/// stamped with the enclosing `<anime aid=…>`'s id. `type="syn"` is
/// rewritten to `synonym`.
pub fn parse_titles_xml(data: &[u8]) -> Result<Vec<Title>, ParseError> {
    let decompressed = maybe_decompress(data);
    let mut reader = Reader::from_reader(decompressed.as_ref());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut titles = Vec::new();
    let mut current_aid = String::new();
    let mut pending: Option<(String, String)> = None; // (lang, type)

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = e.name();
                let local = String::from_utf8_lossy(local.as_ref()).to_string();
                if local == "anime" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"aid" {
                            current_aid = String::from_utf8_lossy(&attr.value).to_string();
                        }
                    }
                } else if local == "title" {
                    let mut lang = String::new();
                    let mut r#type = String::new();
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"xml:lang" => lang = value,
                            b"type" => r#type = value,
                            _ => {}
                        }
                    }
                    if r#type == "syn" {
                        r#type = "synonym".to_string();
                    }
                    pending = Some((lang, r#type));
                }
            }
            Ok(Event::Text(e)) => {
                if let Some((lang, r#type)) = pending.take() {
                    let value = e.unescape().map_err(|e| ParseError::Xml {
                        name: "anime-titles.xml".to_string(),
                        source: quick_xml::DeError::from(e),
                    })?;
                    titles.push(
                        Title::new(value.into_owned())
                            .with_aid(current_aid.clone())
                            .with_lang(lang)
                            .with_type(r#type),
                    );
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ParseError::Xml {
                    name: "anime-titles.xml".to_string(),
                    source: quick_xml::DeError::from(e),
                })
            }
        }
        buf.clear();
    }

    Ok(titles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<animetitles>
<anime aid="1">
<title xml:lang="en" type="main">Cowboy Bebop</title>
<title xml:lang="en" type="syn">Space Warriors</title>
</anime>
<anime aid="2">
<title xml:lang="ja" type="official">Macross</title>
</anime>
</animetitles>"#;

    #[test]
    fn parses_titles_with_enclosing_aid() {
        let titles = parse_titles_xml(SAMPLE.as_bytes()).unwrap();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[0].aid, "1");
        assert_eq!(titles[0].r#type, "main");
        assert_eq!(titles[1].r#type, "synonym");
        assert_eq!(titles[2].aid, "2");
    }

    #[test]
    fn decompresses_gzip_input_transparently() {
        use std::io::Write;
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        let gz = encoder.finish().unwrap();

        let titles = parse_titles_xml(&gz).unwrap();
        assert_eq!(titles.len(), 3);
    }
}
