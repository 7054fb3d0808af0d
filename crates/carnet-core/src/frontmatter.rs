//! Frontmatter codec for memo bodies.
//!
//! Memo metadata (visibility, geolocation, relations, attachment
//! references) is stored as a delimited block prepended to the free-text
//! content:
//!
//! ```text
//! ---
//! visibility: PUBLIC
//! location_lat: 48.85
//! location_lng: 2.35
//! relations: [{"memo":{"name":"memos/1","snippet":""},"type":"REFERENCE"}]
//! attachments: ["attachments/1700000000000_a.png"]
//! ---
//! the actual note text
//! ```
//!
//! Fields that are absent or hold their default value are omitted, and the
//! block itself is omitted when no field remains, so a plain note
//! round-trips byte-identical. Decoding is line-oriented: the block is
//! recognized only when the body starts with a delimiter line and a closing
//! delimiter line exists; anything else is treated as plain content.

use crate::models::{Location, MemoRelation, Visibility};

/// Delimiter line opening and closing the metadata block.
pub const DELIMITER: &str = "---";

/// Metadata carried by a memo body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoMetadata {
    pub visibility: Option<Visibility>,
    pub location: Option<Location>,
    pub relations: Vec<MemoRelation>,
    /// Attachment resource names (`attachments/{filename}`).
    pub attachments: Vec<String>,
}

impl MemoMetadata {
    /// True when encoding would produce no block.
    ///
    /// `Some(Visibility::Private)` counts as empty: the default visibility
    /// is never written, so it reads back as the implicit default.
    pub fn is_empty(&self) -> bool {
        !matches!(
            self.visibility,
            Some(Visibility::Protected) | Some(Visibility::Public)
        ) && self.location.is_none()
            && self.relations.is_empty()
            && self.attachments.is_empty()
    }
}

/// Outcome of decoding a memo body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A well-formed block was found at the start of the body.
    Block { meta: MemoMetadata, content: String },
    /// No block (or a malformed one); the whole body is content.
    NoBlock(String),
}

impl Decoded {
    /// Collapse into `(metadata, content)`, with empty metadata for the
    /// no-block case.
    pub fn into_parts(self) -> (MemoMetadata, String) {
        match self {
            Decoded::Block { meta, content } => (meta, content),
            Decoded::NoBlock(content) => (MemoMetadata::default(), content),
        }
    }
}

/// Encode metadata as a delimited block, or `None` when every field is
/// absent or default.
pub fn encode(meta: &MemoMetadata) -> Option<String> {
    if meta.is_empty() {
        return None;
    }

    let mut lines = vec![DELIMITER.to_string()];
    if let Some(visibility) = meta.visibility {
        if visibility != Visibility::Private {
            lines.push(format!("visibility: {}", visibility.as_str()));
        }
    }
    if let Some(location) = &meta.location {
        lines.push(format!("location_lat: {}", location.latitude));
        lines.push(format!("location_lng: {}", location.longitude));
    }
    if !meta.relations.is_empty() {
        // Serializing Vec<MemoRelation> cannot fail: no maps, no non-string keys.
        let json = serde_json::to_string(&meta.relations).expect("relations serialize");
        lines.push(format!("relations: {json}"));
    }
    if !meta.attachments.is_empty() {
        let json = serde_json::to_string(&meta.attachments).expect("attachments serialize");
        lines.push(format!("attachments: {json}"));
    }
    lines.push(DELIMITER.to_string());
    Some(lines.join("\n"))
}

/// Build a full memo body: block (when any) followed by the content.
pub fn encode_body(content: &str, meta: &MemoMetadata) -> String {
    match encode(meta) {
        Some(block) => format!("{block}\n{content}"),
        None => content.to_string(),
    }
}

/// Decode a memo body into metadata and content.
///
/// The block is recognized only when the first line is a delimiter and a
/// closing delimiter line follows. A missing closing delimiter, or a block
/// that does not start at the very beginning, yields [`Decoded::NoBlock`]
/// with the entire input as content. Inside a recognized block, unknown
/// keys and unparsable values are skipped key by key.
pub fn decode(body: &str) -> Decoded {
    let mut lines = body.split('\n');
    if lines.next() != Some(DELIMITER) {
        return Decoded::NoBlock(body.to_string());
    }

    let mut meta_lines = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line == DELIMITER {
            closed = true;
            break;
        }
        meta_lines.push(line);
    }
    if !closed {
        return Decoded::NoBlock(body.to_string());
    }

    let content = lines.collect::<Vec<_>>().join("\n");
    Decoded::Block {
        meta: parse_meta_lines(&meta_lines),
        content,
    }
}

/// Convenience wrapper collapsing [`decode`] into `(metadata, content)`.
pub fn decode_parts(body: &str) -> (MemoMetadata, String) {
    decode(body).into_parts()
}

fn parse_meta_lines(lines: &[&str]) -> MemoMetadata {
    let mut meta = MemoMetadata::default();
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;

    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "visibility" => meta.visibility = Visibility::parse(value),
            "location_lat" => latitude = value.parse().ok(),
            "location_lng" => longitude = value.parse().ok(),
            "relations" => {
                if let Ok(relations) = serde_json::from_str(value) {
                    meta.relations = relations;
                }
            }
            "attachments" => {
                if let Ok(attachments) = serde_json::from_str(value) {
                    meta.attachments = attachments;
                }
            }
            _ => {}
        }
    }

    if latitude.is_some() || longitude.is_some() {
        meta.location = Some(Location {
            latitude: latitude.unwrap_or(0.0),
            longitude: longitude.unwrap_or(0.0),
            placeholder: None,
        });
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RelatedMemo, RelationType};

    fn sample_meta() -> MemoMetadata {
        MemoMetadata {
            visibility: Some(Visibility::Public),
            location: Some(Location {
                latitude: 48.85,
                longitude: 2.35,
                placeholder: None,
            }),
            relations: vec![MemoRelation {
                memo: Some(RelatedMemo {
                    name: "memos/1".to_string(),
                    snippet: "hello".to_string(),
                }),
                related_memo: None,
                relation_type: RelationType::Reference,
            }],
            attachments: vec!["attachments/1700000000000_a.png".to_string()],
        }
    }

    #[test]
    fn test_round_trip_full_meta() {
        let meta = sample_meta();
        let content = "Buy milk\nand bread";
        let body = encode_body(content, &meta);
        let (decoded_meta, decoded_content) = decode_parts(&body);
        assert_eq!(decoded_meta, meta);
        assert_eq!(decoded_content, content);
    }

    #[test]
    fn test_round_trip_single_fields() {
        for meta in [
            MemoMetadata {
                visibility: Some(Visibility::Protected),
                ..MemoMetadata::default()
            },
            MemoMetadata {
                location: Some(Location {
                    latitude: -12.5,
                    longitude: 130.0,
                    placeholder: None,
                }),
                ..MemoMetadata::default()
            },
            MemoMetadata {
                attachments: vec!["attachments/1_x.bin".to_string()],
                ..MemoMetadata::default()
            },
        ] {
            let body = encode_body("content", &meta);
            let (decoded, content) = decode_parts(&body);
            assert_eq!(decoded, meta);
            assert_eq!(content, "content");
        }
    }

    #[test]
    fn test_empty_meta_emits_no_block() {
        let meta = MemoMetadata::default();
        assert_eq!(encode(&meta), None);
        assert_eq!(encode_body("plain note", &meta), "plain note");
    }

    #[test]
    fn test_private_visibility_is_omitted() {
        let meta = MemoMetadata {
            visibility: Some(Visibility::Private),
            ..MemoMetadata::default()
        };
        assert!(meta.is_empty());
        assert_eq!(encode(&meta), None);
    }

    #[test]
    fn test_plain_content_round_trips_byte_identical() {
        let content = "just a note\nwith two lines";
        let body = encode_body(content, &MemoMetadata::default());
        assert_eq!(body, content);
        assert_eq!(decode(&body), Decoded::NoBlock(content.to_string()));
    }

    #[test]
    fn test_decode_requires_block_at_start() {
        let body = "intro\n---\nvisibility: PUBLIC\n---\nrest";
        assert_eq!(decode(body), Decoded::NoBlock(body.to_string()));
    }

    #[test]
    fn test_decode_unclosed_block_is_content() {
        let body = "---\nvisibility: PUBLIC\nno closing delimiter";
        assert_eq!(decode(body), Decoded::NoBlock(body.to_string()));
    }

    #[test]
    fn test_decode_skips_unknown_keys_and_bad_values() {
        let body = "---\nvisibility: SECRET\ncolor: blue\nlocation_lat: abc\nrelations: not-json\n---\nhi";
        let (meta, content) = decode_parts(body);
        assert_eq!(meta, MemoMetadata::default());
        assert_eq!(content, "hi");
    }

    #[test]
    fn test_decode_partial_location_defaults_other_axis() {
        let body = "---\nlocation_lat: 10.5\n---\nhi";
        let (meta, _) = decode_parts(body);
        assert_eq!(
            meta.location,
            Some(Location {
                latitude: 10.5,
                longitude: 0.0,
                placeholder: None,
            })
        );
    }

    #[test]
    fn test_decode_preserves_content_leading_newline() {
        let meta = MemoMetadata {
            visibility: Some(Visibility::Public),
            ..MemoMetadata::default()
        };
        let content = "\nstarts with a blank line";
        let (_, decoded) = decode_parts(&encode_body(content, &meta));
        assert_eq!(decoded, content);
    }

    #[test]
    fn test_decode_meta_only_body() {
        let body = "---\nvisibility: PUBLIC\n---";
        let (meta, content) = decode_parts(body);
        assert_eq!(meta.visibility, Some(Visibility::Public));
        assert_eq!(content, "");
    }
}
