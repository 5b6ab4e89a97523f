//! Source records
//!
//! A source record is the final output of a resolution: one playable link
//! together with the metadata a player or selection UI needs.

use crate::catalog::LanguageTag;
use serde::{Serialize, Serializer};
use std::fmt;

/// Quality value used when the catalog does not expose one
pub const UNKNOWN_QUALITY: u8 = 0;
/// Size label used when the catalog does not expose one
pub const UNKNOWN_SIZE: &str = "NA";

/// Channel identifier for direct (non-debrid) links
const DIRECT_CHANNEL: u8 = 3;
const LANG_CODE_SUB: u8 = 2;
const LANG_CODE_DUB: u8 = 3;

/// A media URL with the referer the hosting server expects.
///
/// Rendered as `<url>|Referer=<referer>`, which players use to attach the
/// header when requesting the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub url: String,
    pub referer: String,
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|Referer={}", self.url, self.referer)
    }
}

impl Serialize for MediaReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One resolved, playable link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRecord {
    /// Human readable name, e.g. `kimetsu no yaiba - Ep 5`
    pub release_title: String,
    #[serde(rename = "hash")]
    pub media_reference: MediaReference,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub quality: u8,
    pub debrid_provider: String,
    #[serde(rename = "provider")]
    pub provider_id: String,
    #[serde(rename = "size")]
    pub size_label: String,
    pub byte_size: u64,
    #[serde(rename = "info")]
    pub language_flags: Vec<LanguageTag>,
    pub channel: u8,
    #[serde(rename = "sub", serialize_with = "bool_as_int")]
    pub subtitle_flag: bool,
    #[serde(rename = "lang")]
    pub language_code: u8,
}

fn bool_as_int<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Assembles source records for a single catalog site.
#[derive(Debug, Clone)]
pub struct SourceRecordBuilder {
    provider_id: String,
    referer: String,
}

impl SourceRecordBuilder {
    pub fn new(provider_id: impl Into<String>, referer: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            referer: referer.into(),
        }
    }

    /// Builds the record for a resolved media URL.
    ///
    /// Catalog pages carry no quality or size information, so those fields
    /// hold the unknown sentinels.
    pub fn build(
        &self,
        title: &str,
        episode: u32,
        url: &str,
        language: LanguageTag,
    ) -> SourceRecord {
        SourceRecord {
            release_title: format!("{} - Ep {}", title, episode),
            media_reference: MediaReference {
                url: url.to_string(),
                referer: self.referer.clone(),
            },
            kind: "direct",
            quality: UNKNOWN_QUALITY,
            debrid_provider: String::new(),
            provider_id: self.provider_id.clone(),
            size_label: UNKNOWN_SIZE.to_string(),
            byte_size: 0,
            language_flags: vec![language],
            channel: DIRECT_CHANNEL,
            subtitle_flag: true,
            language_code: match language {
                LanguageTag::Dub => LANG_CODE_DUB,
                LanguageTag::Sub => LANG_CODE_SUB,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_sub_record() {
        let builder = SourceRecordBuilder::new("animesdigital", "https://animesdigital.org/");
        let record = builder.build(
            "kimetsu no yaiba",
            5,
            "https://cdn.example/ep5.mp4",
            LanguageTag::Sub,
        );

        assert_eq!(record.release_title, "kimetsu no yaiba - Ep 5");
        assert_eq!(
            record.media_reference.to_string(),
            "https://cdn.example/ep5.mp4|Referer=https://animesdigital.org/"
        );
        assert_eq!(record.language_code, 2);
        assert!(record.subtitle_flag);
        assert_eq!(record.quality, UNKNOWN_QUALITY);
        assert_eq!(record.size_label, UNKNOWN_SIZE);
    }

    #[test]
    fn test_build_dub_record_serializes_with_wire_names() {
        let builder = SourceRecordBuilder::new("animesfhd", "https://animefhd.com/");
        let record = builder.build("naruto", 1, "https://cdn.example/1.mp4", LanguageTag::Dub);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "release_title": "naruto - Ep 1",
                "hash": "https://cdn.example/1.mp4|Referer=https://animefhd.com/",
                "type": "direct",
                "quality": 0,
                "debrid_provider": "",
                "provider": "animesfhd",
                "size": "NA",
                "byte_size": 0,
                "info": ["DUB"],
                "channel": 3,
                "sub": 1,
                "lang": 3
            })
        );
    }
}
