//! ID3 (`id3`)
//!
//! Fields are keyed by ID3v2.3/2.4 frame ids. Three-letter ID3v2.2 ids and
//! the v2.3 `TYER` year frame are mapped onto their current equivalents.

use crate::core::document::ModelSet;
use crate::core::error::XmpResult;
use crate::core::model::Model;
use crate::models::{DublinCore, DynamicMedia};
use crate::types::AltString;
use crate::xmp_model;
use std::borrow::Cow;

xmp_model! {
    /// ID3 text frames
    pub struct Id3("id3") {
        pub title: Option<String> => "title" tag "TIT2",
        pub artist: Option<String> => "leadPerformer" tag "TPE1",
        pub album: Option<String> => "album" tag "TALB",
        pub genre: Option<String> => "contentType" tag "TCON",
        pub recording_time: Option<String> => "recordingTime" tag "TDRC",
        pub track: Option<String> => "trackNumber" tag "TRCK",
        pub comment: AltString => "comment" tag "COMM",
        pub composer: Option<String> => "composer" tag "TCOM",
        pub publisher: Option<String> => "publisher" tag "TPUB",
        pub copyright: Option<String> => "copyright" tag "TCOP",
        pub encoded_by: Option<String> => "encodedBy" tag "TENC",
        pub bpm: Option<u32> => "bpm" tag "TBPM",
    }
}

/// Current frame id for a legacy one
fn current_frame_id(id: &str) -> Option<&'static str> {
    Some(match id {
        "TT2" => "TIT2",
        "TP1" => "TPE1",
        "TAL" => "TALB",
        "TCO" => "TCON",
        "TYE" | "TYER" => "TDRC",
        "TRK" => "TRCK",
        "COM" => "COMM",
        "TCM" => "TCOM",
        "TPB" => "TPUB",
        "TCR" => "TCOP",
        "TEN" => "TENC",
        "TBP" => "TBPM",
        _ => return None,
    })
}

fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.is_empty()).map(str::to_string);
    }
}

impl Model for Id3 {
    fn map_native_tag<'t>(&self, tag: &'t str) -> Cow<'t, str> {
        let upper = tag.trim().to_ascii_uppercase();
        match current_frame_id(&upper) {
            Some(id) => Cow::Borrowed(id),
            None if upper == tag => Cow::Borrowed(tag),
            None => Cow::Owned(upper),
        }
    }

    fn sync_models(&mut self, models: &ModelSet) -> XmpResult<()> {
        if let Some(dc) = models.find_as::<DublinCore>() {
            fill(&mut self.title, dc.title.default_value());
            if self.artist.is_none() && !dc.creator.is_empty() {
                let names: Vec<&str> = dc.creator.iter().map(String::as_str).collect();
                self.artist = Some(names.join("/"));
            }
            fill(&mut self.copyright, dc.rights.default_value());
            fill(&mut self.publisher, dc.publisher.first().map(String::as_str));
        }
        if let Some(dm) = models.find_as::<DynamicMedia>() {
            fill(&mut self.album, dm.album.as_deref());
            fill(&mut self.artist, dm.artist.as_deref());
            fill(&mut self.composer, dm.composer.as_deref());
            fill(&mut self.genre, dm.genre.as_deref());
            if self.track.is_none() {
                self.track = dm.track_number.map(|n| n.to_string());
            }
            if self.recording_time.is_none() {
                self.recording_time = dm.release_date.map(|d| d.to_string());
            }
        }
        Ok(())
    }

    fn sync_to_xmp(&self, models: &mut ModelSet) -> XmpResult<()> {
        if self.title.is_none() && self.artist.is_none() {
            return Ok(());
        }
        let dc = models.make_as::<DublinCore>()?;
        if let Some(title) = &self.title {
            dc.title.fill_default(title);
        }
        if dc.creator.is_empty() {
            for name in self.artist.as_deref().unwrap_or_default().split('/') {
                dc.add_creator(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::native::{get_locale_field, get_native_field, set_locale_field, set_native_field};

    #[test]
    fn test_legacy_frame_ids() {
        let mut id3 = Id3::default();
        set_native_field(&mut id3, "TT2", "Song").unwrap();
        set_native_field(&mut id3, "tye", "1987").unwrap();
        set_native_field(&mut id3, "TBP", "96").unwrap();
        assert_eq!(id3.title.as_deref(), Some("Song"));
        assert_eq!(id3.recording_time.as_deref(), Some("1987"));
        assert_eq!(get_native_field(&id3, "TIT2").unwrap(), "Song");
        assert_eq!(get_native_field(&id3, "TBPM").unwrap(), "96");

        let err = set_native_field(&mut id3, "TBPM", "fast").unwrap_err();
        assert_eq!(err.namespace(), Some("id3"));
        assert!(get_native_field(&id3, "XXXX").unwrap_err().is_not_found());
    }

    #[test]
    fn test_comment_languages() {
        let mut id3 = Id3::default();
        set_locale_field(&mut id3, "COM", "eng", "Live take").unwrap();
        set_locale_field(&mut id3, "COMM", "deu", "Live-Aufnahme").unwrap();
        assert_eq!(get_locale_field(&id3, "COMM", "deu").unwrap(), "Live-Aufnahme");
        assert_eq!(get_locale_field(&id3, "COMM", "fra").unwrap(), "Live take");
        assert_eq!(id3.comment.len(), 2);
    }

    #[test]
    fn test_sync_with_dc() {
        let mut models = ModelSet::new();
        let id3 = Id3 {
            title: Some("Song".to_string()),
            artist: Some("Ann/Bob".to_string()),
            ..Default::default()
        };
        id3.sync_to_xmp(&mut models).unwrap();
        let dc = models.find_as::<DublinCore>().unwrap();
        assert_eq!(dc.title.default_value(), Some("Song"));
        assert_eq!(dc.creator.items(), &["Ann", "Bob"]);

        let mut fresh = Id3::default();
        fresh.sync_models(&models).unwrap();
        assert_eq!(fresh.title.as_deref(), Some("Song"));
        assert_eq!(fresh.artist.as_deref(), Some("Ann/Bob"));
    }
}
