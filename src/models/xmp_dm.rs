//! XMP Dynamic Media (`xmpDM`)

use crate::core::codec::{self, DecodeContext};
use crate::core::document::ModelSet;
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::{Element, Navigable};
use crate::core::model::Model;
use crate::core::node::XmlNode;
use crate::core::reflect::{Capabilities, FieldKind};
use crate::models::{DublinCore, Id3, XmpBase};
use crate::types::Seq;
use crate::utils::datetime::XmpDate;
use crate::{xmp_model, xmp_struct};

xmp_struct! {
    @custom
    /// A named point or range on the media timeline
    pub struct Marker("xmpDM") {
        pub name: Option<String> => "name",
        pub start_time: Option<String> => "startTime",
        pub duration: Option<String> => "duration",
        pub comment: Option<String> => "comment",
        pub marker_type: Option<String> => "type",
    }
}

impl Marker {
    /// A marker at `start_time`
    pub fn new(name: impl Into<String>, start_time: impl Into<String>) -> Self {
        Marker {
            name: Some(name.into()),
            start_time: Some(start_time.into()),
            ..Default::default()
        }
    }

    /// Set the marker's duration
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }
}

/// Markers are written as attribute-form structures and have a compact
/// text form `name@start[+duration]`.
impl Element for Marker {
    const KIND: FieldKind = FieldKind::Struct;
    const CAPABILITIES: Capabilities = Capabilities::TEXT
        .union(Capabilities::TREE)
        .union(Capabilities::ATTR);

    fn to_text(&self) -> XmpResult<String> {
        let start = self
            .start_time
            .as_deref()
            .ok_or_else(|| XmpError::Marshal("marker without a start time".to_string()))?;
        let mut text = format!("{}@{}", self.name.as_deref().unwrap_or_default(), start);
        if let Some(duration) = &self.duration {
            text.push('+');
            text.push_str(duration);
        }
        Ok(text)
    }

    fn from_text(text: &str) -> XmpResult<Self> {
        let (name, timing) = text
            .rsplit_once('@')
            .ok_or_else(|| XmpError::Unmarshal(format!("invalid marker '{}'", text)))?;
        let (start, duration) = match timing.split_once('+') {
            Some((start, duration)) => (start, Some(duration.trim().to_string())),
            None => (timing, None),
        };
        if start.trim().is_empty() {
            return Err(XmpError::Unmarshal(format!(
                "marker '{}' has no start time",
                text
            )));
        }
        Ok(Marker {
            name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
            start_time: Some(start.trim().to_string()),
            duration,
            ..Default::default()
        })
    }

    fn encode_element(&self, name: &str, _as_attr: bool) -> XmpResult<XmlNode> {
        codec::encode_struct(self, name, true)
    }

    fn decode_element(node: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<Self> {
        codec::decode_struct(node, cx)
    }

    fn navigable(&self) -> Option<&dyn Navigable> {
        Some(self)
    }

    fn navigable_mut(&mut self) -> Option<&mut dyn Navigable> {
        Some(self)
    }
}

xmp_model! {
    /// Audio and video properties
    pub struct DynamicMedia("xmpDM") {
        pub album: Option<String> => "album",
        pub artist: Option<String> => "artist",
        pub composer: Option<String> => "composer",
        pub engineer: Option<String> => "engineer",
        pub genre: Option<String> => "genre",
        pub release_date: Option<XmpDate> => "releaseDate",
        pub track_number: Option<u32> => "trackNumber",
        pub disc_number: Option<String> => "discNumber",
        pub tempo: Option<f64> => "tempo",
        pub log_comment: Option<String> => "logComment",
        pub copyright: Option<String> => "copyright",
        pub scene: Option<String> => "scene",
        pub shot_name: Option<String> => "shotName",
        pub markers: Seq<Marker> => "markers",
    }
}

fn fill(slot: &mut Option<String>, value: Option<&String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.is_empty()).cloned();
    }
}

impl Model for DynamicMedia {
    fn sync_models(&mut self, models: &ModelSet) -> XmpResult<()> {
        let Some(id3) = models.find_as::<Id3>() else {
            return Ok(());
        };
        fill(&mut self.album, id3.album.as_ref());
        fill(&mut self.artist, id3.artist.as_ref());
        fill(&mut self.composer, id3.composer.as_ref());
        fill(&mut self.genre, id3.genre.as_ref());
        fill(&mut self.copyright, id3.copyright.as_ref());
        if self.track_number.is_none() {
            if let Some(track) = id3.track.as_deref() {
                // "3/12" is track 3 of 12
                let number = track.split('/').next().unwrap_or_default();
                self.track_number = Some(u32::from_text(number)?);
            }
        }
        if self.tempo.is_none() {
            self.tempo = id3.bpm.map(f64::from);
        }
        if self.release_date.is_none() {
            if let Some(recorded) = id3.recording_time.as_deref() {
                self.release_date = Some(XmpDate::parse(recorded)?);
            }
        }
        Ok(())
    }

    fn sync_to_xmp(&self, models: &mut ModelSet) -> XmpResult<()> {
        if self.artist.is_some() || self.copyright.is_some() {
            let dc = models.make_as::<DublinCore>()?;
            if dc.creator.is_empty() {
                if let Some(artist) = &self.artist {
                    dc.add_creator(artist);
                }
            }
            if let Some(copyright) = &self.copyright {
                dc.rights.fill_default(copyright);
            }
        }
        if let Some(date) = self.release_date {
            let xmp = models.make_as::<XmpBase>()?;
            if xmp.create_date.is_none() {
                xmp.create_date = Some(date);
            }
        }
        Ok(())
    }
}
