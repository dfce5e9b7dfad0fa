//! Reply script
//!
//! The scripted "assistant" never reads what the visitor types. Each
//! submission pops the next authored reply off the front of a script until
//! none are left, after which [`HslTalksError::ScriptComplete`] is returned.

use crate::errors::{HslTalksError, HslTalksResult};
use crate::message::{ChecklistItem, Content, Message, TableRow};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// On-disk script format: `{ "replies": [ { "parts": [...] }, ... ] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptFile {
    pub replies: Vec<ScriptEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub parts: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyScript {
    replies: VecDeque<Message>,
}

impl ReplyScript {
    pub fn new(replies: Vec<Message>) -> HslTalksResult<Self> {
        if replies.is_empty() {
            return Err(HslTalksError::EmptyScript);
        }
        Ok(Self {
            replies: replies.into(),
        })
    }

    /// The authored ten-step commute demo.
    pub fn builtin() -> Self {
        Self {
            replies: builtin_replies().into(),
        }
    }

    pub fn from_json_str(json: &str) -> HslTalksResult<Self> {
        let file: ScriptFile = serde_json::from_str(json)?;
        for (index, entry) in file.replies.iter().enumerate() {
            for part in &entry.parts {
                part.validate()
                    .map_err(|e| HslTalksError::InvalidScript(format!("reply {}: {}", index + 1, e)))?;
            }
        }
        Self::new(
            file.replies
                .into_iter()
                .map(|entry| Message::assistant(entry.parts))
                .collect(),
        )
    }

    pub fn from_file(path: &Path) -> HslTalksResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let script = Self::from_json_str(&json)?;
        log::debug!(
            "Loaded reply script: path={}, replies={}",
            path.display(),
            script.remaining()
        );
        Ok(script)
    }

    /// Remove and return the next reply.
    pub fn pop_next(&mut self) -> HslTalksResult<Message> {
        self.replies
            .pop_front()
            .ok_or(HslTalksError::ScriptComplete)
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

fn checklist(labels: &[&str]) -> Content {
    Content::Checklist {
        items: labels
            .iter()
            .map(|label| ChecklistItem {
                label: label.to_string(),
                checked: true,
            })
            .collect(),
    }
}

fn row(cells: [&str; 7]) -> TableRow {
    TableRow {
        cells: cells.iter().map(|c| c.to_string()).collect(),
        highlight: false,
        strong_cell: None,
    }
}

fn ranking_table() -> Content {
    let columns = [
        "Rank",
        "Nickname",
        "Location",
        "Monthly Saved CO₂ (g)",
        "Annual Saved CO₂ (g)",
        "2025 Saved CO₂ (g)",
        "2024 rank",
    ];

    let mut own = row(["3", "Hiroshi", "Vantaa", "986", "11832", "23221", "9"]);
    own.highlight = true;
    own.strong_cell = Some(1);

    Content::Table {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: vec![
            row(["1", "RenewableRanger", "Tampere", "1222", "14664", "", "53"]),
            row(["2", "PlanetSaver", "Turku", "1047", "12564", "", "12982"]),
            own,
            row(["4", "EcoWarrior", "Helsinki", "748", "8976", "", "1"]),
            row(["5", "GreenRider", "Espoo", "422", "5064", "", "987678"]),
        ],
    }
}

/// The ten commute replies, in playback order.
///
/// Two deliberate departures from the first hand-written version of this
/// demo: the slider label starts at the slider's value (`50%`, it used to
/// read `5%`), and the ranking table carries no empty caption bubble.
fn builtin_replies() -> Vec<Message> {
    vec![
        Message::assistant_image("present_location.png", "Where do you want to go?"),
        Message::assistant(vec![
            checklist(&[
                "🚌 Bus",
                "🚊 Tram",
                "🚆 Train",
                "🚇 Metro",
                "⛴ Ferry",
                "🚲 Helsinki and Espoo",
            ]),
            Content::text("How do you want to go?"),
        ]),
        Message::assistant_text("Use Bike! It's Sunny☀️!"),
        Message::assistant_image("route.png", "Here you are!"),
        Message::assistant_text("You've saved 5g CO2🌳"),
        Message::assistant_image("plot.png", "Total 172g saved this month🌳"),
        Message::assistant(vec![ranking_table()]),
        Message::assistant_text("Keep it up😍 to get free HSL tickets!"),
        Message::assistant(vec![
            Content::text("Do you want to use more bike🚴‍♂️ mileage on this trip?🤔"),
            Content::Slider {
                min: 0,
                max: 100,
                value: 50,
                label_id: "val".to_string(),
            },
        ]),
        Message::assistant_text("kiltti poika🥷"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use std::io::Write;

    #[test]
    fn builtin_script_has_ten_assistant_replies() {
        let script = ReplyScript::builtin();
        assert_eq!(script.remaining(), 10);
        assert!(script
            .replies
            .iter()
            .all(|m| m.sender == Sender::Assistant));
    }

    #[test]
    fn pop_next_is_fifo_and_shrinks_script() {
        let mut script = ReplyScript::builtin();
        let head = script.replies.front().cloned().unwrap();
        let popped = script.pop_next().unwrap();
        assert_eq!(popped, head);
        assert_eq!(script.remaining(), 9);
        assert_eq!(
            popped,
            Message::assistant_image("present_location.png", "Where do you want to go?")
        );
    }

    #[test]
    fn exhausted_script_reports_completion() {
        let mut script = ReplyScript::builtin();
        for _ in 0..10 {
            script.pop_next().unwrap();
        }
        assert_eq!(script.remaining(), 0);
        assert!(matches!(
            script.pop_next(),
            Err(HslTalksError::ScriptComplete)
        ));
        // stays complete
        assert!(matches!(
            script.pop_next(),
            Err(HslTalksError::ScriptComplete)
        ));
    }

    #[test]
    fn empty_script_is_rejected() {
        assert!(matches!(
            ReplyScript::new(vec![]),
            Err(HslTalksError::EmptyScript)
        ));
        assert!(matches!(
            ReplyScript::from_json_str(r#"{"replies": []}"#),
            Err(HslTalksError::EmptyScript)
        ));
    }

    #[test]
    fn malformed_json_is_invalid_script() {
        let err = ReplyScript::from_json_str(r#"{"replies": [{"parts": [{"type": "video"}]}]}"#)
            .unwrap_err();
        assert!(matches!(err, HslTalksError::InvalidScript(_)));
    }

    #[test]
    fn builtin_slider_label_matches_value_and_table_has_no_caption() {
        let replies = builtin_replies();
        let slider = replies[8].render();
        assert!(slider.contains(r#"value="50""#));
        assert!(slider.contains(r#"<span id="val">50%</span>"#));

        assert_eq!(replies[6].parts.len(), 1);
        assert!(!replies[6].render().contains("chat-bubble"));
    }

    #[test]
    fn slider_label_id_must_be_an_identifier() {
        let err = ReplyScript::from_json_str(
            r#"{"replies": [{"parts": [{"type": "slider", "min": 0, "max": 10, "value": 5, "label_id": "x');alert(1);('"}]}]}"#,
        )
        .unwrap_err();
        match err {
            HslTalksError::InvalidScript(msg) => assert!(msg.starts_with("reply 1:")),
            other => panic!("unexpected error: {other:?}"),
        }

        let script = ReplyScript::from_json_str(
            r#"{"replies": [{"parts": [{"type": "slider", "min": 0, "max": 10, "value": 5, "label_id": "bike-share_2"}]}]}"#,
        )
        .unwrap();
        assert_eq!(script.remaining(), 1);
    }

    #[test]
    fn script_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"replies": [
                {{"parts": [{{"type": "text", "text": "first"}}]}},
                {{"parts": [{{"type": "image", "file": "map.png"}}, {{"type": "text", "text": "second"}}]}}
            ]}}"#
        )
        .unwrap();

        let mut script = ReplyScript::from_file(file.path()).unwrap();
        assert_eq!(script.remaining(), 2);
        assert_eq!(script.pop_next().unwrap(), Message::assistant_text("first"));
        assert_eq!(
            script.pop_next().unwrap(),
            Message::assistant_image("map.png", "second")
        );
    }

    #[test]
    fn sample_script_parses() {
        let json = include_str!("../../../../demos/short_script.json");
        let mut script = ReplyScript::from_json_str(json).unwrap();
        assert_eq!(script.remaining(), 4);
        assert_eq!(
            script.pop_next().unwrap(),
            Message::assistant_image("present_location.png", "Where do you want to go?")
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ReplyScript::from_file(Path::new("/nonexistent/hsltalks/script.json"))
            .unwrap_err();
        assert!(matches!(err, HslTalksError::Io(_)));
    }
}
