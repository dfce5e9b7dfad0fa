//! Chat message model and bubble rendering

use crate::html::{Element, Node};
use serde::{Deserialize, Serialize};

/// URL prefix the server mounts the image directory under.
pub const IMAGES_PREFIX: &str = "/static/images/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }

    /// DaisyUI alignment class: user bubbles sit on the right.
    fn alignment(&self) -> &'static str {
        match self {
            Sender::User => "chat-end",
            Sender::Assistant => "chat-start",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub label: String,
    #[serde(default = "default_checked")]
    pub checked: bool,
}

fn default_checked() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub cells: Vec<String>,
    #[serde(default)]
    pub highlight: bool,
    /// Index of a cell rendered in bold
    #[serde(default)]
    pub strong_cell: Option<usize>,
}

/// One piece of a chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text {
        text: String,
    },
    /// Image file name under [`IMAGES_PREFIX`]
    Image {
        file: String,
    },
    /// Embedded external page (QR code service)
    Frame {
        src: String,
    },
    Checklist {
        items: Vec<ChecklistItem>,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<TableRow>,
    },
    Slider {
        min: i32,
        max: i32,
        value: i32,
        #[serde(default = "default_slider_label_id")]
        label_id: String,
    },
}

fn default_slider_label_id() -> String {
    "val".to_string()
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    pub fn image(file: impl Into<String>) -> Self {
        Content::Image { file: file.into() }
    }

    pub fn frame(src: impl Into<String>) -> Self {
        Content::Frame { src: src.into() }
    }

    /// Checks values that end up inside inline script. The slider label id
    /// is spliced into its `oninput` handler, so it must be a plain
    /// identifier.
    pub fn validate(&self) -> Result<(), String> {
        if let Content::Slider { label_id, .. } = self {
            let plain = !label_id.is_empty()
                && label_id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !plain {
                return Err(format!(
                    "slider label_id '{}' must match [A-Za-z0-9_-]+",
                    label_id
                ));
            }
        }
        Ok(())
    }

    fn to_node(&self) -> Node {
        match self {
            Content::Text { text } => Element::new("div")
                .class("chat-bubble chat-bubble-primary")
                .child(text.as_str())
                .into(),
            Content::Image { file } => Element::new("img")
                .attr("src", format!("{}{}", IMAGES_PREFIX, file))
                .class("w-48 h-48")
                .into(),
            Content::Frame { src } => Element::new("iframe")
                .attr("src", src.as_str())
                .class("w-48 h-48 border-none")
                .into(),
            Content::Checklist { items } => {
                let mut list = Element::new("div");
                for item in items {
                    let mut input = Element::new("input").attr("type", "checkbox");
                    if item.checked {
                        input = input.flag("checked");
                    }
                    list = list
                        .child(Element::new("label").child(input).child(item.label.as_str()))
                        .child(Element::new("br"));
                }
                list.into()
            }
            Content::Table { columns, rows } => {
                let head = Element::new("thead").child(
                    Element::new("tr")
                        .children(columns.iter().map(|c| Element::new("th").child(c.as_str()))),
                );
                let body = Element::new("tbody").children(rows.iter().map(render_row));
                Element::new("div")
                    .child(
                        Element::new("table")
                            .attr("border", "1")
                            .attr("cellpadding", "6")
                            .attr("cellspacing", "0")
                            .child(head)
                            .child(body),
                    )
                    .into()
            }
            Content::Slider {
                min,
                max,
                value,
                label_id,
            } => Element::new("div")
                .child(
                    Element::new("input")
                        .attr("type", "range")
                        .attr("min", min.to_string())
                        .attr("max", max.to_string())
                        .attr("value", value.to_string())
                        .attr(
                            "oninput",
                            format!(
                                "document.getElementById('{}').textContent=this.value+'%';",
                                label_id
                            ),
                        ),
                )
                .child(
                    Element::new("span")
                        .id(label_id.as_str())
                        .child(format!("{}%", value)),
                )
                .into(),
        }
    }
}

fn render_row(row: &TableRow) -> Element {
    let mut tr = Element::new("tr");
    if row.highlight {
        tr = tr.style("background-color: #fffae6;");
    }
    tr.children(row.cells.iter().enumerate().map(|(i, cell)| {
        if row.strong_cell == Some(i) {
            Element::new("td").child(Element::new("strong").child(cell.as_str()))
        } else {
            Element::new("td").child(cell.as_str())
        }
    }))
}

/// A chat bubble. Text parts become styled bubbles, other parts are
/// embedded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender: Sender,
    pub parts: Vec<Content>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            parts: vec![Content::text(text)],
        }
    }

    pub fn assistant(parts: Vec<Content>) -> Self {
        Self {
            sender: Sender::Assistant,
            parts,
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant(vec![Content::text(text)])
    }

    /// Image with a caption bubble underneath.
    pub fn assistant_image(file: impl Into<String>, caption: impl Into<String>) -> Self {
        Self::assistant(vec![Content::image(file), Content::text(caption)])
    }

    pub fn to_element(&self) -> Element {
        Element::new("div")
            .class(format!("chat {} p-2", self.sender.alignment()))
            .attr("data-sender", self.sender.as_str())
            .children(self.parts.iter().map(Content::to_node))
    }

    pub fn render(&self) -> String {
        self.to_element().render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_right_aligned_and_tagged() {
        let html = Message::user("hello").render();
        assert_eq!(
            html,
            r#"<div class="chat chat-end p-2" data-sender="user"><div class="chat-bubble chat-bubble-primary">hello</div></div>"#
        );
    }

    #[test]
    fn image_message_references_static_prefix() {
        let html = Message::assistant_image("route.png", "Here you are!").render();
        assert!(html.starts_with(r#"<div class="chat chat-start p-2" data-sender="assistant">"#));
        assert!(html.contains(r#"<img src="/static/images/route.png" class="w-48 h-48">"#));
        assert!(html.contains("Here you are!"));
    }

    #[test]
    fn checklist_marks_checked_items() {
        let message = Message::assistant(vec![Content::Checklist {
            items: vec![
                ChecklistItem {
                    label: "Bus".to_string(),
                    checked: true,
                },
                ChecklistItem {
                    label: "Ferry".to_string(),
                    checked: false,
                },
            ],
        }]);
        let html = message.render();
        assert!(html.contains(r#"<label><input type="checkbox" checked>Bus</label><br>"#));
        assert!(html.contains(r#"<label><input type="checkbox">Ferry</label><br>"#));
    }

    #[test]
    fn highlighted_row_gets_background_and_bold_cell() {
        let message = Message::assistant(vec![Content::Table {
            columns: vec!["Rank".to_string(), "Nickname".to_string()],
            rows: vec![TableRow {
                cells: vec!["3".to_string(), "Hiroshi".to_string()],
                highlight: true,
                strong_cell: Some(1),
            }],
        }]);
        let html = message.render();
        assert!(html.contains("<th>Rank</th><th>Nickname</th>"));
        assert!(html.contains(
            r#"<tr style="background-color: #fffae6;"><td>3</td><td><strong>Hiroshi</strong></td></tr>"#
        ));
    }

    #[test]
    fn slider_label_starts_at_value() {
        let html = Message::assistant(vec![Content::Slider {
            min: 0,
            max: 100,
            value: 50,
            label_id: "val".to_string(),
        }])
        .render();
        assert!(html.contains(r#"<input type="range" min="0" max="100" value="50""#));
        assert!(html.contains(r#"<span id="val">50%</span>"#));
    }

    #[test]
    fn slider_label_id_validation() {
        let slider = |label_id: &str| Content::Slider {
            min: 0,
            max: 100,
            value: 50,
            label_id: label_id.to_string(),
        };
        assert!(slider("val").validate().is_ok());
        assert!(slider("bike_share-2").validate().is_ok());
        assert!(slider("").validate().is_err());
        assert!(slider("it's").validate().is_err());
        assert!(slider("a b").validate().is_err());
        assert!(Content::text("it's fine").validate().is_ok());
    }

    #[test]
    fn content_deserializes_from_tagged_json() {
        let parts: Vec<Content> = serde_json::from_str(
            r#"[{"type":"image","file":"plot.png"},{"type":"checklist","items":[{"label":"Metro"}]}]"#,
        )
        .unwrap();
        assert_eq!(parts[0], Content::image("plot.png"));
        assert_eq!(
            parts[1],
            Content::Checklist {
                items: vec![ChecklistItem {
                    label: "Metro".to_string(),
                    checked: true
                }]
            }
        );
    }
}
