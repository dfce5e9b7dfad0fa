//! Full-page renderer
//!
//! Left half: the live departures map. Right half: the chat history, the
//! input form that posts to the reply route, and an auto-scroll hook.

use crate::html::Element;
use crate::message::{Content, Message};

pub const DEFAULT_MAP_URL: &str =
    "https://omatnaytot.hsl.fi/static?url=ace225d4-84a0-5829-bad1-aab0f9e051cb";
pub const DEFAULT_QR_URL: &str =
    "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data=https://omatnaytot.hsl.fi";

/// Id of the history container the reply fragments are appended to.
pub const CHAT_LIST_ID: &str = "chatlist";
/// Form field carrying the visitor's text.
pub const MESSAGE_FIELD: &str = "msg";

const PICO_CSS: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@latest/css/pico.min.css";
const TAILWIND_JS: &str = "https://cdn.tailwindcss.com";
const DAISYUI_CSS: &str = "https://cdn.jsdelivr.net/npm/daisyui@4.11.1/dist/full.min.css";
const HTMX_JS: &str = "https://unpkg.com/htmx.org@2.0.4/dist/htmx.min.js";

const AUTO_SCROLL_JS: &str = r#"
    const chatList = document.getElementById('chatlist');
    document.body.addEventListener('htmx:afterSwap', event => {
        if (event.detail.target.id === 'chatlist') {
            chatList.scrollTop = chatList.scrollHeight;
        }
    });
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub title: String,
    pub map_url: String,
    pub qr_url: String,
    /// Path the chat form posts to
    pub reply_path: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "HSLTalks".to_string(),
            map_url: DEFAULT_MAP_URL.to_string(),
            qr_url: DEFAULT_QR_URL.to_string(),
            reply_path: "/handle".to_string(),
        }
    }
}

/// The bubble the history is seeded with.
pub fn welcome_message(qr_url: &str) -> Message {
    Message::assistant(vec![
        Content::frame(qr_url),
        Content::text("Scan me to talk"),
    ])
}

fn head(config: &PageConfig) -> Element {
    Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1, viewport-fit=cover"),
        )
        .child(Element::new("title").child(config.title.as_str()))
        .child(
            Element::new("link")
                .attr("rel", "stylesheet")
                .attr("href", PICO_CSS),
        )
        .child(Element::new("style").raw(":root { --pico-font-size: 100%; }"))
        .child(Element::new("script").attr("src", HTMX_JS))
        .child(Element::new("script").attr("src", TAILWIND_JS))
        .child(
            Element::new("link")
                .attr("rel", "stylesheet")
                .attr("href", DAISYUI_CSS),
        )
}

fn map_panel(config: &PageConfig) -> Element {
    Element::new("div")
        .style("position:relative; width:50vw; height:100vh; overflow:hidden;")
        .child(
            Element::new("iframe")
                .attr("src", config.map_url.as_str())
                .class("absolute inset-0 w-full h-full border-none"),
        )
}

fn chat_panel(config: &PageConfig) -> Element {
    let history = Element::new("div")
        .id(CHAT_LIST_ID)
        .class("overflow-auto p-4 space-y-2 flex-1")
        .child(welcome_message(&config.qr_url).to_element());

    let form = Element::new("form")
        .attr("hx-post", config.reply_path.as_str())
        .attr("hx-target", format!("#{}", CHAT_LIST_ID))
        .attr("hx-swap", "beforeend")
        .class("p-4 flex gap-2 border-t bg-base-100 dark:bg-base-800")
        .child(
            Element::new("input")
                .attr("name", MESSAGE_FIELD)
                .id("msg-input")
                .attr("placeholder", "Type a message...")
                .class("flex-1 input input-bordered"),
        )
        .child(Element::new("button").class("btn btn-primary").child("Send"));

    Element::new("div")
        .style("position:relative; width:50vw; height:100vh; display:flex; flex-direction:column;")
        .child(history)
        .child(form)
        .child(Element::new("script").raw(AUTO_SCROLL_JS))
}

/// Render the whole document.
pub fn render_page(config: &PageConfig) -> String {
    let body = Element::new("body").style("margin:0;").child(
        Element::new("main")
            .style(
                "display:grid; grid-template-columns:50% 50%; width:100vw; height:100vh; \
                 margin:0; padding:0; gap:0;",
            )
            .child(map_panel(config))
            .child(chat_panel(config)),
    );

    let document = Element::new("html").child(head(config)).child(body);
    let mut out = String::from("<!doctype html>");
    out.push_str(&document.render());
    out
}
