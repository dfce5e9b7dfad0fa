// HSLTalks Core Library - chat markup, reply script and visitor sessions
// Platform-agnostic: nothing here knows about HTTP.

pub mod errors;
pub mod html;
pub mod message;
pub mod page;
pub mod script;
pub mod session;

pub use errors::{HslTalksError, HslTalksResult};
pub use html::{Element, Node};
pub use message::{ChecklistItem, Content, Message, Sender, TableRow};
pub use page::{render_page, welcome_message, PageConfig};
pub use script::ReplyScript;
pub use session::{ResolvedSession, ScriptScope, SessionStore};
