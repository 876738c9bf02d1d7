pub mod address;
pub mod attachment;
pub mod builder;
pub mod codec;
pub mod headers;
pub mod markdown;
pub mod message;
pub mod mime;
pub mod parts;

pub use address::{Address, AddressList};
pub use attachment::Attachment;
pub use builder::{MessageBuilder, OutboundDraft, Priority, build_reply_draft};
pub use message::Message;
