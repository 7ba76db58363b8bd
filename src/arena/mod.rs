//! The three arenas described in spec.md §3/§4.3, each with a distinct
//! lifetime rule: tag-scoped, per-scan, and append-until-reset.

mod error_arena;
mod tag;
mod text;

pub use error_arena::ErrorArena;
pub use tag::{Freelist, TagBuffer, TagContext, TagFrame, TagStack};
pub use text::TextArena;
