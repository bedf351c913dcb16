//! Missive - Message Template Renderer
//!
//! Renders the subject line and body of transactional messages from a
//! template and a nested data context.
//!
//! Templates use two directives:
//!
//! - `{{ order.total }}` writes the string or number at a dotted path.
//! - `{{#each items}} ... {{/each}}` renders its body once per item in a
//!   sequence. Inside the body the item is bound to `this`, and when the item
//!   is a mapping its fields are bound by name as well.
//!
//! Paths that do not resolve render as nothing, and tags that cannot be
//! understood are kept as written. Use [`Engine::with_strict`] to reject them
//! instead, or [`render_report`] to learn which paths were missing.
//!
//! # Examples
//!
//! ```
//! use missive::{compile, render, Store};
//! use serde_json::json;
//!
//! let template = compile("{{#each items}}{{ name }}: {{ price }}\n{{/each}}").unwrap();
//! let store = Store::new().with_must(
//!     "items",
//!     json!([
//!         { "name": "Board", "price": "25.99" },
//!         { "name": "Deck", "price": "32.00" }
//!     ]),
//! );
//!
//! assert_eq!(render(&template, &store).unwrap(), "Board: 25.99\nDeck: 32.00\n");
//! ```
mod compile;
mod engine;
mod log;
mod region;
mod render;

pub use compile::{compile, tree, Builder, Marker, Message, Parser, Scope, Template};
pub use engine::Engine;
pub use log::{Error, Pointer};
pub use morel::Syntax;
pub use region::Region;
pub use render::{
    render, render_message, render_report, resolve, MessageReport, Missing, Rendered, Renderer,
    Report, Scoping, Store, THIS,
};
