//! Editor runtime for the quire kernel.
//!
//! Builds on [`quire_schema`] to give a list of extensions a live surface:
//!
//! - [`CommandRegistry`] collects named commands and [`CommandChain`] runs
//!   them against one shared transaction, committing or probing
//! - [`PositionTracker`] maps positions through the steps of a transaction
//! - [`HookTable`] and [`Plugin`] let behaviors observe and filter
//!   transactions
//! - [`FrameScheduler`] defers view work and drops it on destroy
//! - [`EditorConfig`] loads TOML settings that disable, configure and
//!   specialize extensions
//!
//! ```
//! use quire_editor::{Editor, Extension};
//! use quire_schema::fields::{CONTENT, GROUP, INLINE};
//! use quire_registry::Field;
//! use serde_json::json;
//!
//! let mut editor = Editor::builder()
//!     .extensions([
//!         Extension::node("doc").field(CONTENT, Field::Static("paragraph+".into())),
//!         Extension::node("paragraph").field(CONTENT, Field::Static("text*".into())),
//!         Extension::node("text")
//!             .field(GROUP, Field::Static("inline".into()))
//!             .field(INLINE, Field::Static(true)),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! editor.command("insert_text", json!("hello")).unwrap();
//! assert_eq!(editor.get_html(), "<paragraph>hello</paragraph>");
//! ```

pub mod commands;
pub mod config;
mod editor;
pub mod error;
pub mod fields;
pub mod hooks;
pub mod scheduler;
mod tracker;
pub mod view;

pub use commands::{
	CORE_COMMANDS, Collision, CommandChain, CommandEnv, CommandFn, CommandMap, CommandProps,
	CommandRegistry, PREVENT_DISPATCH, command, core_commands,
};
pub use config::{
	ConfigError, ConfigWarning, EditorConfig, Specialization, load_config, parse_config_str,
};
pub use editor::{Editor, EditorBuilder, EditorChain};
pub use error::{CommandError, EditorError};
pub use hooks::{FilterFn, HookContext, HookEvent, HookFn, HookTable, Plugin};
pub use quire_registry::Extension;
pub use scheduler::{FrameScheduler, FrameTask};
pub use tracker::{PositionTracker, TrackedPosition};
pub use view::EditorView;
