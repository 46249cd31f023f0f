//! Field keys read by the editor runtime.

use quire_registry::{Field, FieldContext, FieldKey};

use crate::commands::CommandMap;
use crate::hooks::{HookFn, Plugin};

/// Commands contributed by an extension.
pub const COMMANDS: FieldKey<CommandMap> = FieldKey::new("add_commands");

pub const ON_CREATE: FieldKey<HookFn> = FieldKey::new("on_create");
pub const ON_UPDATE: FieldKey<HookFn> = FieldKey::new("on_update");
pub const ON_TRANSACTION: FieldKey<HookFn> = FieldKey::new("on_transaction");
pub const ON_DESTROY: FieldKey<HookFn> = FieldKey::new("on_destroy");

/// Transaction plugins contributed by an extension.
pub const PLUGINS: FieldKey<Vec<Plugin>> = FieldKey::new("add_plugins");

/// Commands layered over the ones resolved from the parent descriptor.
///
/// Entries in `extra` replace same-named parent commands.
pub fn inherit_commands(extra: CommandMap) -> Field<CommandMap> {
	Field::computed(move |cx: &FieldContext<'_, CommandMap>| {
		let mut commands: CommandMap = cx.parent.clone().unwrap_or_default();
		for (name, command) in &extra {
			commands.insert(name.clone(), command.clone());
		}
		commands
	})
}
