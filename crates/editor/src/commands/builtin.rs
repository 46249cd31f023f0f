//! Commands every editor has unless core extensions are disabled.

use std::sync::Arc;

use quire_primitives::{Attrs, Mark, Node, Selection};
use quire_registry::{Extension, Field};
use quire_schema::Schema;
use serde_json::Value;

use super::{CommandMap, CommandProps, command};
use crate::error::CommandError;
use crate::fields::COMMANDS;

/// Name of the behavior carrying the core commands.
pub const CORE_COMMANDS: &str = "core_commands";

/// Behavior registering the built-in commands.
///
/// | command              | arguments                              |
/// |----------------------|----------------------------------------|
/// | `insert_text`        | `"text"` or `{ text }`                 |
/// | `delete_range`       | `{ from, to }`                         |
/// | `delete_selection`   |                                        |
/// | `set_content`        | document tree                          |
/// | `clear_content`      |                                        |
/// | `set_mark`           | `"name"` or `{ name, attrs? }`         |
/// | `unset_mark`         | `"name"` or `{ name }`                 |
/// | `toggle_mark`        | `"name"` or `{ name, attrs? }`         |
/// | `update_attributes`  | `{ name, attrs }`                      |
/// | `set_text_selection` | `pos` or `{ from, to }`                |
/// | `set_meta`           | `{ key, value }`                       |
/// | `focus`, `blur`      |                                        |
pub fn core_commands() -> Extension {
	let mut commands = CommandMap::new();
	commands.insert("insert_text".into(), command(insert_text));
	commands.insert("delete_range".into(), command(delete_range));
	commands.insert("delete_selection".into(), command(delete_selection));
	commands.insert("set_content".into(), command(set_content));
	commands.insert("clear_content".into(), command(clear_content));
	commands.insert("set_mark".into(), command(set_mark));
	commands.insert("unset_mark".into(), command(unset_mark));
	commands.insert("toggle_mark".into(), command(toggle_mark));
	commands.insert("update_attributes".into(), command(update_attributes));
	commands.insert("set_text_selection".into(), command(set_text_selection));
	commands.insert("set_meta".into(), command(set_meta));
	commands.insert("focus".into(), command(focus));
	commands.insert("blur".into(), command(blur));
	Extension::behavior(CORE_COMMANDS).field(COMMANDS, Field::Static(commands))
}

fn insert_text(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let text = match args {
		Value::String(text) => text.as_str(),
		_ => str_arg("insert_text", args, "text")?,
	};
	let selection = props.tr.selection();
	props.tr.replace_text(selection.from(), selection.to(), text)?;
	Ok(true)
}

fn delete_range(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let from = pos_arg("delete_range", args, "from")?;
	let to = pos_arg("delete_range", args, "to")?;
	props.tr.delete(from, to)?;
	Ok(true)
}

fn delete_selection(props: &mut CommandProps<'_>, _args: &Value) -> Result<bool, CommandError> {
	let selection = props.tr.selection();
	if selection.is_empty() {
		return Ok(false);
	}
	props.tr.delete(selection.from(), selection.to())?;
	Ok(true)
}

fn set_content(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let doc: Node = serde_json::from_value(args.clone())
		.map_err(|e| CommandError::invalid("set_content", e.to_string()))?;
	replace_doc(props, doc)
}

fn clear_content(props: &mut CommandProps<'_>, _args: &Value) -> Result<bool, CommandError> {
	replace_doc(props, empty_document(props.schema))
}

/// The top node holding one empty textblock, or nothing if the top node's
/// content does not accept a lone textblock.
pub(crate) fn empty_document(schema: &Schema) -> Node {
	let top = schema.top_node();
	let block = schema.node_types().find(|ty| {
		ty.is_textblock() && top.content().is_some_and(|expr| expr.matches(&[ty.name()]))
	});
	let content = block.map(|ty| vec![Node::new(ty.name())]).unwrap_or_default();
	let mut doc = Node::with_content(top.name(), content);
	schema.fill_defaults(&mut doc);
	doc
}

fn replace_doc(props: &mut CommandProps<'_>, mut doc: Node) -> Result<bool, CommandError> {
	props.schema.fill_defaults(&mut doc);
	if props.content_check {
		props.schema.check(&doc)?;
	}
	props.tr.replace_doc(doc)?;
	let selection = Selection::at_start(props.tr.doc(), props.tr.model());
	props.tr.set_selection(selection);
	Ok(true)
}

fn set_mark(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let mark = mark_arg(props.schema, "set_mark", args)?;
	let selection = props.tr.selection();
	if selection.is_empty() {
		return Ok(false);
	}
	props.tr.add_mark(selection.from(), selection.to(), mark)?;
	Ok(true)
}

fn unset_mark(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let mark = mark_arg(props.schema, "unset_mark", args)?;
	let selection = props.tr.selection();
	if selection.is_empty() {
		return Ok(false);
	}
	props
		.tr
		.remove_mark(selection.from(), selection.to(), &mark.type_name)?;
	Ok(true)
}

/// Removes the mark if every text node in the selection has it, else adds it.
fn toggle_mark(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let mark = mark_arg(props.schema, "toggle_mark", args)?;
	let selection = props.tr.selection();
	if selection.is_empty() {
		return Ok(false);
	}
	let (from, to) = (selection.from(), selection.to());
	if range_has_mark(props, from, to, &mark.type_name) {
		props.tr.remove_mark(from, to, &mark.type_name)?;
	} else {
		props.tr.add_mark(from, to, mark)?;
	}
	Ok(true)
}

fn range_has_mark(props: &CommandProps<'_>, from: usize, to: usize, name: &str) -> bool {
	let mut any = false;
	let mut all = true;
	props.tr.doc().nodes_between(from, to, props.tr.model(), &mut |node: &Node, _| {
		if node.is_text() {
			any = true;
			all &= node.has_mark(name);
		}
		true
	});
	any && all
}

/// Merges attributes into every node of the named type touching the
/// selection, or into the named mark over the selection.
fn update_attributes(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let name = str_arg("update_attributes", args, "name")?;
	let attrs = attrs_arg("update_attributes", args)?;
	let selection = props.tr.selection();
	let (from, to) = (selection.from(), selection.to());

	if props.schema.node_type(name).is_some() {
		let mut positions = Vec::new();
		props.tr.doc().nodes_between(
			from,
			to.max(from + 1),
			props.tr.model(),
			&mut |node: &Node, pos| {
				if node.type_name == name {
					positions.push(pos);
				}
				true
			},
		);
		for &pos in &positions {
			props.tr.set_node_attrs(pos, attrs.clone())?;
		}
		return Ok(!positions.is_empty());
	}

	if let Some(mark_type) = props.schema.mark_type(name) {
		if selection.is_empty() {
			return Ok(false);
		}
		let mut mark = Mark::new(name);
		mark.attrs = mark_type.defaults().clone();
		mark.attrs.extend(attrs);
		props.tr.add_mark(from, to, mark)?;
		return Ok(true);
	}

	Err(CommandError::UnknownNodeType(name.to_string()))
}

fn set_text_selection(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let selection = match args.as_u64() {
		Some(pos) => Selection::cursor(pos as usize),
		None => Selection::new(
			pos_arg("set_text_selection", args, "from")?,
			pos_arg("set_text_selection", args, "to")?,
		),
	};
	props.tr.set_selection(selection);
	Ok(true)
}

fn set_meta(props: &mut CommandProps<'_>, args: &Value) -> Result<bool, CommandError> {
	let key = str_arg("set_meta", args, "key")?;
	let value = args.get("value").cloned().unwrap_or(Value::Bool(true));
	props.tr.set_meta(key, value);
	Ok(true)
}

fn focus(props: &mut CommandProps<'_>, _args: &Value) -> Result<bool, CommandError> {
	let Some(view) = props.view else {
		return Ok(false);
	};
	if props.dispatch {
		let view = Arc::clone(view);
		props.scheduler.schedule("focus", move || view.focus());
	}
	Ok(true)
}

fn blur(props: &mut CommandProps<'_>, _args: &Value) -> Result<bool, CommandError> {
	let Some(view) = props.view else {
		return Ok(false);
	};
	if props.dispatch {
		let view = Arc::clone(view);
		props.scheduler.schedule("blur", move || view.blur());
	}
	Ok(true)
}

fn str_arg<'v>(command: &str, args: &'v Value, key: &str) -> Result<&'v str, CommandError> {
	args.get(key)
		.and_then(Value::as_str)
		.ok_or_else(|| CommandError::invalid(command, format!("expected string '{key}'")))
}

fn pos_arg(command: &str, args: &Value, key: &str) -> Result<usize, CommandError> {
	args.get(key)
		.and_then(Value::as_u64)
		.map(|pos| pos as usize)
		.ok_or_else(|| CommandError::invalid(command, format!("expected position '{key}'")))
}

fn attrs_arg(command: &str, args: &Value) -> Result<Attrs, CommandError> {
	match args.get("attrs") {
		None | Some(Value::Null) => Ok(Attrs::new()),
		Some(Value::Object(attrs)) => Ok(attrs.clone()),
		Some(_) => Err(CommandError::invalid(command, "expected object 'attrs'")),
	}
}

/// Reads a mark name and attributes, filling in the mark type's defaults.
fn mark_arg(schema: &Schema, command: &str, args: &Value) -> Result<Mark, CommandError> {
	let name = match args {
		Value::String(name) => name.as_str(),
		_ => str_arg(command, args, "name")?,
	};
	let mark_type = schema
		.mark_type(name)
		.ok_or_else(|| CommandError::UnknownMark(name.to_string()))?;
	let mut mark = Mark::new(name);
	mark.attrs = mark_type.defaults().clone();
	mark.attrs.extend(attrs_arg(command, args)?);
	Ok(mark)
}
