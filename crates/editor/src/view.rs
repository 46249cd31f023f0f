//! Host view seam.

/// The view an editor is mounted in.
///
/// The kernel never renders; it only asks the host to move focus.
pub trait EditorView: Send + Sync {
	/// Gives the view input focus.
	fn focus(&self);

	/// Removes input focus from the view.
	fn blur(&self);

	/// Returns true if the view has input focus.
	fn has_focus(&self) -> bool;
}
