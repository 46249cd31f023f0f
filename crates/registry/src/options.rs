use serde_json::Value;

/// Deep-merges `overrides` into `base`.
///
/// Objects merge key by key; any other value replaces what was there.
pub fn merge_options(base: &mut Value, overrides: &Value) {
	match (base, overrides) {
		(Value::Object(base), Value::Object(overrides)) => {
			for (key, value) in overrides {
				match base.get_mut(key) {
					Some(existing) => merge_options(existing, value),
					None => {
						base.insert(key.clone(), value.clone());
					}
				}
			}
		}
		(base, overrides) => *base = overrides.clone(),
	}
}
