/// Recursively deep-merge `overlay` into `base`.
///
/// - Tables merge recursively per key.
/// - Scalars and arrays from the overlay **replace** the base value, so an
///   `[[events]]` list in a file replaces any list from an earlier layer.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}
