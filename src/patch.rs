//! Order-preserving YAML re-serialization.
//!
//! `commit()` and the post-migration write-back replace the file wholesale
//! with the current in-memory value, but a naive dump would reorder keys to
//! whatever the serializer feels like. [`ordered_patch`] re-applies the key
//! order of the document that was read from disk: surviving keys keep their
//! position, removed keys are dropped, and new keys are appended at the end.
//!
//! Comments are not preserved — there is no editing layer for YAML comparable
//! to `toml_edit`, so a rewrite loses them.

use serde_yaml::{Mapping, Value as Yaml};

/// Merge `next` into the key order of `prev`.
///
/// For mappings on both sides: iterate `prev`'s keys in order, keeping each
/// key that still exists in `next` (recursing into nested mappings), dropping
/// keys absent from `next`, then appending `next`'s remaining keys in their
/// own order. Anything that isn't a mapping on both sides is replaced by
/// `next` outright.
pub fn ordered_patch(prev: &Yaml, next: Yaml) -> Yaml {
    match (prev, next) {
        (Yaml::Mapping(prev_map), Yaml::Mapping(mut next_map)) => {
            let mut out = Mapping::new();
            for (key, prev_val) in prev_map {
                if let Some(next_val) = next_map.remove(key) {
                    out.insert(key.clone(), ordered_patch(prev_val, next_val));
                }
            }
            for (key, next_val) in next_map {
                out.insert(key, next_val);
            }
            Yaml::Mapping(out)
        }
        (_, next) => next,
    }
}

/// Serialize a latest-shape value to YAML text, preserving the key order of
/// `prev` (the document previously read from disk) when available.
///
/// Returns the text alongside the merged document, which becomes the ordering
/// reference for the next write.
pub fn to_yaml_string(
    data: &serde_json::Value,
    prev: Option<&Yaml>,
) -> Result<(String, Yaml), String> {
    let next: Yaml = serde_yaml::to_value(data).map_err(|e| e.to_string())?;
    let merged = match prev {
        Some(prev) => ordered_patch(prev, next),
        None => next,
    };
    let text = serde_yaml::to_string(&merged).map_err(|e| e.to_string())?;
    Ok((text, merged))
}
