//! Asset URL construction and manifest rewriting.
//!
//! Plate manifests reference files by bare name; consumers need
//! absolute URLs against whatever host is serving the results. The
//! manifest is handled as loose JSON because two schema generations are
//! in the wild and only the parts being rewritten are interesting.

use serde_json::Value;
use tracing::warn;

/// Public URL for one job asset.
pub fn asset_url(base_url: &str, job_id: &str, filename: &str) -> String {
    format!(
        "{}/assets/{}/{}",
        base_url.trim_end_matches('/'),
        job_id,
        filename
    )
}

fn is_absolute(value: &str) -> bool {
    value.contains("://")
}

fn absolutize_map(map: &mut Value, base_url: &str, job_id: &str) {
    let Some(object) = map.as_object_mut() else {
        return;
    };
    for entry in object.values_mut() {
        if let Some(name) = entry.as_str() {
            if !is_absolute(name) {
                *entry = Value::String(asset_url(base_url, job_id, name));
            }
        }
    }
}

/// Rewrites every asset reference in a manifest to an absolute URL and
/// records the base URL used.
///
/// Dispatches on the manifest's `schema` field: schema 3 carries
/// per-card channel maps under `front_cards` and `back_cards`, schema 2
/// the flat `maps.front` / `maps.back` objects plus die references
/// under `geometry`. A missing schema field is treated as 2.
pub fn absolutize_manifest(manifest: &mut Value, base_url: &str, job_id: &str) {
    let schema = manifest
        .get("schema")
        .and_then(Value::as_u64)
        .unwrap_or(2);

    match schema {
        3 => {
            for key in ["front_cards", "back_cards"] {
                if let Some(cards) = manifest.get_mut(key).and_then(Value::as_array_mut) {
                    for card in cards {
                        absolutize_map(card, base_url, job_id);
                    }
                }
            }
        }
        2 => {
            if let Some(maps) = manifest.get_mut("maps") {
                for key in ["front", "back"] {
                    if let Some(side_map) = maps.get_mut(key) {
                        absolutize_map(side_map, base_url, job_id);
                    }
                }
            }
            if let Some(geometry) = manifest.get_mut("geometry") {
                absolutize_map(geometry, base_url, job_id);
            }
        }
        other => {
            warn!(schema = other, job_id, "Unknown manifest schema, leaving untouched");
            return;
        }
    }

    if let Some(object) = manifest.as_object_mut() {
        object.insert(
            "assets_base_url".to_string(),
            Value::String(base_url.trim_end_matches('/').to_string()),
        );
    }
}
