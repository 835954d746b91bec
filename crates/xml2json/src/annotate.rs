//! Region annotation of conversion results

use crate::value::{Object, Value};

/// Key holding result metadata
pub const METADATA_KEY: &str = "metadata";
/// Key inside [`METADATA_KEY`] holding the region code
pub const COUNTRY_CODE_KEY: &str = "countryCode";

/// Merge `region` into `result` under `metadata.countryCode`
///
/// Returns a new object and leaves `result` untouched. With no region (or an
/// empty one) the copy is returned as is, without a `metadata` key. Existing
/// metadata entries are kept; a `metadata` value that is not an object is
/// replaced.
pub fn annotate(result: &Object, region: Option<&str>) -> Object {
    let mut annotated = result.clone();
    let Some(region) = region.filter(|r| !r.is_empty()) else {
        return annotated;
    };

    let mut metadata = match result.get(METADATA_KEY) {
        Some(Value::Object(existing)) => existing.clone(),
        _ => Object::new(),
    };
    metadata.insert(COUNTRY_CODE_KEY, region);
    annotated.insert(METADATA_KEY, metadata);
    annotated
}
