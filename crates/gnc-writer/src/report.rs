use std::collections::BTreeMap;

use gnc_store::StorePatch;
use gnc_types::{MissingField, ResponsePath, StoreKey};
use serde::{Deserialize, Serialize};

/// Outcome of a successful write.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteReport {
    /// Keys written and changed.
    pub patch: StorePatch,
    /// Selected fields that could not be written, by response path.
    pub missing: Vec<MissingField>,
    /// Response path of every object written as a reference, with its key.
    ///
    /// Serialized as an object keyed by the dotted path (`createTodo.tags.0`).
    #[serde(default, with = "dotted_paths")]
    pub locations: BTreeMap<ResponsePath, StoreKey>,
}

impl WriteReport {
    /// `true` when every selected field was present and well-shaped.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Store key of the object written at `path`, if it was normalized.
    pub fn key_at(&self, path: &ResponsePath) -> Option<&StoreKey> {
        self.locations.get(path)
    }
}

mod dotted_paths {
    use std::collections::BTreeMap;

    use gnc_types::{ResponsePath, StoreKey};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        locations: &BTreeMap<ResponsePath, StoreKey>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(locations.iter().map(|(path, key)| (path.to_string(), key)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<ResponsePath, StoreKey>, D::Error> {
        BTreeMap::<String, StoreKey>::deserialize(deserializer)?
            .into_iter()
            .map(|(path, key)| {
                ResponsePath::parse(&path)
                    .map(|path| (path, key))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report_with_locations() -> WriteReport {
        let mut report = WriteReport::default();
        report.locations.insert(
            ResponsePath::parse("createTodo").unwrap(),
            StoreKey::new("Todo99"),
        );
        report.locations.insert(
            ResponsePath::parse("createTodo.tags.0").unwrap(),
            StoreKey::new("Todo99.tags.0"),
        );
        report
    }

    // ---- Serialization ----

    #[test]
    fn locations_serialize_by_dotted_path() {
        let value = serde_json::to_value(report_with_locations()).unwrap();
        assert_eq!(
            value["locations"],
            json!({"createTodo": "Todo99", "createTodo.tags.0": "Todo99.tags.0"})
        );
    }

    #[test]
    fn report_json_reads_back() {
        let report = report_with_locations();
        let text = serde_json::to_string_pretty(&report).unwrap();
        let back: WriteReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report);
        assert_eq!(
            back.key_at(&ResponsePath::parse("createTodo.tags.0").unwrap()),
            Some(&StoreKey::new("Todo99.tags.0"))
        );
    }

    #[test]
    fn invalid_location_path_is_rejected() {
        let err = serde_json::from_value::<WriteReport>(json!({
            "patch": serde_json::to_value(StorePatch::default()).unwrap(),
            "missing": [],
            "locations": {"a..b": "Todo1"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("a..b"));
    }
}
