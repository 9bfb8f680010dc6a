use serde_json::{json, Value};

/// Status code the API uses for locked principals.
pub const LOCKED_STATUS_CODE: &str = "3";

/// Builds the `filters` query parameter understood by the v3 API:
/// a JSON array of `{ name: { operator, values } }` objects.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    filters: Vec<Value>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &str, operator: &str, values: &[&str]) -> Self {
        self.filters.push(json!({
            name: {
                "operator": operator,
                "values": values,
            }
        }));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn to_json_string(&self) -> String {
        Value::Array(self.filters.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_builder_renders_ordered_filter_objects() {
        let filters = FilterBuilder::new()
            .add("name", "~", &["ada"])
            .add("status", "!", &[LOCKED_STATUS_CODE])
            .add("type", "=", &["User"]);

        let parsed: Value = serde_json::from_str(&filters.to_json_string()).expect("json");
        assert_eq!(parsed[0]["name"]["operator"], "~");
        assert_eq!(parsed[0]["name"]["values"][0], "ada");
        assert_eq!(parsed[1]["status"]["values"][0], "3");
        assert_eq!(parsed[2]["type"]["values"][0], "User");
    }

    #[test]
    fn empty_builder_renders_empty_array() {
        let filters = FilterBuilder::new();
        assert!(filters.is_empty());
        assert_eq!(filters.to_json_string(), "[]");
    }
}
