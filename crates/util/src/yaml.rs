//! YAML document loading: resolve anchors/merge keys, then deserialize with
//! a field path attached to any error.

use std::io::Read;

use serde::de::DeserializeOwned;

/// Parse `reader` as YAML into `T`, resolving `<<: *anchor` merge keys
/// first (`serde_yaml` alone only resolves plain aliases, not merges) and
/// reporting deserialization failures with the offending field path.
pub fn parse_yaml<T: DeserializeOwned>(mut reader: impl Read) -> anyhow::Result<T> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    parse_yaml_str(&raw)
}

/// Same as [`parse_yaml`] but takes the document directly as a string.
pub fn parse_yaml_str<T: DeserializeOwned>(raw: &str) -> anyhow::Result<T> {
    let mut value: serde_yaml::Value = serde_yaml::from_str(raw)?;
    value.apply_merge()?;
    serde_path_to_error::deserialize(value).map_err(|error| {
        anyhow::anyhow!("{error} (at `{}`)", error.path())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        name: String,
        value: i64,
    }

    #[test]
    fn test_parse_plain_document() {
        let doc: Doc = parse_yaml_str("name: foo\nvalue: 42").unwrap();
        assert_eq!(doc, Doc { name: "foo".into(), value: 42 });
    }

    #[test]
    fn test_parse_resolves_merge_keys() {
        let yaml = "\
base: &base
  name: foo
  value: 1
doc:
  <<: *base
  value: 42
";
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            doc: Doc,
        }
        let wrapper: Wrapper = parse_yaml_str(yaml).unwrap();
        assert_eq!(wrapper.doc, Doc { name: "foo".into(), value: 42 });
    }

    #[test]
    fn test_parse_error_includes_field_path() {
        let result: anyhow::Result<Doc> = parse_yaml_str("name: foo\nvalue: not_a_number");
        let error = result.unwrap_err();
        assert!(error.to_string().contains("value"));
    }
}
