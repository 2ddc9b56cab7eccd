use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier reserved for fragments that pass through untouched.
pub const RAW_FRAGMENT_ID: &str = "_raw";

/// Identifier the stock splitter gives to fragments that need processing.
///
/// Any identifier other than [`RAW_FRAGMENT_ID`] marks a snippet; this one is
/// only a convention.
pub const SNIPPET_FRAGMENT_ID: &str = "_snippet";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    #[error("Fragment is not valid [{id}], [{content}]")]
    Invalid { id: String, content: String },
}

/// A unit of page content.
///
/// Raw fragments are emitted verbatim; every other fragment is a snippet whose
/// content is a template that may declare backend services. The context holds
/// the data resolved for the snippet and starts empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FragmentRepr", into = "FragmentRepr")]
pub struct Fragment {
    id: String,
    content: String,
    context: Map<String, Value>,
}

/// Wire shape of a fragment, kept compatible with the `_ID` / `_CONTENT` /
/// `_CONTEXT` documents produced by splitters in other processes.
#[derive(Serialize, Deserialize)]
struct FragmentRepr {
    #[serde(rename = "_ID")]
    id: String,
    #[serde(rename = "_CONTENT")]
    content: String,
    #[serde(rename = "_CONTEXT", default)]
    context: Map<String, Value>,
}

impl Fragment {
    fn new(id: String, content: String) -> Result<Self, FragmentError> {
        if id.is_empty() || content.is_empty() {
            return Err(FragmentError::Invalid { id, content });
        }
        Ok(Self {
            id,
            content,
            context: Map::new(),
        })
    }

    pub fn raw(content: impl Into<String>) -> Result<Self, FragmentError> {
        Self::new(RAW_FRAGMENT_ID.to_string(), content.into())
    }

    pub fn snippet(id: impl Into<String>, content: impl Into<String>) -> Result<Self, FragmentError> {
        Self::new(id.into(), content.into())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.context
    }

    pub fn is_raw(&self) -> bool {
        self.id == RAW_FRAGMENT_ID
    }
}

impl TryFrom<FragmentRepr> for Fragment {
    type Error = FragmentError;

    fn try_from(repr: FragmentRepr) -> Result<Self, Self::Error> {
        let mut fragment = Fragment::new(repr.id, repr.content)?;
        fragment.context = repr.context;
        Ok(fragment)
    }
}

impl From<Fragment> for FragmentRepr {
    fn from(fragment: Fragment) -> Self {
        Self {
            id: fragment.id,
            content: fragment.content,
            context: fragment.context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_fragment_is_identified_by_reserved_id() {
        let fragment = Fragment::raw("<p>hi</p>").unwrap();
        assert!(fragment.is_raw());
        assert_eq!(fragment.id(), RAW_FRAGMENT_ID);
        assert!(fragment.context().is_empty());
    }

    #[test]
    fn any_other_id_is_a_snippet() {
        let fragment = Fragment::snippet("services,handlebars", "<script></script>").unwrap();
        assert!(!fragment.is_raw());
    }

    #[test]
    fn empty_id_or_content_is_rejected() {
        assert!(Fragment::raw("").is_err());
        assert!(Fragment::snippet("", "x").is_err());
        assert_eq!(
            Fragment::snippet("_snippet", "").unwrap_err(),
            FragmentError::Invalid {
                id: "_snippet".into(),
                content: String::new(),
            }
        );
    }

    #[test]
    fn deserializes_from_wire_document() {
        let fragment: Fragment = serde_json::from_value(json!({
            "_ID": "_snippet",
            "_CONTENT": "<script data-service='/svc'>{{a}}</script>",
        }))
        .unwrap();
        assert_eq!(fragment.id(), "_snippet");
        assert!(fragment.context().is_empty());

        let doc = serde_json::to_value(&fragment).unwrap();
        assert_eq!(doc["_CONTEXT"], json!({}));
    }

    #[test]
    fn deserialization_enforces_non_empty_content() {
        let result: Result<Fragment, _> =
            serde_json::from_value(json!({ "_ID": "_raw", "_CONTENT": "" }));
        assert!(result.is_err());
    }
}
