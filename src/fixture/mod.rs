// Page fixtures: a body described in JSON or YAML, plus a script of user
// actions to replay against it

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::FieldsConfig;
use crate::dom::{Document, DomResult, NodeId};
use crate::error::{PageError, PageResult};
use crate::page::Page;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub body: Vec<FixtureNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureNode {
    Text(String),
    Element(ElementFixture),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFixture {
    pub tag: String,
    /// Applied in the order written, which is the order serialized back out
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    /// Live value, when it differs from the `value` attribute
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub children: Vec<FixtureNode>,
}

/// One step of a replayed user session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Click { id: String },
    Type { id: String, value: String },
    Remove { id: String },
    Append {
        /// Id of the new node's parent; the body when absent
        #[serde(default)]
        parent: Option<String>,
        node: FixtureNode,
    },
}

impl PageFixture {
    pub fn load(path: &Path) -> PageResult<Self> {
        read_structured(path)
    }

    /// Build the body into a fresh document, then compose a page over it
    /// with the built-in fields and the multivalued controller installed.
    pub fn into_page(&self, config: &FieldsConfig) -> PageResult<Page> {
        let mut document = Document::new();
        let body = document.body();
        for node in &self.body {
            let built = node.build(&mut document)?;
            document.append_child(body, built)?;
        }

        let mut page = Page::from_document(document, config)?;
        let mounted = page.install_builtin_fields(config);
        page.install_multivalued()?;
        tracing::debug!(
            "Built page with {} top-level nodes and {} mounted fields",
            self.body.len(),
            mounted
        );
        Ok(page)
    }
}

impl FixtureNode {
    /// Create the node and its children as a detached subtree
    pub fn build(&self, document: &mut Document) -> DomResult<NodeId> {
        match self {
            FixtureNode::Text(text) => Ok(document.create_text(text)),
            FixtureNode::Element(element) => {
                let id = document.create_element(&element.tag);
                for (name, value) in &element.attributes {
                    document.set_attribute(id, name, value)?;
                }
                if let Some(value) = &element.value {
                    document.set_value(id, value)?;
                }
                for child in &element.children {
                    let built = child.build(document)?;
                    document.append_child(id, built)?;
                }
                Ok(id)
            }
        }
    }
}

impl ScriptAction {
    pub fn apply(&self, page: &mut Page) -> PageResult<()> {
        tracing::debug!("Applying script action {:?}", self);
        match self {
            ScriptAction::Click { id } => {
                page.click_by_id(id)?;
            }
            ScriptAction::Type { id, value } => {
                page.type_into(id, value)?;
            }
            ScriptAction::Remove { id } => page.remove_by_id(id)?,
            ScriptAction::Append { parent, node } => {
                let parent = match parent {
                    Some(id) => page.element_by_id(id)?,
                    None => page.document().body(),
                };
                page.mutate(|document| -> DomResult<()> {
                    let built = node.build(document)?;
                    document.append_child(parent, built)
                })?;
            }
        }
        Ok(())
    }
}

pub fn load_script(path: &Path) -> PageResult<Vec<ScriptAction>> {
    read_structured(path)
}

pub fn run_script(page: &mut Page, script: &[ScriptAction]) -> PageResult<()> {
    for action in script {
        action.apply(page)?;
    }
    Ok(())
}

/// Deserialize a JSON or YAML file, chosen by extension
fn read_structured<T: DeserializeOwned>(path: &Path) -> PageResult<T> {
    let content = fs::read_to_string(path).map_err(|source| PageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        other => Err(PageError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAILS: &str = r##"
body:
  - tag: form
    children:
      - tag: input
        attributes:
          name: emails
          data-kcMultivalued: ""
        value: a@x.com
      - tag: input
        attributes:
          id: amount
          data-kcNumberFormat: "#,##0"
        value: "1234"
"##;

    #[test]
    fn test_yaml_fixture_builds_an_installed_page() {
        let fixture: PageFixture = serde_yaml::from_str(EMAILS).unwrap();
        let config = FieldsConfig::development();
        let page = fixture.into_page(&config).unwrap();

        let amount = page.element_by_id("amount").unwrap();
        assert_eq!(page.document().value(amount), Some("1,234"));
        assert!(page.element_by_id("kc-add-emails-0").is_ok());
    }

    #[test]
    fn test_attributes_keep_authored_order() {
        let node: FixtureNode = serde_yaml::from_str(
            r#"
tag: input
attributes:
  name: emails
  id: emails-0
  data-kcMultivalued: ""
"#,
        )
        .unwrap();
        let mut document = Document::new();
        let input = node.build(&mut document).unwrap();

        let names: Vec<&str> = document
            .attributes(input)
            .unwrap()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "id", "data-kcMultivalued"]);
        assert_eq!(
            document.outer_html(input).unwrap(),
            r#"<input name="emails" id="emails-0" data-kcMultivalued="">"#
        );
    }

    #[test]
    fn test_script_actions_parse_from_json() {
        let script: Vec<ScriptAction> = serde_json::from_str(
            r#"[
                {"action": "click", "id": "kc-add-emails-0"},
                {"action": "type", "id": "emails-1", "value": "b@x.com"},
                {"action": "append", "node": {"tag": "p", "children": ["hi"]}}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            script[0],
            ScriptAction::Click {
                id: "kc-add-emails-0".into()
            }
        );
        assert!(matches!(
            &script[2],
            ScriptAction::Append { parent: None, node: FixtureNode::Element(element) }
                if element.children == vec![FixtureNode::Text("hi".into())]
        ));
    }

    #[test]
    fn test_script_replays_against_page() {
        let fixture: PageFixture = serde_yaml::from_str(EMAILS).unwrap();
        let config = FieldsConfig::development();
        let mut page = fixture.into_page(&config).unwrap();

        let script = vec![
            ScriptAction::Click {
                id: "kc-add-emails-0".into(),
            },
            ScriptAction::Type {
                id: "emails-1".into(),
                value: "b@x.com".into(),
            },
            ScriptAction::Click {
                id: "kc-remove-emails-0".into(),
            },
        ];
        run_script(&mut page, &script).unwrap();

        let survivors = page.multivalued().group(page.document(), "emails").unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(page.document().value(survivors.elements[0]), Some("b@x.com"));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let error = read_structured::<PageFixture>(Path::new("Cargo.toml")).unwrap_err();
        assert!(matches!(error, PageError::UnsupportedFormat(ext) if ext == "toml"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = PageFixture::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(error, PageError::Io { path, .. } if path.ends_with("exist.json")));
    }
}
