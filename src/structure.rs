// Input model: the folder tree described by the operator's JSON file.
// Everything is validated once here so the provisioner can walk a typed
// tree without re-checking shapes mid-run.

use crate::error::{ProvisionError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;

/// Project properties: a flat key/value mapping upserted on the root folder.
pub type Properties = serde_json::Map<String, Value>;

/// A recipe to create inside a folder. `code` and `config` are passed to the
/// platform untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecipeSpec {
    pub name: String,
    pub code: Value,
    pub config: Value,
    #[serde(default)]
    pub description: Option<String>,
}

/// One folder of the tree. Children may be written as bare strings in the
/// input; both forms deserialize into this struct.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "FolderEntry")]
pub struct FolderNode {
    pub name: String,
    pub children: Vec<FolderNode>,
    pub recipes: Vec<RecipeSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FolderEntry {
    Name(String),
    Node {
        name: String,
        #[serde(default)]
        children: Vec<FolderNode>,
        #[serde(default)]
        recipes: Vec<RecipeSpec>,
    },
}

impl From<FolderEntry> for FolderNode {
    fn from(entry: FolderEntry) -> Self {
        match entry {
            FolderEntry::Name(name) => FolderNode::leaf(name),
            FolderEntry::Node {
                name,
                children,
                recipes,
            } => FolderNode {
                name,
                children,
                recipes,
            },
        }
    }
}

impl FolderNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        FolderNode {
            name: name.into(),
            children: Vec::new(),
            recipes: Vec::new(),
        }
    }

    /// Number of folders in this subtree, including this one.
    pub fn folder_count(&self) -> usize {
        1 + self.children.iter().map(FolderNode::folder_count).sum::<usize>()
    }

    /// Number of recipes in this subtree.
    pub fn recipe_count(&self) -> usize {
        self.recipes.len() + self.children.iter().map(FolderNode::recipe_count).sum::<usize>()
    }

    fn check_names(&self, path: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ProvisionError::InvalidStructure(format!(
                "folder under '{}' has an empty name",
                path
            )));
        }
        let here = format!("{}/{}", path, self.name);
        for recipe in &self.recipes {
            if recipe.name.trim().is_empty() {
                return Err(ProvisionError::InvalidStructure(format!(
                    "recipe in '{}' has an empty name",
                    here
                )));
            }
        }
        self.children.iter().try_for_each(|child| child.check_names(&here))
    }
}

#[derive(Deserialize)]
struct Document {
    parent: String,
    children: Vec<FolderNode>,
    #[serde(default)]
    recipes: Vec<RecipeSpec>,
    #[serde(default)]
    properties: Option<Properties>,
}

/// The parsed input file: the root folder (the "project") plus its optional
/// properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStructure {
    pub root: FolderNode,
    pub properties: Option<Properties>,
}

impl ProjectStructure {
    /// Read and validate a structure file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("reading structure from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ProvisionError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a structure document. The top level must carry a
    /// non-empty string `parent` and a `children` array.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| invalid(format!("not valid JSON: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| invalid("top level must be a JSON object".into()))?;
        match object.get("parent") {
            Some(Value::String(name)) if !name.trim().is_empty() => {}
            Some(_) => return Err(invalid("'parent' must be a non-empty string".into())),
            None => return Err(invalid("missing 'parent'".into())),
        }
        match object.get("children") {
            Some(Value::Array(_)) => {}
            Some(_) => return Err(invalid("'children' must be a list".into())),
            None => return Err(invalid("missing 'children'".into())),
        }

        let doc: Document = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        let root = FolderNode {
            name: doc.parent,
            children: doc.children,
            recipes: doc.recipes,
        };
        root.check_names("").map_err(|e| {
            warn!("{}", e);
            e
        })?;

        Ok(ProjectStructure {
            root,
            properties: doc.properties,
        })
    }
}

fn invalid(reason: String) -> ProvisionError {
    warn!("rejecting structure: {}", reason);
    ProvisionError::InvalidStructure(reason)
}

/// Render the tree as indented text for operator review, recipes listed
/// before sub-folders in the order they will be created.
pub fn render_preview(root: &FolderNode) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0);
    out
}

fn write_node(out: &mut String, node: &FolderNode, level: usize) {
    let indent = "  ".repeat(level);
    let _ = writeln!(out, "{}- {}", indent, node.name);
    for recipe in &node.recipes {
        let _ = writeln!(out, "{}  * recipe: {}", indent, recipe.name);
    }
    for child in &node.children {
        write_node(out, child, level + 1);
    }
}
