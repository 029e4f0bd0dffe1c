//! Depth-first creation of the folder tree.
//!
//! Calls go out strictly one at a time in pre-order: a folder, then its
//! recipes, then its sub-folders, and the project properties last of all.
//! A folder whose creation fails takes its whole subtree with it, since the
//! descendants have no parent ID to attach to. A dry run walks the full tree
//! without an ID either, logging what would have been created.

use crate::api::{CreateFolderRequest, CreateRecipeRequest, PropertiesRequest, WorkatoApi};
use crate::status::{Outcome, StatusEntry, StatusLog};
use crate::structure::{FolderNode, ProjectStructure, Properties, RecipeSpec};
use indicatif::ProgressBar;
use log::{error, info};

pub struct Provisioner<'a, A: WorkatoApi + ?Sized> {
    api: &'a A,
    dry_run: bool,
    progress: ProgressBar,
}

impl<'a, A: WorkatoApi + ?Sized> Provisioner<'a, A> {
    pub fn new(api: &'a A, dry_run: bool) -> Self {
        Provisioner {
            api,
            dry_run,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report each call on `progress` as it is issued.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Create the whole structure and return the log of every attempt.
    pub fn run(&self, structure: &ProjectStructure) -> StatusLog {
        let mut log = StatusLog::new();
        let root_id = self.create_folder(&structure.root, None, &mut log);

        if let (Some(project_id), Some(properties)) = (root_id, &structure.properties) {
            self.upsert_properties(project_id, properties, &mut log);
        }
        log
    }

    /// Create `node` under `parent_id`, then its recipes and sub-folders.
    /// Returns the new folder's ID, or `None` on failure or in a dry run.
    pub fn create_folder(&self, node: &FolderNode, parent_id: Option<u64>, log: &mut StatusLog) -> Option<u64> {
        if self.dry_run {
            log.push(StatusEntry::Folder {
                name: node.name.clone(),
                parent_id,
                outcome: Outcome::Planned,
            });
            for recipe in &node.recipes {
                self.create_recipe(recipe, None, log);
            }
            for child in &node.children {
                self.create_folder(child, None, log);
            }
            return None;
        }

        self.progress.set_message(format!("folder {}", node.name));
        let req = CreateFolderRequest {
            name: node.name.clone(),
            parent_id,
        };
        let folder_id = match self.api.create_folder(&req) {
            Ok(id) => id,
            Err(e) => {
                let detail = e.detail();
                error!("Failed to create folder '{}' (parent_id={:?}): {}", node.name, parent_id, detail);
                log.push(StatusEntry::Folder {
                    name: node.name.clone(),
                    parent_id,
                    outcome: Outcome::Failed(detail),
                });
                return None;
            }
        };
        info!("created folder '{}' id={}", node.name, folder_id);
        log.push(StatusEntry::Folder {
            name: node.name.clone(),
            parent_id,
            outcome: Outcome::Created(folder_id),
        });

        for recipe in &node.recipes {
            self.create_recipe(recipe, Some(folder_id), log);
        }
        for child in &node.children {
            self.create_folder(child, Some(folder_id), log);
        }
        Some(folder_id)
    }

    /// Create one recipe in `folder_id`. Without a folder (dry run) the
    /// recipe is only logged as planned.
    pub fn create_recipe(&self, recipe: &RecipeSpec, folder_id: Option<u64>, log: &mut StatusLog) -> Option<u64> {
        let folder = match folder_id {
            Some(id) if !self.dry_run => id,
            _ => {
                log.push(StatusEntry::Recipe {
                    name: recipe.name.clone(),
                    folder_id,
                    outcome: Outcome::Planned,
                });
                return None;
            }
        };

        self.progress.set_message(format!("recipe {}", recipe.name));
        let outcome = match self.api.create_recipe(&CreateRecipeRequest::new(recipe, folder)) {
            Ok(id) => {
                info!("created recipe '{}' id={}", recipe.name, id);
                Outcome::Created(id)
            }
            Err(e) => {
                let detail = e.detail();
                error!("Failed to create recipe '{}' in folder {}: {}", recipe.name, folder, detail);
                Outcome::Failed(detail)
            }
        };
        let id = match outcome {
            Outcome::Created(id) => Some(id),
            _ => None,
        };
        log.push(StatusEntry::Recipe {
            name: recipe.name.clone(),
            folder_id,
            outcome,
        });
        id
    }

    /// Send the full property mapping for the project in one call.
    pub fn upsert_properties(&self, project_id: u64, properties: &Properties, log: &mut StatusLog) -> bool {
        if self.dry_run {
            log.push(StatusEntry::ProjectProperties {
                project_id,
                properties: properties.clone(),
                outcome: Outcome::Planned,
            });
            return false;
        }

        self.progress.set_message("project properties");
        let req = PropertiesRequest {
            properties: properties.clone(),
        };
        let outcome = match self.api.upsert_properties(project_id, &req) {
            Ok(()) => {
                info!("upserted {} properties on project {}", properties.len(), project_id);
                Outcome::Created(())
            }
            Err(e) => {
                let detail = e.detail();
                error!("Failed to upsert project properties for project_id {}: {}", project_id, detail);
                Outcome::Failed(detail)
            }
        };
        let created = outcome.is_created();
        log.push(StatusEntry::ProjectProperties {
            project_id,
            properties: req.properties,
            outcome,
        });
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProvisionError, Result};
    use std::cell::RefCell;

    /// Hands out incrementing IDs and fails folders whose name is listed.
    #[derive(Default)]
    struct FakeApi {
        next_id: RefCell<u64>,
        fail_folders: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeApi {
        fn assign(&self) -> u64 {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            *next
        }
    }

    impl WorkatoApi for FakeApi {
        fn create_folder(&self, req: &CreateFolderRequest) -> Result<u64> {
            self.calls.borrow_mut().push(format!("folder {}", req.name));
            if self.fail_folders.contains(&req.name.as_str()) {
                return Err(ProvisionError::ApiCallFailed { status: 400, body: "nope".into() });
            }
            Ok(self.assign())
        }

        fn create_recipe(&self, req: &CreateRecipeRequest) -> Result<u64> {
            self.calls.borrow_mut().push(format!("recipe {}", req.recipe.name));
            Ok(self.assign())
        }

        fn upsert_properties(&self, project_id: u64, _req: &PropertiesRequest) -> Result<()> {
            self.calls.borrow_mut().push(format!("properties {}", project_id));
            Ok(())
        }
    }

    fn tree() -> FolderNode {
        FolderNode {
            name: "Root".into(),
            children: vec![FolderNode {
                name: "A".into(),
                children: vec![FolderNode::leaf("A1")],
                recipes: vec![RecipeSpec {
                    name: "RA".into(),
                    code: serde_json::json!("x"),
                    config: serde_json::json!({}),
                    description: None,
                }],
            }],
            recipes: Vec::new(),
        }
    }

    #[test]
    fn recipes_precede_child_folders() {
        let api = FakeApi::default();
        let mut log = StatusLog::new();
        let id = Provisioner::new(&api, false).create_folder(&tree(), None, &mut log);

        assert_eq!(id, Some(1));
        assert_eq!(*api.calls.borrow(), vec!["folder Root", "folder A", "recipe RA", "folder A1"]);
        assert_eq!(
            log.entries()[3],
            StatusEntry::Folder { name: "A1".into(), parent_id: Some(2), outcome: Outcome::Created(4) }
        );
    }

    #[test]
    fn failed_folder_skips_its_subtree_only() {
        let api = FakeApi { fail_folders: vec!["A"], ..Default::default() };
        let mut root = tree();
        root.children.push(FolderNode::leaf("B"));
        let mut log = StatusLog::new();
        Provisioner::new(&api, false).create_folder(&root, None, &mut log);

        assert_eq!(*api.calls.borrow(), vec!["folder Root", "folder A", "folder B"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[1].error(), Some("nope"));
        assert_eq!(log.entries()[2].id(), Some(2));
    }

    #[test]
    fn dry_run_logs_everything_and_calls_nothing() {
        let api = FakeApi::default();
        let mut log = StatusLog::new();
        let id = Provisioner::new(&api, true).create_folder(&tree(), None, &mut log);

        assert_eq!(id, None);
        assert!(api.calls.borrow().is_empty());
        assert_eq!(log.len(), 4);
        assert!(log.iter().all(|e| !e.is_created() && e.id().is_none() && e.error().is_none()));
    }

    #[test]
    fn dry_run_property_upsert_is_planned() {
        let api = FakeApi::default();
        let mut log = StatusLog::new();
        let mut props = Properties::new();
        props.insert("k".into(), serde_json::json!("v"));

        assert!(!Provisioner::new(&api, true).upsert_properties(5, &props, &mut log));
        assert!(api.calls.borrow().is_empty());
        assert_eq!(
            log.entries()[0].to_string(),
            "Not upserted project properties for project_id 5 (dry run)"
        );
    }
}
