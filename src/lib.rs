// Library root
// -----------
// This crate exposes the pieces of the provisioning CLI. The binary
// (`main.rs`) only sets up logging and hands over to `ui::run`.
//
// Module responsibilities:
// - `structure`: loads and validates the JSON folder tree, renders the preview.
// - `api`: blocking HTTP client for the folder, recipe and properties endpoints.
// - `provision`: walks the tree and issues the create calls in order.
// - `status`: the per-operation log and its summary rendering.
// - `config`: token, input path and dry-run flag from env and prompts.
// - `ui`: the interactive session tying it all together.
pub mod api;
pub mod config;
pub mod error;
pub mod provision;
pub mod status;
pub mod structure;
pub mod ui;

pub use error::{ProvisionError, Result};
