//! # CLI Command Implementations

use crate::api::{self, AppState, FormResponse, ListResponse, PopupResponse, encode_form};
use crate::config::AppConfig;
use crate::popup::{decode_payload, handle_popup};
use crate::store::{load_or_create_list, save_list};
use std::path::Path;
use trigdeps_core::{
    DependencyList, HtmlRowRenderer, RowRenderer, TrigDepsError, TriggerId, list_from_json,
    list_to_json,
};

/// Maximum input file size for `merge` and `import` (10 MB).
const MAX_INPUT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read an input file, refusing directories and oversized files.
fn read_input(path: &Path) -> Result<Vec<u8>, TrigDepsError> {
    let canonical = path.canonicalize().map_err(|e| {
        TrigDepsError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;
    if !canonical.is_file() {
        return Err(TrigDepsError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| TrigDepsError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(TrigDepsError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }

    std::fs::read(&canonical).map_err(|e| TrigDepsError::IoError(format!("Read input: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), TrigDepsError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| TrigDepsError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn print_table(list: &DependencyList) {
    if list.is_empty() {
        println!("(no dependencies)");
        return;
    }
    for dependency in list {
        println!(
            "{:>12}  {}  [{}]",
            dependency.triggerid, dependency.name, dependency.url
        );
    }
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty state file.
pub fn cmd_init(state: &Path, force: bool) -> Result<(), TrigDepsError> {
    if state.exists() && !force {
        return Err(TrigDepsError::IoError(format!(
            "State file {:?} already exists. Use --force to overwrite.",
            state
        )));
    }
    save_list(&DependencyList::new(), state)?;
    println!("Initialized empty dependency list at {:?}", state);
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show the dependency list.
pub fn cmd_show(state: &Path, json_mode: bool) -> Result<(), TrigDepsError> {
    let list = load_or_create_list(state)?;

    if json_mode {
        return print_json(&ListResponse::from(&list));
    }

    println!("Dependencies ({})", list.len());
    println!("================");
    print_table(&list);
    Ok(())
}

// =============================================================================
// MERGE COMMAND
// =============================================================================

/// Merge a popup payload file into the list.
pub fn cmd_merge(
    state: &Path,
    config: &AppConfig,
    json_mode: bool,
    file: &Path,
) -> Result<(), TrigDepsError> {
    let mut list = load_or_create_list(state)?;
    let merger = config.merger();

    let payload = decode_payload(&read_input(file)?, config.merge.malformed)?;
    let appended = handle_popup(&merger, &mut list, &payload, config.merge.malformed)?;
    if !appended.is_empty() {
        save_list(&list, state)?;
    }

    if json_mode {
        let rows = HtmlRowRenderer.render_all(&appended);
        return print_json(&PopupResponse::success(rows, list.len()));
    }

    println!("Appended {} of {} total", appended.len(), list.len());
    for dependency in &appended {
        println!("  + {}  {}", dependency.triggerid, dependency.name);
    }
    Ok(())
}

// =============================================================================
// REMOVE COMMAND
// =============================================================================

/// Remove one dependency. Removing an unlisted id succeeds.
pub fn cmd_remove(
    state: &Path,
    config: &AppConfig,
    json_mode: bool,
    triggerid: &str,
) -> Result<(), TrigDepsError> {
    let triggerid = TriggerId::parse(triggerid)?;
    let mut list = load_or_create_list(state)?;

    let removed = config.merger().remove(&mut list, &triggerid);
    if removed.is_some() {
        save_list(&list, state)?;
    }

    if json_mode {
        return print_json(&api::RemoveResponse::success(removed.is_some()));
    }

    match removed {
        Some(dependency) => println!("Removed {}  {}", dependency.triggerid, dependency.name),
        None => println!("Trigger {} was not listed", triggerid),
    }
    Ok(())
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Print every row as HTML.
pub fn cmd_render(state: &Path, json_mode: bool) -> Result<(), TrigDepsError> {
    let list = load_or_create_list(state)?;
    let rows = HtmlRowRenderer.render_all(&list);

    if json_mode {
        return print_json(&rows);
    }
    for row in rows {
        println!("{}", row.html);
    }
    Ok(())
}

// =============================================================================
// FORM COMMAND
// =============================================================================

/// Print the urlencoded body the form would submit.
pub fn cmd_form(state: &Path, json_mode: bool) -> Result<(), TrigDepsError> {
    let list = load_or_create_list(state)?;

    if json_mode {
        return print_json(&FormResponse::from(&list));
    }
    println!("{}", encode_form(&list.to_form_pairs()));
    Ok(())
}

// =============================================================================
// EXPORT / IMPORT COMMANDS
// =============================================================================

/// Write the list as JSON to `output`, or to stdout.
pub fn cmd_export(state: &Path, output: Option<&Path>) -> Result<(), TrigDepsError> {
    let list = load_or_create_list(state)?;
    let text = list_to_json(&list)?;

    match output {
        Some(path) => {
            std::fs::write(path, text.as_bytes())
                .map_err(|e| TrigDepsError::IoError(format!("Write export: {}", e)))?;
            println!("Exported {} dependencies to {:?}", list.len(), path);
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Replace the state with a list read from a JSON export.
pub fn cmd_import(state: &Path, file: &Path, force: bool) -> Result<(), TrigDepsError> {
    if state.exists() && !force {
        return Err(TrigDepsError::IoError(format!(
            "State file {:?} already exists. Use --force to overwrite.",
            state
        )));
    }

    let bytes = read_input(file)?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| TrigDepsError::SerializationError(format!("Export is not UTF-8: {}", e)))?;
    let list = list_from_json(text)?;

    save_list(&list, state)?;
    println!("Imported {} dependencies into {:?}", list.len(), state);
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server on the list stored in `state`.
pub async fn cmd_server(
    state: &Path,
    config: &AppConfig,
    host: &str,
    port: u16,
) -> Result<(), TrigDepsError> {
    let list = load_or_create_list(state)?;

    println!("trigdeps server starting...");
    println!();
    println!("Configuration:");
    println!("  Host:      {}", host);
    println!("  Port:      {}", port);
    println!("  State:     {:?}", state);
    println!("  Malformed: {:?}", config.merge.malformed);
    match &config.links.parent_discoveryid {
        Some(id) => println!("  Discovery: {}", id),
        None => println!("  Discovery: (none, prototype batches will be rejected)"),
    }
    println!();
    println!("Endpoints:");
    println!("  POST /popup               - Merge a popup batch");
    println!("  POST /dependencies/remove - Remove a dependency");
    println!("  GET  /dependencies        - List dependencies");
    println!("  GET  /rows                - Rendered rows");
    println!("  GET  /form                - Form submission fields");
    println!("  GET  /health              - Health check");
    println!();

    let app_state = AppState::new(list, config).with_store(state.to_path_buf());
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, app_state).await
}
