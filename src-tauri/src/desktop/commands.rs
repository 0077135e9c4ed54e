//! Tauri commands: the frontend's only way into the workflow.
//!
//! Every command that changes state republishes the snapshot and shows
//! any queued notices, so the webview never tracks state of its own.

use super::DesktopState;
use crate::workflow::{Notice, WorkflowController, WorkflowSnapshot};
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

pub const SNAPSHOT_EVENT: &str = "workflow-updated";

/// Run `f` against the controller, then push the new snapshot and notices.
pub fn with_workflow<T>(
    app: &AppHandle,
    f: impl FnOnce(&mut WorkflowController) -> T,
) -> Result<T, String> {
    let state = app.state::<DesktopState>();
    let (out, snapshot, notices) = {
        let mut workflow = state.workflow.lock().map_err(|e| e.to_string())?;
        let out = f(&mut workflow);
        (out, workflow.snapshot(), workflow.drain_notices())
    };
    publish(app, &snapshot, notices);
    Ok(out)
}

pub fn publish(app: &AppHandle, snapshot: &WorkflowSnapshot, notices: Vec<Notice>) {
    if let Err(e) = app.emit(SNAPSHOT_EVENT, snapshot) {
        log::error!("[WINDOW] Failed to emit snapshot: {}", e);
    }
    for notice in notices {
        let (title, message, kind) = match notice {
            Notice::Error { title, message } => (title, message, MessageDialogKind::Error),
            Notice::Warning { title, message } => (title, message, MessageDialogKind::Warning),
        };
        app.dialog()
            .message(message)
            .title(title)
            .kind(kind)
            .show(|_| {});
    }
}

#[tauri::command]
pub fn workflow_snapshot(app: AppHandle) -> Result<WorkflowSnapshot, String> {
    let state = app.state::<DesktopState>();
    let workflow = state.workflow.lock().map_err(|e| e.to_string())?;
    Ok(workflow.snapshot())
}

#[tauri::command]
pub fn submit_credential(app: AppHandle, key: String) -> Result<bool, String> {
    with_workflow(&app, |wf| wf.submit_credential(&key))
}

#[tauri::command]
pub fn refresh_models(app: AppHandle) -> Result<bool, String> {
    with_workflow(&app, |wf| wf.refresh_models())
}

#[tauri::command]
pub fn select_model(app: AppHandle, model_id: String) -> Result<bool, String> {
    with_workflow(&app, |wf| wf.select_model(&model_id))
}

#[tauri::command]
pub fn capture(app: AppHandle) -> Result<bool, String> {
    with_workflow(&app, |wf| wf.request_capture())
}

#[tauri::command]
pub fn process(app: AppHandle, prompt: String) -> Result<bool, String> {
    with_workflow(&app, |wf| wf.request_process(&prompt))
}

#[tauri::command]
pub fn copy_markdown(app: AppHandle) -> Result<(), String> {
    with_workflow(&app, |wf| wf.copy_markdown())
}

/// Ask for a destination, then write the raw Markdown there.
#[tauri::command]
pub async fn save_markdown(app: AppHandle) -> Result<(), String> {
    if !with_workflow(&app, |wf| wf.can_save())? {
        return Ok(());
    }

    let chosen = app
        .dialog()
        .file()
        .set_title("Save As")
        .set_file_name("result.md")
        .add_filter("Markdown Files", &["md"])
        .add_filter("All Files", &["*"])
        .blocking_save_file();

    let Some(file) = chosen else {
        return Ok(());
    };
    let path = file.into_path().map_err(|e| e.to_string())?;
    with_workflow(&app, |wf| {
        wf.save_markdown(&path);
    })
}

#[tauri::command]
pub fn minimize(app: AppHandle) -> Result<(), String> {
    let state = app.state::<DesktopState>();
    let mut presentation = state.presentation.lock().map_err(|e| e.to_string())?;
    presentation.minimize();
    Ok(())
}

#[tauri::command]
pub fn expand(app: AppHandle) -> Result<(), String> {
    let state = app.state::<DesktopState>();
    let mut presentation = state.presentation.lock().map_err(|e| e.to_string())?;
    presentation.expand();
    Ok(())
}

#[tauri::command]
pub fn quit(app: AppHandle) -> Result<(), String> {
    super::request_quit(&app);
    Ok(())
}

/// Right-click on the floating button: native menu with Show and Quit.
#[tauri::command]
pub fn show_floater_menu(app: AppHandle, window: tauri::Window) -> Result<(), String> {
    let menu = super::tray::build_menu(&app).map_err(|e| e.to_string())?;
    window.popup_menu(&menu).map_err(|e| e.to_string())
}
