//! Tauri application shell.
//!
//! Wires the workflow and presentation controllers to real windows, the
//! menu-bar icon, native dialogs and the global quit shortcut.

mod commands;
mod host;
mod tray;

use crate::capture::ScreencaptureInvoker;
use crate::clipboard::SystemClipboard;
use crate::config::AppConfig;
use crate::credentials::PermissionMarker;
use crate::llm::{GeminiCatalog, GeminiVision};
use crate::presentation::{PresentationController, PresentationMode};
use crate::workflow::{self, JobReceiver, Services, WorkflowController};
use host::{TauriWindowHost, MAIN_WINDOW};
use std::sync::{Arc, Mutex};
use tauri::{AppHandle, Manager, WindowEvent};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};

const QUIT_SHORTCUT: &str = "CommandOrControl+Q";
const SCREEN_RECORDING_SETTINGS: &str =
    "x-apple.systempreferences:com.apple.preference.security?ScreenRecording";

pub struct DesktopState {
    pub workflow: Mutex<WorkflowController>,
    pub presentation: Mutex<PresentationController<TauriWindowHost>>,
}

fn with_presentation(
    app: &AppHandle,
    f: impl FnOnce(&mut PresentationController<TauriWindowHost>),
) {
    let state = app.state::<DesktopState>();
    match state.presentation.lock() {
        Ok(mut presentation) => f(&mut presentation),
        Err(e) => log::error!("[WINDOW] Presentation state poisoned: {}", e),
    };
}

pub(crate) fn expand(app: &AppHandle) {
    with_presentation(app, |p| p.expand());
}

pub(crate) fn request_quit(app: &AppHandle) {
    with_presentation(app, |p| {
        p.request_quit();
    });
}

/// Entry point, called by `main`.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    crate::platform::init_logging();

    let config = AppConfig::from_env();
    log::info!("[CONFIG] API base: {}", config.api_base);
    log::info!("[CONFIG] Capture path: {}", config.capture_path.display());

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            commands::workflow_snapshot,
            commands::submit_credential,
            commands::refresh_models,
            commands::select_model,
            commands::capture,
            commands::process,
            commands::copy_markdown,
            commands::save_markdown,
            commands::minimize,
            commands::expand,
            commands::quit,
            commands::show_floater_menu,
        ])
        .on_menu_event(|app, event| match event.id().as_ref() {
            tray::MENU_EXPAND => expand(app),
            tray::MENU_QUIT => request_quit(app),
            _ => {}
        })
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW {
                return;
            }
            if let WindowEvent::CloseRequested { api, .. } = event {
                api.prevent_close();
                with_presentation(window.app_handle(), |p| p.on_close_requested());
            }
        })
        .setup(move |app| {
            log::info!("Gemini Vision starting up");

            let handle = app.handle().clone();
            let runtime =
                tauri::async_runtime::block_on(async { tokio::runtime::Handle::current() });
            let host = Arc::new(TauriWindowHost::new(handle.clone()));

            let (jobs, events) = workflow::channel(runtime.clone());
            let services = Services {
                catalog: Arc::new(GeminiCatalog::new(&config.api_base)),
                capture: Arc::new(ScreencaptureInvoker::new(host.clone())),
                vision: Arc::new(GeminiVision::new(&config.api_base)),
                clipboard: Box::new(SystemClipboard),
            };
            let first_run = PermissionMarker::new(&config.cache_dir).take_first_run();

            let mut workflow = WorkflowController::new(config.clone(), services, jobs);
            workflow.bootstrap();

            let presentation =
                PresentationController::new(host, runtime, PresentationMode::Minimized);
            app.manage(DesktopState {
                workflow: Mutex::new(workflow),
                presentation: Mutex::new(presentation),
            });

            spawn_event_pump(handle.clone(), events);

            tray::setup_tray(&handle)?;
            handle.plugin(
                tauri_plugin_global_shortcut::Builder::new()
                    .with_handler(|app, _shortcut, event| {
                        if event.state() == ShortcutState::Pressed {
                            request_quit(app);
                        }
                    })
                    .build(),
            )?;
            app.global_shortcut().register(QUIT_SHORTCUT)?;

            match first_run {
                Ok(true) => show_permission_notice(&handle),
                Ok(false) => {}
                Err(e) => log::warn!("[STORE] {}", e),
            }

            log::info!("Ready, minimized to floating button");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running Gemini Vision");
}

/// Apply job events to the workflow in arrival order and republish.
fn spawn_event_pump(app: AppHandle, mut events: JobReceiver) {
    tauri::async_runtime::spawn(async move {
        while let Some(event) = events.recv().await {
            log::debug!("[JOBS] Applying {} result", event.kind());
            if let Err(e) = commands::with_workflow(&app, |wf| wf.apply(event)) {
                log::error!("[JOBS] Could not apply result: {}", e);
            }
        }
        log::info!("[JOBS] Event pump stopped");
    });
}

/// First launch only: explain the Screen Recording permission.
fn show_permission_notice(app: &AppHandle) {
    let opener = app.clone();
    app.dialog()
        .message(
            "Gemini Vision captures your screen with the macOS screencapture tool.\n\n\
             The first capture will ask for Screen Recording permission. You can grant it \
             in System Settings > Privacy & Security > Screen Recording.",
        )
        .title("Screen Recording Permission Needed")
        .kind(MessageDialogKind::Info)
        .buttons(MessageDialogButtons::OkCancelCustom(
            "Open System Settings".to_string(),
            "OK".to_string(),
        ))
        .show(move |open_settings| {
            if !open_settings {
                return;
            }
            #[allow(deprecated)]
            let opened = {
                use tauri_plugin_shell::ShellExt;
                opener.shell().open(SCREEN_RECORDING_SETTINGS, None)
            };
            if let Err(e) = opened {
                log::error!("[WINDOW] Could not open System Settings: {}", e);
            }
        });
}
