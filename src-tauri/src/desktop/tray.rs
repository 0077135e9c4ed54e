//! Menu-bar icon and the Show/Quit menu it shares with the floating button.

use tauri::{
    image::Image as TauriImage,
    menu::{Menu, MenuBuilder, MenuItemBuilder},
    tray::{MouseButton, TrayIconBuilder, TrayIconEvent},
    AppHandle, Runtime,
};

pub const MENU_EXPAND: &str = "expand";
pub const MENU_QUIT: &str = "quit";

/// "Show Gemini Vision" and "Quit". Item events are handled app-wide.
pub fn build_menu<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<Menu<R>> {
    let expand = MenuItemBuilder::with_id(MENU_EXPAND, "Show Gemini Vision").build(app)?;
    let quit = MenuItemBuilder::with_id(MENU_QUIT, "Quit")
        .accelerator("CmdOrCtrl+Q")
        .build(app)?;
    MenuBuilder::new(app)
        .item(&expand)
        .separator()
        .item(&quit)
        .build()
}

/// Left-click expands the review window; right-click opens the menu.
pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let menu = build_menu(app)?;

    let icon_bytes = include_bytes!("../../icons/32x32.png");
    let icon_img = image::load_from_memory(icon_bytes)
        .map_err(|e| format!("Failed to decode tray icon: {}", e))?;
    let rgba = icon_img.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let tray_icon = TauriImage::new_owned(rgba.into_raw(), w, h);

    let _tray = TrayIconBuilder::new()
        .icon(tray_icon)
        .tooltip("Gemini Vision")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray_icon, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                ..
            } = event
            {
                log::info!("[WINDOW] Tray icon clicked");
                super::expand(tray_icon.app_handle());
            }
        })
        .build(app)?;

    Ok(())
}
