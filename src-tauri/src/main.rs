// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    gemini_vision_lib::platform::init_logging();
    if let Err(notice) = gemini_vision_lib::platform::check_host() {
        eprintln!("{}", notice);
        return;
    }
    gemini_vision_lib::run();
}
