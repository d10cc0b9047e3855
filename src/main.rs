//! Tabletop - interactive two-device product viewer
//!
//! Loads a scene with a laptop and a phone and lets the user:
//! - Hover a device to tilt it towards the camera
//! - Click a device to open it and fly the camera in
//! - Press ESC to close the device and return to the overview
//! - Drop an image on the window to show it on both screens
//!
//! Pose and camera transitions are chained by `interaction::InteractionController`,
//! which only starts a new transition once the previous one has finished.

mod anim;
mod app;
mod assets;
mod config;
mod interaction;
mod render;
mod scene;

fn main() {
    app::run();
}
