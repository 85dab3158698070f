//! PRISM QUEST: learn the elements of a rectangular prism
//!
//! Drag a token onto the 3D model to claim vertices, edges, faces and
//! diagonals. Six levels, scored by accuracy and time, with best scores
//! persisted between runs.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod game;
mod geom;
mod level;
mod level_select;
mod menu;
mod model;
mod picking;
mod progress;
mod scene;
mod session;
mod ui;

use macroquad::prelude::*;

use game::{GameAction, GamePage};
use level::LevelCatalog;
use level_select::SelectAction;
use menu::MenuAction;
use progress::ProgressStore;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Prism Quest v{}", VERSION),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Which screen is showing. The game page carries its own session state
/// and is dropped wholesale on navigation, so nothing scheduled inside a
/// level can outlive the level.
enum Page {
    Menu,
    LevelSelect,
    Game(GamePage),
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    // A broken catalog is a configuration error, not a recoverable one
    let catalog = match LevelCatalog::load_embedded() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Invalid level catalog: {}", e);
            return;
        }
    };

    let store = ProgressStore::at_default_location();
    let mut player_progress = store.load();

    let mut page = Page::Menu;

    loop {
        clear_background(scene::BACKGROUND);
        let now = get_time();

        match &mut page {
            Page::Menu => {
                if let MenuAction::Play = menu::draw_menu() {
                    page = Page::LevelSelect;
                }
            }
            Page::LevelSelect => match level_select::draw_level_select(&catalog, &player_progress) {
                SelectAction::StartLevel(id) => match catalog.get(id) {
                    Ok(level) => page = Page::Game(GamePage::new(level, now)),
                    Err(e) => eprintln!("Cannot start level: {}", e),
                },
                SelectAction::Back => page = Page::Menu,
                SelectAction::None => {}
            },
            Page::Game(game_page) => {
                let level_id = game_page.level_id();
                match game_page.frame(&mut player_progress, &store, now) {
                    GameAction::Exit => page = Page::LevelSelect,
                    GameAction::Replay => match catalog.get(level_id) {
                        Ok(level) => page = Page::Game(GamePage::new(level, now)),
                        Err(e) => {
                            eprintln!("Cannot restart level: {}", e);
                            page = Page::LevelSelect;
                        }
                    },
                    GameAction::Advance => {
                        // Past the last level there is nothing to advance
                        // to; fall back to the level grid
                        page = match catalog.get(level_id + 1) {
                            Ok(level) => Page::Game(GamePage::new(level, now)),
                            Err(_) => Page::LevelSelect,
                        };
                    }
                    GameAction::None => {}
                }
            }
        }

        next_frame().await;
    }
}
