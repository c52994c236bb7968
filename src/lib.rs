#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod assets;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod id_generator;
pub mod input;
pub mod measurement;
pub mod placement;
pub mod render;
pub mod scene;
pub mod snap;
pub mod texture_manager;
pub mod tools;
pub mod view;

pub use app::FloorPlanApp;
pub use config::EditorSettings;
pub use editor::{FloorPlanEditor, Interaction};
pub use error::{AssetError, EditorError, PersistenceError};
pub use history::EditHistory;
pub use input::{InputEvent, InputHandler, Shortcut};
pub use placement::{CatalogItem, resolve_drop};
pub use render::{RecordingTarget, RenderTarget, render_scene};
pub use scene::persistence::SceneDocument;
pub use scene::{Scene, SceneSnapshot};
pub use snap::{SnapResult, SnapSettings, resolve_snap};
pub use tools::ToolMode;
pub use view::ViewState;
