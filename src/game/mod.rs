pub mod camera;
pub mod clock;
pub mod constants;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod render;
pub mod state;
pub mod systems;
