mod menu;
mod styles;

pub use menu::run_menu;
