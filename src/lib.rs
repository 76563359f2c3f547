pub mod config;
pub mod datamuse;
pub mod error;
pub mod group_by;
pub mod lookup;
pub mod render;
pub mod save_list;
pub mod session;
