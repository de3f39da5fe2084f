//! 专辑模块

pub mod api;
pub mod models;

pub use api::AlbumApi;
pub use models::{Album, AlbumDetails, AlbumType, NewAlbum};
