pub mod config;
pub mod error;
pub mod events;
pub mod orientation;
pub mod processing {
    pub mod derive;
    pub mod raster;
}
pub mod scroll;
pub mod tasks {
    pub mod render;
    pub mod scroll_effects;
    pub mod textures;
}
