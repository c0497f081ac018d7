pub mod editor;
pub mod layout;
pub mod measure;
pub mod render;
pub mod text;
