pub mod panels;
pub mod plot;
pub mod scene_view;
