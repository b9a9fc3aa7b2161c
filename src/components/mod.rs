pub mod file_pane;
pub mod help;
pub mod status_bar;
pub mod tree;
