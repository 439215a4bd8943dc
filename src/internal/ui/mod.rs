pub mod app;
pub mod filter_modal;
pub mod view;
