pub mod debounce;
pub mod feed;
pub mod filters;
pub mod models;
pub mod notification;
pub mod ui;
