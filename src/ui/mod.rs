/// UI module exports
pub mod bridge;
pub mod components;
pub mod options;
pub mod popup;
