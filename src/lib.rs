// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod corpus;
pub mod evaluator;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod ui;
