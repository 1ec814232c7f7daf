pub mod extraction;
pub mod model;
pub mod prompts;
pub mod render;
pub mod sample;
pub mod schema;
pub mod stats;
pub mod view;
