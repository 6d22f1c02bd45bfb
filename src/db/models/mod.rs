pub mod open_models;

pub use open_models::{NewOpenEvent, OpenEvent, OpenFilter};
