pub mod export;
pub mod rest;
pub mod views;
