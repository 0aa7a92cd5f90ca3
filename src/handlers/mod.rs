// HTTP handlers

pub mod api;
pub mod common;
pub mod pages;
