//! Cross-layer flows: gate, lifecycle engine, stores, history and queries.

mod access_control;
mod file_store;
mod lifecycle;
mod queries;
