pub mod adapters;
pub mod common;
pub mod entities;
pub mod repositories;
pub mod settings;
pub mod snapshot;
pub mod usecases;
pub mod workers;
