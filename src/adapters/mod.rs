// Adapters layer: concrete implementations of the domain ports (weather API, crop model).

pub mod crop_model;
pub mod weather;
