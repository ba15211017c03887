mod first_central_api;
mod first_central_dto;

pub use first_central_api::*;
