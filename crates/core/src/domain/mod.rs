pub mod advisory;
pub mod climate;
pub mod location;
