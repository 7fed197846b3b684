// Text utilities shared across pipeline stages.

pub mod fragments;
pub mod sentences;
