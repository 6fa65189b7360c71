pub mod initiator;
pub mod normalizer;
pub mod resolver;
