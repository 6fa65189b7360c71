pub mod config;
pub mod controllers;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod server;
pub mod services;

pub use config::{PollSettings, ProxyConfig, StreamSettings};
pub use server::AppState;
pub use services::resolver::{ResolutionOutcome, ResolutionRequest, Resolver, ResolverKind};
