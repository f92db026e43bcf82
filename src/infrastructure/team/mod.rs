//! Team infrastructure - repository implementation and registry service

mod postgres_repository;
mod service;

pub use postgres_repository::PostgresTeamRepository;
pub use service::{CreateTeamRequest, JoinTeamRequest, TeamRegistry};
