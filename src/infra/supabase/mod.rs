//! Supabase REST implementation of the leaderboard backend.

mod client;
pub mod rest;

pub use client::SupabaseBackend;
pub use rest::RestClient;
