//! fitplanner - Workout planner with AI-generated routines
//!
//! Local accounts, a fixed exercise library, hand-built workouts and a
//! Gemini-backed routine architect and coach.

pub mod ai;
pub mod auth;
pub mod coach;
pub mod db;
pub mod enrichment;
pub mod exercises;
pub mod generator;
pub mod models;
pub mod planner;
pub mod session;
pub mod tui;

pub use db::Database;
