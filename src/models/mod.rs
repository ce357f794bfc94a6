// src/models/mod.rs

pub mod catalog;
pub mod leaderboard;
pub mod pending_question;
pub mod question;
pub mod user;
