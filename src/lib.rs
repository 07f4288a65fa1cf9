//! Terminal explorer for GitHub users, repositories and commits, with local
//! commit bookmarks.
//!
//! The two pieces that carry the logic are [`favorites::FavoritesStore`]
//! (bookmarks plus their on-device formats) and [`state::BrowseState`] (the
//! user → repository → commit drill-down). Everything else is plumbing around
//! them: the GitHub client in [`network`], storage backends in [`storage`],
//! and the ratatui front end in [`app`], [`input`] and [`ui`].

pub mod app;
pub mod config;
pub mod error;
pub mod favorites;
pub mod input;
pub mod models;
pub mod network;
pub mod state;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod utils;
