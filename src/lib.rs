//! Skyblock asset host - library for rendering and serving Skyblock item icons
//!
//! This library provides functionality to:
//! - Cut flat item icons out of a sprite sheet located by a stylesheet
//! - Compose isometric head icons from 64×64 / 64×32 skin textures
//! - Animate glowing items with an enchantment glint GIF
//! - Cache renders on disk and serve them over HTTP

pub mod cache;
pub mod cli;
pub mod color;
pub mod composition;
pub mod config;
pub mod fetch;
pub mod gif;
pub mod glint;
pub mod head;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod output;
pub mod schedule;
pub mod server;
pub mod service;
pub mod spritesheet;
pub mod store;
pub mod transforms;
