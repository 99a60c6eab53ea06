//! # guild-host
//!
//! Per-guild runtime hosts for a multi-tenant chat bot.
//!
//! Each active guild (tenant) gets one [`host::Host`]: it owns the guild's
//! JSON configuration document, routes the guild's messages to a command
//! dispatcher, tracks members, and exposes moderation primitives that
//! report a plain `false` when the bot lacks permission.
//!
//! ## Architecture
//!
//! ```text
//! Chat service (Transport)            Admin API (api/)
//!     │                                   │
//!     └────────────── Shard ──────────────┘
//!                       │  routes by tenant
//!                       ├── inbox ─▶ Host (tenant 1) ── CommandDispatcher ── Commands
//!                       │              ├── MemberRegistry
//!                       │              ├── ModerationFacade ── Transport
//!                       │              └── ConfigDocument ── DocumentStore
//!                       └── inbox ─▶ Host (tenant 2) ...
//!
//!   DocumentStore: <hosts-root>/<tenant-id>.json
//! ```

pub mod api;
pub mod app_state;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod host;
pub mod member;
pub mod moderation;
pub mod persistence;
pub mod shard;
pub mod transport;
