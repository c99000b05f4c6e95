// Library surface for the typing-game engine; the TUI binary is one
// consumer of it. Keep this lean to avoid coupling to bin-only types.
pub mod clock;
pub mod config;
pub mod controller;
pub mod corpus;
pub mod history;
pub mod metrics;
pub mod runtime;
pub mod session;
