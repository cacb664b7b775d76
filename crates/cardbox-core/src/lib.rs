//! cardbox-core: card model, scheduler, selector, and study sessions.
//!
//! Storage is abstracted behind [`traits::CardStore`]; the backends live in
//! `cardbox-store`. Everything random goes through [`random::RandomSource`]
//! so sessions can be replayed from a seed.

pub mod error;
pub mod exchange;
pub mod model;
pub mod random;
pub mod repository;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod statistics;
pub mod traits;
