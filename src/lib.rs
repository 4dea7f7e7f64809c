//! Decision-time Monte Carlo Tree Search for cooperating agents in tick-based
//! maze worlds.
//!
//! The engine plans joint moves for a group of ghosts ([`search::Coordination`])
//! or the next turn of the protagonist ([`search::Pathing`]) within a hard
//! time budget. Worlds are consumed through the [`world::World`] trait;
//! [`maze::MazeWorld`] is a self-contained implementation.
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use mazetree::maze::MazeWorld;
//! use mazetree::search::{Pathing, Search, SearchConfig};
//! use mazetree::world::{Agent, World};
//!
//! let world = MazeWorld::try_from(
//!     "
//!     #########
//!     #...M...#
//!     #.##.##.#
//!     #.......#
//!     #########
//!     #BPISo  #
//!     #########
//!     ",
//! )
//! .unwrap();
//! let mut search = Search::new(SearchConfig::pathing().with_seed(7), <Pathing>::default());
//! let next = search.decide_move(&world, Instant::now() + Duration::from_millis(5));
//! let here = world.position(Agent::Protagonist);
//! assert!(world.legal_moves(here, world.last_move(Agent::Protagonist)).has(next));
//! ```

#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
// The search runs against a wall clock: every wasted cycle is an iteration
// lost.
#![deny(clippy::perf)]

pub mod maze;
pub mod policy;
pub mod search;
pub mod team;
pub mod world;

pub use search::{Search, SearchConfig};
pub use team::GhostTeam;
