//! # Streams and their operators.
//!
//! [`Stream`] is the central type. Operators live in separate `impl` blocks:
//!
//! | File          | Operators                                                   |
//! |---------------|-------------------------------------------------------------|
//! | `source.rs`   | `create`, `subscribe`, `just`, `of`, `empty`, `failed`      |
//! | `operators.rs`| `map`, `filter`, `flat_map` and their `try_*` variants      |
//! | `schedule.rs` | `subscribe_on`, `observe_on`                                |
//! | `bridge.rs`   | `to_async`                                                  |

mod bridge;
mod operators;
mod schedule;
mod source;

pub use bridge::AsyncEvents;
pub use source::Stream;
