//! Dependency tracking between observable records and the effects that read them.
//!
//! An [`Effect`] runs immediately; every [`Record`] key it reads is recorded.
//! Writing one of those keys later runs the effect again, synchronously.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let state = mini_reactive::observable([("x", 1)]);
//! let seen = Rc::new(RefCell::new(vec![]));
//!
//! let _render = mini_reactive::effect({
//! 	let state = state.clone();
//! 	let seen = seen.clone();
//! 	move || seen.borrow_mut().push(state.get("x"))
//! });
//!
//! state.set("x", 2).unwrap();
//! assert_eq!(*seen.borrow(), vec![Some(1), Some(2)]);
//! ```
//!
//! Everything is single-threaded: effects and their subscriptions belong to
//! the thread that created them.

pub mod macros;

mod addr;
mod dependencies;
mod effect;
mod error;
mod record;
mod runtime;

pub use effect::{effect, Effect};
pub use error::WriteError;
pub use record::{observable, Record, WeakRecord};
