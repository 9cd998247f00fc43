use std::cell::RefCell;
use std::rc::Rc;

use crate::dependencies::{Store, Subject, Subscriber};
use crate::effect::{Effect, EffectBody};

thread_local! {
	static STORE: RefCell<Store> = RefCell::new(Store::new());
	static ACTIVE: RefCell<Vec<Rc<EffectBody>>> = const { RefCell::new(Vec::new()) };
	static DETACHED: RefCell<Vec<Effect>> = const { RefCell::new(Vec::new()) };
}

/// Marks an effect as running for as long as the guard lives.
///
/// Effects nest: the innermost running effect receives the reads.
pub(crate) struct ActiveGuard {
	_private: (),
}

impl ActiveGuard {
	pub fn enter(effect: Rc<EffectBody>) -> Self {
		ACTIVE.with(|active| active.borrow_mut().push(effect));
		ActiveGuard { _private: () }
	}
}

impl Drop for ActiveGuard {
	fn drop(&mut self) {
		// Released outside of the borrow: the popped effect may be the last handle.
		let _popped = ACTIVE.try_with(|active| active.borrow_mut().pop());
	}
}

fn current() -> Option<Rc<EffectBody>> {
	ACTIVE.with(|active| active.borrow().last().cloned())
}

fn is_running(effect: &Rc<EffectBody>) -> bool {
	ACTIVE.with(|active| active.borrow().iter().any(|e| Rc::ptr_eq(e, effect)))
}

/// Records that the running effect, if any, read `key` of `record`.
pub(crate) fn track(record: &Subject, key: &str) {
	let Some(effect) = current() else {
		return;
	};

	if effect.is_disposed() {
		return;
	}

	let inserted = STORE.with(|store| store.borrow_mut().track(record, key, effect.addr()));
	if inserted {
		effect.depends_on(record.clone(), key);
		tracing::trace!(effect = effect.name(), key, "tracked");
	}
}

/// Re-runs every effect that read `key` of `record`.
pub(crate) fn trigger(record: &Subject, key: &str) {
	let effects = STORE.with(|store| store.borrow().subscribers(record, key));
	if effects.is_empty() {
		return;
	}

	tracing::trace!(key, count = effects.len(), "trigger");

	for effect in effects {
		if is_running(&effect) {
			tracing::trace!(effect = effect.name(), key, "effect is already running, skipped");
			continue;
		}

		effect.run();
	}
}

pub(crate) fn untrack(record: &Subject, key: &str, effect: &Subscriber) {
	let _ = STORE.try_with(|store| store.borrow_mut().untrack(record, key, effect));
}

pub(crate) fn forget(record: &Subject) {
	let _ = STORE.try_with(|store| store.borrow_mut().forget(record));
}

pub(crate) fn subscriber_count(record: &Subject, key: &str) -> usize {
	STORE.with(|store| store.borrow().subscribers(record, key).len())
}

pub(crate) fn detach(effect: Effect) {
	DETACHED.with(|detached| detached.borrow_mut().push(effect));
}

/// Lets go of detached effects that have been disposed since.
pub(crate) fn release_disposed() {
	let disposed = DETACHED.try_with(|detached| {
		let mut detached = detached.borrow_mut();
		let (disposed, alive): (Vec<Effect>, Vec<Effect>) =
			detached.drain(..).partition(|effect| effect.is_disposed());
		*detached = alive;
		disposed
	});

	// Dropped once the borrow is released, their cleanup touches the store.
	drop(disposed);
}
