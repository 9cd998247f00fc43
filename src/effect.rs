use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::addr::WeakAddr;
use crate::dependencies::{Subject, Subscriber};
use crate::runtime::{self, ActiveGuard};

/// Registers `func` as an effect and runs it once right away.
///
/// Every [`Record`](crate::Record) read during the run subscribes the effect
/// to that key; a later write to the key runs `func` again. Dropping the last
/// handle disposes the effect, use [`Effect::detach`] to keep it alive for
/// the rest of the thread.
#[must_use]
pub fn effect(func: impl Fn() + 'static) -> Effect {
	let effect = Effect::new(func);
	effect.run();
	effect
}

#[derive(Clone)]
pub struct Effect {
	body: Rc<EffectBody>,
}

pub(crate) struct EffectBody {
	name: &'static str,
	func: Box<dyn Fn()>,
	inner: RefCell<EffectInner>,
	this: Weak<EffectBody>,
}

struct EffectInner {
	dependencies: Vec<(Subject, String)>,
	runs: usize,
	disposed: bool,
}

impl Effect {
	/// Creates an effect without running it.
	#[must_use]
	pub fn new(func: impl Fn() + 'static) -> Self {
		Self::new_with_name("<unnamed>", func)
	}

	#[must_use]
	pub fn new_with_name(name: &'static str, func: impl Fn() + 'static) -> Self {
		Effect {
			body: Rc::new_cyclic(|this| EffectBody {
				name,
				func: Box::new(func),
				inner: RefCell::new(EffectInner {
					dependencies: Vec::new(),
					runs: 0,
					disposed: false,
				}),
				this: this.clone(),
			}),
		}
	}

	/// Runs the body now, replacing the dependencies of the previous run.
	pub fn run(&self) {
		self.body.run();
	}

	/// Unsubscribes from every key and prevents any further run.
	pub fn dispose(&self) {
		self.body.dispose();
	}

	pub fn is_disposed(&self) -> bool {
		self.body.is_disposed()
	}

	/// Hands the effect over to the thread, it stays subscribed until disposed.
	pub fn detach(self) {
		runtime::detach(self);
	}

	pub fn name(&self) -> &'static str {
		self.body.name
	}

	/// How many times the body has been executed.
	pub fn runs(&self) -> usize {
		self.body.inner.borrow().runs
	}

	/// Number of `(record, key)` pairs read during the latest run.
	pub fn dependencies(&self) -> usize {
		self.body.inner.borrow().dependencies.len()
	}
}

impl EffectBody {
	pub(crate) fn name(&self) -> &'static str {
		self.name
	}

	pub(crate) fn addr(&self) -> Subscriber {
		WeakAddr::new(self.this.clone())
	}

	pub(crate) fn is_disposed(&self) -> bool {
		self.inner.borrow().disposed
	}

	pub(crate) fn depends_on(&self, record: Subject, key: &str) {
		self.inner
			.borrow_mut()
			.dependencies
			.push((record, key.to_owned()));
	}

	pub(crate) fn run(self: &Rc<Self>) {
		{
			let mut self_mut = self.inner.borrow_mut();
			if self_mut.disposed {
				return;
			}
			self_mut.runs += 1;
		}

		self.cleanup();

		tracing::debug!(effect = self.name, "run");

		let _active = ActiveGuard::enter(self.clone());
		(self.func)();
	}

	fn dispose(&self) {
		self.inner.borrow_mut().disposed = true;
		self.cleanup();
		runtime::release_disposed();
		tracing::debug!(effect = self.name, "disposed");
	}

	fn cleanup(&self) {
		let dependencies = std::mem::take(&mut self.inner.borrow_mut().dependencies);
		if dependencies.is_empty() {
			return;
		}

		let this = self.addr();
		for (record, key) in &dependencies {
			runtime::untrack(record, key, &this);
		}
	}
}

impl Drop for EffectBody {
	fn drop(&mut self) {
		self.cleanup();
	}
}

impl PartialEq for Effect {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}
}

impl Eq for Effect {}

impl std::fmt::Debug for Effect {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.body.inner.borrow();
		f.debug_struct("Effect")
			.field("name", &self.body.name)
			.field("runs", &inner.runs)
			.field("disposed", &inner.disposed)
			.finish()
	}
}
