use std::sync::{Arc, Mutex, MutexGuard};

use mockall::predicate::eq;
use mockall::*;

/// Stands in for whatever an effect renders to.
#[automock]
pub trait Spy {
	fn observed(&self, value: Option<i64>);
}

#[derive(Clone)]
pub struct SharedMock(Arc<Mutex<MockSpy>>);

impl SharedMock {
	pub fn new() -> SharedMock {
		SharedMock(Arc::new(Mutex::new(MockSpy::new())))
	}

	pub fn get(&self) -> MutexGuard<'_, MockSpy> {
		self.0.lock().unwrap()
	}

	/// Verifies the previous expectations, then expects `value` exactly `times` times.
	pub fn expect(&self, value: Option<i64>, times: usize) {
		let mut spy = self.get();
		spy.checkpoint();
		spy.expect_observed().with(eq(value)).times(times).return_const(());
	}

	/// Verifies the previous expectations, then expects no call at all.
	pub fn expect_silence(&self) {
		let mut spy = self.get();
		spy.checkpoint();
		spy.expect_observed().times(0).return_const(());
	}

	pub fn verify(&self) {
		self.get().checkpoint();
	}
}
