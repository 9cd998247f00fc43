use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use fxhash::FxHashMap;

use crate::addr::WeakAddr;
use crate::dependencies::Subject;
use crate::runtime;
use crate::WriteError;

/// Builds an observable record out of `(key, value)` pairs.
pub fn observable<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Record<V>
where
	K: Into<String>,
	V: 'static,
{
	fields.into_iter().collect()
}

/// A string-keyed map whose reads and writes are observed.
///
/// Reads made while an [`Effect`](crate::Effect) runs subscribe it to the key,
/// writes re-run the subscribed effects. Keys can be added at any time, and
/// reading a missing key subscribes as well. Clones share the same identity.
pub struct Record<V: 'static> {
	body: Rc<RecordBody<V>>,
}

/// Non-owning handle to a [`Record`].
pub struct WeakRecord<V: 'static> {
	body: Weak<RecordBody<V>>,
}

struct RecordBody<V: 'static> {
	values: RefCell<FxHashMap<String, V>>,
	frozen: Cell<bool>,
	this: Weak<RecordBody<V>>,
}

impl<V: 'static> Record<V> {
	pub fn new() -> Self {
		Self::from_map(FxHashMap::default())
	}

	fn from_map(values: FxHashMap<String, V>) -> Self {
		Record {
			body: Rc::new_cyclic(|this| RecordBody {
				values: RefCell::new(values),
				frozen: Cell::new(false),
				this: this.clone(),
			}),
		}
	}

	#[inline]
	pub fn get(&self, key: &str) -> Option<V>
	where
		V: Clone,
	{
		self.with(key, |value| value.cloned())
	}

	/// Tracked read that borrows the value instead of cloning it.
	///
	/// The record is borrowed while `func` runs, so `func` must not write to it.
	pub fn with<R>(&self, key: &str, func: impl FnOnce(Option<&V>) -> R) -> R {
		self.body.track(key);
		func(self.body.values.borrow().get(key))
	}

	pub fn get_untracked(&self, key: &str) -> Option<V>
	where
		V: Clone,
	{
		self.body.values.borrow().get(key).cloned()
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.with(key, |value| value.is_some())
	}

	#[inline]
	pub fn set(&self, key: &str, value: V) -> Result<(), WriteError> {
		self.replace(key, value).map(|_| ())
	}

	/// Stores `value` and returns what was there before.
	pub fn replace(&self, key: &str, value: V) -> Result<Option<V>, WriteError> {
		self.body.writable(key)?;
		let old = self.body.values.borrow_mut().insert(key.to_owned(), value);
		self.body.trigger(key);
		Ok(old)
	}

	/// Returns `Ok(false)` without notifying anyone when the stored value is equal.
	pub fn set_if_changed(&self, key: &str, value: V) -> Result<bool, WriteError>
	where
		V: PartialEq,
	{
		self.body.writable(key)?;
		{
			let mut values = self.body.values.borrow_mut();
			if values.get(key) == Some(&value) {
				return Ok(false);
			}
			values.insert(key.to_owned(), value);
		}
		self.body.trigger(key);
		Ok(true)
	}

	/// Mutates an existing value in place. A missing key is left alone.
	///
	/// The record is borrowed while `func` runs.
	pub fn update(&self, key: &str, func: impl FnOnce(&mut V)) -> Result<(), WriteError> {
		self.body.writable(key)?;
		let found = match self.body.values.borrow_mut().get_mut(key) {
			Some(value) => {
				func(value);
				true
			}
			None => false,
		};

		if found {
			self.body.trigger(key);
		}

		Ok(())
	}

	/// Deletes `key`, notifying its readers only if it was present.
	pub fn remove(&self, key: &str) -> Result<Option<V>, WriteError> {
		self.body.writable(key)?;
		let old = self.body.values.borrow_mut().remove(key);
		if old.is_some() {
			self.body.trigger(key);
		}
		Ok(old)
	}

	/// Rejects every later write with [`WriteError::Frozen`].
	pub fn freeze(&self) {
		self.body.frozen.set(true);
	}

	pub fn is_frozen(&self) -> bool {
		self.body.frozen.get()
	}

	pub fn keys(&self) -> Vec<String> {
		self.body.values.borrow().keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.body.values.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.body.values.borrow().is_empty()
	}

	/// Number of live effects that read `key` in their latest run.
	pub fn subscribers(&self, key: &str) -> usize {
		runtime::subscriber_count(&self.body.subject(), key)
	}

	pub fn downgrade(&self) -> WeakRecord<V> {
		WeakRecord {
			body: Rc::downgrade(&self.body),
		}
	}
}

impl<V: 'static> RecordBody<V> {
	fn subject(&self) -> Subject {
		let this: Weak<dyn Any> = self.this.clone();
		WeakAddr::new(this)
	}

	fn track(&self, key: &str) {
		runtime::track(&self.subject(), key);
	}

	fn trigger(&self, key: &str) {
		runtime::trigger(&self.subject(), key);
	}

	fn writable(&self, key: &str) -> Result<(), WriteError> {
		if self.frozen.get() {
			tracing::warn!(key, "write to a frozen record rejected");
			return Err(WriteError::Frozen {
				key: key.to_owned(),
			});
		}

		Ok(())
	}
}

impl<V: 'static> Drop for RecordBody<V> {
	fn drop(&mut self) {
		runtime::forget(&self.subject());
	}
}

impl<V: 'static> WeakRecord<V> {
	pub fn upgrade(&self) -> Option<Record<V>> {
		self.body.upgrade().map(|body| Record { body })
	}
}

impl<V: 'static> Clone for WeakRecord<V> {
	fn clone(&self) -> Self {
		WeakRecord {
			body: self.body.clone(),
		}
	}
}

impl<V: 'static> Clone for Record<V> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<V: 'static> Default for Record<V> {
	fn default() -> Self {
		Record::new()
	}
}

impl<V: 'static> PartialEq for Record<V> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}
}

impl<V: 'static> Eq for Record<V> {}

impl<K, V> FromIterator<(K, V)> for Record<V>
where
	K: Into<String>,
	V: 'static,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Record::from_map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

impl<V> Debug for Record<V>
where
	V: 'static + Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.body.values.borrow().iter()).finish()
	}
}
