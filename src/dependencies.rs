use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::addr::WeakAddr;
use crate::effect::EffectBody;

/// Identity of an observed record. Never keeps the record alive.
pub(crate) type Subject = WeakAddr<dyn Any>;

/// Identity of a registered effect. Never keeps the effect alive.
pub(crate) type Subscriber = WeakAddr<EffectBody>;

/// Effects collected for a single trigger pass.
pub(crate) type Snapshot = SmallVec<[Rc<EffectBody>; 4]>;

/// `record -> key -> effects`.
///
/// Levels are created lazily by [`Store::track`] and removed again by
/// [`Store::untrack`] as soon as they become empty, so a pair is present
/// only while at least one effect depends on it.
#[derive(Default)]
pub(crate) struct Store {
	records: BTreeMap<Subject, FxHashMap<String, BTreeSet<Subscriber>>>,
}

impl Store {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` when `effect` was not yet subscribed to `(record, key)`.
	pub fn track(&mut self, record: &Subject, key: &str, effect: Subscriber) -> bool {
		let keys = self.records.entry(record.clone()).or_default();
		match keys.get_mut(key) {
			Some(effects) => effects.insert(effect),
			None => {
				keys.insert(key.to_owned(), BTreeSet::from([effect]));
				true
			}
		}
	}

	/// Copies out every live effect subscribed to `(record, key)`.
	///
	/// Callers iterate the copy, so effects re-subscribing while they run
	/// never touch the set being walked.
	pub fn subscribers(&self, record: &Subject, key: &str) -> Snapshot {
		self.records
			.get(record)
			.and_then(|keys| keys.get(key))
			.map(|effects| effects.iter().filter_map(|effect| effect.upgrade()).collect())
			.unwrap_or_default()
	}

	pub fn untrack(&mut self, record: &Subject, key: &str, effect: &Subscriber) {
		let Some(keys) = self.records.get_mut(record) else {
			return;
		};

		if let Some(effects) = keys.get_mut(key) {
			effects.remove(effect);
			if effects.is_empty() {
				keys.remove(key);
			}
		}

		if keys.is_empty() {
			self.records.remove(record);
		}
	}

	pub fn forget(&mut self, record: &Subject) {
		self.records.remove(record);
	}
}
