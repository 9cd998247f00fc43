use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Weak;

/// Non-owning pointer compared by the address of its allocation.
pub struct WeakAddr<T: ?Sized> {
	ptr: Weak<T>,
}

impl<T: ?Sized> WeakAddr<T> {
	pub fn new(ptr: Weak<T>) -> Self {
		WeakAddr { ptr }
	}

	fn thin(&self) -> *const () {
		Weak::as_ptr(&self.ptr).cast::<()>()
	}
}

impl<T: ?Sized> Clone for WeakAddr<T> {
	fn clone(&self) -> Self {
		WeakAddr {
			ptr: self.ptr.clone(),
		}
	}
}

impl<T: ?Sized> Deref for WeakAddr<T> {
	type Target = Weak<T>;
	fn deref(&self) -> &Self::Target {
		&self.ptr
	}
}

impl<T: ?Sized> PartialEq for WeakAddr<T> {
	fn eq(&self, other: &Self) -> bool {
		self.thin() == other.thin()
	}
}

impl<T: ?Sized> Eq for WeakAddr<T> {}

impl<T: ?Sized> Ord for WeakAddr<T> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.thin().cmp(&other.thin())
	}
}

impl<T: ?Sized> PartialOrd for WeakAddr<T> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T: ?Sized> std::fmt::Debug for WeakAddr<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "WeakAddr({:p})", self.thin())
	}
}
