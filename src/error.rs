use thiserror::Error;

/// A write rejected by the record. Rejected writes never notify effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
	#[error("cannot write `{key}`: record is frozen")]
	Frozen { key: String },
}
