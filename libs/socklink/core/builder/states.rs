/// Type-state markers for the builder pattern
///
/// The server address is the one required input; these markers make
/// `build()` unavailable until it has been set.
use std::marker::PhantomData;

/// Marker trait for address state
pub trait AddressState {}

/// Server address has not been set
pub struct NoAddress;
impl AddressState for NoAddress {}

/// Server address has been set
pub struct HasAddress;
impl AddressState for HasAddress {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<A> {
    _address: PhantomData<A>,
}

impl<A> TypeState<A> {
    pub(crate) fn new() -> Self {
        Self {
            _address: PhantomData,
        }
    }
}
