//! Wires every route's handler name to its controller.

use crate::controllers::{CreateDog, DeleteDog, GetDog, Hello, ListDogs, UpdateDog};
use crate::dispatcher::Dispatcher;
use crate::routes;
use crate::store::DogStore;
use std::sync::Arc;

/// Register one controller per route, all sharing `store`.
///
/// # Safety
///
/// Spawns handler coroutines; see [`Dispatcher::register_handler`].
pub unsafe fn register_all(dispatcher: &mut Dispatcher, store: Arc<dyn DogStore>) {
    // SAFETY: forwarded to the caller.
    unsafe {
        dispatcher.register_typed(routes::HELLO, Hello);
        dispatcher.register_typed(routes::LIST_DOGS, ListDogs { store: Arc::clone(&store) });
        dispatcher.register_typed(routes::GET_DOG, GetDog { store: Arc::clone(&store) });
        dispatcher.register_typed(routes::CREATE_DOG, CreateDog { store: Arc::clone(&store) });
        dispatcher.register_typed(routes::UPDATE_DOG, UpdateDog { store: Arc::clone(&store) });
        dispatcher.register_typed(routes::DELETE_DOG, DeleteDog { store });
    }
}
