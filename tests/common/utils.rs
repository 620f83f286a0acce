use locator_cache::action::executor::ActionExecutor;
use locator_cache::agent::resolver::ActionResolver;
use locator_cache::oracle::scripted::ScriptedOracle;
use locator_cache::repository::backend::MemoryBackend;
use locator_cache::repository::store::LocatorStore;

/// Resolver over an in-memory store and a scripted oracle, with no settle
/// delays. Returns handles to the backend and oracle for inspection.
pub fn scripted_resolver(replies: &[&str]) -> (ActionResolver, MemoryBackend, ScriptedOracle) {
    let backend = MemoryBackend::new();
    let oracle = ScriptedOracle::new(replies.iter().copied());
    let store = LocatorStore::load(Box::new(backend.clone()));
    let resolver = ActionResolver::new(store, Box::new(oracle.clone()), ActionExecutor::immediate());
    (resolver, backend, oracle)
}
