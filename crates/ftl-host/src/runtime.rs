use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use ftl_ledger::{InvocationContext, LedgerError, LedgerResult, Outcome, TokenLedger};
use ftl_store::{KeyValueStore, Transaction};
use ftl_types::{AccountId, Quantity};
use tracing::{debug, info, warn};

use crate::auth::{Credential, CredentialResolver};
use crate::bus::{EventBuffer, EventBus};
use crate::config::HostConfig;
use crate::response::{Response, INTERNAL_FAULT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EntryPoint {
    Instantiate,
    Invoke,
}

/// Reference host for the token ledger.
///
/// Every invocation runs inside its own [`Transaction`] over the backing
/// store. On success the transaction commits and the buffered events are
/// published; on failure (including a panic inside the engine) the
/// transaction is rolled back, no event is published, and the caller gets an
/// error [`Response`]. Invocations are serialized, which gives each one a
/// consistent view of the store.
pub struct Runtime<S: KeyValueStore> {
    store: S,
    ledger: TokenLedger,
    bus: EventBus,
    config: HostConfig,
    serial: Mutex<()>,
}

impl<S: KeyValueStore> Runtime<S> {
    pub fn new(store: S, config: HostConfig) -> Self {
        Self {
            ledger: TokenLedger::new(config.ledger.clone()),
            bus: EventBus::new(config.event_history, config.subscriber_queue),
            store,
            config,
            serial: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Deploy-time entry point. Only `init` has an effect.
    pub fn instantiate<A: AsRef<str>>(
        &self,
        credential: Credential,
        name: &str,
        args: &[A],
    ) -> Response {
        self.run(EntryPoint::Instantiate, credential, name, args)
    }

    /// Entry point for every ledger operation except `init`.
    pub fn invoke<A: AsRef<str>>(
        &self,
        credential: Credential,
        name: &str,
        args: &[A],
    ) -> Response {
        self.run(EntryPoint::Invoke, credential, name, args)
    }

    /// Every account holding a balance record, read outside any invocation.
    pub fn holders(&self) -> LedgerResult<Vec<(AccountId, Quantity)>> {
        let resolver = CredentialResolver::new(Credential::Anonymous, "");
        let events = EventBuffer::new();
        let ctx = InvocationContext {
            store: &self.store,
            identity: &resolver,
            events: &events,
        };
        self.ledger.holders(&ctx)
    }

    fn run<A: AsRef<str>>(
        &self,
        entry: EntryPoint,
        credential: Credential,
        name: &str,
        args: &[A],
    ) -> Response {
        let _guard = match self.serial.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let txn = Transaction::begin(&self.store);
        let resolver =
            CredentialResolver::new(credential, self.config.identity_attribute.as_str());
        let events = EventBuffer::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let ctx = InvocationContext {
                store: &txn,
                identity: &resolver,
                events: &events,
            };
            match entry {
                EntryPoint::Instantiate => self.ledger.instantiate(&ctx, name, args),
                EntryPoint::Invoke => self.ledger.invoke(&ctx, name, args),
            }
        }));

        match outcome {
            Ok(Ok(outcome)) => self.commit(txn, events, name, outcome),
            Ok(Err(err)) => {
                let discarded = txn.rollback();
                debug!(operation = name, code = err.code(), discarded, "invocation failed");
                Response::from_error(&err)
            }
            Err(panic) => {
                txn.rollback();
                let message = panic_message(panic.as_ref());
                warn!(operation = name, %message, "engine panicked; invocation aborted");
                Response::failure(INTERNAL_FAULT, format!("internal fault: {message}"))
            }
        }
    }

    fn commit(
        &self,
        txn: Transaction<&S>,
        events: EventBuffer,
        name: &str,
        outcome: Outcome,
    ) -> Response {
        match txn.commit() {
            Ok(written) => {
                let batch = events.into_events();
                if written > 0 || !batch.is_empty() {
                    info!(operation = name, written, events = batch.len(), "invocation committed");
                }
                self.bus.publish(batch);
                Response::success(outcome.to_bytes())
            }
            Err(e) => {
                let err = LedgerError::StorageWriteError {
                    key: "<commit>".into(),
                    reason: e.to_string(),
                };
                warn!(operation = name, error = %err, "commit failed");
                Response::from_error(&err)
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use ftl_ledger::{GenesisPolicy, LedgerConfig};
    use ftl_store::{InMemoryKvStore, StoreError, StoreResult};
    use ftl_types::LedgerEvent;

    use super::*;
    use crate::bus::EventFilter;

    fn runtime() -> Runtime<InMemoryKvStore> {
        Runtime::new(InMemoryKvStore::new(), HostConfig::default())
    }

    fn cert(cn: &str) -> Credential {
        Credential::certificate(format!("CN={cn},OU=client,O=Org1"))
    }

    fn genesis(rt: &Runtime<InMemoryKvStore>, owner: &str) {
        let r = rt.instantiate(Credential::Anonymous, "init", &[owner]);
        assert!(r.is_ok(), "{r}");
    }

    fn query(rt: &Runtime<InMemoryKvStore>, name: &str, args: &[&str]) -> String {
        let r = rt.invoke(Credential::Anonymous, name, args);
        assert!(r.is_ok(), "{r}");
        r.payload_str().unwrap().to_string()
    }

    #[test]
    fn genesis_scenario() {
        let rt = runtime();
        let sub = rt.bus().subscribe(EventFilter::default());
        let r = rt.instantiate(Credential::Anonymous, "init", &["alice"]);
        assert!(r.is_ok());
        assert!(r.payload.is_empty());

        assert_eq!(query(&rt, "balanceOf", &["alice"]), "100000000");
        assert_eq!(query(&rt, "balanceOf", &["bob"]), "0");
        assert_eq!(query(&rt, "totalSupply", &[]), "100000000");

        let events = sub.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Transfer");
        assert_eq!(
            String::from_utf8(events[0].payload.clone()).unwrap(),
            r#"{"from":"","to":"alice","value":100000000}"#
        );
    }

    #[test]
    fn transfer_scenario() {
        let rt = runtime();
        genesis(&rt, "alice");
        let sub = rt.bus().subscribe(EventFilter::default());

        let r = rt.invoke(cert("alice"), "transfer", &["bob", "1000"]);
        assert_eq!(r.payload_str(), Some("true"));

        assert_eq!(query(&rt, "balanceOf", &["alice"]), "99999000");
        assert_eq!(query(&rt, "balanceOf", &["bob"]), "1000");
        let events = sub.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].decode().unwrap(),
            LedgerEvent::transfer("alice".into(), "bob".into(), 1000)
        );
    }

    #[test]
    fn approve_and_transfer_from_scenario() {
        let rt = runtime();
        genesis(&rt, "alice");
        assert!(rt.invoke(cert("alice"), "approve", &["carol", "500"]).is_ok());
        assert!(rt
            .invoke(cert("carol"), "transferFrom", &["alice", "dave", "500"])
            .is_ok());

        assert_eq!(query(&rt, "allowance", &["alice", "carol"]), "0");
        assert_eq!(query(&rt, "balanceOf", &["dave"]), "500");
        assert_eq!(query(&rt, "balanceOf", &["alice"]), "99999500");
    }

    #[test]
    fn over_allowance_scenario() {
        let rt = runtime();
        genesis(&rt, "alice");
        rt.invoke(cert("alice"), "approve", &["carol", "500"]);
        let before = rt.store().entries().unwrap();
        let sub = rt.bus().subscribe(EventFilter::default());

        let r = rt.invoke(cert("carol"), "transferFrom", &["alice", "dave", "501"]);
        assert_eq!(r.code.as_deref(), Some("ArithmeticUnderflow"));
        assert_eq!(rt.store().entries().unwrap(), before);
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn anonymous_caller_cannot_transfer() {
        let rt = runtime();
        genesis(&rt, "alice");
        let r = rt.invoke(Credential::Anonymous, "transfer", &["bob", "1"]);
        assert_eq!(r.code.as_deref(), Some("IdentityResolutionError"));
        assert_eq!(query(&rt, "balanceOf", &["alice"]), "100000000");
    }

    #[test]
    fn unknown_function_name() {
        let rt = runtime();
        let r = rt.invoke(cert("alice"), "burn", &["1"]);
        assert_eq!(r.code.as_deref(), Some("UnknownOperation"));
        assert_eq!(r.message, "invalid function name: burn");
    }

    #[test]
    fn init_only_through_instantiate() {
        let rt = runtime();
        let r = rt.invoke(cert("alice"), "init", &["alice"]);
        assert_eq!(r.code.as_deref(), Some("UnknownOperation"));
        assert!(rt.store().is_empty());

        let r = rt.instantiate(Credential::Anonymous, "migrate", &[] as &[&str]);
        assert!(r.is_ok());
        assert!(rt.store().is_empty());
    }

    #[test]
    fn repeated_genesis_policy_comes_from_config() {
        let mut config = HostConfig::default();
        config.ledger = LedgerConfig {
            total_supply: 10,
            genesis_policy: GenesisPolicy::Reject,
        };
        let rt = Runtime::new(InMemoryKvStore::new(), config);
        genesis(&rt, "alice");
        let r = rt.instantiate(Credential::Anonymous, "init", &["bob"]);
        assert_eq!(r.code.as_deref(), Some("AlreadyInitialized"));
        assert_eq!(query(&rt, "balanceOf", &["bob"]), "0");
    }

    #[test]
    fn holders_lists_balances() {
        let rt = runtime();
        genesis(&rt, "alice");
        rt.invoke(cert("alice"), "transfer", &["bob", "25"]);
        let holders = rt.holders().unwrap();
        assert_eq!(
            holders,
            vec![
                (AccountId::new("alice"), 99_999_975),
                (AccountId::new("bob"), 25)
            ]
        );
    }

    #[test]
    fn events_are_kept_in_history() {
        let rt = runtime();
        genesis(&rt, "alice");
        rt.invoke(cert("alice"), "approve", &["bob", "5"]);
        rt.invoke(cert("bob"), "transferFrom", &["alice", "bob", "6"]);
        let names: Vec<String> = rt.bus().history().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Transfer", "Approval"]);
    }

    // -----------------------------------------------------------------------
    // Transaction discipline
    // -----------------------------------------------------------------------

    /// Store whose `put_batch` can be made to fail, to exercise commit errors.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryKvStore,
        fail_commit: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
            self.inner.put(key, value)
        }

        fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
            self.inner.scan_prefix(prefix)
        }

        fn put_batch(&self, entries: &[(String, Vec<u8>)]) -> StoreResult<()> {
            if self.fail_commit.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("conflict".into()));
            }
            self.inner.put_batch(entries)
        }
    }

    #[test]
    fn failed_commit_publishes_nothing() {
        let rt = Runtime::new(FlakyStore::default(), HostConfig::default());
        assert!(rt
            .instantiate(Credential::Anonymous, "init", &["alice"])
            .is_ok());
        let sub = rt.bus().subscribe(EventFilter::default());

        rt.store().fail_commit.store(true, Ordering::SeqCst);
        let r = rt.invoke(cert("alice"), "transfer", &["bob", "1"]);
        assert_eq!(r.code.as_deref(), Some("StorageWriteError"));
        assert!(sub.drain().is_empty());
        assert_eq!(rt.store().inner.get("balance::bob").unwrap(), None);
    }

    /// Store that panics on reads of one key, standing in for an engine bug.
    struct PanickingStore {
        inner: InMemoryKvStore,
    }

    impl KeyValueStore for PanickingStore {
        fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            if key == "balance::boom" {
                panic!("simulated engine fault");
            }
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
            self.inner.put(key, value)
        }

        fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
            self.inner.scan_prefix(prefix)
        }
    }

    #[test]
    fn panics_become_failure_responses() {
        let rt = Runtime::new(
            PanickingStore {
                inner: InMemoryKvStore::new(),
            },
            HostConfig::default(),
        );
        assert!(rt
            .instantiate(Credential::Anonymous, "init", &["alice"])
            .is_ok());

        let r = rt.invoke(cert("alice"), "transfer", &["boom", "1"]);
        assert_eq!(r.code.as_deref(), Some(INTERNAL_FAULT));
        assert_eq!(r.message, "internal fault: simulated engine fault");
        assert_eq!(
            rt.store().inner.get("balance::alice").unwrap(),
            Some(b"100000000".to_vec())
        );

        // The runtime stays usable afterwards.
        assert!(rt.invoke(cert("alice"), "transfer", &["bob", "1"]).is_ok());
    }

    #[test]
    fn concurrent_transfers_conserve_supply() {
        use std::thread;

        let rt = Arc::new(runtime());
        genesis(&rt, "alice");
        for who in ["w0", "w1", "w2", "w3"] {
            assert!(rt.invoke(cert("alice"), "transfer", &[who, "1000"]).is_ok());
        }

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let rt = Arc::clone(&rt);
                thread::spawn(move || {
                    let me = format!("w{i}");
                    let next = format!("w{}", (i + 1) % 4);
                    for _ in 0..50 {
                        rt.invoke(cert(&me), "transfer", &[next.as_str(), "7"]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("worker should not panic");
        }

        let total: u64 = rt.holders().unwrap().iter().map(|(_, q)| q).sum();
        assert_eq!(total, 100_000_000);
    }
}
