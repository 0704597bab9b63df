use ftl_store::KeyValueStore;
use ftl_types::{format_quantity, AccountId, EventName, LedgerEvent, Quantity};
use tracing::{debug, info, warn};

use crate::accessor::AccountStore;
use crate::arith::{checked_add, checked_sub};
use crate::config::{GenesisPolicy, LedgerConfig};
use crate::error::{LedgerError, LedgerResult};
use crate::operation::Operation;
use crate::traits::{EventSink, IdentityResolver};

/// Host collaborators available to a single invocation.
#[derive(Clone, Copy)]
pub struct InvocationContext<'a> {
    /// Transaction-scoped view of the host key-value space.
    pub store: &'a dyn KeyValueStore,
    pub identity: &'a dyn IdentityResolver,
    pub events: &'a dyn EventSink,
}

/// Successful result of an operation, before wire encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No payload (genesis, and names the instantiate path ignores).
    Empty,
    /// A numeric query result.
    Quantity(Quantity),
    /// A state-changing operation was applied.
    Accepted,
}

impl Outcome {
    /// Wire payload: decimal text for numbers, `true` for mutations.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Quantity(q) => format_quantity(*q).into_bytes(),
            Self::Accepted => b"true".to_vec(),
        }
    }
}

/// The token ledger engine.
///
/// Stateless apart from its configuration: every ledger record lives in the
/// host store handed in through [`InvocationContext`]. Each mutating
/// operation stages its writes, checks every arithmetic step, encodes its
/// event, flushes, and only then emits. A failure anywhere before the flush
/// leaves the store untouched and emits nothing. Once the flush succeeds the
/// operation has succeeded; an event sink fault after that point is logged,
/// not returned.
#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    config: LedgerConfig,
}

impl TokenLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Instantiate entry point. Only `init` does anything here; every other
    /// name succeeds with an empty payload.
    pub fn instantiate<S: AsRef<str>>(
        &self,
        ctx: &InvocationContext<'_>,
        name: &str,
        args: &[S],
    ) -> LedgerResult<Outcome> {
        if name != Operation::INIT {
            debug!(operation = name, "ignored on instantiate");
            return Ok(Outcome::Empty);
        }
        let op = Operation::parse(name, args)?;
        self.execute(ctx, op)
    }

    /// Invoke entry point for every operation except `init`.
    pub fn invoke<S: AsRef<str>>(
        &self,
        ctx: &InvocationContext<'_>,
        name: &str,
        args: &[S],
    ) -> LedgerResult<Outcome> {
        if name == Operation::INIT {
            return Err(LedgerError::UnknownOperation(name.to_string()));
        }
        let op = Operation::parse(name, args)?;
        self.execute(ctx, op)
    }

    /// Run a decoded operation.
    pub fn execute(&self, ctx: &InvocationContext<'_>, op: Operation) -> LedgerResult<Outcome> {
        debug!(operation = %op, "executing");
        let result = match op {
            Operation::Init { owner } => self.init(ctx, &owner).map(|()| Outcome::Empty),
            Operation::TotalSupply => Ok(Outcome::Quantity(self.total_supply())),
            Operation::BalanceOf { account } => {
                self.balance_of(ctx, &account).map(Outcome::Quantity)
            }
            Operation::Allowance { owner, spender } => {
                self.allowance(ctx, &owner, &spender).map(Outcome::Quantity)
            }
            Operation::Transfer { to, value } => {
                self.transfer(ctx, &to, value).map(|()| Outcome::Accepted)
            }
            Operation::Approve { spender, value } => {
                self.approve(ctx, &spender, value).map(|()| Outcome::Accepted)
            }
            Operation::TransferFrom { from, to, value } => self
                .transfer_from(ctx, &from, &to, value)
                .map(|()| Outcome::Accepted),
        };
        if let Err(err) = &result {
            debug!(error = %err, code = err.code(), "operation failed");
        }
        result
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Genesis: mint the whole supply to `owner`.
    pub fn init(&self, ctx: &InvocationContext<'_>, owner: &AccountId) -> LedgerResult<()> {
        let mut accounts = AccountStore::new(ctx.store);

        if let Some(existing) = accounts.genesis_owner()? {
            match self.config.genesis_policy {
                GenesisPolicy::Reject => {
                    return Err(LedgerError::AlreadyInitialized(existing.into_inner()))
                }
                GenesisPolicy::Overwrite => {
                    warn!(previous = %existing, owner = %owner, "re-running genesis");
                }
            }
        }

        let supply = self.config.total_supply;
        let event = encode(LedgerEvent::transfer(AccountId::mint(), owner.clone(), supply))?;
        accounts.set_balance(owner, supply);
        accounts.record_genesis(owner);
        accounts.flush()?;

        info!(owner = %owner, supply, "genesis minted");
        publish(ctx, event);
        Ok(())
    }

    pub fn total_supply(&self) -> Quantity {
        self.config.total_supply
    }

    pub fn balance_of(
        &self,
        ctx: &InvocationContext<'_>,
        account: &AccountId,
    ) -> LedgerResult<Quantity> {
        AccountStore::new(ctx.store).get_balance(account)
    }

    pub fn allowance(
        &self,
        ctx: &InvocationContext<'_>,
        owner: &AccountId,
        spender: &AccountId,
    ) -> LedgerResult<Quantity> {
        AccountStore::new(ctx.store).get_allowance(owner, spender)
    }

    /// Move `value` from the caller to `to`.
    pub fn transfer(
        &self,
        ctx: &InvocationContext<'_>,
        to: &AccountId,
        value: Quantity,
    ) -> LedgerResult<()> {
        let caller = resolve_caller(ctx)?;
        let mut accounts = AccountStore::new(ctx.store);

        let sender_balance = accounts.get_balance(&caller)?;
        accounts.set_balance(&caller, checked_sub(sender_balance, value)?);

        let recipient_balance = accounts.get_balance(to)?;
        accounts.set_balance(to, checked_add(recipient_balance, value)?);

        let event = encode(LedgerEvent::transfer(caller.clone(), to.clone(), value))?;
        accounts.flush()?;
        debug!(from = %caller, to = %to, value, "transfer applied");
        publish(ctx, event);
        Ok(())
    }

    /// Set the amount `spender` may move out of the caller's balance.
    /// Replaces any previous allowance.
    pub fn approve(
        &self,
        ctx: &InvocationContext<'_>,
        spender: &AccountId,
        value: Quantity,
    ) -> LedgerResult<()> {
        let caller = resolve_caller(ctx)?;
        let mut accounts = AccountStore::new(ctx.store);
        accounts.set_allowance(&caller, spender, value);

        let event = encode(LedgerEvent::approval(caller.clone(), spender.clone(), value))?;
        accounts.flush()?;
        debug!(owner = %caller, spender = %spender, value, "approval applied");
        publish(ctx, event);
        Ok(())
    }

    /// Move `value` from `from` to `to`, spending the caller's allowance on
    /// `from`.
    pub fn transfer_from(
        &self,
        ctx: &InvocationContext<'_>,
        from: &AccountId,
        to: &AccountId,
        value: Quantity,
    ) -> LedgerResult<()> {
        let caller = resolve_caller(ctx)?;
        let mut accounts = AccountStore::new(ctx.store);

        let from_balance = accounts.get_balance(from)?;
        accounts.set_balance(from, checked_sub(from_balance, value)?);

        let allowance = accounts.get_allowance(from, &caller)?;
        accounts.set_allowance(from, &caller, checked_sub(allowance, value)?);

        let to_balance = accounts.get_balance(to)?;
        accounts.set_balance(to, checked_add(to_balance, value)?);

        let event = encode(LedgerEvent::transfer(from.clone(), to.clone(), value))?;
        accounts.flush()?;
        debug!(spender = %caller, from = %from, to = %to, value, "delegated transfer applied");
        publish(ctx, event);
        Ok(())
    }

    /// Every account holding a balance record, in key order.
    pub fn holders(
        &self,
        ctx: &InvocationContext<'_>,
    ) -> LedgerResult<Vec<(AccountId, Quantity)>> {
        AccountStore::new(ctx.store).balances()
    }
}

fn resolve_caller(ctx: &InvocationContext<'_>) -> LedgerResult<AccountId> {
    ctx.identity
        .resolve_caller()
        .map_err(|fault| LedgerError::IdentityResolutionError(fault.to_string()))
}

/// An event whose payload is already serialized.
struct EncodedEvent {
    name: EventName,
    payload: Vec<u8>,
}

/// Serialize `event` ahead of the flush, so an unencodable payload aborts
/// the operation with nothing written.
fn encode(event: LedgerEvent) -> LedgerResult<EncodedEvent> {
    let payload = event
        .to_payload()
        .map_err(|e| LedgerError::EventEmissionError(e.to_string()))?;
    Ok(EncodedEvent {
        name: event.name(),
        payload,
    })
}

/// Hand a committed event to the host. Delivery is the host's concern: the
/// state change has already been applied, so a sink fault is logged and the
/// operation still succeeds.
fn publish(ctx: &InvocationContext<'_>, event: EncodedEvent) {
    if let Err(fault) = ctx.events.emit(event.name.as_str(), &event.payload) {
        warn!(event = event.name.as_str(), %fault, "event sink rejected event");
    }
}
