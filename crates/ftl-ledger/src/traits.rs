use ftl_types::AccountId;

use crate::error::HostFault;

/// Identity boundary: who is invoking the current operation.
///
/// The host verifies the caller's credential before the engine runs; the
/// engine only asks for the resulting identity string.
pub trait IdentityResolver: Send + Sync {
    /// Identity of the invoking principal, or a fault when the invocation
    /// carries no verifiable credential.
    fn resolve_caller(&self) -> Result<AccountId, HostFault>;
}

/// Event boundary: fire-and-forget publication onto the host bus.
pub trait EventSink: Send + Sync {
    fn emit(&self, name: &str, payload: &[u8]) -> Result<(), HostFault>;
}
