use std::fmt;

use ftl_types::{parse_canonical_quantity, AccountId, Quantity};

use crate::error::{LedgerError, LedgerResult};

/// A named ledger operation with its arguments decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Genesis: mint the total supply to `owner`.
    Init { owner: AccountId },
    TotalSupply,
    BalanceOf { account: AccountId },
    Allowance { owner: AccountId, spender: AccountId },
    Transfer { to: AccountId, value: Quantity },
    Approve { spender: AccountId, value: Quantity },
    TransferFrom {
        from: AccountId,
        to: AccountId,
        value: Quantity,
    },
}

impl Operation {
    pub const INIT: &'static str = "init";
    pub const TOTAL_SUPPLY: &'static str = "totalSupply";
    pub const BALANCE_OF: &'static str = "balanceOf";
    pub const ALLOWANCE: &'static str = "allowance";
    pub const TRANSFER: &'static str = "transfer";
    pub const APPROVE: &'static str = "approve";
    pub const TRANSFER_FROM: &'static str = "transferFrom";

    /// Decode a host invocation. Names are case-sensitive.
    ///
    /// Arity and argument shape are checked here, before anything touches
    /// storage.
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> LedgerResult<Self> {
        let op = match name {
            Self::INIT => {
                let [owner] = expect_args::<_, 1>(Self::INIT, args)?;
                Self::Init {
                    owner: AccountId::new(owner),
                }
            }
            Self::TOTAL_SUPPLY => {
                let [] = expect_args::<_, 0>(Self::TOTAL_SUPPLY, args)?;
                Self::TotalSupply
            }
            Self::BALANCE_OF => {
                let [account] = expect_args::<_, 1>(Self::BALANCE_OF, args)?;
                Self::BalanceOf {
                    account: AccountId::new(account),
                }
            }
            Self::ALLOWANCE => {
                let [owner, spender] = expect_args::<_, 2>(Self::ALLOWANCE, args)?;
                Self::Allowance {
                    owner: AccountId::new(owner),
                    spender: AccountId::new(spender),
                }
            }
            Self::TRANSFER => {
                let [to, value] = expect_args::<_, 2>(Self::TRANSFER, args)?;
                Self::Transfer {
                    to: AccountId::new(to),
                    value: expect_quantity(Self::TRANSFER, value)?,
                }
            }
            Self::APPROVE => {
                let [spender, value] = expect_args::<_, 2>(Self::APPROVE, args)?;
                Self::Approve {
                    spender: AccountId::new(spender),
                    value: expect_quantity(Self::APPROVE, value)?,
                }
            }
            Self::TRANSFER_FROM => {
                let [from, to, value] = expect_args::<_, 3>(Self::TRANSFER_FROM, args)?;
                Self::TransferFrom {
                    from: AccountId::new(from),
                    to: AccountId::new(to),
                    value: expect_quantity(Self::TRANSFER_FROM, value)?,
                }
            }
            other => return Err(LedgerError::UnknownOperation(other.to_string())),
        };
        Ok(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => Self::INIT,
            Self::TotalSupply => Self::TOTAL_SUPPLY,
            Self::BalanceOf { .. } => Self::BALANCE_OF,
            Self::Allowance { .. } => Self::ALLOWANCE,
            Self::Transfer { .. } => Self::TRANSFER,
            Self::Approve { .. } => Self::APPROVE,
            Self::TransferFrom { .. } => Self::TRANSFER_FROM,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn expect_args<S: AsRef<str>, const N: usize>(
    operation: &'static str,
    args: &[S],
) -> LedgerResult<[String; N]> {
    if args.len() != N {
        return Err(LedgerError::invalid_args(
            operation,
            format!("expected {N} arguments, got {}", args.len()),
        ));
    }
    Ok(std::array::from_fn(|i| args[i].as_ref().to_string()))
}

fn expect_quantity(operation: &'static str, text: String) -> LedgerResult<Quantity> {
    parse_canonical_quantity(&text)
        .map_err(|_| LedgerError::invalid_args(operation, format!("{text:?} is not a quantity")))
}
