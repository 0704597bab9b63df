use ftl_ledger::{HostFault, IdentityResolver};
use ftl_types::AccountId;

/// Credential attached to an invocation after the transport verified it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    /// A verified client certificate, carried as its subject distinguished
    /// name, e.g. `CN=alice,OU=client,O=Org1`.
    Certificate { subject: String },
    /// An identity the embedding application has already established.
    Principal(String),
    /// No credential was presented.
    Anonymous,
}

impl Credential {
    pub fn certificate(subject: impl Into<String>) -> Self {
        Self::Certificate {
            subject: subject.into(),
        }
    }

    pub fn principal(name: impl Into<String>) -> Self {
        Self::Principal(name.into())
    }
}

/// Resolves the caller of one invocation from its [`Credential`].
///
/// For certificates the caller is the value of the configured subject
/// attribute (the common name by default).
#[derive(Clone, Debug)]
pub struct CredentialResolver {
    credential: Credential,
    attribute: String,
}

impl CredentialResolver {
    pub fn new(credential: Credential, attribute: impl Into<String>) -> Self {
        Self {
            credential,
            attribute: attribute.into(),
        }
    }
}

impl IdentityResolver for CredentialResolver {
    fn resolve_caller(&self) -> Result<AccountId, HostFault> {
        match &self.credential {
            Credential::Certificate { subject } => subject_attribute(subject, &self.attribute)
                .map(AccountId::new)
                .ok_or_else(|| {
                    HostFault::new(format!(
                        "certificate subject has no {} attribute",
                        self.attribute
                    ))
                }),
            Credential::Principal(name) if !name.is_empty() => Ok(AccountId::new(name.as_str())),
            Credential::Principal(_) => Err(HostFault::new("empty principal")),
            Credential::Anonymous => Err(HostFault::new("no credential presented")),
        }
    }
}

/// Value of `attribute` in a comma-separated distinguished name.
fn subject_attribute<'a>(subject: &'a str, attribute: &str) -> Option<&'a str> {
    subject.split(',').find_map(|rdn| {
        let (name, value) = rdn.split_once('=')?;
        (name.trim().eq_ignore_ascii_case(attribute) && !value.trim().is_empty())
            .then(|| value.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(credential: Credential) -> Result<AccountId, HostFault> {
        CredentialResolver::new(credential, "CN").resolve_caller()
    }

    #[test]
    fn certificate_common_name() {
        let id = resolve(Credential::certificate("CN=alice,OU=client,O=Org1")).unwrap();
        assert_eq!(id, AccountId::new("alice"));
    }

    #[test]
    fn attribute_lookup_tolerates_spacing_and_case() {
        let id = resolve(Credential::certificate("O=Org1, cn = bob ")).unwrap();
        assert_eq!(id, AccountId::new("bob"));
    }

    #[test]
    fn configured_attribute() {
        let resolver =
            CredentialResolver::new(Credential::certificate("CN=svc,UID=u-42"), "UID");
        assert_eq!(resolver.resolve_caller().unwrap(), AccountId::new("u-42"));
    }

    #[test]
    fn certificate_without_attribute_fails() {
        let err = resolve(Credential::certificate("O=Org1,OU=client")).unwrap_err();
        assert_eq!(err, HostFault::new("certificate subject has no CN attribute"));
        assert!(resolve(Credential::certificate("CN=")).is_err());
    }

    #[test]
    fn principal_passes_through() {
        assert_eq!(
            resolve(Credential::principal("carol")).unwrap(),
            AccountId::new("carol")
        );
        assert!(resolve(Credential::principal("")).is_err());
    }

    #[test]
    fn anonymous_has_no_identity() {
        assert_eq!(
            resolve(Credential::Anonymous).unwrap_err(),
            HostFault::new("no credential presented")
        );
    }
}
