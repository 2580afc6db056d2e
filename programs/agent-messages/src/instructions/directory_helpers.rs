//! Agent directory: the active security code per agent.

use crate::errors::RejectionReason;
use crate::state::{AgentId, SecurityCode};
use crate::store::MessageStore;

/// Inserts or overwrites the code for `agent_id`. Returns whether a code
/// was replaced.
pub fn register<S: MessageStore + ?Sized>(
    store: &mut S,
    agent_id: AgentId,
    code: SecurityCode,
) -> bool {
    store.put_security_code(agent_id, code).is_some()
}

pub fn lookup<S: MessageStore + ?Sized>(store: &S, agent_id: AgentId) -> Option<SecurityCode> {
    store.security_code(agent_id)
}

pub fn require_registered<S: MessageStore + ?Sized>(
    store: &S,
    agent_id: AgentId,
) -> Result<SecurityCode, RejectionReason> {
    lookup(store, agent_id).ok_or(RejectionReason::AgentNotRegistered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CircuitString;
    use crate::store::InMemoryStore;

    #[test]
    fn test_unknown_agent_is_not_registered() {
        let store = InMemoryStore::new();
        assert_eq!(
            require_registered(&store, AgentId(7)),
            Err(RejectionReason::AgentNotRegistered)
        );
    }

    #[test]
    fn test_register_reports_replacement() {
        let mut store = InMemoryStore::new();
        let jb = CircuitString::new("security_code", "jb").expect("fits");
        let aa = CircuitString::new("security_code", "aa").expect("fits");

        assert!(!register(&mut store, AgentId(7), jb));
        assert!(register(&mut store, AgentId(7), aa));
        assert_eq!(require_registered(&store, AgentId(7)), Ok(aa));
    }
}
