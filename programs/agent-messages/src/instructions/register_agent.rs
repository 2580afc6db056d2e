//! Register an agent's security code

use crate::errors::{LengthCheckedField, RejectionReason};
use crate::events::AgentRegistered;
use crate::state::{AgentId, SecurityCode};
use crate::store::MessageStore;

use super::directory_helpers;
use super::validation::require_length;
use super::Context;

/// Writes `code` as the active code for `agent_id`, replacing any earlier one.
///
/// The caller is not authenticated here. Deciding who may register is the
/// ledger's job.
pub fn handler<S: MessageStore + ?Sized>(
    ctx: Context<'_, S>,
    agent_id: AgentId,
    code: SecurityCode,
) -> Result<(), RejectionReason> {
    if let Some(expected) = ctx.policy.registration_code_length {
        require_length(LengthCheckedField::SecurityCode, &code, expected)?;
    }

    let replaced = directory_helpers::register(&mut *ctx.store, agent_id, code);

    ctx.events.emit(AgentRegistered { agent_id, replaced });
    tracing::info!(agent_id = %agent_id, replaced, "agent registered");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AcceptancePolicy;
    use crate::events::{AcceptanceEvent, EventLog};
    use crate::state::CircuitString;
    use crate::store::InMemoryStore;

    fn code(value: &str) -> SecurityCode {
        CircuitString::new("security_code", value).expect("fits")
    }

    fn register(
        store: &mut InMemoryStore,
        policy: &AcceptancePolicy,
        events: &mut EventLog,
        value: &str,
    ) -> Result<(), RejectionReason> {
        handler(
            Context {
                store,
                policy,
                events,
            },
            AgentId(7),
            code(value),
        )
    }

    #[test]
    fn test_plaintext_accepts_any_code_length() {
        let mut store = InMemoryStore::new();
        let mut events = EventLog::default();
        let policy = AcceptancePolicy::plaintext();

        for value in ["", "j", "jb", "a-much-longer-code"] {
            register(&mut store, &policy, &mut events, value).expect("no length rule");
        }
        assert_eq!(store.security_code(AgentId(7)), Some(code("a-much-longer-code")));
    }

    #[test]
    fn test_shielded_requires_two_characters() {
        let mut store = InMemoryStore::new();
        let mut events = EventLog::default();
        let policy = AcceptancePolicy::shielded();

        let err = register(&mut store, &policy, &mut events, "jbx")
            .expect_err("3 characters must be rejected");
        assert_eq!(
            err,
            RejectionReason::InvalidContentLength {
                field: LengthCheckedField::SecurityCode,
                expected: 2,
                actual: 3,
            }
        );
        assert_eq!(store.security_code(AgentId(7)), None);
        assert!(events.is_empty());

        register(&mut store, &policy, &mut events, "jb").expect("2 characters pass");
        assert_eq!(store.security_code(AgentId(7)), Some(code("jb")));
    }

    #[test]
    fn test_reregistration_emits_replaced() {
        let mut store = InMemoryStore::new();
        let mut events = EventLog::default();
        let policy = AcceptancePolicy::plaintext();

        register(&mut store, &policy, &mut events, "jb").expect("first registration");
        register(&mut store, &policy, &mut events, "aa").expect("second registration");

        assert_eq!(
            events.take(),
            vec![
                AcceptanceEvent::AgentRegistered(AgentRegistered {
                    agent_id: AgentId(7),
                    replaced: false,
                }),
                AcceptanceEvent::AgentRegistered(AgentRegistered {
                    agent_id: AgentId(7),
                    replaced: true,
                }),
            ]
        );
    }
}
