//! Accept a message through a verified attestation
//!
//! The attestation stands in for the message: once verified, its public
//! output goes through the same checks as a plaintext submission, minus
//! the content length check which the pinned circuit decides.

use agent_messages_zkvm_guest::Attestation;

use crate::config::ShieldedContentCheck;
use crate::context::ExecutionContext;
use crate::errors::RejectionReason;
use crate::events::ShieldedMessageAccepted;
use crate::state::{MessageKey, ProofOutput};
use crate::store::MessageStore;
use crate::verifier::AttestationVerifier;

use super::validation::authenticate;
use super::{directory_helpers, provenance_helpers, sequence_helpers, Context};

pub fn handler<S: MessageStore + ?Sized, V: AttestationVerifier + ?Sized>(
    ctx: Context<'_, S>,
    verifier: &V,
    attestation: &Attestation,
    exec: &ExecutionContext,
) -> Result<(), RejectionReason> {
    let output = verifier.verify(attestation)?;
    apply_verified(ctx, &output, exec)
}

/// Runs the post-verification checks and commits. `output` must come from
/// a successful `AttestationVerifier::verify`.
pub fn apply_verified<S: MessageStore + ?Sized>(
    ctx: Context<'_, S>,
    output: &ProofOutput,
    exec: &ExecutionContext,
) -> Result<(), RejectionReason> {
    let stored = directory_helpers::require_registered(&*ctx.store, output.agent_id)?;
    authenticate(&stored, &output.security_code)?;

    match ctx.policy.shielded_content_check {
        ShieldedContentCheck::Disabled => tracing::trace!(
            agent_id = %output.agent_id,
            message_number = %output.message_number,
            "shielded content length check disabled, skipping"
        ),
        ShieldedContentCheck::Enforced => tracing::trace!(
            agent_id = %output.agent_id,
            message_number = %output.message_number,
            "shielded content length enforced by circuit"
        ),
    }

    let key = MessageKey::new(output.agent_id, output.message_number);
    sequence_helpers::check_advance(&*ctx.store, output.agent_id, output.message_number)?;
    provenance_helpers::require_unrecorded(
        &*ctx.store,
        key,
        sequence_helpers::last_number(&*ctx.store, output.agent_id),
    )?;

    sequence_helpers::commit_advance(&mut *ctx.store, output.agent_id, output.message_number);
    let provenance = provenance_helpers::record(&mut *ctx.store, key, exec);

    ctx.events.emit(ShieldedMessageAccepted {
        agent_id: output.agent_id,
        message_number: output.message_number,
        provenance,
    });
    tracing::info!(
        agent_id = %output.agent_id,
        message_number = %output.message_number,
        block_height = exec.block_height,
        nonce = exec.nonce,
        "shielded message accepted"
    );

    Ok(())
}
