//! Accept a plaintext message

use crate::errors::{LengthCheckedField, RejectionReason};
use crate::events::MessageAccepted;
use crate::state::Message;
use crate::store::MessageStore;

use super::validation::{authenticate, require_length};
use super::{directory_helpers, sequence_helpers, Context};

/// Checks run in a fixed order: registration, security code, content
/// length, sequence. The counter only moves once all of them pass.
pub fn handler<S: MessageStore + ?Sized>(
    ctx: Context<'_, S>,
    message: &Message,
) -> Result<(), RejectionReason> {
    let stored = directory_helpers::require_registered(&*ctx.store, message.agent_id)?;
    authenticate(&stored, &message.security_code)?;
    require_length(
        LengthCheckedField::MessageContent,
        &message.content,
        ctx.policy.content_length,
    )?;
    sequence_helpers::check_advance(&*ctx.store, message.agent_id, message.number)?;

    sequence_helpers::commit_advance(&mut *ctx.store, message.agent_id, message.number);

    ctx.events.emit(MessageAccepted {
        agent_id: message.agent_id,
        message_number: message.number,
    });
    tracing::info!(
        agent_id = %message.agent_id,
        message_number = %message.number,
        "message accepted"
    );

    Ok(())
}
