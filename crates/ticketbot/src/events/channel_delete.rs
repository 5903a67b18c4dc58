use super::*;

/// Someone deleted a ticket by hand, so there's nothing left for the closing queue to do.
pub fn channel_delete(data: &UserData, channel: ChannelHandle) -> Result<(), Error> {
    if data.closing.cancel(&channel) {
        tracing::info!(channel.id = %channel, "Ticket deleted manually, dropped pending close");
    }
    Ok(())
}
