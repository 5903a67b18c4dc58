//! An in-memory [`Directory`] that records every call made to it.

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    directory::{ChannelHandle, ChannelRequest, Directory, DirectoryError, Member},
    summary::OrderSummary,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ResolveMember(String),
    CreateChannel(ChannelRequest),
    SendMessage(ChannelHandle, OrderSummary),
    DeleteChannel(ChannelHandle),
}

#[derive(Debug, Default)]
pub struct RecordingDirectory {
    members: HashSet<String>,
    calls: Mutex<Vec<Call>>,
    channels_created: Mutex<usize>,
    failing_destination: Mutex<Option<String>>,
    failing_deletions: Mutex<bool>,
    channel_creation_delay: Mutex<Option<Duration>>,
    hang_channel_creation: Mutex<bool>,
}

impl RecordingDirectory {
    pub fn with_members(members: &[&str]) -> Self {
        Self { members: members.iter().map(|x| x.to_string()).collect(), ..Default::default() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn fail_messages_to(&self, destination: &str) {
        *self.failing_destination.lock() = Some(destination.to_string());
    }

    pub fn fail_deletions(&self) {
        *self.failing_deletions.lock() = true;
    }

    pub fn delay_channel_creation(&self, delay: Duration) {
        *self.channel_creation_delay.lock() = Some(delay);
    }

    pub fn hang_channel_creation(&self) {
        *self.hang_channel_creation.lock() = true;
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Directory for RecordingDirectory {
    async fn resolve_member(&self, identity: &str) -> Result<Option<Member>, DirectoryError> {
        self.record(Call::ResolveMember(identity.to_string()));
        Ok(self.members.contains(identity).then(|| Member {
            id: identity.to_string(),
            display_name: format!("member {identity}"),
            avatar_url: None,
        }))
    }

    async fn create_private_channel(
        &self,
        request: &ChannelRequest,
    ) -> Result<ChannelHandle, DirectoryError> {
        self.record(Call::CreateChannel(request.clone()));
        let hang = *self.hang_channel_creation.lock();
        if hang {
            std::future::pending::<()>().await;
        }
        let delay = *self.channel_creation_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut created = self.channels_created.lock();
        *created += 1;
        Ok(ChannelHandle(format!("channel-{created}")))
    }

    async fn send_message(
        &self,
        destination: &ChannelHandle,
        summary: &OrderSummary,
    ) -> Result<(), DirectoryError> {
        self.record(Call::SendMessage(destination.clone(), summary.clone()));
        if self.failing_destination.lock().as_deref() == Some(destination.0.as_str()) {
            return Err(DirectoryError::failed("send_message", "Missing Access"));
        }
        Ok(())
    }

    async fn delete_channel(&self, channel: &ChannelHandle) -> Result<(), DirectoryError> {
        self.record(Call::DeleteChannel(channel.clone()));
        if *self.failing_deletions.lock() {
            return Err(DirectoryError::failed("delete_channel", "Unknown Channel"));
        }
        Ok(())
    }
}
