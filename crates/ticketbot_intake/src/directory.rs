use std::fmt::Display;

use async_trait::async_trait;
use serde::Serialize;

use crate::summary::OrderSummary;

/// A resolved member of the managed community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Opaque reference to a channel created (or known) by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChannelHandle(pub String);

impl Display for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGrant {
    /// Nobody may view the channel unless another grant says otherwise.
    DenyEveryone,
    /// A single member may view and post.
    AllowMember(String),
    /// Everyone holding this role may view and post.
    AllowRole(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    pub name: String,
    pub grants: Vec<AccessGrant>,
}

pub const TICKET_CHANNEL_PREFIX: &str = "ticket-";

impl ChannelRequest {
    /// A private ticket channel readable by the owner and the staff role only.
    pub fn private_ticket(owner: &Member, staff_role: &str) -> Self {
        ChannelRequest {
            name: ticket_channel_name(&owner.display_name),
            grants: vec![
                AccessGrant::DenyEveryone,
                AccessGrant::AllowMember(owner.id.clone()),
                AccessGrant::AllowRole(staff_role.to_string()),
            ],
        }
    }
}

/// `ticket-<name>`, lowercased with whitespace runs collapsed into a single dash,
/// the way discord normalizes text channel names anyways.
pub fn ticket_channel_name(display_name: &str) -> String {
    let name = display_name.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    format!("{TICKET_CHANNEL_PREFIX}{name}")
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
    #[error("{operation} failed: {message}")]
    Failed { operation: &'static str, message: String },
}

impl DirectoryError {
    pub fn failed(operation: &'static str, err: impl Display) -> Self {
        DirectoryError::Failed { operation, message: err.to_string() }
    }
}

/// The chat platform, as far as the order intake is concerned.
///
/// Every method is a network round-trip. Implementations should not retry on their own:
/// a retried channel creation can leave duplicate channels behind.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up a member of the community. `Ok(None)` means the identity is not a member.
    async fn resolve_member(&self, identity: &str) -> Result<Option<Member>, DirectoryError>;

    async fn create_private_channel(
        &self,
        request: &ChannelRequest,
    ) -> Result<ChannelHandle, DirectoryError>;

    async fn send_message(
        &self,
        destination: &ChannelHandle,
        summary: &OrderSummary,
    ) -> Result<(), DirectoryError>;

    async fn delete_channel(&self, channel: &ChannelHandle) -> Result<(), DirectoryError>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ticket_channel_name() {
        assert_eq!(ticket_channel_name("elkowar"), "ticket-elkowar");
        assert_eq!(ticket_channel_name("Big  Zulrah Fan"), "ticket-big-zulrah-fan");
    }

    #[test]
    fn test_private_ticket_grants() {
        let owner = Member { id: "42".into(), display_name: "Owner".into(), avatar_url: None };
        let request = ChannelRequest::private_ticket(&owner, "7");
        assert_eq!(request.name, "ticket-owner");
        assert_eq!(
            request.grants,
            vec![
                AccessGrant::DenyEveryone,
                AccessGrant::AllowMember("42".into()),
                AccessGrant::AllowRole("7".into()),
            ]
        );
    }
}
