//! Order intake for the ticket bot: cooldowns, ticket provisioning and closing,
//! independent of the chat platform behind [`Directory`].

pub mod closing;
pub mod cooldown;
pub mod directory;
pub mod intake;
pub mod order;
pub mod summary;

#[cfg(test)]
mod fake;

pub use closing::{ClosingQueue, CLOSE_GRACE_DELAY};
pub use cooldown::{Admission, CooldownGate};
pub use directory::{
    AccessGrant, ChannelHandle, ChannelRequest, Directory, DirectoryError, Member,
    TICKET_CHANNEL_PREFIX,
};
pub use intake::{IntakeConfig, IntakeError, OrderIntakeService, TicketCreated};
pub use order::{format_catalog_name, FormData, OrderRequest, OrderType, Stats};
pub use summary::{OrderSummary, SummaryField};
