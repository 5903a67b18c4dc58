pub mod config;
pub mod embeds;
pub mod extensions;
pub mod prelude;
pub mod util;

use std::sync::Arc;

use ticketbot_intake::{ClosingQueue, OrderIntakeService};

#[derive(Debug, Clone)]
pub struct UserData {
    pub config: Arc<config::Config>,
    pub intake: Arc<OrderIntakeService>,
    pub closing: Arc<ClosingQueue>,
}
