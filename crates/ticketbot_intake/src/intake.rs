use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::Instant;

use crate::{
    cooldown::{Admission, CooldownGate},
    directory::{ChannelHandle, ChannelRequest, Directory, DirectoryError},
    order::OrderRequest,
    summary::OrderSummary,
};

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Minimum time between two accepted orders of the same requester.
    pub cooldown_window: Duration,
    /// Upper bound for every single call into the [`Directory`].
    pub call_timeout: Duration,
    /// Where to log incoming orders for staff, if anywhere.
    pub order_log: Option<ChannelHandle>,
    /// Role that gets access to every ticket channel.
    pub staff_role: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("You can only open another ticket in {} seconds", retry_after_secs(.retry_after))]
    RateLimited { retry_after: Duration },
    #[error("You need to join the discord server before opening a ticket")]
    NotAMember,
    #[error("Failed to create ticket")]
    ProvisioningFailed(#[source] DirectoryError),
}

/// Seconds until the next attempt may succeed, rounded up so clients never retry too early.
pub fn retry_after_secs(retry_after: &Duration) -> u64 {
    retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCreated {
    pub channel: ChannelHandle,
}

pub struct OrderIntakeService {
    config: IntakeConfig,
    directory: Arc<dyn Directory>,
    cooldowns: CooldownGate,
}

impl std::fmt::Debug for OrderIntakeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderIntakeService")
            .field("config", &self.config)
            .field("cooldowns", &self.cooldowns)
            .finish_non_exhaustive()
    }
}

impl OrderIntakeService {
    pub fn new(config: IntakeConfig, directory: Arc<dyn Directory>) -> Self {
        let cooldowns = CooldownGate::new(config.cooldown_window);
        Self { config, directory, cooldowns }
    }

    pub fn cooldowns(&self) -> &CooldownGate {
        &self.cooldowns
    }

    /// Turn an order into a ticket channel.
    ///
    /// The requester's cooldown is only committed once the channel exists and the
    /// welcome message was delivered, so a failed attempt never costs them their window.
    #[tracing::instrument(skip_all, fields(order.requester_id, order.order_type))]
    pub async fn submit_order(&self, request: OrderRequest) -> Result<TicketCreated, IntakeError> {
        let order = request.validate().map_err(IntakeError::InvalidRequest)?;
        let span = tracing::Span::current();
        span.record("order.requester_id", order.requester_id.as_str());
        span.record("order.order_type", order.order_type.to_string().as_str());

        let _guard = self.cooldowns.lock(&order.requester_id).await;
        let now = Instant::now();
        if let Admission::Rejected { retry_after } = self.cooldowns.admit(&order.requester_id, now) {
            tracing::info!(retry_after = ?retry_after, "Rejecting order, requester is on cooldown");
            return Err(IntakeError::RateLimited { retry_after });
        }

        let member = self
            .bounded("resolve_member", self.directory.resolve_member(&order.requester_id))
            .await
            .map_err(IntakeError::ProvisioningFailed)?
            .ok_or(IntakeError::NotAMember)?;

        if let Some(order_log) = &self.config.order_log {
            let summary = OrderSummary::order_log(&order, &member);
            self.bounded("send_order_log", self.directory.send_message(order_log, &summary))
                .await
                .map_err(IntakeError::ProvisioningFailed)?;
        }

        let channel_request = ChannelRequest::private_ticket(&member, &self.config.staff_role);
        let channel = self
            .bounded("create_private_channel", self.directory.create_private_channel(&channel_request))
            .await
            .map_err(IntakeError::ProvisioningFailed)?;

        let welcome = OrderSummary::ticket_welcome(&order, &member);
        if let Err(err) =
            self.bounded("send_ticket_welcome", self.directory.send_message(&channel, &welcome)).await
        {
            tracing::error!(
                error.message = %err,
                channel.id = %channel,
                "Ticket channel was created but the welcome message failed, channel needs manual cleanup"
            );
            return Err(IntakeError::ProvisioningFailed(err));
        }

        self.cooldowns.commit(&order.requester_id, now);
        tracing::info!(channel.id = %channel, channel.name = %channel_request.name, "Created ticket");
        Ok(TicketCreated { channel })
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, DirectoryError>>,
    ) -> Result<T, DirectoryError> {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DirectoryError::Timeout { operation }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        directory::AccessGrant,
        fake::{Call, RecordingDirectory},
    };

    const WINDOW: Duration = Duration::from_secs(300);

    fn service(directory: Arc<RecordingDirectory>, order_log: Option<&str>) -> OrderIntakeService {
        OrderIntakeService::new(
            IntakeConfig {
                cooldown_window: WINDOW,
                call_timeout: Duration::from_secs(10),
                order_log: order_log.map(|x| ChannelHandle(x.to_string())),
                staff_role: "staff".to_string(),
            },
            directory,
        )
    }

    fn order(requester: &str) -> OrderRequest {
        OrderRequest {
            requester_id: Some(requester.to_string()),
            order_type: Some("inferno".to_string()),
            price: Some(500.0),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_cooldown_scenario() {
        let directory = Arc::new(RecordingDirectory::with_members(&["U1"]));
        let service = service(directory.clone(), None);

        let first = service.submit_order(order("U1")).await.unwrap();
        assert_eq!(first.channel, ChannelHandle("channel-1".into()));

        tokio::time::advance(Duration::from_secs(30)).await;
        match service.submit_order(order("U1")).await {
            Err(IntakeError::RateLimited { retry_after }) => {
                assert_eq!(retry_after, Duration::from_secs(270))
            }
            other => panic!("expected rate limit, got {other:?}"),
        }

        tokio::time::advance(Duration::from_secs(271)).await;
        let third = service.submit_order(order("U1")).await.unwrap();
        assert_eq!(third.channel, ChannelHandle("channel-2".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_request_has_no_side_effects() {
        let directory = Arc::new(RecordingDirectory::with_members(&["U1"]));
        let service = service(directory.clone(), Some("orders"));

        let no_requester = OrderRequest { order_type: Some("quiver".into()), ..Default::default() };
        let no_type = OrderRequest { requester_id: Some("U1".into()), ..Default::default() };
        for request in [no_requester, no_type] {
            let result = service.submit_order(request).await;
            assert!(matches!(result, Err(IntakeError::InvalidRequest(_))));
        }
        assert!(directory.calls().is_empty());
        assert_eq!(service.cooldowns().last_accepted("U1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_a_member_leaves_cooldown_untouched() {
        let directory = Arc::new(RecordingDirectory::with_members(&[]));
        let service = service(directory.clone(), Some("orders"));

        let result = service.submit_order(order("stranger")).await;
        assert!(matches!(result, Err(IntakeError::NotAMember)));
        assert_eq!(directory.calls(), vec![Call::ResolveMember("stranger".into())]);
        assert_eq!(service.cooldowns().last_accepted("stranger"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_order_logs_then_provisions() {
        let directory = Arc::new(RecordingDirectory::with_members(&["U1"]));
        let service = service(directory.clone(), Some("orders"));

        let created = service.submit_order(order("U1")).await.unwrap();

        let calls = directory.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::ResolveMember("U1".into()));
        assert!(matches!(&calls[1], Call::SendMessage(dest, _) if dest.0 == "orders"));
        match &calls[2] {
            Call::CreateChannel(request) => {
                assert_eq!(request.name, "ticket-member-u1");
                assert_eq!(
                    request.grants,
                    vec![
                        AccessGrant::DenyEveryone,
                        AccessGrant::AllowMember("U1".into()),
                        AccessGrant::AllowRole("staff".into()),
                    ]
                );
            }
            other => panic!("expected channel creation, got {other:?}"),
        }
        assert!(matches!(&calls[3], Call::SendMessage(dest, summary)
            if *dest == created.channel && summary.mention.as_deref() == Some("U1")));
        assert!(service.cooldowns().last_accepted("U1").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_log_failure_is_fatal() {
        let directory = Arc::new(RecordingDirectory::with_members(&["U1"]));
        directory.fail_messages_to("orders");
        let service = service(directory.clone(), Some("orders"));

        let result = service.submit_order(order("U1")).await;
        assert!(matches!(result, Err(IntakeError::ProvisioningFailed(_))));
        assert!(!directory.calls().iter().any(|x| matches!(x, Call::CreateChannel(_))));
        assert_eq!(service.cooldowns().last_accepted("U1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_welcome_does_not_commit() {
        let directory = Arc::new(RecordingDirectory::with_members(&["U1"]));
        directory.fail_messages_to("channel-1");
        let service = service(directory.clone(), None);

        let result = service.submit_order(order("U1")).await;
        assert!(matches!(result, Err(IntakeError::ProvisioningFailed(_))));
        assert_eq!(service.cooldowns().last_accepted("U1"), None);

        // the requester may resubmit right away
        directory.fail_messages_to("nowhere");
        assert!(service.submit_order(order("U1")).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_directory_times_out() {
        let directory = Arc::new(RecordingDirectory::with_members(&["U1"]));
        directory.hang_channel_creation();
        let service = service(directory.clone(), None);

        let result = service.submit_order(order("U1")).await;
        assert!(matches!(
            result,
            Err(IntakeError::ProvisioningFailed(DirectoryError::Timeout {
                operation: "create_private_channel"
            }))
        ));
        assert_eq!(service.cooldowns().last_accepted("U1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_duplicate_submission_creates_one_ticket() {
        let directory = Arc::new(RecordingDirectory::with_members(&["U1"]));
        directory.delay_channel_creation(Duration::from_secs(1));
        let service = Arc::new(service(directory.clone(), None));

        let (a, b) = tokio::join!(
            service.submit_order(order("U1")),
            service.submit_order(order("U1"))
        );
        let results = [a, b];
        assert_eq!(results.iter().filter(|x| x.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|x| matches!(x, Err(IntakeError::RateLimited { .. })))
                .count(),
            1
        );
        let created = directory.calls().iter().filter(|x| matches!(x, Call::CreateChannel(_))).count();
        assert_eq!(created, 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(&Duration::from_secs(270)), 270);
        assert_eq!(retry_after_secs(&Duration::from_millis(269_001)), 270);
    }
}
