use std::sync::Arc;

use attenthive_application::{
    ActorResolver, CareLogService, MembershipService, RateLimitService, RecipientService,
    UserService,
};
use ipnet::IpNet;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub actor_resolver: ActorResolver,
    pub user_service: UserService,
    pub membership_service: MembershipService,
    pub recipient_service: RecipientService,
    pub care_log_service: CareLogService,
    pub rate_limit_service: RateLimitService,
    pub frontend_url: String,
    pub bootstrap_token: String,
    /// Peers whose `x-forwarded-for` header is believed.
    pub trusted_proxies: Arc<Vec<IpNet>>,
}
