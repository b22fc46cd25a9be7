//! Per-client rate limiting using a token bucket.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Tokens replenished per second for each client.
const REQUESTS_PER_SECOND: u64 = 20;
/// Requests a client may issue in a burst before being throttled.
const BURST_SIZE: u32 = 200;

/// Creates the rate limiter applied to every order and table endpoint.
///
/// A full service of a table (open, a few rounds of items, prepare, bill) is
/// a handful of requests, while a waiter terminal may drive several tables at
/// once, hence the generous burst.
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Limits are
/// keyed by the socket peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(REQUESTS_PER_SECOND)
            .burst_size(BURST_SIZE)
            .finish()
            .expect("rate limit period and burst are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
