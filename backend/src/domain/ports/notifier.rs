//! Port for fanning tracking updates out to interested subscribers.

use async_trait::async_trait;

use crate::domain::parcel::Parcel;
use crate::domain::tracking::TrackingEvent;

/// Port notified after every committed tracking mutation.
///
/// Delivery is best effort: callers log adapter failures and carry on, so an
/// implementation must never be able to roll back the mutation it describes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackingNotifier: Send + Sync {
    /// Announce a committed status/location change.
    async fn notify(&self, parcel: &Parcel, event: &TrackingEvent);
}

/// Notifier that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrackingNotifier;

#[async_trait]
impl TrackingNotifier for NoopTrackingNotifier {
    async fn notify(&self, _parcel: &Parcel, _event: &TrackingEvent) {}
}
