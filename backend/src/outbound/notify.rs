//! Tracking update notifier backed by structured logging.
//!
//! Downstream subscriber channels (email, SMS) hang off the same port; this
//! adapter records every committed movement so operators can follow parcels
//! through the log stream.

use async_trait::async_trait;
use tracing::info;

use crate::domain::parcel::Parcel;
use crate::domain::ports::TrackingNotifier;
use crate::domain::tracking::TrackingEvent;

/// Notifier that emits one structured log line per committed movement.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTrackingNotifier;

#[async_trait]
impl TrackingNotifier for TracingTrackingNotifier {
    async fn notify(&self, parcel: &Parcel, event: &TrackingEvent) {
        info!(
            tracking_code = parcel.tracking_code.as_str(),
            status = event.status.as_str(),
            location = %event.location,
            recipient_email = %parcel.recipient_email,
            "parcel movement recorded"
        );
    }
}
