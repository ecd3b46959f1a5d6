use tracing::{debug, warn};

use crate::database::AbstractEvents;
use crate::error::{Error, Result};

/// Make sure a booking's event reference resolves before it is written.
///
/// Runs only when the reference changed in this save. Each qualifying call
/// reads the events collection; nothing is cached. The check and the
/// following write are not atomic.
pub async fn ensure_event_exists<E>(events: &E, event_id: &str, changed: bool) -> Result<()>
where
    E: AbstractEvents + ?Sized,
{
    if !changed {
        return Ok(());
    }

    debug!("Checking event reference {}", event_id);
    if events.event_exists(event_id).await? {
        Ok(())
    } else {
        warn!("Rejected booking for missing event {}", event_id);
        Err(Error::ReferentialIntegrity {
            event_id: event_id.to_string(),
        })
    }
}
