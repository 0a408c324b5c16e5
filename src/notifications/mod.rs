//! Dashboard Change Notifications
//!
//! Typed pub/sub through which the engine announces tree changes. The engine
//! never depends on who is listening; a renderer, a logger or a test recorder
//! subscribe the same way.
//!
//! # Example Usage
//!
//! ```no_run
//! use contribstats::notifications::{AsyncNotificationManager, DashboardEvent, NotificationManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = AsyncNotificationManager::<DashboardEvent>::new();
//! manager.publish(DashboardEvent::FilterChanged { starred_only: true }).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod manager;
pub mod traits;


pub use error::{NotificationError, NotificationResult};
pub use events::{DashboardEvent, ListingTarget, NotificationEvent, SummaryScope};
pub use manager::AsyncNotificationManager;
pub use traits::{DeliveryStats, NotificationManager, Subscriber};
