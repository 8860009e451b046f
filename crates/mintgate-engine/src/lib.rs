//! # mintgate-engine: Time-Phased Allow-List Sale Engine
//!
//! Grants a strictly limited, time-phased right to mint numbered assets,
//! then accounts for and releases the payments.
//!
//! ## Flow of a mutating call
//!
//! 1. Read the phase from the clock and the configured start time.
//! 2. For allow-list mints, verify the membership proof.
//! 3. Plan the quota reservation.
//! 4. Quote the payment.
//! 5. Mint through the [`AssetRegistry`].
//! 6. Commit quota and custody.
//!
//! Steps 1–5 run under one exclusive lock and any failure leaves every
//! counter unchanged. Step 6 cannot fail.
//!
//! ## Seams
//!
//! - [`AssetRegistry`] owns asset ids and ownership. [`InMemoryRegistry`]
//!   is the reference implementation.
//! - [`PayoutRail`] moves released funds. [`LedgerRail`] records credits.
//! - [`Clock`] supplies "now". [`SystemClock`] for production,
//!   [`ManualClock`] for tests and simulation.

pub mod clock;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod rail;
pub mod registry;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{MintReceipt, SaleEngine};
pub use error::SaleError;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use rail::{LedgerRail, PayoutError, PayoutRail};
pub use registry::{AssetRegistry, InMemoryRegistry, RegistryError};
pub use state::{EngineState, MintPlan};
