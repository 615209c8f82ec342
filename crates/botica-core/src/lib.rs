//! # botica-core: Pure Business Logic for Botica
//!
//! This crate is the **heart** of Botica, a single-location pharmacy
//! point-of-sale and inventory system. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Botica Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │               Presentation (out of scope)                     │ │
//! │  │    POS screen ──► Inventory screen ──► Reports                │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │              ★ botica-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌────────────┐     │ │
//! │  │  │  types   │ │  money   │ │ allocation │ │   totals   │     │ │
//! │  │  │ Product  │ │ rounding │ │ lot picks  │ │ sale math  │     │ │
//! │  │  │ Sale ... │ │  rules   │ │ (greedy)   │ │  payment   │     │ │
//! │  │  └──────────┘ └──────────┘ └────────────┘ └────────────┘     │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                 botica-db (Database Layer)                    │ │
//! │  │       SQLite repositories, settlement transactions            │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, ProductLot, Sale, Purchase, ...)
//! - [`money`] - Decimal rounding rules for monetary aggregates
//! - [`allocation`] - Oldest-expiration-first lot allocation planning
//! - [`totals`] - Sale/purchase totals and payment policy
//! - [`validation`] - Input validation for carts and intake lines
//! - [`clock`] - Injectable time source
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Exact Decimals**: All money and quantities are `rust_decimal::Decimal`
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod clock;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use botica_core::Product` instead of
// `use botica_core::types::Product`.

pub use clock::{Clock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Folio series used for sales.
pub const SERIES_SALE: &str = "SALE";

/// Folio series used for supplier purchases.
pub const SERIES_PURCHASE: &str = "PURCHASE";

/// Folio series used for customer returns.
pub const SERIES_RETURN: &str = "RETURN";

/// Folio series used for cash-session cuts.
pub const SERIES_CASHCUT: &str = "CASHCUT";

/// Zero-padding width applied when a folio series is created on demand.
///
/// Seeded series may carry their own width; this is only the default for
/// series that appear for the first time through `next_folio`.
pub const DEFAULT_FOLIO_PADDING: u32 = 6;
