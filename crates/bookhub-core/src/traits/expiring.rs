//! Stores whose entries lapse with time.

/// A store holding entries that become dead at a known instant.
///
/// Readers already treat dead entries as absent; purging only reclaims the
/// memory they hold.
pub trait ExpiringStore: Send + Sync + std::fmt::Debug + 'static {
    /// Short name used in logs.
    fn label(&self) -> &'static str;

    /// Removes every dead entry. Returns how many were removed.
    fn purge_expired(&self) -> usize;
}
