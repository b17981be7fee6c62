mod accelerator;
mod fingerprint_blocker;
mod ipset;
mod nft;

pub use accelerator::AcceleratorReloader;
pub use fingerprint_blocker::FingerprintBlocker;
pub use ipset::IpsetBlocker;
pub use nft::NftBlocker;
