//! Command flag sets
//!
//! Both flag types are partitioned into disjoint ranges:
//! * bits the engine defines and acts upon;
//! * an _interface reserved_ range, owned by the calling layer, which the engine never inspects;
//! * a _protocol reserved_ range, owned by individual protocol implementations
//!   (for example [`ftp::ASCII`]).
//!
//! The partition is checked at compile time.
// (c) 2026 the xfer-engine developers

use static_assertions::const_assert_eq;

use crate::util::bit_set;

bit_set!(
    /// Flags modifying a [`List`](super::command::Command::List) command
    pub ListFlags => u16 {
        /// No flags
        NONE => 0,
        /// Fetch a listing even if a cache lookup could satisfy the request
        REFRESH => 0x0001,
        /// Only fetch a listing if the cache lookup fails or contains unsure entries.
        /// The age of a cached listing is not considered.
        AVOID => 0x0002,
        /// If the directory cannot be entered, list whatever directory we are in.
        /// Useful when reconnecting and we don't know if the remote directory still exists.
        FALLBACK_CURRENT => 0x0004,
        /// Symlink discovery: find out whether a link points to a directory
        LINK => 0x0008,
        /// Discard the cached listing before doing anything else
        CLEARCACHE => 0x0010,

        /// Bits owned by the calling layer. The engine never touches these.
        INTERFACE_RESERVED_MASK => 0x0f00,
        /// Bits owned by individual protocol implementations
        PROTOCOL_RESERVED_MASK => 0xf000,
    }
);

impl ListFlags {
    /// All the bits the engine itself defines
    pub const ENGINE_MASK: Self = Self::REFRESH
        .union(Self::AVOID)
        .union(Self::FALLBACK_CURRENT)
        .union(Self::LINK)
        .union(Self::CLEARCACHE);
}

bit_set!(
    /// Flags modifying a [`Transfer`](super::command::Command::Transfer) command
    pub TransferFlags => u16 {
        /// No flags (an upload)
        NONE => 0,
        /// Bits owned by the calling layer. The engine never touches these.
        INTERFACE_RESERVED_MASK => 0x000f,
        /// Transfer direction is remote to local
        DOWNLOAD => 0x0010,
        /// Sync the local file to stable storage when a download completes
        FSYNC => 0x0020,
        /// Bits owned by individual protocol implementations
        PROTOCOL_RESERVED_MASK => 0xff00,
        /// The highest protocol reserved bit
        PROTOCOL_RESERVED_MAX => 0x8000,
    }
);

impl TransferFlags {
    /// All the bits the engine itself defines
    pub const ENGINE_MASK: Self = Self::DOWNLOAD.union(Self::FSYNC);

    /// Is this a download?
    #[must_use]
    pub const fn download(self) -> bool {
        self.contains(Self::DOWNLOAD)
    }

    /// The protocol reserved bits of this value
    #[must_use]
    pub const fn protocol_bits(self) -> Self {
        self.intersection(Self::PROTOCOL_RESERVED_MASK)
    }
}

/// Flags meaningful only to FTP
pub mod ftp {
    use super::TransferFlags;

    /// Transfer in ASCII mode, translating line endings
    pub const ASCII: TransferFlags = TransferFlags::PROTOCOL_RESERVED_MAX;
}

// The ranges must not overlap.
const_assert_eq!(
    ListFlags::ENGINE_MASK.bits() & ListFlags::INTERFACE_RESERVED_MASK.bits(),
    0
);
const_assert_eq!(
    ListFlags::ENGINE_MASK.bits() & ListFlags::PROTOCOL_RESERVED_MASK.bits(),
    0
);
const_assert_eq!(
    ListFlags::INTERFACE_RESERVED_MASK.bits() & ListFlags::PROTOCOL_RESERVED_MASK.bits(),
    0
);
const_assert_eq!(
    TransferFlags::ENGINE_MASK.bits() & TransferFlags::INTERFACE_RESERVED_MASK.bits(),
    0
);
const_assert_eq!(
    TransferFlags::ENGINE_MASK.bits() & TransferFlags::PROTOCOL_RESERVED_MASK.bits(),
    0
);
const_assert_eq!(
    TransferFlags::INTERFACE_RESERVED_MASK.bits() & TransferFlags::PROTOCOL_RESERVED_MASK.bits(),
    0
);
const_assert_eq!(
    ftp::ASCII.bits() & !TransferFlags::PROTOCOL_RESERVED_MASK.bits(),
    0
);
