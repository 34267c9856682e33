//! Reply code algebra
//!
//! A [`Reply`] classifies the outcome of any step of execution.
//! Every error-class code is defined as `base | ERROR`, so `reply.is_error()` is a single mask
//! test and further classification (is it fatal? is it a timeout?) is another bit test on the
//! same value.
//!
//! Two codes are dispositions rather than outcomes: [`Reply::CONTINUE`] (run the state machine
//! again without waiting for the transport) and [`Reply::WOULDBLOCK`] (wait for the transport).
//! They only pass between an operation and its driver.
// (c) 2026 the xfer-engine developers

use std::fmt::{self, Display};

use crate::util::bit_set;

const ERROR_BIT: u32 = 0x0002;

bit_set!(
    /// Outcome or step disposition of an operation
    pub Reply => u32 {
        /// Success
        OK => 0x0000,
        /// The transport has I/O outstanding; the operation resumes when it completes
        WOULDBLOCK => 0x0001,
        /// Generic failure. Every failure code includes this bit.
        ERROR => ERROR_BIT,
        /// Failure which is pointless to retry automatically
        CRITICALERROR => 0x0004 | ERROR_BIT,
        /// The operation was cancelled
        CANCELED => 0x0008 | ERROR_BIT,
        /// The command was malformed
        SYNTAXERROR => 0x0010 | ERROR_BIT,
        /// There is no connection
        NOTCONNECTED => 0x0020 | ERROR_BIT,
        /// The connection was closed. On its own, this is informational.
        DISCONNECTED => 0x0040,
        /// An implementation defect; details are in the log
        INTERNALERROR => 0x0080 | ERROR_BIT,
        /// Another command is in progress
        BUSY => 0x0100 | ERROR_BIT,
        /// Connect was requested while already connected
        ALREADYCONNECTED => 0x0200 | ERROR_BIT,
        /// The server rejected our credentials. Reported alongside [`Reply::CRITICALERROR`].
        PASSWORDFAILED => 0x0400,
        /// The transport detected stalled I/O
        TIMEOUT => 0x0800 | ERROR_BIT,
        /// The command is not supported by this protocol
        NOTSUPPORTED => 0x1000 | ERROR_BIT,
        /// A local file could not be written during transfer
        WRITEFAILED => 0x2000 | ERROR_BIT,
        /// Symlink discovery found that the link does not point to a directory
        LINKNOTDIR => 0x4000 | ERROR_BIT,
        /// Run the state machine again without waiting for the transport
        CONTINUE => 0x8000,
        /// Internal marker for a missing item
        NOTFOUND => 0x0001_0000 | ERROR_BIT,
    }
);

/// Individual bit names, used for display
const BIT_NAMES: &[(u32, &str)] = &[
    (0x0001, "WOULDBLOCK"),
    (0x0002, "ERROR"),
    (0x0004, "CRITICAL"),
    (0x0008, "CANCELED"),
    (0x0010, "SYNTAX"),
    (0x0020, "NOTCONNECTED"),
    (0x0040, "DISCONNECTED"),
    (0x0080, "INTERNAL"),
    (0x0100, "BUSY"),
    (0x0200, "ALREADYCONNECTED"),
    (0x0400, "PASSWORDFAILED"),
    (0x0800, "TIMEOUT"),
    (0x1000, "NOTSUPPORTED"),
    (0x2000, "WRITEFAILED"),
    (0x4000, "LINKNOTDIR"),
    (0x8000, "CONTINUE"),
    (0x0001_0000, "NOTFOUND"),
];

impl Reply {
    /// Does this code carry the error bit?
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.intersects(Self::ERROR)
    }

    /// Is this a failure that must not be retried automatically?
    #[must_use]
    pub const fn is_critical(self) -> bool {
        self.contains(Self::CRITICALERROR)
    }

    /// Is this a step disposition ([`Reply::CONTINUE`] or [`Reply::WOULDBLOCK`]) rather than an outcome?
    #[must_use]
    pub const fn is_disposition(self) -> bool {
        self.0 == Self::CONTINUE.0 || self.0 == Self::WOULDBLOCK.0
    }

    /// Converts a terminal reply into a `Result`, so that an outer layer can use `?` on it.
    pub fn into_result(self) -> Result<Self, Self> {
        if self.is_error() { Err(self) } else { Ok(self) }
    }
}

impl Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "OK");
        }
        let mut names: Vec<String> = BIT_NAMES
            .iter()
            .filter(|(bit, _)| self.0 & *bit != 0)
            .map(|(_, name)| (*name).to_string())
            .collect();
        let known = BIT_NAMES.iter().fold(0u32, |acc, (bit, _)| acc | *bit);
        let rest = self.0 & !known;
        if rest != 0 {
            names.push(format!("{rest:#x}"));
        }
        write!(f, "{}", names.join("|"))
    }
}

impl std::error::Error for Reply {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::Reply;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn critical_is_error() {
        assert!(!(Reply::CRITICALERROR & Reply::ERROR).is_empty());
        assert!(Reply::CRITICALERROR.is_error());
        assert!(Reply::CRITICALERROR.is_critical());
        assert!(!Reply::ERROR.is_critical());
    }

    #[rstest]
    #[case(Reply::OK)]
    #[case(Reply::WOULDBLOCK)]
    #[case(Reply::DISCONNECTED)]
    #[case(Reply::CONTINUE)]
    #[case(Reply::PASSWORDFAILED)]
    fn not_errors(#[case] code: Reply) {
        assert!((code & Reply::ERROR).is_empty());
        assert!(!code.is_error());
    }

    #[rstest]
    #[case(Reply::ERROR)]
    #[case(Reply::CANCELED)]
    #[case(Reply::SYNTAXERROR)]
    #[case(Reply::NOTCONNECTED)]
    #[case(Reply::INTERNALERROR)]
    #[case(Reply::BUSY)]
    #[case(Reply::ALREADYCONNECTED)]
    #[case(Reply::TIMEOUT)]
    #[case(Reply::NOTSUPPORTED)]
    #[case(Reply::WRITEFAILED)]
    #[case(Reply::LINKNOTDIR)]
    #[case(Reply::NOTFOUND)]
    fn errors(#[case] code: Reply) {
        assert!(code.is_error());
        assert!(code.contains(Reply::ERROR));
    }

    #[test]
    fn dispositions() {
        assert!(Reply::CONTINUE.is_disposition());
        assert!(Reply::WOULDBLOCK.is_disposition());
        assert!(!Reply::OK.is_disposition());
        assert!(!(Reply::CONTINUE | Reply::ERROR).is_disposition());
        assert!(!Reply::CONTINUE.intersects(Reply::ERROR));
    }

    #[test]
    fn subtraction() {
        let r = Reply::CRITICALERROR | Reply::PASSWORDFAILED;
        assert_eq!(r.difference(Reply::PASSWORDFAILED), Reply::CRITICALERROR);
        assert_eq!(r.difference(Reply::CRITICALERROR), Reply::PASSWORDFAILED);
    }

    #[test]
    fn display() {
        assert_eq!(Reply::OK.to_string(), "OK");
        assert_eq!(Reply::ERROR.to_string(), "ERROR");
        assert_eq!(Reply::CRITICALERROR.to_string(), "ERROR|CRITICAL");
        assert_eq!(Reply::TIMEOUT.to_string(), "ERROR|TIMEOUT");
        assert_eq!(Reply::from_bits(0x0010_0000).to_string(), "0x100000");
    }

    #[test]
    fn debug() {
        assert_eq!(format!("{:?}", Reply::OK), "Reply(OK)");
        assert_eq!(format!("{:?}", Reply::WOULDBLOCK), "Reply(WOULDBLOCK)");
    }

    #[test]
    fn into_result() {
        assert_eq!(Reply::OK.into_result(), Ok(Reply::OK));
        assert_eq!(Reply::DISCONNECTED.into_result(), Ok(Reply::DISCONNECTED));
        assert_eq!(Reply::TIMEOUT.into_result(), Err(Reply::TIMEOUT));
        let e: anyhow::Error = Reply::TIMEOUT.into_result().unwrap_err().into();
        assert_eq!(e.to_string(), "ERROR|TIMEOUT");
    }
}
