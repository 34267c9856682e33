//! SFTP operations
//!
//! The wire commands are those of an interactive SFTP client (`cd`, `chmod`, `get`, ...).
//! Operations which act on a named file first change into its directory, and fall back to
//! absolute paths if that fails.
// (c) 2026 the xfer-engine developers

mod chmod;
mod cwd;
mod delete;
mod list;
mod mkdir;
mod raw;
mod rename;
mod rmdir;
mod transfer;

pub(crate) use chmod::ChmodOp;
pub(crate) use cwd::CwdOp;
pub(crate) use delete::DeleteOp;
pub(crate) use list::ListOp;
pub(crate) use mkdir::MkdirOp;
pub(crate) use raw::RawOp;
pub(crate) use rename::RenameOp;
pub(crate) use rmdir::RemoveDirOp;
pub(crate) use transfer::TransferOp;

use super::OpContext;
use crate::protocol::path::ServerPath;

/// Characters which never need quoting
fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "._-+~@%,:=".contains(c)
}

/// Quotes a file name for an SFTP command line.
///
/// Names made only of safe characters are returned as they are. Anything else is wrapped in
/// double quotes, with embedded double quotes doubled.
/// Transports speaking SFTP can use this to implement
/// [`Transport::quote_filename`](crate::Transport::quote_filename).
#[must_use]
pub fn quote_filename(name: &str) -> String {
    if !name.is_empty() && name.chars().all(is_safe) {
        return name.to_string();
    }
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Requests a change of the remote working directory as a subcommand
pub(crate) fn change_dir(ctx: &mut OpContext<'_>, path: &ServerPath) {
    ctx.push_subcommand(Box::new(CwdOp::new(path.clone())));
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::quote_filename;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("a.txt", "a.txt")]
    #[case("my-file_2.tar.gz", "my-file_2.tar.gz")]
    #[case("/home/user/a.txt", "\"/home/user/a.txt\"")]
    #[case("with space", "\"with space\"")]
    #[case("say \"hi\"", "\"say \"\"hi\"\"\"")]
    #[case("", "\"\"")]
    fn quoting(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(quote_filename(input), expected);
    }
}
