//! File transfer (get and put)
// (c) 2026 the xfer-engine developers

use tracing::{debug, info, warn};

use super::change_dir;
use crate::cache::Freshness;
use crate::protocol::command::{CommandId, TransferArgs, TransferData};
use crate::protocol::data::DataChannel;
use crate::protocol::flags::{TransferFlags, ftp};
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, TransferInfo, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    WaitCwd,
    Transfer,
    Waiting,
}

/// Transfers one file in either direction.
///
/// The local source or sink is opened when the wire command is sent. The open reader or
/// writer is held here, where the driver can reach it through [`Operation::data_channel`],
/// and dropped as soon as the operation ends.
#[derive(Debug)]
pub(crate) struct TransferOp {
    args: TransferArgs,
    state: State,
    use_absolute: bool,
    channel: Option<DataChannel>,
}

impl TransferOp {
    pub(crate) fn new(args: TransferArgs) -> Self {
        Self {
            args,
            state: State::Init,
            use_absolute: false,
            channel: None,
        }
    }

    fn direction(&self) -> &'static str {
        if self.args.download() { "download" } else { "upload" }
    }

    fn open_channel(&self) -> Result<DataChannel, Reply> {
        match self.args.data() {
            TransferData::Upload(source) => source.open().map(DataChannel::Upload).map_err(|e| {
                warn!("Could not open '{}': {e:#}", source.name());
                Reply::CRITICALERROR
            }),
            TransferData::Download(sink) => sink
                .open()
                .map(|writer| DataChannel::Download {
                    writer,
                    fsync: self.args.flags().contains(TransferFlags::FSYNC),
                })
                .map_err(|e| {
                    warn!("Could not open '{}': {e:#}", sink.name());
                    Reply::CRITICALERROR | Reply::WRITEFAILED
                }),
        }
    }

    fn mark_cache(&self, ctx: &OpContext<'_>, freshness: Freshness) {
        if let Some(server) = ctx.server() {
            let _ = ctx.cache.update_file(
                server,
                self.args.remote_path(),
                self.args.remote_file(),
                false,
                freshness,
            );
        }
    }

    fn transfer_info(&self, remote: String) -> TransferInfo {
        let (local, size) = match self.args.data() {
            TransferData::Upload(source) => (source.name(), source.size()),
            TransferData::Download(sink) => (sink.name(), None),
        };
        TransferInfo {
            download: self.args.download(),
            remote,
            local,
            size,
            extra_flags: self.args.extra_flags().to_string(),
            persistent_state: self.args.persistent_state().to_vec(),
        }
    }
}

impl Operation for TransferOp {
    fn id(&self) -> CommandId {
        CommandId::Transfer
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Init => {
                if self.args.flags().protocol_bits().contains(ftp::ASCII) {
                    debug!("ASCII mode has no meaning over SFTP, ignoring");
                }
                info!(
                    "Starting {} of '{}'",
                    self.direction(),
                    self.args
                        .remote_path()
                        .format_filename(self.args.remote_file(), false)
                );
                self.state = State::WaitCwd;
                change_dir(ctx, self.args.remote_path());
                Reply::CONTINUE
            }
            State::Transfer => {
                let channel = match self.open_channel() {
                    Ok(c) => c,
                    Err(reply) => return reply,
                };
                self.channel = Some(channel);
                if !self.args.download() {
                    self.mark_cache(ctx, Freshness::Unknown);
                }
                let remote = self
                    .args
                    .remote_path()
                    .format_filename(self.args.remote_file(), !self.use_absolute);
                let quoted = ctx.transport.quote_filename(&remote);
                ctx.transport.announce_transfer(&self.transfer_info(remote));
                self.state = State::Waiting;
                let verb = if self.args.download() { "get" } else { "put" };
                ctx.transport.send_command(&format!("{verb} {quoted}"))
            }
            State::WaitCwd | State::Waiting => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.state != State::Waiting {
            return unexpected_event(self, "response");
        }
        self.channel = None;
        let result = ctx.transport.result();
        if result.is_error() {
            debug!("{} failed: {result}", self.direction());
        }
        result
    }

    fn subcommand_result(
        &mut self,
        prev: Reply,
        _prev_op: &dyn Operation,
        _ctx: &mut OpContext<'_>,
    ) -> Reply {
        if self.state != State::WaitCwd {
            return unexpected_event(self, "subcommand result");
        }
        if prev != Reply::OK {
            debug!("could not change directory ({prev}), using absolute path");
            self.use_absolute = true;
        }
        self.state = State::Transfer;
        Reply::CONTINUE
    }

    fn cancel(&mut self, ctx: &mut OpContext<'_>) {
        self.channel = None;
        if self.state == State::Waiting && !self.args.download() {
            self.mark_cache(ctx, Freshness::Unsure);
        }
    }

    fn data_channel(&mut self) -> Option<&mut DataChannel> {
        self.channel.as_mut()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::cache::{DirectoryCache, DirectoryListing, Freshness, MemoryDirectoryCache};
    use crate::protocol::command::{Command, TransferArgs, TransferData};
    use crate::protocol::data::{FileSource, MemorySink, MemorySource, SharedBuffer};
    use crate::protocol::flags::{TransferFlags, ftp};
    use crate::protocol::path::ServerPath;
    use crate::protocol::reply::Reply;
    use crate::session::TransferInfo;
    use crate::session::test::{RecordingTransport, connected_executor, run_to_end, test_server};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn upload(source: MemorySource) -> Command {
        Command::Transfer(TransferArgs::new(
            TransferData::Upload(Box::new(source)),
            ServerPath::new("/in"),
            "up.bin",
            TransferFlags::NONE,
        ))
    }

    #[test]
    fn download_releases_sink() {
        let buffer = SharedBuffer::default();
        let cmd = Command::Transfer(
            TransferArgs::new(
                TransferData::Download(Box::new(MemorySink::new("mem", buffer.clone()))),
                ServerPath::new("/out"),
                "f.txt",
                TransferFlags::DOWNLOAD | TransferFlags::FSYNC | ftp::ASCII,
            )
            .with_extra_flags("-p")
            .with_persistent_state(vec![1, 2]),
        );
        let mut exec = connected_executor(
            RecordingTransport::default(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut().script([Reply::OK, Reply::OK]);
        let reply = exec.execute(cmd);
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent, ["cd \"/out\"", "get f.txt"]);
        assert_eq!(
            exec.transport().transfers,
            [TransferInfo {
                download: true,
                remote: "f.txt".into(),
                local: "mem".into(),
                size: None,
                extra_flags: "-p".into(),
                persistent_state: vec![1, 2],
            }]
        );
        // The command, its sink and the open writer are all gone
        assert_eq!(buffer.references(), 1);
    }

    #[test]
    fn upload_marks_cache() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/in"), vec![]),
        );
        let mut exec = connected_executor(RecordingTransport::default(), cache.clone());
        exec.transport_mut().script([Reply::ERROR, Reply::OK]);
        let reply = exec.execute(upload(MemorySource::new("src", &b"abc"[..])));
        assert_eq!(run_to_end(&mut exec, reply), Reply::OK);
        assert_eq!(exec.transport().sent[1], "put \"/in/up.bin\"");
        assert_eq!(exec.transport().transfers[0].size, Some(3));
        let listing = cache.lookup(&test_server(), &ServerPath::new("/in")).unwrap();
        assert_eq!(listing.entry("up.bin").unwrap().freshness, Freshness::Unknown);
    }

    #[test]
    fn cancelled_upload_is_unsure() {
        let cache = Arc::new(MemoryDirectoryCache::new());
        cache.store(
            &test_server(),
            DirectoryListing::new(ServerPath::new("/in"), vec![]),
        );
        let mut exec = connected_executor(RecordingTransport::default(), cache.clone());
        let reply = exec.execute(upload(MemorySource::new("src", &b"abc"[..])));
        assert_eq!(reply, Reply::WOULDBLOCK);
        exec.transport_mut().complete();
        assert_eq!(exec.response_received(), Reply::WOULDBLOCK);
        assert!(exec.wait_parts().1.is_some());

        assert_eq!(exec.cancel(), Reply::CANCELED);
        assert!(exec.transport().aborted);
        let listing = cache.lookup(&test_server(), &ServerPath::new("/in")).unwrap();
        assert_eq!(listing.entry("up.bin").unwrap().freshness, Freshness::Unsure);
    }

    #[test]
    fn unreadable_source() {
        let mut exec = connected_executor(
            RecordingTransport::default(),
            Arc::new(MemoryDirectoryCache::new()),
        );
        exec.transport_mut().script([Reply::OK]);
        let cmd = Command::Transfer(TransferArgs::new(
            TransferData::Upload(Box::new(FileSource::new("/nonexistent/xfer-engine/file"))),
            ServerPath::new("/in"),
            "x",
            TransferFlags::NONE,
        ));
        let reply = exec.execute(cmd);
        assert_eq!(run_to_end(&mut exec, reply), Reply::CRITICALERROR);
        assert_eq!(exec.transport().sent, ["cd \"/in\""]);
        assert!(!exec.is_busy());
    }
}
