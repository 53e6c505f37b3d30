//! In-process fake IMAP server for integration testing
//!
//! Mail-in-a-Box speaks IMAP over implicit TLS, so the handshake
//! starts as soon as the TCP connection is accepted:
//!
//! ```text
//!   Client connects via TCP
//!       |
//!   TLS handshake
//!       |
//!   Server sends greeting: "* OK IMAP4rev1 ready\r\n"
//!       |
//!   LOGIN -> SELECT INBOX -> FETCH 1:* (BODY.PEEK[]) -> LOGOUT
//! ```
//!
//! Every client command starts with a tag (`A0001`, `A0002`, ...) that
//! the server echoes in its tagged OK/NO/BAD. Untagged `*` lines carry
//! data ahead of the completion.

use super::handlers::{handle_fetch, handle_login, handle_logout, handle_select};
use super::io::write_line;
use super::mailbox::Mailbox;
use imap_codec::CommandCodec;
use imap_codec::decode::Decoder;
use imap_codec::imap_types::command::CommandBody;
use imap_codec::imap_types::mailbox::Mailbox as ImapMailbox;
use rcgen::generate_simple_self_signed;
use rustls::pki_types::PrivatePkcs8KeyDer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

/// State shared between the test and every connection task.
struct Shared {
    mailbox: Mutex<Mailbox>,
    user: String,
    password: String,
    logins: AtomicUsize,
    logouts: AtomicUsize,
    fetched: AtomicUsize,
}

/// A fake IMAP server on localhost with an OS-assigned port.
///
/// The TLS certificate is self-signed and generated at startup, so
/// clients must connect with invalid certificates accepted.
pub struct FakeImapServer {
    port: u16,
    shared: Arc<Shared>,
    _handle: tokio::task::JoinHandle<()>,
}

impl FakeImapServer {
    /// Start a server holding `mailbox` for the account `user` /
    /// `password`. Any other credentials are refused at LOGIN.
    pub async fn start(mailbox: Mailbox, user: &str, password: &str) -> Self {
        // Several tests may race to install the provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to ephemeral port");
        let port = listener.local_addr().unwrap().port();

        let cert = generate_simple_self_signed(vec!["127.0.0.1".to_string()])
            .expect("generate self-signed cert");
        let cert_der = cert.cert.der().clone();
        let key_der = PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der());

        let tls_config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert_der], key_der.into())
            .expect("build server TLS config");
        let acceptor = TlsAcceptor::from(Arc::new(tls_config));

        let shared = Arc::new(Shared {
            mailbox: Mutex::new(mailbox),
            user: user.to_string(),
            password: password.to_string(),
            logins: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            fetched: AtomicUsize::new(0),
        });

        let accept_shared = shared.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _addr)) = listener.accept().await else {
                    break;
                };
                let acceptor = acceptor.clone();
                let shared = accept_shared.clone();
                tokio::spawn(async move {
                    let Ok(tls_stream) = acceptor.accept(stream).await else {
                        return;
                    };
                    handle_session(tls_stream, &shared).await;
                });
            }
        });

        Self {
            port,
            shared,
            _handle: handle,
        }
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Append a message to INBOX. Visible to the next SELECT.
    pub fn deliver(&self, raw: &[u8]) {
        self.shared.mailbox.lock().unwrap().deliver(raw);
    }

    /// Number of successful LOGINs so far.
    pub fn logins(&self) -> usize {
        self.shared.logins.load(Ordering::SeqCst)
    }

    /// Number of LOGOUTs received so far.
    pub fn logouts(&self) -> usize {
        self.shared.logouts.load(Ordering::SeqCst)
    }

    /// Number of message bodies sent in FETCH responses so far.
    pub fn fetched(&self) -> usize {
        self.shared.fetched.load(Ordering::SeqCst)
    }
}

fn mailbox_name(mb: &ImapMailbox<'_>) -> String {
    match mb {
        ImapMailbox::Inbox => "INBOX".to_string(),
        ImapMailbox::Other(other) => {
            let bytes: &[u8] = other.as_ref();
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Greet the client and run the command loop over an established TLS
/// stream.
///
/// Commands are parsed with `imap-codec`; LOGIN arguments are taken
/// from the raw line since that is what the client actually sent.
async fn handle_session<S: AsyncRead + AsyncWrite + Unpin>(stream: S, shared: &Shared) {
    let mut reader = BufReader::new(stream);
    if write_line(&mut reader, "* OK IMAP4rev1 Fake server ready\r\n")
        .await
        .is_err()
    {
        return;
    }

    let mut selected_folder: Option<String> = None;
    let codec = CommandCodec::default();

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Ok((_, command)) = codec.decode(line.as_bytes()) else {
            let tag = trimmed.split_whitespace().next().unwrap_or("*");
            let resp = format!("{tag} BAD Parse error\r\n");
            if write_line(&mut reader, &resp).await.is_err() {
                break;
            }
            continue;
        };

        let tag = command.tag.inner();
        let snap = shared.mailbox.lock().unwrap().clone();

        match command.body {
            CommandBody::Login { .. } => {
                let account = (shared.user.as_str(), shared.password.as_str());
                if handle_login(tag, &line, account, &mut reader).await {
                    shared.logins.fetch_add(1, Ordering::SeqCst);
                }
            }
            CommandBody::Select { mailbox: mb, .. } => {
                let name = mailbox_name(&mb);
                selected_folder = handle_select(tag, &name, &snap, &mut reader).await;
            }
            CommandBody::Fetch {
                sequence_set,
                uid: false,
                ..
            } => {
                let sent = handle_fetch(
                    tag,
                    &sequence_set,
                    &snap,
                    selected_folder.as_deref(),
                    &mut reader,
                )
                .await;
                shared.fetched.fetch_add(sent, Ordering::SeqCst);
            }
            CommandBody::Logout => {
                shared.logouts.fetch_add(1, Ordering::SeqCst);
                handle_logout(tag, &mut reader).await;
                break;
            }
            _ => {
                let resp = format!("{tag} BAD Unknown command\r\n");
                if write_line(&mut reader, &resp).await.is_err() {
                    break;
                }
            }
        }
    }
}
