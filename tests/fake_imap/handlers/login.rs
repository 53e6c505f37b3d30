//! LOGIN command handler.
//!
//! `async-imap` sends both arguments as quoted strings:
//!
//! ```text
//! A0001 LOGIN "anna@example.com" "s3cret"
//! ```
//!
//! The handler compares them against the account the server was
//! started with and answers `NO [AUTHENTICATIONFAILED]` on mismatch.

use crate::fake_imap::io::write_line;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Split the LOGIN arguments out of a raw command line, undoing IMAP
/// quoting (`\"` and `\\` escapes).
fn parse_login_args(line: &str) -> Vec<String> {
    let rest = line
        .trim()
        .splitn(3, ' ')
        .nth(2)
        .unwrap_or_default();

    let mut args = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' => {
                chars.next();
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => break,
                        other => value.push(other),
                    }
                }
                args.push(value);
            }
            _ => {
                let mut value = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ' ' {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
                args.push(value);
            }
        }
    }
    args
}

/// Handle the LOGIN command. Returns whether the login succeeded.
pub async fn handle_login<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    line: &str,
    account: (&str, &str),
    stream: &mut BufReader<S>,
) -> bool {
    let args = parse_login_args(line);
    let ok = args.len() == 2 && args[0] == account.0 && args[1] == account.1;

    let resp = if ok {
        format!("{tag} OK LOGIN completed\r\n")
    } else {
        format!("{tag} NO [AUTHENTICATIONFAILED] Invalid credentials\r\n")
    };
    write_line(stream, &resp).await.is_ok() && ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    const ACCOUNT: (&str, &str) = ("anna@example.com", "s3cret");

    async fn run(tag: &str, line: &str) -> (String, bool) {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);

        let ok = handle_login(tag, line, ACCOUNT, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        (String::from_utf8(buf).unwrap(), ok)
    }

    #[test]
    fn parses_quoted_arguments() {
        let args = parse_login_args("A1 LOGIN \"anna@example.com\" \"pa\\\"ss\"\r\n");
        assert_eq!(args, vec!["anna@example.com", "pa\"ss"]);
    }

    #[test]
    fn parses_atoms() {
        let args = parse_login_args("A1 LOGIN anna s3cret");
        assert_eq!(args, vec!["anna", "s3cret"]);
    }

    #[tokio::test]
    async fn accepts_matching_credentials() {
        let (output, ok) = run("A0001", "A0001 LOGIN \"anna@example.com\" \"s3cret\"\r\n").await;
        assert!(ok);
        assert_eq!(output, "A0001 OK LOGIN completed\r\n");
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let (output, ok) = run("A0001", "A0001 LOGIN \"anna@example.com\" \"nope\"\r\n").await;
        assert!(!ok);
        assert!(output.starts_with("A0001 NO [AUTHENTICATIONFAILED]"));
    }
}
