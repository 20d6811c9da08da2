//! Minimal SMTP client dialogue: read replies, send commands.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error_handling::ProbeError;

/// A complete (possibly multi-line) SMTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    /// The reply text joined into one line, as sent by the server.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    /// Whether any line of an EHLO reply advertises the given extension.
    pub fn advertises(&self, extension: &str) -> bool {
        self.lines.iter().any(|line| {
            line.get(4..)
                .and_then(|rest| rest.split_whitespace().next())
                .is_some_and(|keyword| keyword.eq_ignore_ascii_case(extension))
        })
    }
}

/// Reads one SMTP reply, following continuation lines (`250-...`) up to the
/// final line (`250 ...`).
///
/// # Errors
///
/// Returns `ProbeError::Io` on socket failures and `ProbeError::Malformed`
/// if the connection closes mid-reply or a line has no reply code.
pub async fn read_reply<S>(reader: &mut BufReader<S>) -> Result<SmtpReply, ProbeError>
where
    S: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let mut raw = Vec::new();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            return Err(ProbeError::Malformed(
                "connection closed before SMTP reply completed".to_string(),
            ));
        }
        // Servers may send Latin-1 banners
        let line = String::from_utf8_lossy(&raw)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        let code = line
            .get(..3)
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| ProbeError::Malformed(format!("invalid SMTP reply line: {line:?}")))?;
        let last = line.as_bytes().get(3) != Some(&b'-');
        lines.push(line);
        if last {
            return Ok(SmtpReply { code, lines });
        }
    }
}

/// Sends one command line terminated by CRLF.
pub async fn send_command<S>(stream: &mut S, command: &str) -> Result<(), ProbeError>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(format!("{command}\r\n").as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}
