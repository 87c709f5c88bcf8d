//! Terminal surface backed by the controlling tty.

use std::io;
use std::path::PathBuf;

use crate::core::input::KeyEvent;
use crate::core::terminal::Terminal;

#[cfg(unix)]
use std::collections::VecDeque;
#[cfg(unix)]
use std::fs::OpenOptions;
#[cfg(unix)]
use std::io::Write;
#[cfg(unix)]
use std::time::{Duration, Instant};

#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use tracing::{debug, warn};

#[cfg(unix)]
use crate::core::input::parse_key_event;
#[cfg(unix)]
use crate::platform::stdin_buffer::StdinBuffer;

const DEFAULT_COLUMNS: usize = 80;
const DEFAULT_ROWS: usize = 24;
#[cfg(unix)]
const ESCAPE_TIMEOUT_MS: u64 = 10;
#[cfg(unix)]
const CURSOR_REPORT_TIMEOUT: Duration = Duration::from_millis(100);

#[cfg(unix)]
fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result > 0 && (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }
        if result > 0 {
            return Err(io::Error::other(format!(
                "poll(POLLOUT) returned revents=0x{:x}",
                fds.revents
            )));
        }
    }
}

#[cfg(unix)]
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> io::Result<usize>,
    FWait: FnMut(c_int) -> io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
            }
            Ok(count) => written += count.min(bytes.len() - written),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => wait_writable(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

#[cfg(unix)]
fn read_fd(fd: c_int, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        let result = unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
        if result >= 0 {
            return Ok(result as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(usize, usize)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col as usize, size.ws_row as usize))
    } else {
        None
    }
}

/// `timeout_ms < 0` waits forever.
#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: i32) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0);
    }
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Finds a `ESC [ row ; col R` report. Returns its byte range and the
/// zero-based `(column, row)`.
#[cfg_attr(not(unix), allow(dead_code))]
fn find_cursor_report(bytes: &[u8]) -> Option<(usize, usize, usize, usize)> {
    let mut search = 0;
    while let Some(offset) = bytes[search..].windows(2).position(|pair| pair == b"\x1b[") {
        let start = search + offset;
        let body = &bytes[start + 2..];
        if let Some(end) = body.iter().position(|&byte| byte == b'R') {
            let params = std::str::from_utf8(&body[..end]).ok();
            let parsed = params.and_then(|params| {
                let (row, col) = params.split_once(';')?;
                Some((row.parse::<usize>().ok()?, col.parse::<usize>().ok()?))
            });
            if let Some((row, col)) = parsed {
                return Some((
                    start,
                    start + 2 + end + 1,
                    col.saturating_sub(1),
                    row.saturating_sub(1),
                ));
            }
        }
        search = start + 1;
    }
    None
}

/// Renders `text` for a tty in raw mode.
///
/// Tracks where the cursor lands assuming immediate wrap at `width`, and
/// emits `\r\n` after the last column so the tty agrees with that model.
#[cfg_attr(not(unix), allow(dead_code))]
fn render_output(
    text: &str,
    mask: Option<Option<char>>,
    column: &mut usize,
    row: &mut usize,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(1);
    let last_row = height.max(1) - 1;
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\n' {
            out.push_str("\r\n");
            *column = 0;
            *row = (*row + 1).min(last_row);
            continue;
        }
        let rendered = match mask {
            None => ch,
            Some(Some(_)) if ch == ' ' => ' ',
            Some(Some(mask)) => mask,
            Some(None) => continue,
        };
        out.push(rendered);
        *column += 1;
        if *column >= width {
            out.push_str("\r\n");
            *column = 0;
            *row = (*row + 1).min(last_row);
        }
    }
    out
}

/// Relative motion from row `from_row` to `(col, row)`.
#[cfg_attr(not(unix), allow(dead_code))]
fn cursor_motion(from_row: usize, col: usize, row: usize) -> String {
    let mut out = String::new();
    if row < from_row {
        out.push_str(&format!("\x1b[{}A", from_row - row));
    } else if row > from_row {
        out.push_str(&format!("\x1b[{}B", row - from_row));
    }
    out.push('\r');
    if col > 0 {
        out.push_str(&format!("\x1b[{col}C"));
    }
    out
}

/// The process's own terminal, driven in raw mode.
///
/// The cursor position is tracked locally from what has been written, seeded
/// by a cursor position report at [`Terminal::start`]. Moves are emitted as
/// relative sequences, so the tracked row only needs to be right relative to
/// the prompt line.
#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    column: usize,
    row: usize,
    password_mode: bool,
    password_mask: Option<char>,
    stdin_buffer: StdinBuffer,
    queued: VecDeque<String>,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            column: 0,
            row: 0,
            password_mode: false,
            password_mask: None,
            stdin_buffer: StdinBuffer::new(ESCAPE_TIMEOUT_MS),
            queued: VecDeque::new(),
            write_log_path: None,
            write_log_failed: false,
        }
    }

    /// Character echoed per typed character in password mode. `None` echoes
    /// nothing.
    pub fn with_password_mask(mut self, mask: Option<char>) -> Self {
        self.password_mask = mask;
        self
    }

    /// Append every byte written to the tty to `path`.
    pub fn with_write_log(mut self, path: Option<PathBuf>) -> Self {
        self.write_log_path = path;
        self
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_raw_mode(&mut self) -> io::Result<()> {
        if let Some(original) = self.original_termios.take() {
            set_termios(self.stdin_fd, &original)?;
        }
        Ok(())
    }

    fn write_raw(&mut self, data: &str) -> io::Result<()> {
        write_fd(self.stdout_fd, data)?;
        if self.write_log_failed || data.is_empty() {
            return Ok(());
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(data.as_bytes()));
            if let Err(err) = result {
                warn!(path = %path.display(), error = %err, "disabling terminal write log");
                self.write_log_failed = true;
            }
        }
        Ok(())
    }

    /// Ask the tty where the cursor is. Input that arrives around the
    /// report is kept for [`Terminal::read_key`].
    fn query_cursor_position(&mut self) -> io::Result<Option<(usize, usize)>> {
        write_fd(self.stdout_fd, "\x1b[6n")?;

        let deadline = Instant::now() + CURSOR_REPORT_TIMEOUT;
        let mut received = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            if let Some((start, end, col, row)) = find_cursor_report(&received) {
                let mut rest = received[..start].to_vec();
                rest.extend_from_slice(&received[end..]);
                self.feed_input(&rest);
                return Ok(Some((col, row)));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !poll_readable(self.stdin_fd, remaining.as_millis() as i32)? {
                self.feed_input(&received);
                return Ok(None);
            }
            let count = read_fd(self.stdin_fd, &mut chunk)?;
            if count == 0 {
                self.feed_input(&received);
                return Ok(None);
            }
            received.extend_from_slice(&chunk[..count]);
        }
    }

    fn feed_input(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            let sequences = self.stdin_buffer.process(bytes);
            self.queued.extend(sequences);
        }
    }

    fn next_sequence(&mut self) -> io::Result<String> {
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(sequence) = self.queued.pop_front() {
                return Ok(sequence);
            }

            let timeout_ms = if self.stdin_buffer.is_pending() {
                self.stdin_buffer
                    .next_timeout_ms(Instant::now(), ESCAPE_TIMEOUT_MS as i32)
            } else {
                -1
            };
            if !poll_readable(self.stdin_fd, timeout_ms)? {
                let flushed = self.stdin_buffer.flush_due(Instant::now());
                self.queued.extend(flushed);
                continue;
            }

            let count = read_fd(self.stdin_fd, &mut chunk)?;
            if count == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal input closed",
                ));
            }
            self.feed_input(&chunk[..count]);
        }
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        if let Err(err) = self.restore_raw_mode() {
            warn!(error = %err, "failed to restore terminal mode");
        }
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(&mut self) -> io::Result<()> {
        self.enable_raw_mode()?;
        self.stdin_buffer.clear();
        match self.query_cursor_position()? {
            Some((col, row)) => {
                self.column = col;
                self.row = row;
            }
            None => {
                debug!("no cursor position report; assuming column 0");
                self.column = 0;
            }
        }
        debug!(column = self.column, row = self.row, "raw mode enabled");
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.queued.clear();
        self.stdin_buffer.clear();
        // Flush input before leaving raw mode to avoid buffered bytes leaking to the shell.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };
        debug!("raw mode disabled");
        self.restore_raw_mode()
    }

    fn cursor_column(&self) -> usize {
        self.column
    }

    fn cursor_row(&self) -> usize {
        self.row
    }

    fn buffer_width(&self) -> usize {
        read_winsize(self.stdout_fd)
            .map(|(cols, _)| cols)
            .unwrap_or(DEFAULT_COLUMNS)
    }

    fn buffer_height(&self) -> usize {
        read_winsize(self.stdout_fd)
            .map(|(_, rows)| rows)
            .unwrap_or(DEFAULT_ROWS)
    }

    fn set_cursor_position(&mut self, column: usize, row: usize) -> io::Result<()> {
        if self.password_mode && self.password_mask.is_none() {
            return Ok(());
        }
        let motion = cursor_motion(self.row, column, row);
        self.write_raw(&motion)?;
        self.column = column;
        self.row = row;
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        let mask = self.password_mode.then_some(self.password_mask);
        let (width, height) = (self.buffer_width(), self.buffer_height());
        let rendered = render_output(
            text,
            mask,
            &mut self.column,
            &mut self.row,
            width,
            height,
        );
        self.write_raw(&rendered)
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text)?;
        self.write_raw("\r\n")?;
        self.column = 0;
        self.row = (self.row + 1).min(self.buffer_height().max(1) - 1);
        Ok(())
    }

    fn password_mode(&self) -> bool {
        self.password_mode
    }

    fn set_password_mode(&mut self, enabled: bool) {
        self.password_mode = enabled;
    }

    fn read_key(&mut self, intercept: bool) -> io::Result<KeyEvent> {
        loop {
            let sequence = self.next_sequence()?;
            match parse_key_event(&sequence) {
                Some(event) => {
                    if !intercept {
                        if let Some(ch) = event.character.filter(|ch| !ch.is_control()) {
                            let mut encoded = [0u8; 4];
                            self.write(ch.encode_utf8(&mut encoded))?;
                        }
                    }
                    return Ok(event);
                }
                None => debug!(bytes = sequence.len(), "skipping unrecognised input sequence"),
            }
        }
    }
}

/// Placeholder for platforms without termios; every operation fails.
#[cfg(not(unix))]
#[derive(Debug, Default)]
pub struct ProcessTerminal {
    password_mode: bool,
}

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password_mask(self, _mask: Option<char>) -> Self {
        self
    }

    pub fn with_write_log(self, _path: Option<PathBuf>) -> Self {
        self
    }
}

#[cfg(not(unix))]
fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "process terminal requires a unix tty",
    )
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn start(&mut self) -> io::Result<()> {
        Err(unsupported())
    }

    fn cursor_column(&self) -> usize {
        0
    }

    fn cursor_row(&self) -> usize {
        0
    }

    fn buffer_width(&self) -> usize {
        DEFAULT_COLUMNS
    }

    fn buffer_height(&self) -> usize {
        DEFAULT_ROWS
    }

    fn set_cursor_position(&mut self, _column: usize, _row: usize) -> io::Result<()> {
        Err(unsupported())
    }

    fn write(&mut self, _text: &str) -> io::Result<()> {
        Err(unsupported())
    }

    fn write_line(&mut self, _text: &str) -> io::Result<()> {
        Err(unsupported())
    }

    fn password_mode(&self) -> bool {
        self.password_mode
    }

    fn set_password_mode(&mut self, enabled: bool) {
        self.password_mode = enabled;
    }

    fn read_key(&mut self, _intercept: bool) -> io::Result<KeyEvent> {
        Err(unsupported())
    }
}
