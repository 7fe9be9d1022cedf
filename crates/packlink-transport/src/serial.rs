use std::fs::OpenOptions;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::LinkStream;

/// Serial tty transport.
///
/// Opens a character device non-blocking and puts it in raw 8N1 mode with
/// no flow control, matching the UART framing every controller uses.
pub struct SerialPort;

impl SerialPort {
    /// Baud rates with a termios equivalent.
    pub const SUPPORTED_BAUDS: &'static [u32] = &[9600, 19200, 38400, 57600, 115200, 230400];

    /// Baud rate used by every inter-controller link.
    pub const DEFAULT_BAUD: u32 = 9600;

    /// Open `path` at `baud` and return a non-blocking link.
    pub fn open(path: impl AsRef<Path>, baud: u32) -> Result<LinkStream> {
        let path = path.as_ref().to_path_buf();
        let speed = speed_for(baud).ok_or(TransportError::UnsupportedBaud(baud))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        let fd = file.as_raw_fd();
        configure_raw(fd, speed).map_err(|source| TransportError::Configure {
            path: path.clone(),
            source,
        })?;

        info!(?path, baud, "serial link opened");
        Ok(LinkStream::from_serial(file))
    }
}

fn speed_for(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        _ => return None,
    };
    Some(speed)
}

fn configure_raw(fd: libc::c_int, speed: libc::speed_t) -> std::io::Result<()> {
    // SAFETY: `termios` is a plain C struct; zeroed is a valid starting value
    // that tcgetattr fully overwrites before use.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open descriptor owned by the caller and `tio` is a
    // valid writable termios for the duration of each call.
    unsafe {
        if libc::tcgetattr(fd, &mut tio) != 0 {
            return Err(std::io::Error::last_os_error());
        }

        libc::cfmakeraw(&mut tio);
        tio.c_cflag |= libc::CLOCAL | libc::CREAD;
        tio.c_cflag &= !(libc::CSTOPB | libc::PARENB | libc::CRTSCTS | libc::CSIZE);
        tio.c_cflag |= libc::CS8;
        tio.c_cc[libc::VMIN] = 0;
        tio.c_cc[libc::VTIME] = 0;

        if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::tcsetattr(fd, libc::TCSANOW, &tio) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        // Stale bytes from before we opened would only desync the first frame.
        if libc::tcflush(fd, libc::TCIOFLUSH) != 0 {
            debug!("tcflush failed; continuing with unflushed buffers");
        }
    }
    Ok(())
}
