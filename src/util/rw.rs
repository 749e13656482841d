use std::{cell::RefCell, fmt::Write, io, rc::Rc};

/// Buffer shared between a WriteHandle and whoever reads back its output.
pub type SharedStringBuffer = Rc<RefCell<StringBuffer>>;

pub struct StringBuffer {
    s: String,
}

impl StringBuffer {
    pub fn new() -> StringBuffer {
        StringBuffer{s: String::new()}
    }

    pub fn as_str(&self) -> &str {
        self.s.as_str()
    }

    pub fn clear(&mut self) {
        self.s = String::new();
    }

    /// Takes the contents, leaving the buffer empty.
    pub fn export_string(&mut self) -> String {
        std::mem::take(&mut self.s)
    }
}

// String only implements fmt::Write
impl io::Write for StringBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let str_rep = std::str::from_utf8(buf)
            .map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, e)
            })?;
        let res = self.s.write_str(str_rep);
        match res {
            Ok(_) => Ok(buf.len()),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// For convenience, so we can pass around a shared stream writer.
//
// This lets the converter write to stdout/stderr when run as a program,
// and to string buffers when run from tests.
#[derive(Clone)]
pub struct WriteHandle {
    w: Rc<RefCell<dyn io::Write>>,
}

impl WriteHandle {
    pub fn stdout_write_handle() -> WriteHandle {
        WriteHandle{
            w: Rc::new(RefCell::new(io::stdout()))
        }
    }

    pub fn stderr_write_handle() -> WriteHandle {
        WriteHandle{
            w: Rc::new(RefCell::new(io::stderr()))
        }
    }

    pub fn string_buff_write_handle() -> (WriteHandle, SharedStringBuffer) {
        let buffer = Rc::new(RefCell::new(StringBuffer::new()));
        let h = WriteHandle{
            w: buffer.clone()
        };
        (h, buffer)
    }

    pub fn empty_write_handle() -> WriteHandle {
        WriteHandle{
            w: Rc::new(RefCell::new(io::empty()))
        }
    }
}

impl io::Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The test framework cannot capture direct writes to stdout or stderr,
        // only writes through print/println/eprintln, so trace them here.
        tracing::trace!("WriteHandle::write {}", String::from_utf8_lossy(buf));
        self.w.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.w.borrow_mut().flush()
    }
}

/// writeln!, but ignores the result. For writing to error streams, where
/// there is nowhere left to report a failure to.
#[macro_export]
macro_rules! write_errln {
    ($dst:expr) => {{
        use std::io::Write as _;
        let _ = writeln!($dst);
    }};
    ($dst:expr, $($arg:tt)*) => {{
        use std::io::Write as _;
        let _ = writeln!($dst, $($arg)*);
    }};
}
